//! The model abstraction: field declarations, value conversion and the
//! [`model!`](crate::model!) declaration macro.
//!
//! A model describes its own fields instead of being inspected at run time.
//! Each field has a [`Shape`] derived from its Rust type through
//! [`FieldType`]; the dispatcher later decides whether that shape is one the
//! codecs support.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{FieldError, ModelError};
use crate::units::{CalendarUnit, DurationValue, TimeZoneId};
use crate::value::{Record, Value};

/// A data entity with a fixed, named, typed field set.
///
/// Implementations are normally generated by [`model!`](crate::model!).
/// `get` returns `None` for an absent field, `set` assigns a present one;
/// codecs start from `Default::default()` and only call `set` for fields that
/// carry a value.
pub trait Model: Default + 'static {
    /// Type name used in diagnostics and as the registry key.
    const NAME: &'static str;

    /// Every field in declaration order, including non-exposed ones.
    fn declare() -> Vec<FieldDecl>;

    fn get(&self, field: &str) -> Option<Value>;

    fn set(&mut self, field: &str, value: Value) -> Result<(), ModelError>;
}

/// Type-erased handle to a [`Model`] type.
///
/// Carries enough to enumerate the fields of a nested model without knowing
/// its Rust type, which is what lets the codecs recurse through [`Record`]s.
#[derive(Clone, Copy)]
pub struct ModelRef {
    name: &'static str,
    type_id: TypeId,
    declare: fn() -> Vec<FieldDecl>,
}

impl ModelRef {
    pub fn of<M: Model>() -> Self {
        Self {
            name: M::NAME,
            type_id: TypeId::of::<M>(),
            declare: M::declare,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is<M: Model>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }

    pub fn declare(&self) -> Vec<FieldDecl> {
        (self.declare)()
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModelRef {}

impl Hash for ModelRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelRef({})", self.name)
    }
}

/// Declared shape of a field's Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Bool,
    Str,
    Int,
    Long,
    Duration,
    CalendarUnit,
    TimeZone,
    List(Box<Shape>),
    /// A nullable field; only meaningful at the top level of a field.
    Optional(Box<Shape>),
    Model(ModelRef),
    /// A Rust type the codecs know nothing about.
    Other(&'static str),
}

impl Shape {
    /// Rust-flavoured rendering of the declared type, for error messages.
    pub fn describe(&self) -> String {
        match self {
            Shape::Bool => "bool".to_owned(),
            Shape::Str => "String".to_owned(),
            Shape::Int => "i32".to_owned(),
            Shape::Long => "i64".to_owned(),
            Shape::Duration => "DurationValue".to_owned(),
            Shape::CalendarUnit => "CalendarUnit".to_owned(),
            Shape::TimeZone => "TimeZoneId".to_owned(),
            Shape::List(item) => format!("Vec<{}>", item.describe()),
            Shape::Optional(item) => format!("Option<{}>", item.describe()),
            Shape::Model(model) => model.name().to_owned(),
            Shape::Other(name) => (*name).to_owned(),
        }
    }
}

/// One declared field of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: &'static str,
    pub shape: Shape,
    /// Whether the field is part of the public contract (plain `pub`).
    pub exposed: bool,
}

impl FieldDecl {
    pub fn new(name: &'static str, shape: Shape, exposed: bool) -> Self {
        Self {
            name,
            shape,
            exposed,
        }
    }
}

/// Conversion between a Rust field type and the dynamic [`Value`].
pub trait FieldType: Sized {
    fn shape() -> Shape;

    /// `None` means the field is absent.
    fn to_value(&self) -> Option<Value>;

    fn from_value(value: Value) -> Result<Self, FieldError>;
}

macro_rules! scalar_field_types {
    ($($ty:ty => $shape:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn shape() -> Shape {
                    Shape::$shape
                }

                fn to_value(&self) -> Option<Value> {
                    Some(Value::$shape(self.clone()))
                }

                fn from_value(value: Value) -> Result<Self, FieldError> {
                    match value {
                        Value::$shape(v) => Ok(v),
                        other => Err(FieldError::mismatch(Self::shape().describe(), other.kind())),
                    }
                }
            }
        )*
    };
}

scalar_field_types! {
    bool => Bool,
    String => Str,
    i32 => Int,
    i64 => Long,
    DurationValue => Duration,
    CalendarUnit => CalendarUnit,
    TimeZoneId => TimeZone,
}

macro_rules! unsupported_field_types {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn shape() -> Shape {
                    Shape::Other(stringify!($ty))
                }

                fn to_value(&self) -> Option<Value> {
                    Some(Value::Opaque(format!("{self:?}")))
                }

                fn from_value(value: Value) -> Result<Self, FieldError> {
                    Err(FieldError::mismatch(stringify!($ty), value.kind()))
                }
            }
        )*
    };
}

unsupported_field_types!(f32, f64, u8, u16, u32, u64, usize, i8, i16, isize, char);

impl<T: FieldType> FieldType for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(Box::new(T::shape()))
    }

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(T::to_value)
    }

    fn from_value(value: Value) -> Result<Self, FieldError> {
        T::from_value(value).map(Some)
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn shape() -> Shape {
        Shape::List(Box::new(T::shape()))
    }

    fn to_value(&self) -> Option<Value> {
        Some(Value::List(self.iter().filter_map(T::to_value).collect()))
    }

    fn from_value(value: Value) -> Result<Self, FieldError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(FieldError::mismatch(Self::shape().describe(), other.kind())),
        }
    }
}

/// [`FieldType::from_value`] for a nested model type.
pub fn model_from_value<M: Model>(value: Value) -> Result<M, FieldError> {
    match value {
        Value::Model(record) => Ok(record.into_model::<M>()?),
        other => Err(FieldError::mismatch(M::NAME, other.kind())),
    }
}

/// [`FieldType::to_value`] for a nested model type.
pub fn model_to_value<M: Model>(model: &M) -> Option<Value> {
    Some(Value::Model(Record::capture(model)))
}

/// Declares a model struct.
///
/// The struct gets a [`Model`] implementation, a [`FieldType`]
/// implementation so it can be nested in other models, and `PartialEq`,
/// `Eq`, `Hash`, `Debug` and `Display` built from the generic structural
/// operations. It must also derive (or implement) `Default`. Only plain
/// `pub` fields are serialized.
///
/// ```
/// use model_pack::{binary, model};
///
/// model! {
///     #[derive(Clone, Default)]
///     pub struct Pair {
///         pub a: i32,
///         pub b: Option<String>,
///     }
/// }
///
/// let pair = Pair { a: 3, b: Some("x".into()) };
/// let bytes = binary::to_bytes(&pair).unwrap();
/// assert_eq!(binary::from_bytes::<Pair>(&bytes).unwrap(), pair);
/// assert_eq!(pair.to_string(), "Pair[a=3,b=x]");
/// ```
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Model for $name {
            const NAME: &'static str = stringify!($name);

            fn declare() -> ::std::vec::Vec<$crate::FieldDecl> {
                ::std::vec![
                    $(
                        $crate::FieldDecl::new(
                            stringify!($field),
                            <$ty as $crate::FieldType>::shape(),
                            stringify!($fvis) == "pub",
                        ),
                    )*
                ]
            }

            fn get(&self, field: &str) -> ::std::option::Option<$crate::Value> {
                match field {
                    $(stringify!($field) => $crate::FieldType::to_value(&self.$field),)*
                    _ => ::std::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                field: &str,
                value: $crate::Value,
            ) -> ::std::result::Result<(), $crate::ModelError> {
                match field {
                    $(
                        stringify!($field) => {
                            self.$field = <$ty as $crate::FieldType>::from_value(value)
                                .map_err(|e| e.at(stringify!($name), stringify!($field)))?;
                            ::std::result::Result::Ok(())
                        }
                    )*
                    _ => ::std::result::Result::Err($crate::ModelError::UnknownField {
                        model: stringify!($name),
                        field: field.to_owned(),
                    }),
                }
            }
        }

        impl $crate::FieldType for $name {
            fn shape() -> $crate::Shape {
                $crate::Shape::Model($crate::ModelRef::of::<Self>())
            }

            fn to_value(&self) -> ::std::option::Option<$crate::Value> {
                $crate::model::model_to_value(self)
            }

            fn from_value(
                value: $crate::Value,
            ) -> ::std::result::Result<Self, $crate::FieldError> {
                $crate::model::model_from_value(value)
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $crate::structural::equals(self, other)
            }
        }

        impl ::std::cmp::Eq for $name {}

        impl ::std::hash::Hash for $name {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                state.write_u64($crate::structural::hash_of(self));
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::structural::to_string(self))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::structural::to_string(self))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::DurationUnit;

    crate::model! {
        #[derive(Clone, Default)]
        pub struct Sample {
            pub flag: bool,
            pub tags: Vec<String>,
            pub(crate) hidden: i64,
            secret: Option<String>,
            pub timeout: Option<DurationValue>,
        }
    }

    #[test]
    fn declarations_follow_source_order_and_visibility() {
        let decls = Sample::declare();
        let names: Vec<_> = decls.iter().map(|d| d.name).collect();
        assert_eq!(names, ["flag", "tags", "hidden", "secret", "timeout"]);
        let exposed: Vec<_> = decls.iter().map(|d| d.exposed).collect();
        assert_eq!(exposed, [true, true, false, false, true]);
        assert_eq!(decls[1].shape, Shape::List(Box::new(Shape::Str)));
        assert_eq!(
            decls[4].shape,
            Shape::Optional(Box::new(Shape::Duration))
        );
    }

    #[test]
    fn get_and_set_by_name() {
        let mut s = Sample::default();
        assert_eq!(s.get("timeout"), None);
        s.set("timeout", Value::Duration(DurationValue::new(3, DurationUnit::Hours)))
            .unwrap();
        assert_eq!(s.timeout, Some(DurationValue::new(3, DurationUnit::Hours)));
        assert_eq!(s.get("flag"), Some(Value::Bool(false)));
        assert_eq!(s.get("nope"), None);
        let _ = &s.secret;
    }

    #[test]
    fn set_rejects_wrong_value_kind() {
        let mut s = Sample::default();
        let err = s.set("flag", Value::Int(1)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::TypeMismatch { model: "Sample", field: "flag", found: "int", .. }
        ));
        assert!(matches!(
            s.set("missing", Value::Bool(true)),
            Err(ModelError::UnknownField { .. })
        ));
    }

    #[test]
    fn shape_descriptions() {
        assert_eq!(<Vec<Option<f64>>>::shape().describe(), "Vec<Option<f64>>");
        assert_eq!(Sample::shape().describe(), "Sample");
        assert_eq!(ModelRef::of::<Sample>().name(), "Sample");
        assert!(ModelRef::of::<Sample>().is::<Sample>());
    }
}
