//! Type dispatcher: maps a field's declared [`Shape`] onto the closed set of
//! [`TypeTag`]s the codecs know how to encode.

use std::any::TypeId;
use std::collections::HashSet;

use crate::catalog;
use crate::error::ModelError;
use crate::model::{FieldDecl, ModelRef, Shape};

/// Supported field value shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Str,
    Int,
    Long,
    Duration,
    CalendarUnit,
    TimeZone,
    StrList,
    ModelList(ModelRef),
    Model(ModelRef),
}

impl TypeTag {
    pub fn describe(&self) -> String {
        match self {
            TypeTag::Bool => "bool".to_owned(),
            TypeTag::Str => "string".to_owned(),
            TypeTag::Int => "int".to_owned(),
            TypeTag::Long => "long".to_owned(),
            TypeTag::Duration => "duration".to_owned(),
            TypeTag::CalendarUnit => "calendar unit".to_owned(),
            TypeTag::TimeZone => "time zone".to_owned(),
            TypeTag::StrList => "list of strings".to_owned(),
            TypeTag::ModelList(model) => format!("list of {}", model.name()),
            TypeTag::Model(model) => model.name().to_owned(),
        }
    }

    /// Nested model type carried by this tag, if any.
    pub fn nested_model(&self) -> Option<ModelRef> {
        match self {
            TypeTag::ModelList(model) | TypeTag::Model(model) => Some(*model),
            _ => None,
        }
    }
}

fn tag_of_shape(shape: &Shape) -> Option<TypeTag> {
    Some(match shape {
        Shape::Bool => TypeTag::Bool,
        Shape::Str => TypeTag::Str,
        Shape::Int => TypeTag::Int,
        Shape::Long => TypeTag::Long,
        Shape::Duration => TypeTag::Duration,
        Shape::CalendarUnit => TypeTag::CalendarUnit,
        Shape::TimeZone => TypeTag::TimeZone,
        Shape::List(item) => match item.as_ref() {
            Shape::Str => TypeTag::StrList,
            Shape::Model(model) => TypeTag::ModelList(*model),
            _ => return None,
        },
        Shape::Model(model) => TypeTag::Model(*model),
        Shape::Optional(_) | Shape::Other(_) => return None,
    })
}

/// Resolves the tag of one field of `model`.
///
/// A top-level `Option` only marks the field nullable and is looked through;
/// anything outside the supported set is an
/// [`ModelError::UnsupportedField`] naming the field and model.
pub fn tag_of(model: &ModelRef, decl: &FieldDecl) -> Result<TypeTag, ModelError> {
    let shape = match &decl.shape {
        Shape::Optional(inner) => inner.as_ref(),
        shape => shape,
    };
    tag_of_shape(shape).ok_or_else(|| ModelError::UnsupportedField {
        model: model.name(),
        field: decl.name,
        type_name: decl.shape.describe(),
    })
}

/// Element shape of a list-typed field, `None` for anything else.
pub fn element_type_of(decl: &FieldDecl) -> Option<&Shape> {
    let shape = match &decl.shape {
        Shape::Optional(inner) => inner.as_ref(),
        shape => shape,
    };
    match shape {
        Shape::List(item) => Some(item.as_ref()),
        _ => None,
    }
}

/// Dispatches every field of `model` and of every model reachable from it.
///
/// Recursive model graphs are visited once per type.
pub fn validate(model: &ModelRef) -> Result<(), ModelError> {
    let mut seen: HashSet<TypeId> = HashSet::new();
    let mut pending = vec![*model];
    while let Some(next) = pending.pop() {
        if !seen.insert(next.type_id()) {
            continue;
        }
        for field in catalog::descriptors(&next)? {
            if let Some(nested) = field.tag.nested_model() {
                pending.push(nested);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::CalendarUnit;

    crate::model! {
        #[derive(Default)]
        pub struct Leaf {
            pub id: String,
        }
    }

    crate::model! {
        #[derive(Default)]
        pub struct Branch {
            pub leaves: Option<Vec<Leaf>>,
            pub first: Option<Leaf>,
            pub names: Vec<String>,
            pub unit: Option<CalendarUnit>,
            pub children: Vec<Branch>,
        }
    }

    crate::model! {
        #[derive(Default)]
        pub struct Broken {
            pub ok: i32,
            pub ratio: f64,
        }
    }

    crate::model! {
        #[derive(Default)]
        pub struct Holder {
            pub inner: Option<Broken>,
        }
    }

    fn decl(model: ModelRef, name: &str) -> FieldDecl {
        model.declare().into_iter().find(|d| d.name == name).unwrap()
    }

    #[test]
    fn dispatches_supported_shapes() {
        let branch = ModelRef::of::<Branch>();
        let leaf = ModelRef::of::<Leaf>();
        assert_eq!(
            tag_of(&branch, &decl(branch, "leaves")).unwrap(),
            TypeTag::ModelList(leaf)
        );
        assert_eq!(
            tag_of(&branch, &decl(branch, "first")).unwrap(),
            TypeTag::Model(leaf)
        );
        assert_eq!(
            tag_of(&branch, &decl(branch, "names")).unwrap(),
            TypeTag::StrList
        );
        assert_eq!(
            tag_of(&branch, &decl(branch, "unit")).unwrap(),
            TypeTag::CalendarUnit
        );
        assert_eq!(
            element_type_of(&decl(branch, "leaves")),
            Some(&Shape::Model(leaf))
        );
        assert_eq!(element_type_of(&decl(branch, "unit")), None);
    }

    #[test]
    fn rejects_unsupported_shapes_with_context() {
        let broken = ModelRef::of::<Broken>();
        match tag_of(&broken, &decl(broken, "ratio")) {
            Err(ModelError::UnsupportedField {
                model,
                field,
                type_name,
            }) => {
                assert_eq!(model, "Broken");
                assert_eq!(field, "ratio");
                assert_eq!(type_name, "f64");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(tag_of_shape(&Shape::List(Box::new(Shape::Int))).is_none());
        assert!(tag_of_shape(&Shape::List(Box::new(Shape::Optional(Box::new(Shape::Str))))).is_none());
    }

    #[test]
    fn validate_walks_nested_and_recursive_models() {
        assert!(validate(&ModelRef::of::<Branch>()).is_ok());
        assert!(matches!(
            validate(&ModelRef::of::<Holder>()),
            Err(ModelError::UnsupportedField { model: "Broken", .. })
        ));
    }
}
