//! Dynamic field values and records.
//!
//! Codecs never touch typed models directly. A typed model is captured into
//! a [`Record`] (its exposed fields in canonical order), encoded from there,
//! and decoding produces a `Record` that is turned back into the typed model
//! in one step, so a failed decode never leaves a half-filled model behind.

use std::fmt;

use crate::catalog;
use crate::error::ModelError;
use crate::model::{Model, ModelRef};
use crate::units::{CalendarUnit, DurationValue, TimeZoneId};

/// A present field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    Str(String),
    Int(i32),
    Long(i64),
    Duration(DurationValue),
    CalendarUnit(CalendarUnit),
    TimeZone(TimeZoneId),
    List(Vec<Value>),
    Model(Record),
    /// `Debug` rendering of a field type the codecs do not support. Only
    /// the structural operations see it; the dispatcher rejects the field
    /// before any codec runs.
    Opaque(String),
}

impl Value {
    /// Short name of the value's shape, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Duration(_) => "duration",
            Value::CalendarUnit(_) => "calendar unit",
            Value::TimeZone(_) => "time zone",
            Value::List(_) => "list",
            Value::Model(_) => "model",
            Value::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Long(l) => write!(f, "{l}"),
            Value::Duration(d) => write!(f, "{d}"),
            Value::CalendarUnit(u) => write!(f, "{u}"),
            Value::TimeZone(z) => write!(f, "{z}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Model(record) => write!(f, "{record}"),
            Value::Opaque(text) => f.write_str(text),
        }
    }
}

/// A model instance in dynamic form: one entry per catalog field, in
/// canonical order, `None` for absent fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    model: ModelRef,
    entries: Vec<(&'static str, Option<Value>)>,
}

impl Record {
    pub fn new(model: ModelRef, entries: Vec<(&'static str, Option<Value>)>) -> Self {
        Self { model, entries }
    }

    /// Reads every exposed field of `model` into a record.
    pub fn capture<M: Model>(model: &M) -> Self {
        let model_ref = ModelRef::of::<M>();
        let entries = catalog::field_catalog(&model_ref)
            .into_iter()
            .map(|decl| (decl.name, model.get(decl.name)))
            .collect();
        Self::new(model_ref, entries)
    }

    pub fn model(&self) -> ModelRef {
        self.model
    }

    pub fn entries(&self) -> &[(&'static str, Option<Value>)] {
        &self.entries
    }

    /// Value of a field, `None` when absent or unknown.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Builds the typed model: default construction, then one `set` per
    /// present entry.
    pub fn into_model<M: Model>(self) -> Result<M, ModelError> {
        if !self.model.is::<M>() {
            return Err(ModelError::WrongModel {
                expected: M::NAME,
                found: self.model.name(),
            });
        }
        let mut model = M::default();
        for (name, value) in self.entries {
            if let Some(value) = value {
                model.set(name, value)?;
            }
        }
        Ok(model)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.model.name())?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match value {
                Some(value) => write!(f, "{name}={value}")?,
                None => write!(f, "{name}=null")?,
            }
        }
        f.write_str("]")
    }
}
