//! Tree-map codec: reads a model out of an already-parsed JSON tree.
//!
//! Fields are looked up by name, so key order in the tree is irrelevant.
//! Missing keys and `null` leave a field absent; unknown keys are ignored.

use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::catalog;
use crate::dispatch::TypeTag;
use crate::error::ModelError;
use crate::model::{Model, ModelRef};
use crate::units::{CalendarUnit, DurationUnit, DurationValue, TimeZoneId};
use crate::value::{Record, Value};

/// Builds an `M` from a JSON object.
///
/// ```
/// use model_pack::{model, tree};
/// use serde_json::json;
///
/// model! {
///     #[derive(Default)]
///     pub struct Pair {
///         pub a: i32,
///         pub b: Option<String>,
///     }
/// }
///
/// let pair: Pair = tree::read_tree(&json!({"b": "x", "a": 3})).unwrap();
/// assert_eq!(pair.a, 3);
/// assert_eq!(pair.b.as_deref(), Some("x"));
/// ```
pub fn read_tree<M: Model>(tree: &Json) -> Result<M, ModelError> {
    read_tree_with(tree, &TreeOptions::default())
}

pub fn read_tree_with<M: Model>(tree: &Json, options: &TreeOptions) -> Result<M, ModelError> {
    read_tree_record_with(tree, ModelRef::of::<M>(), options)?.into_model()
}

pub fn read_tree_record(tree: &Json, model: ModelRef) -> Result<Record, ModelError> {
    read_tree_record_with(tree, model, &TreeOptions::default())
}

pub fn read_tree_record_with(
    tree: &Json,
    model: ModelRef,
    options: &TreeOptions,
) -> Result<Record, ModelError> {
    match tree {
        Json::Object(map) => TreeReader { options }.read_object(map, model, 0),
        other => Err(ModelError::NotAnObject {
            model: model.name(),
            found: kind(other),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Maximum model nesting depth; the root model is depth 0.
    pub max_depth: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

struct TreeReader<'a> {
    options: &'a TreeOptions,
}

fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl TreeReader<'_> {
    fn read_object(
        &self,
        map: &Map<String, Json>,
        model: ModelRef,
        depth: usize,
    ) -> Result<Record, ModelError> {
        if depth > self.options.max_depth {
            return Err(ModelError::DepthExceeded {
                model: model.name(),
                limit: self.options.max_depth,
            });
        }
        let fields = catalog::descriptors(&model)?;
        trace!(model = model.name(), keys = map.len(), depth, "tree read");
        for key in map.keys() {
            if !fields.iter().any(|f| f.name == key.as_str()) {
                debug!(model = model.name(), field = key.as_str(), "ignoring unknown tree key");
            }
        }
        let mut entries = Vec::with_capacity(fields.len());
        for field in fields {
            let value = match map.get(field.name) {
                None | Some(Json::Null) => None,
                Some(json) => Some(self.convert(json, model, field.name, field.tag, depth)?),
            };
            entries.push((field.name, value));
        }
        Ok(Record::new(model, entries))
    }

    fn convert(
        &self,
        json: &Json,
        model: ModelRef,
        field: &'static str,
        tag: TypeTag,
        depth: usize,
    ) -> Result<Value, ModelError> {
        let mismatch = |found: &Json| ModelError::TypeMismatch {
            model: model.name(),
            field,
            expected: tag.describe(),
            found: kind(found),
        };
        let invalid = |reason: String| ModelError::InvalidValue {
            model: model.name(),
            field,
            reason,
        };
        Ok(match (tag, json) {
            (TypeTag::Bool, Json::Bool(b)) => Value::Bool(*b),
            (TypeTag::Str, Json::String(s)) => Value::Str(s.clone()),
            (TypeTag::Int, Json::Number(n)) => {
                let n = n.as_i64().ok_or_else(|| mismatch(json))?;
                Value::Int(i32::try_from(n).map_err(|_| invalid(format!("{n} out of int range")))?)
            }
            (TypeTag::Long, Json::Number(n)) => Value::Long(n.as_i64().ok_or_else(|| mismatch(json))?),
            (TypeTag::Duration, Json::Object(map)) => {
                let magnitude = map
                    .get("magnitude")
                    .and_then(Json::as_i64)
                    .ok_or_else(|| invalid("duration needs an integer `magnitude`".to_owned()))?;
                let unit = map
                    .get("unit")
                    .and_then(Json::as_str)
                    .ok_or_else(|| invalid("duration needs a string `unit`".to_owned()))?;
                let unit = DurationUnit::from_name(unit)
                    .ok_or_else(|| invalid(format!("unknown duration unit `{unit}`")))?;
                Value::Duration(DurationValue::new(magnitude, unit))
            }
            (TypeTag::CalendarUnit, Json::String(s)) => Value::CalendarUnit(
                CalendarUnit::from_name(s).ok_or_else(|| invalid(format!("unknown calendar unit `{s}`")))?,
            ),
            (TypeTag::TimeZone, Json::String(s)) => {
                Value::TimeZone(TimeZoneId::parse(s).map_err(|e| invalid(e.to_string()))?)
            }
            (TypeTag::StrList, Json::Array(items)) => Value::List(
                items
                    .iter()
                    .map(|item| match item {
                        Json::String(s) => Ok(Value::Str(s.clone())),
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            (TypeTag::ModelList(nested), Json::Array(items)) => Value::List(
                items
                    .iter()
                    .map(|item| match item {
                        Json::Object(map) => {
                            self.read_object(map, nested, depth + 1).map(Value::Model)
                        }
                        other => Err(mismatch(other)),
                    })
                    .collect::<Result<_, _>>()?,
            ),
            (TypeTag::Model(nested), Json::Object(map)) => {
                Value::Model(self.read_object(map, nested, depth + 1)?)
            }
            (_, other) => return Err(mismatch(other)),
        })
    }
}
