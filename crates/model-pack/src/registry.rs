//! Named registry of model types for reads where the type is only known at
//! run time, such as a stored document tagged with its model name.

use indexmap::IndexMap;
use model_pack_buffers::Reader;
use tracing::debug;

use crate::binary::BinaryDecoder;
use crate::dispatch;
use crate::document::{self, DocumentOptions, DocumentParser};
use crate::error::ModelError;
use crate::model::{Model, ModelRef};
use crate::tree;
use crate::value::Record;

/// Model types keyed by [`Model::NAME`], in registration order.
///
/// ```
/// use model_pack::{model, ModelRegistry, Value};
/// use serde_json::json;
///
/// model! {
///     #[derive(Default)]
///     pub struct Pair {
///         pub a: i32,
///     }
/// }
///
/// let mut registry = ModelRegistry::new();
/// registry.register::<Pair>().unwrap();
/// let record = registry.read_tree("Pair", &json!({"a": 3})).unwrap();
/// assert_eq!(record.get("a"), Some(&Value::Int(3)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<&'static str, ModelRef>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `M` after checking that every field in its graph is supported.
    pub fn register<M: Model>(&mut self) -> Result<&mut Self, ModelError> {
        let model = ModelRef::of::<M>();
        dispatch::validate(&model)?;
        if self.models.contains_key(M::NAME) {
            return Err(ModelError::DuplicateModel(M::NAME));
        }
        debug!(model = M::NAME, "registered model");
        self.models.insert(M::NAME, model);
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<ModelRef> {
        self.models.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Registered names in registration order.
    pub fn list_names(&self) -> Vec<&'static str> {
        self.models.keys().copied().collect()
    }

    fn lookup(&self, name: &str) -> Result<ModelRef, ModelError> {
        self.get(name)
            .ok_or_else(|| ModelError::UnknownModel(name.to_owned()))
    }

    pub fn parse_document(
        &self,
        name: &str,
        parser: &mut DocumentParser<'_>,
        options: &DocumentOptions,
    ) -> Result<Record, ModelError> {
        document::parse_record(parser, self.lookup(name)?, options)
    }

    pub fn read_binary(&self, name: &str, reader: &mut Reader<'_>) -> Result<Record, ModelError> {
        BinaryDecoder::new().read_record(reader, self.lookup(name)?)
    }

    pub fn read_tree(&self, name: &str, tree: &serde_json::Value) -> Result<Record, ModelError> {
        tree::read_tree_record(tree, self.lookup(name)?)
    }
}
