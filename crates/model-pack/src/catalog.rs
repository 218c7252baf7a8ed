//! Field catalog: the canonical, name-sorted field list of a model type.
//!
//! Both order-dependent codecs (binary and canonical document parsing) walk
//! fields in exactly this order, so encoder and decoder must agree on it.
//! The catalog is recomputed on every call; it is a pure function of the
//! model's declarations.

use crate::dispatch::{self, TypeTag};
use crate::error::ModelError;
use crate::model::{FieldDecl, Model, ModelRef};

/// A serializable field together with its dispatched type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub tag: TypeTag,
}

/// Exposed fields of `model`, sorted ascending by name.
///
/// Total: a model without exposed fields yields an empty catalog.
pub fn field_catalog(model: &ModelRef) -> Vec<FieldDecl> {
    let mut fields: Vec<FieldDecl> = model
        .declare()
        .into_iter()
        .filter(|decl| decl.exposed)
        .collect();
    fields.sort_by(|a, b| a.name.cmp(b.name));
    fields
}

/// Canonical catalog of `model` with every field resolved to a [`TypeTag`].
///
/// Fails with [`ModelError::UnsupportedField`] on the first field whose
/// declared type the codecs cannot handle.
pub fn descriptors(model: &ModelRef) -> Result<Vec<FieldDescriptor>, ModelError> {
    field_catalog(model)
        .iter()
        .map(|decl| {
            Ok(FieldDescriptor {
                name: decl.name,
                tag: dispatch::tag_of(model, decl)?,
            })
        })
        .collect()
}

/// [`descriptors`] for a typed model.
pub fn fields_of<M: Model>() -> Result<Vec<FieldDescriptor>, ModelError> {
    descriptors(&ModelRef::of::<M>())
}
