//! Hashing, equality and rendering derived from the field catalog.
//!
//! These back the `PartialEq`, `Hash`, `Debug` and `Display` impls that
//! [`model!`](crate::model!) generates, and work for any [`Model`].

use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::catalog;
use crate::model::{Model, ModelRef};
use crate::value::Record;

/// XOR of the hashes of every exposed field's value.
///
/// XOR keeps the fold order-independent. An absent field hashes as `None`,
/// which differs from any present value.
pub fn hash_of<M: Model>(model: &M) -> u64 {
    catalog::field_catalog(&ModelRef::of::<M>())
        .iter()
        .map(|decl| {
            let mut hasher = DefaultHasher::new();
            decl.name.hash(&mut hasher);
            model.get(decl.name).hash(&mut hasher);
            hasher.finish()
        })
        .fold(0, |acc, h| acc ^ h)
}

/// Same concrete type and equal values for every exposed field.
pub fn equals<A: Model, B: Model>(a: &A, b: &B) -> bool {
    if TypeId::of::<A>() != TypeId::of::<B>() {
        return false;
    }
    catalog::field_catalog(&ModelRef::of::<A>())
        .iter()
        .all(|decl| a.get(decl.name) == b.get(decl.name))
}

/// `Name[field1=value1,field2=value2]` in canonical order; absent fields
/// render as `null`.
pub fn to_string<M: Model>(model: &M) -> String {
    Record::capture(model).to_string()
}
