//! Declare a model once and get binary, JSON document and JSON tree codecs
//! plus structural hashing, equality and rendering.
//!
//! Every codec works from the same canonical field catalog: a model's
//! exposed (plain `pub`) fields sorted by name. The binary format carries no
//! field names at all, so encoder and decoder must share that catalog.
//!
//! ```
//! use model_pack::{binary, document, model, tree};
//! use serde_json::json;
//!
//! model! {
//!     #[derive(Clone, Default)]
//!     pub struct Pair {
//!         pub a: i32,
//!         pub b: Option<String>,
//!     }
//! }
//!
//! let pair = Pair { a: 3, b: Some("x".into()) };
//!
//! let bytes = binary::to_bytes(&pair).unwrap();
//! assert_eq!(binary::from_bytes::<Pair>(&bytes).unwrap(), pair);
//!
//! let text = document::to_document_string(&pair).unwrap();
//! assert_eq!(text, r#"{"a":3,"b":"x"}"#);
//! assert_eq!(document::from_document_str::<Pair>(&text).unwrap(), pair);
//!
//! let from_tree: Pair = tree::read_tree(&json!({"b": "x", "a": 3})).unwrap();
//! assert_eq!(from_tree, pair);
//! ```

#[macro_use]
pub mod model;

pub mod binary;
pub mod catalog;
pub mod codec;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod registry;
pub mod structural;
pub mod tree;
pub mod units;
pub mod value;

pub use catalog::{field_catalog, fields_of, FieldDescriptor};
pub use codec::{ModelCodec, StreamReader, StreamWriter};
pub use dispatch::TypeTag;
pub use error::{FieldError, ModelError};
pub use model::{FieldDecl, FieldType, Model, ModelRef, Shape};
pub use registry::ModelRegistry;
pub use units::{CalendarUnit, DurationUnit, DurationValue, InvalidTimeZone, TimeZoneId};
pub use value::{Record, Value};

pub use model_pack_buffers::{BufferError, Reader, Writer};
