//! Registry matrix: reading records by model name.

mod common;

use common::{monitor, Monitor, Pair, Schedule, WithFloat};
use model_pack::document::{DocumentOptions, DocumentParser};
use model_pack::{binary, document, ModelError, ModelRegistry, Reader, Value};
use serde_json::json;

fn registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry
        .register::<Monitor>()
        .unwrap()
        .register::<Pair>()
        .unwrap()
        .register::<Schedule>()
        .unwrap();
    registry
}

#[test]
fn lists_names_in_registration_order() {
    assert_eq!(registry().list_names(), ["Monitor", "Pair", "Schedule"]);
}

#[test]
fn reads_every_format_by_name() {
    let registry = registry();
    let m = monitor();

    let bytes = binary::to_bytes(&m).unwrap();
    let mut reader = Reader::new(&bytes);
    let from_binary = registry.read_binary("Monitor", &mut reader).unwrap();

    let text = document::to_document_string(&m).unwrap();
    let mut parser = DocumentParser::new(&text);
    let from_document = registry
        .parse_document("Monitor", &mut parser, &DocumentOptions::default())
        .unwrap();

    let tree: serde_json::Value = serde_json::from_str(&text).unwrap();
    let from_tree = registry.read_tree("Monitor", &tree).unwrap();

    assert_eq!(from_binary, from_document);
    assert_eq!(from_document, from_tree);
    assert_eq!(from_tree.get("name"), Some(&Value::Str("cpu-high".into())));
    assert_eq!(from_tree.into_model::<Monitor>().unwrap(), m);
}

#[test]
fn registration_errors() {
    let mut registry = registry();
    assert!(matches!(
        registry.register::<Pair>(),
        Err(ModelError::DuplicateModel("Pair"))
    ));
    assert!(registry.register::<WithFloat>().is_err());
    assert_eq!(registry.len(), 3);
}

#[test]
fn unknown_model_name() {
    let err = registry().read_tree("Alert", &json!({})).unwrap_err();
    assert_eq!(err.to_string(), "unknown model `Alert`");
}
