//! Dynamic Round-Trip Tests
//!
//! Declared types serialize, store and rebuild at runtime with their
//! versions intact.

use fieldstruct::schema::Options;
use fieldstruct::{
    SchemaBuilder, SchemaStore, SerializedSchema, StructType, TypeCatalog, TypeRegistry, Value,
    Variant,
};
use serde_json::json;
use tempfile::TempDir;

fn setup_order(registry: &TypeRegistry) -> StructType {
    let line = StructType::builder_in("Shop::Line", registry)
        .variant(Variant::Strict)
        .required("sku", "string")
        .unwrap()
        .attribute("quantity", "integer", &["coercible"], Options::new().default_value(1))
        .unwrap()
        .build()
        .unwrap();

    StructType::builder_in("Shop::Order", registry)
        .attribute("number", "string", &["required"], Options::new().format("^[0-9]{4}$"))
        .unwrap()
        .attribute("lines", "array", &[], Options::new().of(line))
        .unwrap()
        .attribute(
            "placed_by",
            "string",
            &[],
            Options::new().default_with(|| Value::from("system")),
        )
        .unwrap()
        .attribute("note", "string", &[], Options::new().description("free text").alias("memo"))
        .unwrap()
        .build()
        .unwrap()
}

/// Rebuilding under a prefix keeps the version and nests the element type.
#[test]
fn test_rebuild_under_prefix() {
    let registry = TypeRegistry::with_builtins();
    let order = setup_order(&registry);
    let catalog = TypeCatalog::new();
    let builder = SchemaBuilder::new(&registry, &catalog);

    let rebuilt = builder.rebuild(order.schema(), Some("Replica")).unwrap();
    assert_eq!(rebuilt.name(), "Replica::Shop::Order");
    assert_eq!(rebuilt.version(), order.version());
    assert!(catalog.get("Replica::Shop::Line").is_some());
    assert!(catalog.is_namespace("Replica::Shop"));
    assert_eq!(rebuilt.resolve("memo"), rebuilt.resolve("note"));
}

/// Producer defaults serialize as a marker and are not re-run after a
/// rebuild.
#[test]
fn test_producer_default_is_detached_after_rebuild() {
    let registry = TypeRegistry::with_builtins();
    let order = setup_order(&registry);
    let serialized = order.schema().to_serialized();
    assert_eq!(
        serialized.attribute("placed_by").and_then(|a| a.default.clone()),
        Some(json!("<proc>"))
    );

    let original = order.instantiate(json!({"number": "0001"})).unwrap();
    assert_eq!(original.get("placed_by"), Some(&Value::from("system")));

    let catalog = TypeCatalog::new();
    let rebuilt = SchemaBuilder::new(&registry, &catalog)
        .build(&serialized, None)
        .unwrap();
    let instance = rebuilt.instantiate(json!({"number": "0001"})).unwrap();
    assert_eq!(instance.get("placed_by"), Some(&Value::Null));
    assert_eq!(rebuilt.version(), order.version());
}

/// Nested element instances are built from plain maps.
#[test]
fn test_rebuilt_type_builds_nested_instances() {
    let registry = TypeRegistry::with_builtins();
    let catalog = TypeCatalog::new();
    let builder = SchemaBuilder::new(&registry, &catalog);
    let json = setup_order(&registry).schema().to_serialized().to_json().unwrap();
    let rebuilt = builder.build_json(&json, None).unwrap();

    let instance = rebuilt
        .from_json(r#"{"number": "0042", "lines": [{"sku": "A-1", "quantity": "3"}, {"sku": "B-2"}]}"#)
        .unwrap();
    assert!(instance.is_valid());
    assert_eq!(
        serde_json::Value::Object(instance.to_map()),
        json!({
            "number": "0042",
            "lines": [{"sku": "A-1", "quantity": 3}, {"sku": "B-2", "quantity": 1}],
            "placed_by": null,
            "note": null
        })
    );
}

/// Stored schemas load into a fresh catalog with identical content.
#[test]
fn test_store_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let registry = TypeRegistry::with_builtins();
    let order = setup_order(&registry);
    let store = SchemaStore::new(temp_dir.path());

    let path = store.save(&order).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        format!("shop.order-{}.json", order.version())
    );

    let stored = SchemaStore::read(&path).unwrap();
    assert_eq!(stored, order.schema().to_serialized());

    let catalog = TypeCatalog::new();
    let loaded = store
        .load_all(&SchemaBuilder::new(&registry, &catalog))
        .unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].version(), order.version());
    assert!(catalog.get("Shop::Order").is_some());
}

/// The array form of the attribute list is accepted too.
#[test]
fn test_attribute_array_form() {
    let source = SerializedSchema::from_value(json!({
        "name": "Examples::Tag",
        "attributes": [
            {"name": "label", "type": "string", "required": true},
            {"name": "weight", "type": "float"}
        ]
    }))
    .unwrap();

    let registry = TypeRegistry::with_builtins();
    let catalog = TypeCatalog::new();
    let st = SchemaBuilder::new(&registry, &catalog).build(&source, None).unwrap();
    assert_eq!(st.schema().names().collect::<Vec<_>>(), vec!["label", "weight"]);
}
