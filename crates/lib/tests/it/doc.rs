//! Document facade tests: path reads, writes, deletes and data helpers.

use dtree::{Document, Entry, NodeType, PinMode, Value};

use crate::helpers::*;

#[test]
fn set_then_get_nested_value() {
    let doc = Document::new();
    doc.set("a.b", 5).unwrap();

    assert_eq!(doc.get_value("a.b").unwrap(), 5);
    assert_encodes(&doc, r#"{"a":{"b":5}}"#);
}

#[test]
fn get_returns_each_entry_kind() {
    let doc = order();

    assert!(matches!(doc.get("id").unwrap(), Entry::Value(Value::Int(17))));
    assert_eq!(doc.get("customer").unwrap().node_type(), NodeType::Object);
    assert_eq!(doc.get("lines").unwrap().node_type(), NodeType::List);

    let customer = doc.get("customer").unwrap().into_object().unwrap();
    assert_eq!(customer.get_as::<String>("name").unwrap(), "Ada");
}

#[test]
fn strict_and_lenient_lookups() {
    let doc = order();

    let err = doc.get("customer.email").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.module(), "document");

    assert!(doc.find("customer.email", false).unwrap().is_none());
    assert!(doc.find("customer.email", true).unwrap_err().is_not_found());
    assert!(doc.try_get_value("customer.email").unwrap().is_none());
    assert!(!doc.exists("customer.email").unwrap());
    assert!(doc.exists("customer.tier").unwrap());
}

#[test]
fn accessor_type_mismatches() {
    let doc = order();

    assert!(doc.get_value("customer").unwrap_err().is_type_error());
    assert!(doc.get_object("lines").unwrap_err().is_type_error());
    assert!(doc.get_list("id").unwrap_err().is_type_error());
    assert!(doc.get_as::<i64>("customer.name").unwrap_err().is_type_error());
}

#[test]
fn defaults_apply_to_missing_null_and_empty() {
    let doc = Document::parse(r#"{"blank":"","none":null,"set":"x"}"#).unwrap();

    assert_eq!(doc.get_value_or("blank", "d").unwrap(), "d");
    assert_eq!(doc.get_value_or("none", "d").unwrap(), "d");
    assert_eq!(doc.get_value_or("missing", "d").unwrap(), "d");
    assert_eq!(doc.get_value_or("set", "d").unwrap(), "x");
    assert_eq!(doc.get_as_or::<String>("none", "d".to_string()).unwrap(), "d");

    let fallback = Document::parse(r#"{"k":1}"#).unwrap();
    let got = doc.get_object_or("missing", fallback.as_read_only()).unwrap();
    assert!(got.is_read_only());
    assert_eq!(got.get_value("k").unwrap(), 1);
}

#[test]
fn sub_documents_are_live_views() {
    let doc = order();
    let customer = doc.get_object("customer").unwrap();

    customer.set("tier", "platinum").unwrap();
    assert_eq!(doc.get_value("customer.tier").unwrap(), "platinum");

    doc.set("customer.name", "Grace").unwrap();
    assert_eq!(customer.get_value("name").unwrap(), "Grace");
}

#[test]
fn overwriting_changes_kind() {
    let doc = order();

    doc.set("customer", "anonymous").unwrap();
    assert_eq!(doc.get_value("customer").unwrap(), "anonymous");

    doc.set("id", vec![1, 2, 3]).unwrap();
    assert_eq!(doc.count("id").unwrap(), 3);

    let inner = Document::parse(r#"{"nested":true}"#).unwrap();
    doc.set_object("lines", &inner).unwrap();
    assert_eq!(doc.get_value("lines.nested").unwrap(), true);

    // Field order is kept when a field changes kind.
    let keys: Vec<String> = doc.get_dictionary("").unwrap().into_keys().collect();
    assert_eq!(keys, vec!["id", "customer", "lines"]);
}

#[test]
fn set_list_copies_documents() {
    let doc = Document::new();
    let a = Document::parse(r#"{"n":1}"#).unwrap();
    let b = Document::parse(r#"{"n":2}"#).unwrap();

    doc.set_list("items", &[a.clone(), b.clone()]).unwrap();
    a.set("n", 100).unwrap();

    assert_encodes(&doc, r#"{"items":[{"n":1},{"n":2}]}"#);
}

#[test]
fn assigning_a_document_to_itself_through_the_self_selector() {
    let doc = order();
    let before = doc.encode(false).unwrap();
    doc.set("", &doc).unwrap();
    assert_eq!(doc.encode(false).unwrap(), before);
}

#[test]
fn whole_document_assignment_keeps_handles() {
    let doc = order();
    let view = doc.get_object("").unwrap();
    let replacement = Document::parse(r#"{"fresh":1}"#).unwrap();

    doc.set("", &replacement).unwrap();

    assert_encodes(&view, r#"{"fresh":1}"#);
    assert!(!doc.exists("customer").unwrap());
}

#[test]
fn single_value_documents() {
    let doc = Document::parse("42").unwrap();

    assert!(doc.is_single_value().unwrap());
    assert_eq!(doc.get_value("").unwrap(), 42);
    assert_eq!(doc.get_as::<i64>("").unwrap(), 42);
    assert_encodes(&doc, "42");

    doc.set("", "text").unwrap();
    assert_encodes(&doc, r#""text""#);

    doc.set("field", 1).unwrap();
    assert!(!doc.is_single_value().unwrap());
}

#[test]
fn delete_counts_removed_nodes() {
    let doc = order();

    assert_eq!(doc.delete("lines.price").unwrap(), 3);
    assert_eq!(doc.delete("customer.tier").unwrap(), 1);
    assert_eq!(doc.delete("customer.tier").unwrap(), 0);

    assert_eq!(
        doc.encode_schema(false).unwrap(),
        r#"{"id","customer":{"name"},"lines":[{"sku","qty"}]}"#
    );
}

#[test]
fn contains_and_clear_data() {
    let doc = order();
    assert!(doc.contains_data().unwrap());

    let schema = doc.encode_schema(false).unwrap();
    doc.clear_data().unwrap();

    assert!(!doc.contains_data().unwrap());
    assert_eq!(doc.count("lines").unwrap(), 0);
    assert_eq!(doc.get_value("customer.name").unwrap(), Value::Null);
    assert_eq!(doc.encode_schema(false).unwrap(), schema);
}

#[test]
fn revisions_advance_on_every_change() {
    let doc = order();
    let start = doc.revision().unwrap();

    doc.set("customer.name", "Linus").unwrap();
    let after_set = doc.revision().unwrap();
    assert!(after_set > start);

    doc.delete("id").unwrap();
    assert!(doc.revision().unwrap() > after_set);

    let unchanged = doc.revision().unwrap();
    doc.get_value("customer.name").unwrap();
    assert_eq!(doc.revision().unwrap(), unchanged);
}

#[test]
fn read_only_documents_reject_every_mutator() {
    let doc = order().as_read_only();
    let other = Document::new();

    let attempts = [
        doc.set("id", 1).unwrap_err(),
        doc.set_object("x", &other).unwrap_err(),
        doc.ensure_list("l").unwrap_err(),
        doc.push("lines", Some(&other)).unwrap_err(),
        doc.create_and_push("lines").unwrap_err(),
        doc.push_count("lines", 1, |_, _| Ok(())).unwrap_err(),
        doc.remove_at("lines", &[0]).unwrap_err(),
        doc.retain_at("lines", &[0]).unwrap_err(),
        doc.delete("id").unwrap_err(),
        doc.clear_data().unwrap_err(),
    ];
    for err in attempts {
        assert!(err.is_read_only_violation(), "unexpected error: {err}");
    }

    let line = doc.get_list("lines").unwrap().first().unwrap();
    assert!(line.is_read_only());
    assert!(line.set("qty", 0).unwrap_err().is_read_only_violation());
    assert_eq!(doc.get_value("lines.0.qty").unwrap(), 2);
}

#[test]
fn parse_read_only() {
    let doc = Document::parse_read_only(r#"{"a":1}"#).unwrap();
    assert!(doc.is_read_only());
    assert_eq!(doc.pin_mode(), PinMode::Pinned);
    assert!(doc.set("a", 2).unwrap_err().is_read_only_violation());
}

#[test]
fn dictionary_of_fields() {
    let doc = order();
    let fields = doc.get_dictionary("customer").unwrap();

    assert_eq!(fields.len(), 2);
    assert_eq!(fields["name"].as_value().unwrap(), "Ada");
    assert!(doc.get_dictionary("missing").unwrap().is_empty());
}

#[test]
fn deep_each_without_self() {
    let doc = Document::parse(
        r#"{"name":"root","kids":[{"name":"a","kids":[{"name":"a1"},{"name":"a2"}]},{"name":"b"}]}"#,
    )
    .unwrap();

    let mut names = Vec::new();
    doc.deep_each(
        "kids",
        |node| names.push(node.get_as::<String>("name").unwrap()),
        false,
    )
    .unwrap();
    assert_eq!(names, vec!["a", "a1", "a2", "b"]);
}

#[test]
fn bytes_round_trip() {
    let doc = order();
    let bytes = doc.to_bytes().unwrap();
    let back = Document::from_bytes(&bytes).unwrap();
    assert_eq!(back, doc);

    let err = Document::from_bytes(&[0xff, 0xfe]).unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn malformed_text_is_invalid_input() {
    let err = Document::parse(r#"{"a":"#).unwrap_err();
    assert!(err.is_invalid_input());
    assert!("{".parse::<Document>().is_err());
    assert_encodes(&Document::parse("   ").unwrap(), "{}");
}

#[test]
fn from_json_and_to_json() {
    let json = serde_json::json!({"a": [1, 2], "b": {"c": null}});
    let doc = Document::from_json(&json).unwrap();

    assert_eq!(doc.to_json().unwrap(), json);
    assert_eq!(serde_json::to_value(&doc).unwrap(), json);
    assert_eq!(doc.to_string(), r#"{"a":[1,2],"b":{"c":null}}"#);
}
