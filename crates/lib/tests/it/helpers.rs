use dtree::{Document, DocumentList};

// ==========================
// DOCUMENT FACTORIES
// ==========================

/// Parses a pinned document, panicking on malformed test input.
pub fn doc(text: &str) -> Document<'static> {
    Document::parse(text).expect("Failed to parse test document")
}

/// An order with a customer and three line items.
pub fn order() -> Document<'static> {
    doc(r#"{
        "id": 17,
        "customer": {"name": "Ada", "tier": "gold"},
        "lines": [
            {"sku": "A-1", "qty": 2, "price": 1.5},
            {"sku": "B-2", "qty": 1, "price": 10.0},
            {"sku": "C-3", "qty": 5, "price": 0.25}
        ]
    }"#)
}

// ==========================
// ASSERTION HELPERS
// ==========================

/// Assert the non-canonical encoding of `doc`.
pub fn assert_encodes(doc: &Document<'_>, expected: &str) {
    assert_eq!(
        doc.encode(false).expect("Failed to encode"),
        expected,
        "Unexpected encoding"
    );
}

/// Assert that every member of `list` has the same schema as `template_schema`.
pub fn assert_members_match(list: &DocumentList<'_>, template_schema: &str) {
    for (index, member) in list.iter().enumerate() {
        assert_eq!(
            member.encode_schema(true).expect("Failed to encode schema"),
            template_schema,
            "Member {index} diverges from the template"
        );
        assert!(
            !member.encode_schema(true).unwrap().is_empty(),
            "Empty schema for member {index}"
        );
    }
}

/// Integer values of field `field` across the members of `list`.
pub fn field_ints(list: &DocumentList<'_>, field: &str) -> Vec<i64> {
    list.iter()
        .map(|member| member.get_as::<i64>(field).expect("Missing integer field"))
        .collect()
}
