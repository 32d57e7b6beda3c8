//! List tests: seeding, templates, member mutation and DocumentList views.

use dtree::{Document, Value};

use crate::helpers::*;

#[test]
fn push_with_fills_each_member() {
    let doc = Document::new();
    doc.push_with("items", [1, 2, 3], |member, n| member.set("n", n))
        .unwrap();

    let items = doc.get_list("items").unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(field_ints(&items, "n"), vec![1, 2, 3]);

    // The template was derived from the first member.
    let member_schema = items.get(0).unwrap().encode_schema(true).unwrap();
    assert_eq!(
        doc.encode_schema(true).unwrap(),
        format!(r#"{{"items":[{member_schema}]}}"#)
    );
    assert_members_match(&items, &member_schema);
}

#[test]
fn create_and_push_starts_from_the_template() {
    let doc = Document::parse(r#"{"list":[{"x":1,"y":"a"}]}"#).unwrap();

    let member = doc.create_and_push("list").unwrap();
    assert!(member.exists("x").unwrap());
    assert_eq!(member.get_value("x").unwrap(), Value::Null);
    assert_eq!(member.get_value("y").unwrap(), Value::Null);

    member.set("x", 2).unwrap();
    assert_encodes(&doc, r#"{"list":[{"x":1,"y":"a"},{"x":2,"y":null}]}"#);
}

#[test]
fn seeding_drops_a_lone_empty_member() {
    let doc = Document::parse(r#"{"list":[{"x":null}]}"#).unwrap();
    assert_eq!(doc.count("list").unwrap(), 0);
    assert_eq!(doc.encode_schema(false).unwrap(), r#"{"list":[{"x"}]}"#);

    let member = doc.create_and_push("list").unwrap();
    assert!(member.exists("x").unwrap());
    assert_eq!(doc.count("list").unwrap(), 1);

    // With more than one member, empty ones are kept.
    let doc = Document::parse(r#"{"list":[{"x":null},{"x":null}]}"#).unwrap();
    assert_eq!(doc.count("list").unwrap(), 2);
}

#[test]
fn first_push_rederives_the_template() {
    let doc = Document::new();
    doc.ensure_list("rows").unwrap();
    assert_eq!(doc.encode_schema(false).unwrap(), r#"{"rows":[{}]}"#);

    let row = Document::parse(r#"{"a":1,"b":{"c":2}}"#).unwrap();
    doc.push("rows", Some(&row)).unwrap();
    assert_eq!(
        doc.encode_schema(false).unwrap(),
        r#"{"rows":[{"a","b":{"c"}}]}"#
    );

    // Later pushes do not reshape the template.
    let other = Document::parse(r#"{"z":true}"#).unwrap();
    doc.push("rows", Some(&other)).unwrap();
    assert_eq!(
        doc.encode_schema(false).unwrap(),
        r#"{"rows":[{"a","b":{"c"}}]}"#
    );
    assert_eq!(doc.count("rows").unwrap(), 2);
}

#[test]
fn push_none_only_creates_the_list() {
    let doc = Document::new();
    doc.push("a.b", None).unwrap();

    assert_eq!(doc.count("a.b").unwrap(), 0);
    assert_encodes(&doc, r#"{"a":{"b":[]}}"#);

    // An existing list is left alone.
    doc.push("a.b", Some(&Document::parse(r#"{"k":1}"#).unwrap()))
        .unwrap();
    doc.push("a.b", None).unwrap();
    assert_eq!(doc.count("a.b").unwrap(), 1);
}

#[test]
fn pushed_members_are_copies() {
    let doc = Document::new();
    let member = Document::parse(r#"{"v":1}"#).unwrap();
    doc.push("l", Some(&member)).unwrap();
    member.set("v", 2).unwrap();

    assert_eq!(doc.get_value("l.0.v").unwrap(), 1);
}

#[test]
fn push_onto_a_non_list_is_a_type_error() {
    let doc = order();
    assert!(doc.push("id", None).unwrap_err().is_type_error());
    assert!(doc.create_and_push("customer").unwrap_err().is_type_error());
}

#[test]
fn push_into_a_template_only_list_is_not_found() {
    let doc = Document::parse(r#"{"groups":[{"tags":[]}]}"#).unwrap();
    assert_eq!(doc.count("groups").unwrap(), 0);

    let err = doc.push("groups.tags", None).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn push_count_and_push_from() {
    let doc = Document::new();
    doc.push_count("squares", 4, |member, i| member.set("sq", i * i))
        .unwrap();
    assert_eq!(
        field_ints(&doc.get_list("squares").unwrap(), "sq"),
        vec![0, 1, 4, 9]
    );

    doc.push_from("names", ["x", "y"], |name| {
        let member = Document::new();
        member.set("name", name)?;
        Ok(member)
    })
    .unwrap();
    assert_eq!(
        doc.get_list("names")
            .unwrap()
            .iter()
            .map(|m| m.get_as::<String>("name").unwrap())
            .collect::<Vec<_>>(),
        vec!["x", "y"]
    );
}

#[test]
fn remove_at_renumbers_and_signals_change() {
    let doc = Document::parse(r#"{"l":[{"i":0},{"i":1},{"i":2}]}"#).unwrap();
    let before = doc.revision().unwrap();

    assert_eq!(doc.remove_at("l", &[1]).unwrap(), 1);

    let list = doc.get_list("l").unwrap();
    assert_eq!(field_ints(&list, "i"), vec![0, 2]);
    assert_eq!(doc.get_value("l.1.i").unwrap(), 2);
    assert!(doc.revision().unwrap() > before);
}

#[test]
fn remove_and_retain_edge_cases() {
    let doc = Document::parse(r#"{"l":[{"i":0},{"i":1},{"i":2},{"i":3}]}"#).unwrap();

    assert_eq!(doc.remove_at("l", &[9]).unwrap(), 0);
    assert_eq!(doc.remove_at("missing", &[0]).unwrap(), 0);
    assert!(doc.remove_at("l.0.i", &[0]).unwrap_err().is_type_error());

    assert_eq!(doc.retain_at("l", &[0, 3]).unwrap(), 2);
    assert_eq!(field_ints(&doc.get_list("l").unwrap(), "i"), vec![0, 3]);

    assert_eq!(doc.retain_at("l", &[]).unwrap(), 2);
    assert_eq!(doc.count("l").unwrap(), 0);
    // The template outlives the members.
    assert_eq!(doc.encode_schema(false).unwrap(), r#"{"l":[{"i"}]}"#);
}

#[test]
fn writes_through_a_list_reach_every_member_and_the_template() {
    let doc = order();

    doc.set("lines.qty", 0).unwrap();
    assert_eq!(field_ints(&doc.get_list("lines").unwrap(), "qty"), vec![0, 0, 0]);

    doc.set("lines.note", "gift").unwrap();
    let lines = doc.get_list("lines").unwrap();
    for line in &lines {
        assert_eq!(line.get_value("note").unwrap(), "gift");
    }

    // The template gains the field without data.
    let template_schema = lines.first().unwrap().encode_schema(true).unwrap();
    assert_members_match(&lines, &template_schema);
    let created = doc.create_and_push("lines").unwrap();
    assert_eq!(created.get_value("note").unwrap(), Value::Null);
    assert_eq!(created.encode_schema(true).unwrap(), template_schema);
}

#[test]
fn indexed_writes_touch_one_member() {
    let doc = order();
    doc.set("lines.1.qty", 7).unwrap();
    assert_eq!(field_ints(&doc.get_list("lines").unwrap(), "qty"), vec![2, 7, 5]);

    let err = doc.set("lines.9.qty", 7).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn replacing_a_member_by_index() {
    let doc = order();
    let replacement = Document::parse(r#"{"sku":"Z-9","qty":9,"price":9.0}"#).unwrap();

    doc.set("lines.0", &replacement).unwrap();
    let first = doc.get_list("lines").unwrap().first().unwrap();
    assert_eq!(first.get_value("sku").unwrap(), "Z-9");
    assert_eq!(doc.count("lines").unwrap(), 3);
}

#[test]
fn views_are_shared_until_a_change() {
    let doc = Document::parse(r#"{"outer":{"l":[{"v":{"deep":1}},{"v":{"deep":2}}]}}"#).unwrap();

    let first = doc.get_list("outer.l").unwrap();
    let second = doc.get_list("outer.l").unwrap();
    assert!(first.shares_view(&second));

    let root_before = doc.revision().unwrap();
    doc.set("outer.l.0.v.deep", 10).unwrap();

    let third = doc.get_list("outer.l").unwrap();
    assert!(!third.shares_view(&first));
    assert!(doc.revision().unwrap() > root_before);

    // The old snapshot keeps its membership.
    assert_eq!(first.len(), 2);
    assert_eq!(first.get(0).unwrap().get_value("v.deep").unwrap(), 10);
}

#[test]
fn removed_members_in_old_snapshots_are_stale() {
    let doc = Document::parse(r#"{"l":[{"i":0},{"i":1}]}"#).unwrap();
    let snapshot = doc.get_list("l").unwrap();

    doc.remove_at("l", &[0]).unwrap();

    let gone = snapshot.get(0).unwrap();
    assert!(gone.get_value("i").unwrap_err().is_stale_handle());
    assert_eq!(snapshot.get(1).unwrap().get_value("i").unwrap(), 1);
}

#[test]
fn document_list_queries() {
    let doc = Document::parse(r#"{"nums":[3,1,2],"objs":[{"a":1},{"a":2}],"empty":[]}"#).unwrap();

    let nums = doc.get_list("nums").unwrap();
    assert!(nums.item_is_single_value().unwrap());
    assert_eq!(nums.to_values::<i64>().unwrap(), vec![3, 1, 2]);
    assert_eq!(
        nums.try_single_values().unwrap(),
        Some(vec![Value::Int(3), Value::Int(1), Value::Int(2)])
    );
    assert_eq!(nums.encode(false).unwrap(), "[3,1,2]");
    assert_eq!(nums.iter().rev().count(), 3);
    assert_eq!(nums.iter().len(), 3);

    let objs = doc.get_list("objs").unwrap();
    assert!(!objs.item_is_single_value().unwrap());
    assert_eq!(objs.try_single_values().unwrap(), None);

    let needle = Document::parse(r#"{"a":2}"#).unwrap();
    assert_eq!(objs.index_of(&needle), Some(1));
    assert!(objs.contains(&needle));
    assert!(!objs.contains(&Document::parse(r#"{"a":3}"#).unwrap()));
    assert_eq!(objs.last().unwrap().get_value("a").unwrap(), 2);

    let empty = doc.get_list("empty").unwrap();
    assert!(empty.is_empty());
    assert!(!empty.item_is_single_value().unwrap());
    assert!(empty.first().is_none());
}

#[test]
fn each_visits_members_in_order() {
    let doc = order();
    let mut skus = Vec::new();
    doc.each("lines", |line| {
        skus.push(line.get_as::<String>("sku").unwrap());
        true
    })
    .unwrap();
    assert_eq!(skus, vec!["A-1", "B-2", "C-3"]);

    let mut calls = 0;
    doc.each("missing", |_| {
        calls += 1;
        true
    })
    .unwrap();
    assert_eq!(calls, 0);
}
