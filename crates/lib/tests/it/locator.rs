//! Locator tests: path grammar through the facade and pluggable locators.

use std::rc::Rc;

use dtree::{Locator, Matcher, PathLocator, PathMatcher};

use crate::helpers::*;

#[test]
fn malformed_expressions_are_rejected() {
    let doc = order();
    for bad in ["a..b", "customer.", ".id", "lines.@sku"] {
        let err = doc.get(bad).unwrap_err();
        assert!(err.is_malformed_expression(), "{bad} was accepted");
        assert_eq!(err.module(), "locator");
    }
    assert!(doc.set("a..b", 1).unwrap_err().is_malformed_expression());
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let doc = order();
    assert_eq!(doc.get_value("  customer.name ").unwrap(), "Ada");
    assert!(doc.get_object("   ").unwrap() == doc);
}

#[test]
fn anchored_paths_start_at_the_top() {
    let doc = order();
    let line = doc.get_list("lines").unwrap().get(1).unwrap();

    assert_eq!(line.get_value("@id").unwrap(), 17);
    assert_eq!(line.get_value("@customer.name").unwrap(), "Ada");
    assert!(line.try_get("id").unwrap().is_none());

    line.set("@customer.tier", "silver").unwrap();
    assert_eq!(doc.get_value("customer.tier").unwrap(), "silver");
}

#[test]
fn name_segments_fan_out_over_lists() {
    let doc = order();
    let skus = doc.get_dictionary("lines.sku").unwrap();
    // Every member matches; the first one names the entry.
    assert_eq!(skus.len(), 1);
    assert_eq!(skus["sku"].as_value().unwrap(), "A-1");

    assert_eq!(doc.get_value("lines.sku").unwrap(), "A-1");
    assert_eq!(doc.get_value("lines.2.sku").unwrap(), "C-3");
}

#[test]
fn locator_caches_compiled_matchers() {
    let locator = PathLocator::with_cache_capacity(2);
    let first = locator.compile("a.b").unwrap();
    let again = locator.compile("a.b").unwrap();
    assert!(Rc::ptr_eq(&first, &again));
    assert_eq!(locator.cached(), 1);

    locator.compile("c").unwrap();
    locator.compile("d").unwrap();
    assert!(locator.cached() <= 2);

    let uncached = PathLocator::with_cache_capacity(0);
    uncached.compile("a").unwrap();
    assert_eq!(uncached.cached(), 0);
}

/// Locator accepting `/` as the separator.
#[derive(Debug)]
struct SlashLocator;

impl Locator for SlashLocator {
    fn compile(&self, expression: &str) -> dtree::Result<Rc<dyn Matcher>> {
        let matcher = PathMatcher::parse(&expression.replace('/', "."))?;
        Ok(Rc::new(matcher))
    }
}

#[test]
fn documents_accept_custom_locators() {
    let doc = order().with_locator(Rc::new(SlashLocator));

    assert_eq!(doc.get_value("customer/name").unwrap(), "Ada");
    doc.set("customer/address/city", "Paris").unwrap();
    assert_eq!(doc.get_value("customer/address/city").unwrap(), "Paris");

    // Handles derived from the document keep its locator.
    let customer = doc.get_object("customer").unwrap();
    assert_eq!(customer.get_value("address/city").unwrap(), "Paris");
}

#[test]
fn pinned_copies_keep_their_locator() {
    let pool = dtree::Pool::new();
    let pinned = pool.run(|scope| {
        let doc = scope
            .parse(r#"{"customer":{"name":"Ada"}}"#)
            .unwrap()
            .with_locator(Rc::new(SlashLocator));
        doc.to_pinned().unwrap()
    });
    assert_eq!(pinned.get_value("customer/name").unwrap(), "Ada");
}
