//! Pool tests: scoped reuse, recycling, pinning and configuration.

use std::panic::{AssertUnwindSafe, catch_unwind};

use dtree::{Document, PinMode, Pool, PoolConfig};

use crate::helpers::*;

#[test]
fn scoped_documents_are_reusable() {
    let pool = Pool::new();
    pool.run(|scope| {
        let doc = scope.parse(r#"{"a":1}"#).unwrap();
        assert_eq!(doc.pin_mode(), PinMode::Reusable);
        assert_eq!(doc.get_value("a").unwrap(), 1);

        let copy = doc.clone();
        assert_eq!(copy.pin_mode(), PinMode::Reusable);
        assert_eq!(scope.issued(), 2);
    });
    assert_eq!(pool.stats().retained, 2);
}

#[test]
fn to_pinned_outlives_the_scope() {
    let pool = Pool::new();
    let pinned = pool.run(|scope| {
        let doc = scope.document();
        doc.push_with("rows", [1, 2], |row, n| row.set("n", n)).unwrap();
        doc.to_pinned().unwrap()
    });

    assert_eq!(pinned.pin_mode(), PinMode::Pinned);
    assert_encodes(&pinned, r#"{"rows":[{"n":1},{"n":2}]}"#);
    assert_eq!(pinned.encode_schema(false).unwrap(), r#"{"rows":[{"n"}]}"#);

    // The scope's arena went back to the pool despite the copy.
    let stats = pool.stats();
    assert_eq!(stats.arenas_recycled, 1);
    assert_eq!(stats.arenas_leaked, 0);
}

#[test]
fn copies_keep_pin_mode_and_read_only() {
    let pool = Pool::new();
    let pinned = pool.run(|scope| {
        let doc = scope.parse_read_only(r#"{"a":{"b":1}}"#).unwrap();

        let child = doc.get_object("a").unwrap();
        assert_eq!(child.pin_mode(), PinMode::Reusable);
        assert!(child.is_read_only());

        let copy = doc.try_clone().unwrap();
        assert_eq!(copy.pin_mode(), PinMode::Reusable);
        assert!(copy.is_read_only());
        assert!(copy.set("a.b", 2).unwrap_err().is_read_only_violation());
        assert_eq!(copy, doc);

        doc.to_pinned().unwrap()
    });

    assert_eq!(pinned.pin_mode(), PinMode::Pinned);
    assert!(pinned.is_read_only());
    assert!(pinned.set("a.b", 2).unwrap_err().is_read_only_violation());
    assert_eq!(pinned.get_value("a.b").unwrap(), 1);

    let writable = Document::parse(r#"{"x":1}"#).unwrap();
    let copy = writable.clone();
    assert_eq!(copy.pin_mode(), PinMode::Pinned);
    assert!(!copy.is_read_only());
}

#[test]
fn documents_move_between_pinned_and_pooled_trees() {
    let pool = Pool::new();
    let target = Document::new();
    pool.run(|scope| {
        let scratch = scope.parse(r#"{"k":"v"}"#).unwrap();
        target.set("copied", &scratch).unwrap();
        target.push("list", Some(&scratch)).unwrap();

        let pooled = scope.document();
        pooled.set("from_pinned", &target).unwrap();
        assert_eq!(pooled.get_value("from_pinned.copied.k").unwrap(), "v");
    });
    assert_eq!(target.get_value("copied.k").unwrap(), "v");
    assert_eq!(target.get_value("list.0.k").unwrap(), "v");
}

#[test]
fn equality_spans_pin_modes() {
    let pool = Pool::new();
    let pinned = doc(r#"{"a":1,"b":2}"#);
    pool.run(|scope| {
        let pooled = scope.parse(r#"{"b":2,"a":1}"#).unwrap();
        assert!(pooled == pinned);
        assert!(pinned == pooled);
    });
}

#[test]
fn arenas_are_reused_across_scopes() {
    let pool = Pool::new();
    for round in 0..5 {
        pool.run(|scope| {
            let doc = scope.document();
            doc.set("round", round).unwrap();
            doc.push_count("items", 10, |item, i| item.set("i", i)).unwrap();
            assert_eq!(doc.count("items").unwrap(), 10);
        });
    }
    let stats = pool.stats();
    assert_eq!(stats.arenas_created, 1);
    assert_eq!(stats.arenas_reused, 4);
    assert_eq!(stats.arenas_recycled, 5);
}

#[test]
fn early_returns_still_release() {
    let pool = Pool::new();
    let result: dtree::Result<()> = pool.run(|scope| {
        let doc = scope.parse(r#"{"a":1}"#)?;
        doc.get_value("missing")?;
        Ok(())
    });

    assert!(result.unwrap_err().is_not_found());
    assert_eq!(pool.stats().retained, 1);
}

#[test]
fn panics_still_release() {
    let pool = Pool::new();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        pool.run(|scope| {
            let doc = scope.document();
            doc.set("a", 1).unwrap();
            panic!("boom");
        })
    }));

    assert!(outcome.is_err());
    assert_eq!(pool.stats().arenas_recycled, 1);
}

#[test]
fn bytes_through_a_scope() {
    let pool = Pool::new();
    let original = order();
    let bytes = original.to_bytes().unwrap();
    pool.run(|scope| {
        let doc = scope.from_bytes(&bytes).unwrap();
        assert_eq!(doc, original);
        assert!(scope.from_bytes(&[0xc3]).unwrap_err().is_invalid_input());

        let read_only = scope.parse_read_only("{}").unwrap();
        assert!(read_only.set("a", 1).unwrap_err().is_read_only_violation());
    });
}

#[test]
fn pool_config_is_validated() {
    let err = Pool::with_config(PoolConfig::default().with_initial_slot_capacity(usize::MAX))
        .unwrap_err();
    assert_eq!(err.module(), "pool");
    assert!(err.is_config_error());

    let pool = Pool::with_config(
        PoolConfig::default()
            .with_max_retained_arenas(0)
            .with_matcher_cache_capacity(0),
    )
    .unwrap();
    pool.run(|scope| {
        scope.document().set("a", 1).unwrap();
    });
    let stats = pool.stats();
    assert_eq!(stats.retained, 0);
    assert_eq!(stats.arenas_discarded, 1);
}

#[test]
fn cloned_pool_handles_share_the_free_list() {
    let pool = Pool::new();
    let handle = pool.clone();
    pool.run(|scope| {
        scope.document();
    });
    handle.run(|scope| {
        scope.document();
    });
    assert_eq!(handle.stats().arenas_created, 1);
    assert_eq!(pool.stats().arenas_reused, 1);
}
