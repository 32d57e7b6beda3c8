//! Path expressions.
//!
//! Documents never interpret path text themselves. A [`Locator`] compiles an
//! expression into a [`Matcher`], and the matcher does the walking: it finds
//! existing nodes for reads and creates missing intermediate structure for
//! writes. [`PathLocator`] is the default implementation; a document can be
//! switched to another with
//! [`Document::with_locator`](crate::Document::with_locator).

mod errors;
mod path;

use std::{fmt, rc::Rc};

pub use errors::LocatorError;
pub use path::{PathLocator, PathMatcher};

use crate::{
    Result,
    node::{NodeArena, NodeId, Reach, WriteTarget},
};

/// Leaf factory handed to [`Matcher::resolve_for_write`].
///
/// Called with the arena and the terminal name of the path; returns a new,
/// detached node carrying that name.
pub type LeafFactory<'a> = dyn FnMut(&mut NodeArena, &str) -> Result<NodeId> + 'a;

/// A compiled path expression.
pub trait Matcher: fmt::Debug {
    /// The expression this matcher was compiled from.
    fn expression(&self) -> &str;

    /// Returns true if the expression addresses the document itself.
    fn is_self_selector(&self) -> bool;

    /// Every node the expression addresses below `root`, in tree order.
    fn find(&self, arena: &NodeArena, root: NodeId, reach: Reach) -> Result<Vec<NodeId>>;

    /// Creates whatever is missing along the expression below `root`, then
    /// calls `leaf` for each terminal position and attaches the result.
    fn resolve_for_write(
        &self,
        arena: &mut NodeArena,
        root: NodeId,
        leaf: &mut LeafFactory<'_>,
    ) -> Result<Vec<WriteTarget>>;
}

/// Compiles path expressions into matchers.
pub trait Locator: fmt::Debug {
    fn compile(&self, expression: &str) -> Result<Rc<dyn Matcher>>;
}

thread_local! {
    static DEFAULT_LOCATOR: Rc<PathLocator> = Rc::new(PathLocator::default());
}

/// The per-thread locator used by pinned documents.
pub fn default_locator() -> Rc<dyn Locator> {
    DEFAULT_LOCATOR.with(|locator| Rc::clone(locator) as Rc<dyn Locator>)
}
