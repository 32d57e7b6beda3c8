//! Dot-separated path expressions.
//!
//! Grammar:
//!
//! - segments are separated by `.` and trimmed of surrounding whitespace;
//! - the empty expression addresses the document itself;
//! - a leading `@` starts from the top-most ancestor instead of the document;
//! - on an object a segment names a field;
//! - on a list an unsigned integer segment selects one member, and any other
//!   segment is applied to every member (and, for shape-changing operations,
//!   to the list template).
//!
//! ```
//! # use dtree::locator::PathMatcher;
//! let path = PathMatcher::parse(" @ order . lines . 0 ")?;
//! assert!(path.is_anchored());
//! assert_eq!(path.segments().collect::<Vec<_>>(), vec!["order", "lines", "0"]);
//!
//! assert!(PathMatcher::parse("a..b").is_err());
//! # Ok::<(), dtree::Error>(())
//! ```

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::{LeafFactory, Locator, LocatorError, Matcher};
use crate::{
    Result,
    doc::DocumentError,
    node::{NodeArena, NodeId, NodeType, Reach, WriteTarget, type_mismatch},
};

const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    name: String,
    index: Option<usize>,
}

impl Segment {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            index: name.parse().ok(),
        }
    }
}

/// Longest path accepted by [`PathMatcher::parse`]. Writes walk one stack
/// frame per segment.
pub(crate) const MAX_SEGMENTS: usize = 256;

/// A compiled dot-separated path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    expression: String,
    anchored: bool,
    segments: Vec<Segment>,
}

impl PathMatcher {
    pub fn parse(expression: &str) -> Result<Self> {
        let malformed = |reason: &str| LocatorError::MalformedExpression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = expression.trim();
        let (anchored, body) = match trimmed.strip_prefix('@') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        let mut segments = Vec::new();
        if !body.is_empty() {
            for raw in body.split('.') {
                let name = raw.trim();
                if name.is_empty() {
                    return Err(malformed("empty segment").into());
                }
                if name.contains('@') {
                    return Err(malformed("'@' may only lead the expression").into());
                }
                if segments.len() == MAX_SEGMENTS {
                    return Err(malformed("too many segments").into());
                }
                segments.push(Segment::new(name));
            }
        }

        Ok(Self {
            expression: expression.to_string(),
            anchored,
            segments,
        })
    }

    /// Returns true if the path starts from the top-most ancestor.
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|segment| segment.name.as_str())
    }

    fn start(&self, arena: &NodeArena, root: NodeId) -> Result<NodeId> {
        if self.anchored {
            arena.top(root)
        } else {
            Ok(root)
        }
    }

    fn step(
        &self,
        arena: &NodeArena,
        at: NodeId,
        segment: &Segment,
        reach: Reach,
        out: &mut Vec<NodeId>,
    ) -> Result<()> {
        match arena.node_type(at)? {
            NodeType::Object => {
                if let Some(child) = arena.child(at, &segment.name)? {
                    out.push(child);
                }
            }
            NodeType::List => match segment.index {
                Some(index) => {
                    if let Some(member) = arena.members(at)?.get(index) {
                        out.push(*member);
                    }
                }
                None => {
                    for root in arena.fan_out(at, reach)? {
                        self.step(arena, root, segment, reach, out)?;
                    }
                }
            },
            NodeType::Value => {}
        }
        Ok(())
    }

    fn write_from(
        &self,
        arena: &mut NodeArena,
        at: NodeId,
        segments: &[Segment],
        leaf: &mut LeafFactory<'_>,
        written: &mut Vec<WriteTarget>,
    ) -> Result<()> {
        let Some((segment, rest)) = segments.split_first() else {
            return Ok(());
        };
        match arena.node_type(at)? {
            NodeType::Object => {
                if rest.is_empty() {
                    let node = leaf(arena, &segment.name)?;
                    arena.attach(at, node)?;
                    written.push(WriteTarget {
                        parent: at,
                        name: segment.name.clone(),
                        node,
                    });
                    return Ok(());
                }
                let next = match arena.child(at, &segment.name)? {
                    Some(child) => child,
                    None => {
                        let created = arena.create_object(&segment.name);
                        arena.attach(at, created)?;
                        created
                    }
                };
                self.write_from(arena, next, rest, leaf, written)
            }
            NodeType::List => match segment.index {
                Some(index) => {
                    let member = arena.members(at)?.get(index).copied().ok_or_else(|| {
                        DocumentError::NotFound {
                            path: self.expression.clone(),
                        }
                    })?;
                    self.write_from(arena, member, rest, leaf, written)
                }
                None => {
                    for root in arena.fan_out(at, Reach::Shape)? {
                        self.write_from(arena, root, segments, leaf, written)?;
                    }
                    Ok(())
                }
            },
            NodeType::Value => Err(type_mismatch(&self.expression, "object", NodeType::Value)),
        }
    }
}

impl Matcher for PathMatcher {
    fn expression(&self) -> &str {
        &self.expression
    }

    fn is_self_selector(&self) -> bool {
        !self.anchored && self.segments.is_empty()
    }

    fn find(&self, arena: &NodeArena, root: NodeId, reach: Reach) -> Result<Vec<NodeId>> {
        let mut current = vec![self.start(arena, root)?];
        for segment in &self.segments {
            let mut next = Vec::new();
            for at in current {
                self.step(arena, at, segment, reach, &mut next)?;
            }
            if next.is_empty() {
                return Ok(next);
            }
            current = next;
        }
        Ok(current)
    }

    fn resolve_for_write(
        &self,
        arena: &mut NodeArena,
        root: NodeId,
        leaf: &mut LeafFactory<'_>,
    ) -> Result<Vec<WriteTarget>> {
        let start = self.start(arena, root)?;
        let mut written = Vec::new();
        self.write_from(arena, start, &self.segments, leaf, &mut written)?;
        Ok(written)
    }
}

/// The default [`Locator`]: compiles [`PathMatcher`]s and keeps a bounded
/// cache of them keyed by expression text.
#[derive(Debug)]
pub struct PathLocator {
    cache: RefCell<HashMap<String, Rc<PathMatcher>>>,
    capacity: usize,
}

impl Default for PathLocator {
    fn default() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl PathLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero disables caching. A full cache is emptied before
    /// the next insert.
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
            capacity,
        }
    }

    /// Number of cached matchers.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl Locator for PathLocator {
    fn compile(&self, expression: &str) -> Result<Rc<dyn Matcher>> {
        if let Some(hit) = self.cache.borrow().get(expression) {
            return Ok(Rc::clone(hit) as Rc<dyn Matcher>);
        }
        let matcher = Rc::new(PathMatcher::parse(expression)?);
        if self.capacity > 0 {
            let mut cache = self.cache.borrow_mut();
            if cache.len() >= self.capacity {
                cache.clear();
            }
            cache.insert(expression.to_string(), Rc::clone(&matcher));
        }
        Ok(matcher)
    }
}
