//! Path-addressed documents.
//!
//! A [`Document`] is a handle to one object node of a tree. Every read and
//! write takes a path expression, which the document's
//! [`Locator`](crate::locator::Locator) compiles and resolves against that
//! node:
//!
//! ```
//! # use dtree::Document;
//! let doc = Document::new();
//! doc.set("customer.name", "Ada")?;
//! doc.push_with("lines", [10, 20], |line, qty| line.set("qty", qty))?;
//!
//! assert_eq!(doc.get_as::<String>("customer.name")?, "Ada");
//! assert_eq!(doc.count("lines")?, 2);
//! assert_eq!(
//!     doc.encode(false)?,
//!     r#"{"customer":{"name":"Ada"},"lines":[{"qty":10},{"qty":20}]}"#
//! );
//! # Ok::<(), dtree::Error>(())
//! ```
//!
//! Sub-documents and lists returned by lookups are live views into the same
//! tree: writing through them changes the parent document. [`Clone`] is the
//! deep copy.
//!
//! # Lifecycle
//!
//! `Document<'static>` values are pinned: they own their tree outright.
//! Documents created through a [`PoolScope`] borrow the scope and are
//! recycled with it; [`Document::to_pinned`] detaches a copy that outlives
//! the scope.

mod assign;
mod entry;
mod errors;
mod list;

use std::{
    cell::RefCell,
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
    str::FromStr,
};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use tracing::debug;

pub use assign::Assign;
pub use entry::Entry;
pub use errors::DocumentError;
pub use list::{DocumentList, Iter};

use crate::{
    Result,
    locator::{Locator, LocatorError, Matcher, default_locator},
    node::{NodeArena, NodeId, NodeType, PinMode, Reach, type_mismatch},
    pool::{PoolScope, SharedArena},
    value::Value,
};

pub(crate) fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        DocumentError::InvalidInput {
            reason: e.to_string(),
        }
        .into()
    })
}

fn malformed(expression: &str, reason: &str) -> crate::Error {
    LocatorError::MalformedExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// The anonymous scalar of a single-value document.
fn scalar_field(tree: &NodeArena, id: NodeId, path: &str) -> Result<NodeId> {
    match tree.anonymous_child(id)? {
        Some(child) if tree.node_type(child)? == NodeType::Value => Ok(child),
        _ => Err(type_mismatch(path, "value", tree.node_type(id)?)),
    }
}

fn not_found(path: &str) -> crate::Error {
    DocumentError::NotFound {
        path: path.to_string(),
    }
    .into()
}

/// Context shared by every handle into one tree.
#[derive(Clone)]
pub(crate) struct Binding<'s> {
    tree: SharedArena,
    read_only: bool,
    scope: Option<&'s PoolScope>,
    locator: Rc<dyn Locator>,
}

impl<'s> Binding<'s> {
    fn document(&self, root: NodeId) -> Document<'s> {
        Document {
            binding: self.clone(),
            root,
        }
    }

    /// A new, empty tree with the same lifecycle as this one.
    fn fresh_tree(&self) -> SharedArena {
        match self.scope {
            Some(scope) => scope.issue(),
            None => Rc::new(RefCell::new(NodeArena::pinned())),
        }
    }
}

/// Handle to an object node, exposing path-addressed operations.
pub struct Document<'s> {
    binding: Binding<'s>,
    root: NodeId,
}

impl Document<'static> {
    /// Creates an empty pinned document.
    pub fn new() -> Self {
        let mut arena = NodeArena::pinned();
        let root = arena.create_object("");
        Self::bind(
            Rc::new(RefCell::new(arena)),
            root,
            false,
            None,
            default_locator(),
        )
    }

    /// Parses encoded text into a pinned document.
    pub fn parse(text: &str) -> Result<Self> {
        Self::decode(text, false)
    }

    /// Parses encoded text into a read-only pinned document.
    pub fn parse_read_only(text: &str) -> Result<Self> {
        Self::decode(text, true)
    }

    /// Decodes UTF-8 encoded bytes into a pinned document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(utf8(bytes)?)
    }

    /// Builds a pinned document from JSON. A non-object becomes a
    /// single-value document.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let mut arena = NodeArena::pinned();
        let root = arena.load_root(json)?;
        Ok(Self::bind(
            Rc::new(RefCell::new(arena)),
            root,
            false,
            None,
            default_locator(),
        ))
    }

    fn decode(text: &str, read_only: bool) -> Result<Self> {
        let mut arena = NodeArena::pinned();
        let root = arena.decode(text)?;
        Ok(Self::bind(
            Rc::new(RefCell::new(arena)),
            root,
            read_only,
            None,
            default_locator(),
        ))
    }
}

impl Default for Document<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Document<'static> {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'s> Document<'s> {
    pub(crate) fn bind(
        tree: SharedArena,
        root: NodeId,
        read_only: bool,
        scope: Option<&'s PoolScope>,
        locator: Rc<dyn Locator>,
    ) -> Self {
        Self {
            binding: Binding {
                tree,
                read_only,
                scope,
                locator,
            },
            root,
        }
    }

    pub fn pin_mode(&self) -> PinMode {
        if self.binding.scope.is_some() {
            PinMode::Reusable
        } else {
            PinMode::Pinned
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.binding.read_only
    }

    /// Another handle to the same node that rejects every mutator.
    pub fn as_read_only(&self) -> Document<'s> {
        let mut alias = self.alias();
        alias.binding.read_only = true;
        alias
    }

    /// Another handle to the same node that resolves paths with `locator`.
    pub fn with_locator(&self, locator: Rc<dyn Locator>) -> Document<'s> {
        let mut alias = self.alias();
        alias.binding.locator = locator;
        alias
    }

    /// Change counter of this document's root node.
    pub fn revision(&self) -> Result<u64> {
        self.binding.tree.borrow().revision(self.root)
    }

    /// Number of live nodes in the whole tree this document belongs to.
    pub fn live_nodes(&self) -> usize {
        self.binding.tree.borrow().len()
    }

    fn alias(&self) -> Document<'s> {
        self.binding.document(self.root)
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.binding.read_only {
            return Err(DocumentError::ReadOnlyViolation {
                operation: operation.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn compile(&self, path: &str) -> Result<Rc<dyn Matcher>> {
        self.binding.locator.compile(path)
    }

    /// First data match for `matcher`. The self selector resolves to the
    /// anonymous field of a single-value document.
    fn resolve(&self, tree: &NodeArena, matcher: &dyn Matcher) -> Result<Option<NodeId>> {
        let Some(hit) = matcher
            .find(tree, self.root, Reach::Data)?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        if matcher.is_self_selector() {
            return Ok(Some(tree.anonymous_child(hit)?.unwrap_or(hit)));
        }
        Ok(Some(hit))
    }

    fn entry(&self, id: NodeId) -> Result<Entry<'s>> {
        let value = {
            let tree = self.binding.tree.borrow();
            match tree.node_type(id)? {
                NodeType::Value => Some(tree.value(id)?.clone()),
                NodeType::Object => return Ok(Entry::Object(self.binding.document(id))),
                NodeType::List => None,
            }
        };
        match value {
            Some(value) => Ok(Entry::Value(value)),
            None => Ok(Entry::List(DocumentList::new(self.binding.clone(), id)?)),
        }
    }

    pub(crate) fn copy_into(
        &self,
        arena: &mut NodeArena,
        name: &str,
        own: &SharedArena,
    ) -> Result<NodeId> {
        if Rc::ptr_eq(&self.binding.tree, own) {
            arena.import(None, self.root, name)
        } else {
            let source = self.binding.tree.borrow();
            arena.import(Some(&*source), self.root, name)
        }
    }

    // === Reads ===

    /// Looks up `path`. With `throw_on_missing` a miss is
    /// [`DocumentError::NotFound`]; otherwise it is `None`.
    pub fn find(&self, path: &str, throw_on_missing: bool) -> Result<Option<Entry<'s>>> {
        let matcher = self.compile(path)?;
        let hit = self.resolve(&self.binding.tree.borrow(), matcher.as_ref())?;
        match hit {
            Some(id) => self.entry(id).map(Some),
            None if throw_on_missing => Err(not_found(path)),
            None => Ok(None),
        }
    }

    pub fn get(&self, path: &str) -> Result<Entry<'s>> {
        self.find(path, true)?.ok_or_else(|| not_found(path))
    }

    pub fn try_get(&self, path: &str) -> Result<Option<Entry<'s>>> {
        self.find(path, false)
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.try_get(path)?.is_some())
    }

    pub fn get_value(&self, path: &str) -> Result<Value> {
        match self.get(path)? {
            Entry::Value(value) => Ok(value),
            other => Err(type_mismatch(path, "value", other.node_type())),
        }
    }

    pub fn try_get_value(&self, path: &str) -> Result<Option<Value>> {
        match self.try_get(path)? {
            None => Ok(None),
            Some(Entry::Value(value)) => Ok(Some(value)),
            Some(other) => Err(type_mismatch(path, "value", other.node_type())),
        }
    }

    /// The value at `path`, or `default` when it is missing, null or empty
    /// text.
    pub fn get_value_or(&self, path: &str, default: impl Into<Value>) -> Result<Value> {
        match self.try_get_value(path)? {
            Some(value) if !value.is_empty_value() => Ok(value),
            _ => Ok(default.into()),
        }
    }

    /// The value at `path` converted to `T`.
    pub fn get_as<T>(&self, path: &str) -> Result<T>
    where
        T: for<'v> TryFrom<&'v Value, Error = DocumentError>,
    {
        let value = self.get_value(path)?;
        T::try_from(&value).map_err(|e| e.at_path(path).into())
    }

    /// Like [`get_as`](Self::get_as), falling back to `default` under the
    /// same conditions as [`get_value_or`](Self::get_value_or).
    pub fn get_as_or<T>(&self, path: &str, default: T) -> Result<T>
    where
        T: for<'v> TryFrom<&'v Value, Error = DocumentError>,
    {
        match self.try_get_value(path)? {
            Some(value) if !value.is_empty_value() => {
                T::try_from(&value).map_err(|e| e.at_path(path).into())
            }
            _ => Ok(default),
        }
    }

    /// The object at `path`. The self selector yields this document.
    pub fn get_object(&self, path: &str) -> Result<Document<'s>> {
        self.try_get_object(path)?.ok_or_else(|| not_found(path))
    }

    pub fn try_get_object(&self, path: &str) -> Result<Option<Document<'s>>> {
        if self.compile(path)?.is_self_selector() {
            return Ok(Some(self.alias()));
        }
        match self.try_get(path)? {
            None => Ok(None),
            Some(Entry::Object(doc)) => Ok(Some(doc)),
            Some(other) => Err(type_mismatch(path, "object", other.node_type())),
        }
    }

    pub fn get_object_or(&self, path: &str, default: Document<'s>) -> Result<Document<'s>> {
        Ok(self.try_get_object(path)?.unwrap_or(default))
    }

    pub fn get_list(&self, path: &str) -> Result<DocumentList<'s>> {
        self.try_get_list(path)?.ok_or_else(|| not_found(path))
    }

    pub fn try_get_list(&self, path: &str) -> Result<Option<DocumentList<'s>>> {
        match self.try_get(path)? {
            None => Ok(None),
            Some(Entry::List(list)) => Ok(Some(list)),
            Some(other) => Err(type_mismatch(path, "list", other.node_type())),
        }
    }

    /// Number of members of the list at `path`; zero when there is none.
    pub fn count(&self, path: &str) -> Result<usize> {
        Ok(self.try_get_list(path)?.map_or(0, |list| list.len()))
    }

    /// Calls `f` for each member of the list at `path` until it returns
    /// `false`. A missing list is treated as empty.
    pub fn each(&self, path: &str, mut f: impl FnMut(&Document<'s>) -> bool) -> Result<()> {
        let Some(list) = self.try_get_list(path)? else {
            return Ok(());
        };
        for member in &list {
            if !f(&member) {
                break;
            }
        }
        Ok(())
    }

    /// Walks a recursive structure: every member of the list `list_name`,
    /// then every member of that member's `list_name`, and so on, parents
    /// before children.
    pub fn deep_each(
        &self,
        list_name: &str,
        mut action: impl FnMut(&Document<'s>),
        include_self: bool,
    ) -> Result<()> {
        if include_self {
            action(self);
        }
        self.descend(list_name, &mut action)
    }

    fn descend(&self, list_name: &str, action: &mut dyn FnMut(&Document<'s>)) -> Result<()> {
        let Some(list) = self.try_get_list(list_name)? else {
            return Ok(());
        };
        for member in &list {
            action(&member);
            member.descend(list_name, action)?;
        }
        Ok(())
    }

    /// Name to entry for every match of `path`. When the only match is an
    /// object, its fields are returned instead. The first match of a name
    /// wins.
    pub fn get_dictionary(&self, path: &str) -> Result<IndexMap<String, Entry<'s>>> {
        let matcher = self.compile(path)?;
        let named: Vec<(String, NodeId)> = {
            let tree = self.binding.tree.borrow();
            let hits = if matcher.is_self_selector() {
                vec![self.root]
            } else {
                matcher.find(&tree, self.root, Reach::Data)?
            };
            match hits.as_slice() {
                [only] if tree.node_type(*only)? == NodeType::Object => tree
                    .fields(*only)?
                    .into_iter()
                    .map(|(name, id)| (name.to_string(), id))
                    .collect(),
                _ => hits
                    .iter()
                    .map(|id| Ok((tree.name(*id)?.to_string(), *id)))
                    .collect::<Result<_>>()?,
            }
        };
        let mut dictionary = IndexMap::with_capacity(named.len());
        for (name, id) in named {
            if !dictionary.contains_key(&name) {
                let entry = self.entry(id)?;
                dictionary.insert(name, entry);
            }
        }
        Ok(dictionary)
    }

    // === Writes ===

    /// Writes `value` at `path`.
    ///
    /// When nothing matches, missing intermediate objects are created. When
    /// matches exist, a scalar replaces a scalar in place and every other
    /// combination replaces the matched node. Documents and lists are always
    /// copied in; the tree never shares nodes with its source.
    ///
    /// The self selector assigns to this document: a scalar makes it a
    /// single-value document, a document overwrites its content while this
    /// handle stays valid, and a list makes it an anonymous list.
    pub fn set<'a>(&self, path: &str, value: impl Into<Assign<'a>>) -> Result<()> {
        self.ensure_writable("set")?;
        let value: Assign<'a> = value.into();
        let matcher = self.compile(path)?;
        if matcher.is_self_selector() {
            return self.assign_self(&value);
        }

        let own = &self.binding.tree;
        let mut tree = own.borrow_mut();
        let hits = matcher.find(&tree, self.root, Reach::Shape)?;
        if hits.is_empty() {
            matcher.resolve_for_write(
                &mut tree,
                self.root,
                &mut |arena: &mut NodeArena, name: &str| -> Result<NodeId> {
                    value.materialize(arena, name, own)
                },
            )?;
            return Ok(());
        }

        for hit in hits {
            if !tree.contains(hit) {
                continue;
            }
            if let (NodeType::Value, Assign::Value(scalar)) = (tree.node_type(hit)?, &value) {
                if !tree.in_template(hit)? {
                    tree.set_value(hit, scalar.clone())?;
                }
                continue;
            }
            self.replace(&mut tree, hit, &value)?;
        }
        Ok(())
    }

    fn replace(&self, tree: &mut NodeArena, hit: NodeId, value: &Assign<'_>) -> Result<()> {
        let own = &self.binding.tree;
        let Some(parent) = tree.parent(hit)? else {
            let root = value.materialize_root(tree, own)?;
            return tree.overwrite(hit, root);
        };
        if tree.node_type(parent)? == NodeType::List {
            let member = value.materialize_root(tree, own)?;
            return tree.replace_member(parent, hit, member);
        }
        let name = tree.name(hit)?.to_string();
        let node = value.materialize(tree, &name, own)?;
        tree.attach(parent, node)
    }

    fn assign_self(&self, value: &Assign<'_>) -> Result<()> {
        let own = &self.binding.tree;
        let mut tree = own.borrow_mut();
        match value {
            Assign::Value(scalar) => {
                if let Some(child) = tree.anonymous_child(self.root)?
                    && tree.node_type(child)? == NodeType::Value
                {
                    return tree.set_value(child, scalar.clone());
                }
                tree.clear_fields(self.root)?;
                let leaf = tree.create_value("", scalar.clone());
                tree.attach(self.root, leaf)
            }
            Assign::Document(doc) => {
                if Rc::ptr_eq(&doc.binding.tree, own) && doc.root == self.root {
                    return Ok(());
                }
                let replacement = value.materialize_root(&mut tree, own)?;
                debug!(root = %self.root, "replacing document content");
                tree.overwrite(self.root, replacement)
            }
            Assign::List(_) => {
                let list = value.materialize(&mut tree, "", own)?;
                tree.clear_fields(self.root)?;
                tree.attach(self.root, list)
            }
        }
    }

    /// Copies `doc` to `path`.
    pub fn set_object(&self, path: &str, doc: &Document<'_>) -> Result<()> {
        self.set(path, doc)
    }

    /// Replaces whatever is at `path` with a list holding copies of `items`.
    pub fn set_list(&self, path: &str, items: &[Document<'_>]) -> Result<()> {
        self.set(path, items)
    }

    /// Creates an empty list at `path` unless a list is already there.
    pub fn ensure_list(&self, path: &str) -> Result<()> {
        self.ensure_writable("ensure_list")?;
        self.list_or_create(path).map(|_| ())
    }

    /// The first list matching `path`, if any.
    fn existing_list(&self, path: &str) -> Result<Option<NodeId>> {
        let matcher = self.compile(path)?;
        let tree = self.binding.tree.borrow();
        let Some(hit) = self.resolve(&tree, matcher.as_ref())? else {
            return Ok(None);
        };
        if hit == self.root && tree.fields(hit)?.is_empty() {
            return Ok(None);
        }
        match tree.node_type(hit)? {
            NodeType::List => Ok(Some(hit)),
            other => Err(type_mismatch(path, "list", other)),
        }
    }

    fn list_or_create(&self, path: &str) -> Result<NodeId> {
        if let Some(list) = self.existing_list(path)? {
            return Ok(list);
        }
        let matcher = self.compile(path)?;
        let mut tree = self.binding.tree.borrow_mut();
        if matcher.is_self_selector() {
            let kind = tree.node_type(self.root)?;
            if !tree.fields(self.root)?.is_empty() {
                return Err(type_mismatch(path, "list", kind));
            }
            let list = tree.build_list("", Vec::new())?;
            tree.attach(self.root, list)?;
            return Ok(list);
        }
        let written = matcher.resolve_for_write(
            &mut tree,
            self.root,
            &mut |arena: &mut NodeArena, name: &str| -> Result<NodeId> {
                arena.build_list(name, Vec::new())
            },
        )?;
        for target in &written {
            if !tree.in_template(target.node)? {
                return Ok(target.node);
            }
        }
        Err(not_found(path))
    }

    /// Appends a copy of `member` to the list at `path`, creating the list
    /// if needed. `None` only creates the list.
    pub fn push(&self, path: &str, member: Option<&Document<'_>>) -> Result<()> {
        self.ensure_writable("push")?;
        let list = self.list_or_create(path)?;
        let Some(member) = member else {
            return Ok(());
        };
        let own = &self.binding.tree;
        let mut tree = own.borrow_mut();
        let copy = member.copy_into(&mut tree, "", own)?;
        tree.push_member(list, copy)
    }

    /// Appends a member shaped like the list's template and returns it.
    pub fn create_and_push(&self, path: &str) -> Result<Document<'s>> {
        self.ensure_writable("create_and_push")?;
        let list = self.list_or_create(path)?;
        let member = {
            let mut tree = self.binding.tree.borrow_mut();
            let member = tree.instantiate_template(list)?;
            tree.push_member(list, member)?;
            member
        };
        Ok(self.binding.document(member))
    }

    /// Appends one member per item. Each member starts as a copy of the
    /// template and is filled by `fill` before it joins the list; if `fill`
    /// fails the member is discarded and the error returned.
    pub fn push_with<T>(
        &self,
        path: &str,
        items: impl IntoIterator<Item = T>,
        mut fill: impl FnMut(&Document<'s>, T) -> Result<()>,
    ) -> Result<()> {
        self.ensure_writable("push")?;
        let list = self.list_or_create(path)?;
        for item in items {
            let member = self.binding.tree.borrow_mut().instantiate_template(list)?;
            let doc = self.binding.document(member);
            if let Err(err) = fill(&doc, item) {
                self.binding.tree.borrow_mut().free(member);
                return Err(err);
            }
            self.binding.tree.borrow_mut().push_member(list, member)?;
        }
        Ok(())
    }

    /// Appends `count` members, filling each with its index.
    pub fn push_count(
        &self,
        path: &str,
        count: usize,
        fill: impl FnMut(&Document<'s>, usize) -> Result<()>,
    ) -> Result<()> {
        self.push_with(path, 0..count, fill)
    }

    /// Appends a copy of the document `factory` builds for each item.
    pub fn push_from<'d, T>(
        &self,
        path: &str,
        items: impl IntoIterator<Item = T>,
        mut factory: impl FnMut(T) -> Result<Document<'d>>,
    ) -> Result<()> {
        self.ensure_writable("push")?;
        let list = self.list_or_create(path)?;
        for item in items {
            let doc = factory(item)?;
            let own = &self.binding.tree;
            let mut tree = own.borrow_mut();
            let copy = doc.copy_into(&mut tree, "", own)?;
            tree.push_member(list, copy)?;
        }
        Ok(())
    }

    /// Removes the members at `indexes` from the list at `path` and
    /// renumbers the rest. Returns how many were removed; a missing list
    /// removes nothing.
    pub fn remove_at(&self, path: &str, indexes: &[usize]) -> Result<usize> {
        self.ensure_writable("remove_at")?;
        let Some(list) = self.existing_list(path)? else {
            return Ok(0);
        };
        self.binding
            .tree
            .borrow_mut()
            .retain_members(list, |index| !indexes.contains(&index))
    }

    /// Keeps only the members at `indexes`. Returns how many were removed.
    pub fn retain_at(&self, path: &str, indexes: &[usize]) -> Result<usize> {
        self.ensure_writable("retain_at")?;
        let Some(list) = self.existing_list(path)? else {
            return Ok(0);
        };
        self.binding
            .tree
            .borrow_mut()
            .retain_members(list, |index| indexes.contains(&index))
    }

    /// Removes every match of `path`: list members leave their list, fields
    /// leave their object. The self selector removes every field of this
    /// document. Returns the number of data nodes removed.
    pub fn delete(&self, path: &str) -> Result<usize> {
        self.ensure_writable("delete")?;
        let matcher = self.compile(path)?;
        let mut tree = self.binding.tree.borrow_mut();
        if matcher.is_self_selector() {
            return tree.clear_fields(self.root);
        }
        let hits = matcher.find(&tree, self.root, Reach::Shape)?;
        let mut removed = 0;
        for hit in hits {
            if !tree.contains(hit) {
                continue;
            }
            let in_template = tree.in_template(hit)?;
            let gone = match tree.parent(hit)? {
                Some(parent) if tree.node_type(parent)? == NodeType::List => {
                    tree.remove_member(parent, hit)?
                }
                Some(parent) => {
                    let name = tree.name(hit)?.to_string();
                    tree.detach_child(parent, &name)?
                }
                None => false,
            };
            if gone && !in_template {
                removed += 1;
            }
        }
        Ok(removed)
    }

    // === Transform ===

    /// Renames fields in bulk.
    ///
    /// `expression` is a `;`-separated list of `path=>name` rules. Every
    /// field matched by `path` (list templates included) is renamed to
    /// `name` in place; a sibling already using `name` is replaced. Rules
    /// run in order, so a later rule sees the names an earlier one wrote.
    /// Returns how many data-bearing fields were renamed.
    ///
    /// ```
    /// # use dtree::Document;
    /// let doc = Document::parse(r#"{"id":7,"lines":[{"sku":"a"},{"sku":"b"}]}"#)?;
    /// doc.transform("id=>number; lines.sku=>code")?;
    /// assert_eq!(doc.encode(false)?, r#"{"number":7,"lines":[{"code":"a"},{"code":"b"}]}"#);
    /// # Ok::<(), dtree::Error>(())
    /// ```
    pub fn transform(&self, expression: &str) -> Result<usize> {
        self.ensure_writable("transform")?;
        let mut rules = Vec::new();
        for rule in expression.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let Some((path, name)) = rule.split_once("=>") else {
                return Err(malformed(rule, "expected 'path=>name'"));
            };
            let name = name.trim();
            if name.is_empty() {
                return Err(malformed(rule, "missing the new name"));
            }
            let matcher = self.compile(path.trim())?;
            if matcher.is_self_selector() {
                return Err(malformed(rule, "the document itself cannot be renamed"));
            }
            rules.push((matcher, name));
        }

        let mut tree = self.binding.tree.borrow_mut();
        let mut renamed = 0;
        for (matcher, name) in rules {
            for hit in matcher.find(&tree, self.root, Reach::Shape)? {
                if !tree.contains(hit) {
                    continue;
                }
                let in_template = tree.in_template(hit)?;
                if tree.rename(hit, name)? && !in_template {
                    renamed += 1;
                }
            }
        }
        debug!(renamed, "transformed field names");
        Ok(renamed)
    }

    /// Rewrites every scalar matched by `path` through `f`.
    ///
    /// A matched single-value document has its anonymous field rewritten,
    /// and a matched list has each member rewritten that way. Returns how
    /// many scalars were rewritten.
    pub fn transform_values<F>(&self, path: &str, mut f: F) -> Result<usize>
    where
        F: FnMut(&Value) -> Value,
    {
        self.ensure_writable("transform_values")?;
        let matcher = self.compile(path)?;
        let mut tree = self.binding.tree.borrow_mut();
        let hits = matcher.find(&tree, self.root, Reach::Data)?;

        let mut targets = Vec::new();
        for hit in hits {
            match tree.node_type(hit)? {
                NodeType::Value => targets.push(hit),
                NodeType::Object => targets.push(scalar_field(&tree, hit, path)?),
                NodeType::List => {
                    for member in tree.members(hit)? {
                        targets.push(scalar_field(&tree, *member, path)?);
                    }
                }
            }
        }
        for target in &targets {
            let value = f(tree.value(*target)?);
            tree.set_value(*target, value)?;
        }
        Ok(targets.len())
    }

    // === Data ===

    pub fn contains_data(&self) -> Result<bool> {
        self.binding.tree.borrow().contains_data(self.root)
    }

    /// Resets every value to null and empties every list, keeping field
    /// names and list templates.
    pub fn clear_data(&self) -> Result<()> {
        self.ensure_writable("clear_data")?;
        self.binding.tree.borrow_mut().clear_data(self.root)
    }

    /// Returns true if this document holds exactly one anonymous scalar.
    pub fn is_single_value(&self) -> Result<bool> {
        let tree = self.binding.tree.borrow();
        match tree.anonymous_child(self.root)? {
            Some(child) => Ok(tree.node_type(child)? == NodeType::Value),
            None => Ok(false),
        }
    }

    // === Encoding ===

    /// Encodes the document. `sequential` orders fields canonically.
    pub fn encode(&self, sequential: bool) -> Result<String> {
        self.binding.tree.borrow().encode(self.root, sequential)
    }

    /// Encodes names and shape only.
    pub fn encode_schema(&self, sequential: bool) -> Result<String> {
        self.binding.tree.borrow().encode_schema(self.root, sequential)
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        self.binding.tree.borrow().to_json(self.root)
    }

    /// UTF-8 bytes of [`encode(false)`](Self::encode).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.encode(false)?.into_bytes())
    }

    fn canonical_key(&self) -> Result<String> {
        Ok(self.encode(true)?.to_lowercase())
    }

    // === Lifecycle ===

    /// Deep copy into a new tree with the same pin mode.
    pub fn try_clone(&self) -> Result<Document<'s>> {
        let tree = self.binding.fresh_tree();
        let root = {
            let source = self.binding.tree.borrow();
            tree.borrow_mut().import(Some(&*source), self.root, "")?
        };
        Ok(Document {
            binding: Binding {
                tree,
                read_only: self.binding.read_only,
                scope: self.binding.scope,
                locator: Rc::clone(&self.binding.locator),
            },
            root,
        })
    }

    /// A pinned document that can outlive this one's scope. A pinned
    /// document returns another handle to itself; a reusable one is copied
    /// into a fresh pinned tree.
    pub fn to_pinned(&self) -> Result<Document<'static>> {
        if self.binding.scope.is_none() {
            return Ok(Document::bind(
                Rc::clone(&self.binding.tree),
                self.root,
                self.binding.read_only,
                None,
                Rc::clone(&self.binding.locator),
            ));
        }
        let mut arena = NodeArena::pinned();
        let root = {
            let source = self.binding.tree.borrow();
            arena.import(Some(&*source), self.root, "")?
        };
        Ok(Document::bind(
            Rc::new(RefCell::new(arena)),
            root,
            self.binding.read_only,
            None,
            Rc::clone(&self.binding.locator),
        ))
    }
}

/// Deep copy. A document whose root has been freed clones as an empty
/// document.
impl Clone for Document<'_> {
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|_| {
            let tree = self.binding.fresh_tree();
            let root = tree.borrow_mut().create_object("");
            Document {
                binding: Binding {
                    tree,
                    read_only: self.binding.read_only,
                    scope: self.binding.scope,
                    locator: Rc::clone(&self.binding.locator),
                },
                root,
            }
        })
    }
}

/// Equal when the canonical encodings match case-insensitively.
impl<'b> PartialEq<Document<'b>> for Document<'_> {
    fn eq(&self, other: &Document<'b>) -> bool {
        match (self.canonical_key(), other.canonical_key()) {
            (Ok(a), Ok(b)) => a == b,
            _ => Rc::ptr_eq(&self.binding.tree, &other.binding.tree) && self.root == other.root,
        }
    }
}

impl Eq for Document<'_> {}

impl Hash for Document<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.canonical_key() {
            Ok(key) => key.hash(state),
            Err(_) => self.root.hash(state),
        }
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode(false) {
            Ok(code) => f.write_str(&code),
            Err(_) => f.write_str("null"),
        }
    }
}

impl fmt::Debug for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("pin", &self.pin_mode())
            .field("read_only", &self.binding.read_only)
            .field("code", &self.encode(false).ok())
            .finish()
    }
}

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
