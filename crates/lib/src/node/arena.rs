use std::{collections::HashMap, rc::Rc};

use indexmap::IndexMap;
use tracing::trace;

use super::{ListState, Node, NodeId, NodeState, NodeType, PinMode, Reach, Shallow};
use crate::{Result, doc::DocumentError, value::Value};

const DEFAULT_SLOT_CAPACITY: usize = 16;
const DEFAULT_SPARE_BUFFERS: usize = 32;

pub(crate) fn type_mismatch(path: &str, expected: &str, actual: NodeType) -> crate::Error {
    DocumentError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: actual.name().to_string(),
    }
    .into()
}

fn invalid_structure(id: NodeId, reason: &str) -> crate::Error {
    DocumentError::InvalidStructure {
        node: id.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

fn stale(id: NodeId) -> crate::Error {
    DocumentError::StaleHandle {
        node: id.to_string(),
    }
    .into()
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slot table holding every node of one document tree.
///
/// Freed slots and the child collections of freed nodes go to free lists and
/// are handed out again by later allocations. [`NodeArena::reset`] frees the
/// whole tree at once while keeping those buffers, which is what makes a
/// recycled arena cheap to refill.
///
/// The read methods are public so custom [`Matcher`](crate::locator::Matcher)s
/// can walk a tree; structural mutation stays inside the crate apart from
/// [`create_object`](Self::create_object) and [`attach`](Self::attach), which
/// write hooks need to build intermediate nodes.
#[derive(Debug)]
pub struct NodeArena {
    pin: PinMode,
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    spare_maps: Vec<IndexMap<String, NodeId>>,
    spare_members: Vec<Vec<NodeId>>,
    max_spare_buffers: usize,
    live: usize,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::pinned()
    }
}

impl NodeArena {
    /// Creates an arena for a pinned document.
    pub fn pinned() -> Self {
        Self::with_capacity(PinMode::Pinned, DEFAULT_SLOT_CAPACITY, DEFAULT_SPARE_BUFFERS)
    }

    pub(crate) fn with_capacity(pin: PinMode, slot_capacity: usize, max_spare_buffers: usize) -> Self {
        Self {
            pin,
            slots: Vec::with_capacity(slot_capacity),
            free_slots: Vec::new(),
            spare_maps: Vec::new(),
            spare_members: Vec::new(),
            max_spare_buffers,
            live: 0,
        }
    }

    pub fn pin_mode(&self) -> PinMode {
        self.pin
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if `id` names a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(|| stale(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| stale(id))
    }

    // === Allocation ===

    fn alloc(&mut self, name: &str, state: NodeState) -> NodeId {
        let node = Node {
            name: name.to_string(),
            parent: None,
            revision: 0,
            state,
        };
        self.live += 1;
        if let Some(index) = self.free_slots.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId::new(index, 0)
        }
    }

    /// Allocates a detached, empty object node.
    pub fn create_object(&mut self, name: &str) -> NodeId {
        let children = self.spare_maps.pop().unwrap_or_default();
        self.alloc(name, NodeState::Object(children))
    }

    /// Allocates a detached value node.
    pub fn create_value(&mut self, name: &str, value: Value) -> NodeId {
        self.alloc(name, NodeState::Value(value))
    }

    pub(crate) fn member_buffer(&mut self) -> Vec<NodeId> {
        self.spare_members.pop().unwrap_or_default()
    }

    fn recycle_map(&mut self, mut children: IndexMap<String, NodeId>) {
        if self.spare_maps.len() < self.max_spare_buffers {
            children.clear();
            self.spare_maps.push(children);
        }
    }

    fn recycle_members(&mut self, mut members: Vec<NodeId>) {
        if self.spare_members.len() < self.max_spare_buffers {
            members.clear();
            self.spare_members.push(members);
        }
    }

    /// Removes a single node from its slot without touching its descendants.
    fn take(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(id.index() as u32);
        self.live -= 1;
        Some(node)
    }

    /// Frees `id` and every node below it. Stale ids are ignored.
    pub(crate) fn free(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(node) = self.take(next) else {
                continue;
            };
            match node.state {
                NodeState::Value(_) => {}
                NodeState::Object(children) => {
                    pending.extend(children.values().copied());
                    self.recycle_map(children);
                }
                NodeState::List(list) => {
                    pending.push(list.template);
                    pending.extend(list.members.iter().copied());
                    self.recycle_members(list.members);
                }
            }
        }
    }

    /// Frees every node while keeping slot storage and spare buffers.
    ///
    /// Slot generations keep counting up across resets, so ids handed out
    /// before the reset stay stale afterwards.
    pub(crate) fn reset(&mut self) {
        for index in 0..self.slots.len() {
            let taken = {
                let slot = &mut self.slots[index];
                let node = slot.node.take();
                if node.is_some() {
                    slot.generation = slot.generation.wrapping_add(1);
                }
                node
            };
            if let Some(node) = taken {
                match node.state {
                    NodeState::Value(_) => {}
                    NodeState::Object(children) => self.recycle_map(children),
                    NodeState::List(list) => self.recycle_members(list.members),
                }
            }
        }
        self.free_slots.clear();
        self.free_slots.extend((0..self.slots.len() as u32).rev());
        self.live = 0;
    }

    // === Reads ===

    pub fn node_type(&self, id: NodeId) -> Result<NodeType> {
        Ok(self.node(id)?.state.node_type())
    }

    pub fn name(&self, id: NodeId) -> Result<&str> {
        Ok(&self.node(id)?.name)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Change counter of a node; bumped whenever it or a descendant changes.
    pub fn revision(&self, id: NodeId) -> Result<u64> {
        Ok(self.node(id)?.revision)
    }

    pub fn value(&self, id: NodeId) -> Result<&Value> {
        let node = self.node(id)?;
        match &node.state {
            NodeState::Value(value) => Ok(value),
            other => Err(type_mismatch(&node.name, "value", other.node_type())),
        }
    }

    /// Looks up a named child. Non-object nodes have no children.
    pub fn child(&self, id: NodeId, name: &str) -> Result<Option<NodeId>> {
        match &self.node(id)?.state {
            NodeState::Object(children) => Ok(children.get(name).copied()),
            _ => Ok(None),
        }
    }

    /// Fields of an object in insertion order.
    pub fn fields(&self, id: NodeId) -> Result<Vec<(&str, NodeId)>> {
        let node = self.node(id)?;
        match &node.state {
            NodeState::Object(children) => Ok(children
                .iter()
                .map(|(name, child)| (name.as_str(), *child))
                .collect()),
            other => Err(type_mismatch(&node.name, "object", other.node_type())),
        }
    }

    pub(crate) fn list_state(&self, id: NodeId) -> Result<&ListState> {
        let node = self.node(id)?;
        match &node.state {
            NodeState::List(list) => Ok(list),
            other => Err(type_mismatch(&node.name, "list", other.node_type())),
        }
    }

    fn list_state_mut(&mut self, id: NodeId) -> Result<&mut ListState> {
        let node = self.node_mut(id)?;
        match &mut node.state {
            NodeState::List(list) => Ok(list),
            other => Err(type_mismatch(&node.name, "list", other.node_type())),
        }
    }

    /// Member roots of a list, in order.
    pub fn members(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.list_state(id)?.members)
    }

    /// Template root of a list.
    pub fn template(&self, id: NodeId) -> Result<NodeId> {
        Ok(self.list_state(id)?.template)
    }

    /// Roots a list routes a name segment through: every member, preceded by
    /// the template when `reach` is [`Reach::Shape`].
    pub fn fan_out(&self, id: NodeId, reach: Reach) -> Result<Vec<NodeId>> {
        let list = self.list_state(id)?;
        let mut roots = Vec::with_capacity(list.members.len() + 1);
        if reach == Reach::Shape {
            roots.push(list.template);
        }
        roots.extend_from_slice(&list.members);
        Ok(roots)
    }

    /// Walks parent links up to the top-most ancestor.
    pub fn top(&self, id: NodeId) -> Result<NodeId> {
        let mut at = id;
        while let Some(parent) = self.node(at)?.parent {
            at = parent;
        }
        Ok(at)
    }

    /// Returns true if `id` is a list template or lies beneath one.
    pub fn in_template(&self, id: NodeId) -> Result<bool> {
        let mut at = id;
        while let Some(parent) = self.node(at)?.parent {
            if let NodeState::List(list) = &self.node(parent)?.state
                && list.template == at
            {
                return Ok(true);
            }
            at = parent;
        }
        Ok(false)
    }

    /// The anonymous child of a single-value object, if it is one.
    pub fn anonymous_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        match &self.node(id)?.state {
            NodeState::Object(children) if children.len() == 1 => Ok(children.get("").copied()),
            _ => Ok(None),
        }
    }

    /// Returns true if this node or any descendant holds a non-null scalar.
    pub fn contains_data(&self, id: NodeId) -> Result<bool> {
        let mut pending = vec![id];
        while let Some(at) = pending.pop() {
            match &self.node(at)?.state {
                NodeState::Value(value) => {
                    if !value.is_null() {
                        return Ok(true);
                    }
                }
                NodeState::Object(children) => pending.extend(children.values().copied()),
                NodeState::List(list) => pending.extend(list.members.iter().copied()),
            }
        }
        Ok(false)
    }

    pub(crate) fn shallow(&self, id: NodeId) -> Result<Shallow> {
        Ok(match &self.node(id)?.state {
            NodeState::Value(value) => Shallow::Value(value.clone()),
            NodeState::Object(children) => Shallow::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), *child))
                    .collect(),
            ),
            NodeState::List(list) => Shallow::List {
                template: list.template,
                members: list.members.clone(),
            },
        })
    }

    // === Mutation ===

    /// Bumps the revision of `id` and every ancestor, dropping cached list
    /// views on the way up.
    pub(crate) fn changed(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(at) = current {
            let Ok(node) = self.node_mut(at) else {
                break;
            };
            node.revision += 1;
            if let NodeState::List(list) = &mut node.state {
                list.view = None;
            }
            current = node.parent;
        }
    }

    /// Adds `child` to the object `parent` under the child's own name,
    /// replacing (and freeing) any field already using that name. The field
    /// keeps its position when replaced.
    ///
    /// Anything attached beneath a list template is stripped of data.
    ///
    /// `child` must be detached (or already the field of `parent`) and must
    /// not be `parent` or one of its ancestors.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let kind = self.node_type(parent)?;
        if kind != NodeType::Object {
            return Err(type_mismatch(self.name(parent)?, "object", kind));
        }
        let node = self.node(child)?;
        let name = node.name.clone();
        if let Some(owner) = node.parent
            && (owner != parent || self.child(parent, &name)? != Some(child))
        {
            return Err(invalid_structure(child, "node already has a parent"));
        }
        let mut at = Some(parent);
        while let Some(ancestor) = at {
            if ancestor == child {
                return Err(invalid_structure(child, "node would become its own ancestor"));
            }
            at = self.node(ancestor)?.parent;
        }
        let strip = self.in_template(parent)?;
        let previous = match &mut self.node_mut(parent)?.state {
            NodeState::Object(children) => children.insert(name, child),
            _ => None,
        };
        if let Some(previous) = previous
            && previous != child
        {
            self.free(previous);
        }
        self.node_mut(child)?.parent = Some(parent);
        if strip {
            self.strip(child)?;
        }
        self.changed(parent);
        Ok(())
    }

    /// Replaces a scalar in place.
    pub(crate) fn set_value(&mut self, id: NodeId, value: Value) -> Result<()> {
        let node = self.node_mut(id)?;
        match &mut node.state {
            NodeState::Value(slot) => *slot = value,
            other => {
                let actual = other.node_type();
                return Err(type_mismatch(&node.name, "value", actual));
            }
        }
        self.changed(id);
        Ok(())
    }

    /// Removes the field `name` from an object. Returns false if absent.
    pub(crate) fn detach_child(&mut self, parent: NodeId, name: &str) -> Result<bool> {
        let removed = match &mut self.node_mut(parent)?.state {
            NodeState::Object(children) => children.shift_remove(name),
            _ => None,
        };
        let Some(removed) = removed else {
            return Ok(false);
        };
        self.free(removed);
        self.changed(parent);
        Ok(true)
    }

    /// Renames an object field, keeping its position. A sibling already
    /// using `name` is freed. Returns false if the name was unchanged.
    pub(crate) fn rename(&mut self, id: NodeId, name: &str) -> Result<bool> {
        let Some(parent) = self.parent(id)? else {
            return Err(invalid_structure(id, "a detached node has no field to rename"));
        };
        let old = self.node(id)?.name.clone();
        if old == name {
            return Ok(false);
        }
        let NodeState::Object(children) = &mut self.node_mut(parent)?.state else {
            return Err(invalid_structure(id, "list members are unnamed"));
        };
        let displaced = children.shift_remove(name);
        let Some(index) = children.get_index_of(old.as_str()) else {
            return Err(stale(id));
        };
        children.shift_remove_index(index);
        children.shift_insert(index, name.to_string(), id);
        if let Some(displaced) = displaced {
            self.free(displaced);
        }
        self.node_mut(id)?.name = name.to_string();
        self.changed(parent);
        Ok(true)
    }

    /// Removes every field of an object, returning how many were removed.
    pub(crate) fn clear_fields(&mut self, id: NodeId) -> Result<usize> {
        let kind = self.node_type(id)?;
        if kind != NodeType::Object {
            return Err(type_mismatch(self.name(id)?, "object", kind));
        }
        let fresh = self.spare_maps.pop().unwrap_or_default();
        let old = match &mut self.node_mut(id)?.state {
            NodeState::Object(children) => std::mem::replace(children, fresh),
            _ => IndexMap::new(),
        };
        let count = old.len();
        for child in old.values() {
            self.free(*child);
        }
        self.recycle_map(old);
        self.changed(id);
        Ok(count)
    }

    /// Moves the state of the detached node `source` into `target`, keeping
    /// the target's name, parent and id. The target's previous content is
    /// freed.
    pub(crate) fn overwrite(&mut self, target: NodeId, source: NodeId) -> Result<()> {
        if target == source {
            return Ok(());
        }
        self.node(target)?;
        let incoming = self.take(source).ok_or_else(|| stale(source))?;
        let previous = std::mem::replace(&mut self.node_mut(target)?.state, incoming.state);
        match previous {
            NodeState::Value(_) => {}
            NodeState::Object(children) => {
                for child in children.values() {
                    self.free(*child);
                }
                self.recycle_map(children);
            }
            NodeState::List(list) => {
                self.free(list.template);
                for member in &list.members {
                    self.free(*member);
                }
                self.recycle_members(list.members);
            }
        }
        let adopted: Vec<NodeId> = match &self.node(target)?.state {
            NodeState::Value(_) => Vec::new(),
            NodeState::Object(children) => children.values().copied().collect(),
            NodeState::List(list) => std::iter::once(list.template)
                .chain(list.members.iter().copied())
                .collect(),
        };
        for child in adopted {
            self.node_mut(child)?.parent = Some(target);
        }
        if self.in_template(target)? {
            self.strip(target)?;
        }
        self.changed(target);
        Ok(())
    }

    /// Clears data below `id` without signalling a change: values become
    /// null, objects keep their field names, lists drop their members.
    fn strip(&mut self, id: NodeId) -> Result<()> {
        let mut pending = vec![id];
        while let Some(at) = pending.pop() {
            let mut dropped = None;
            match &mut self.node_mut(at)?.state {
                NodeState::Value(value) => *value = Value::Null,
                NodeState::Object(children) => pending.extend(children.values().copied()),
                NodeState::List(list) => {
                    list.view = None;
                    dropped = Some(std::mem::take(&mut list.members));
                }
            }
            if let Some(members) = dropped {
                for member in &members {
                    self.free(*member);
                }
                self.recycle_members(members);
            }
        }
        Ok(())
    }

    /// Clears all data below `id` and signals the change.
    pub(crate) fn clear_data(&mut self, id: NodeId) -> Result<()> {
        self.strip(id)?;
        self.changed(id);
        Ok(())
    }

    /// Deep-copies a subtree into this arena, from `source` or, when `None`,
    /// from this arena itself. The copy is detached and named `name`.
    ///
    /// Children are copied before their parents off an explicit stack, so
    /// the depth of the subtree is not limited by the call stack.
    pub(crate) fn import(
        &mut self,
        source: Option<&NodeArena>,
        id: NodeId,
        name: &str,
    ) -> Result<NodeId> {
        enum Frame {
            Visit(NodeId, String),
            Build(NodeId, String, Shallow),
        }

        fn take(copies: &mut HashMap<NodeId, NodeId>, original: NodeId) -> Result<NodeId> {
            copies.remove(&original).ok_or_else(|| stale(original))
        }

        let mut copies = HashMap::new();
        let mut pending = vec![Frame::Visit(id, name.to_string())];
        while let Some(frame) = pending.pop() {
            match frame {
                Frame::Visit(at, name) => {
                    let shallow = match source {
                        Some(arena) => arena.shallow(at)?,
                        None => self.shallow(at)?,
                    };
                    let children: Vec<Frame> = match &shallow {
                        Shallow::Value(_) => Vec::new(),
                        Shallow::Object(fields) => fields
                            .iter()
                            .map(|(field, child)| Frame::Visit(*child, field.clone()))
                            .collect(),
                        Shallow::List { template, members } => std::iter::once(template)
                            .chain(members)
                            .map(|root| Frame::Visit(*root, String::new()))
                            .collect(),
                    };
                    pending.push(Frame::Build(at, name, shallow));
                    pending.extend(children);
                }
                Frame::Build(at, name, shallow) => {
                    let copy = match shallow {
                        Shallow::Value(value) => self.create_value(&name, value),
                        Shallow::Object(fields) => {
                            let copy = self.create_object(&name);
                            for (field, child) in fields {
                                let child_copy = take(&mut copies, child)?;
                                self.node_mut(child_copy)?.parent = Some(copy);
                                if let NodeState::Object(children) = &mut self.node_mut(copy)?.state {
                                    children.insert(field, child_copy);
                                }
                            }
                            copy
                        }
                        Shallow::List { template, members } => {
                            let template_copy = take(&mut copies, template)?;
                            let mut member_copies = self.member_buffer();
                            for member in members {
                                member_copies.push(take(&mut copies, member)?);
                            }
                            self.assemble_list(&name, template_copy, member_copies)?
                        }
                    };
                    copies.insert(at, copy);
                }
            }
        }
        take(&mut copies, id)
    }

    fn assemble_list(
        &mut self,
        name: &str,
        template: NodeId,
        members: Vec<NodeId>,
    ) -> Result<NodeId> {
        let count = members.len();
        let list = self.alloc(
            name,
            NodeState::List(ListState {
                members,
                template,
                view: None,
            }),
        );
        self.node_mut(template)?.parent = Some(list);
        for index in 0..count {
            let member = self.list_state(list)?.members[index];
            let node = self.node_mut(member)?;
            node.parent = Some(list);
            node.name.clear();
        }
        Ok(list)
    }

    /// Builds a detached list from member roots already in this arena.
    ///
    /// With no members the template is an empty object. Otherwise the
    /// template is a data-free copy of the first member, and a lone member
    /// is only kept when it carries data.
    pub(crate) fn build_list(&mut self, name: &str, mut members: Vec<NodeId>) -> Result<NodeId> {
        let template = match members.first().copied() {
            None => self.create_object(""),
            Some(first) => {
                let template = self.import(None, first, "")?;
                self.strip(template)?;
                if members.len() == 1 && !self.contains_data(first)? {
                    members.clear();
                    self.free(first);
                }
                template
            }
        };
        self.assemble_list(name, template, members)
    }

    /// Copies the template of `list` as a new detached member root.
    pub(crate) fn instantiate_template(&mut self, list: NodeId) -> Result<NodeId> {
        let template = self.template(list)?;
        self.import(None, template, "")
    }

    /// Appends a detached member root. The first member of an empty list
    /// becomes the model for its template.
    pub(crate) fn push_member(&mut self, list: NodeId, member: NodeId) -> Result<()> {
        self.node(member)?;
        let state = self.list_state_mut(list)?;
        let first = state.members.is_empty();
        state.members.push(member);
        let node = self.node_mut(member)?;
        node.parent = Some(list);
        node.name.clear();
        if first {
            self.derive_template(list, member)?;
        }
        self.changed(list);
        Ok(())
    }

    fn derive_template(&mut self, list: NodeId, model: NodeId) -> Result<()> {
        let template = self.import(None, model, "")?;
        self.strip(template)?;
        self.node_mut(template)?.parent = Some(list);
        let previous = std::mem::replace(&mut self.list_state_mut(list)?.template, template);
        self.free(previous);
        trace!(list = %list, template = %template, "derived list template from first member");
        Ok(())
    }

    /// Swaps member `old` for the detached member root `new`.
    pub(crate) fn replace_member(&mut self, list: NodeId, old: NodeId, new: NodeId) -> Result<()> {
        let state = self.list_state_mut(list)?;
        let Some(position) = state.members.iter().position(|member| *member == old) else {
            return Err(stale(old));
        };
        state.members[position] = new;
        let node = self.node_mut(new)?;
        node.parent = Some(list);
        node.name.clear();
        self.free(old);
        self.changed(list);
        Ok(())
    }

    /// Removes one member. Returns false if it is not a member of `list`.
    pub(crate) fn remove_member(&mut self, list: NodeId, member: NodeId) -> Result<bool> {
        let state = self.list_state_mut(list)?;
        let Some(position) = state.members.iter().position(|m| *m == member) else {
            return Ok(false);
        };
        state.members.remove(position);
        self.free(member);
        self.changed(list);
        Ok(true)
    }

    /// Keeps the members whose index satisfies `keep`, frees the rest and
    /// renumbers. Returns the number removed.
    pub(crate) fn retain_members(
        &mut self,
        list: NodeId,
        keep: impl Fn(usize) -> bool,
    ) -> Result<usize> {
        let kept = self.member_buffer();
        let members = std::mem::replace(&mut self.list_state_mut(list)?.members, kept);
        let mut removed = Vec::new();
        {
            let state = self.list_state_mut(list)?;
            for (index, member) in members.iter().copied().enumerate() {
                if keep(index) {
                    state.members.push(member);
                } else {
                    removed.push(member);
                }
            }
        }
        self.recycle_members(members);
        for member in &removed {
            self.free(*member);
        }
        self.changed(list);
        Ok(removed.len())
    }

    /// Snapshot of a list's members, shared until the list next changes.
    pub(crate) fn list_view(&mut self, list: NodeId) -> Result<Rc<[NodeId]>> {
        let state = self.list_state_mut(list)?;
        if let Some(view) = &state.view {
            return Ok(Rc::clone(view));
        }
        let view: Rc<[NodeId]> = Rc::from(state.members.as_slice());
        state.view = Some(Rc::clone(&view));
        Ok(view)
    }
}
