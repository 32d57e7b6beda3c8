//! Canonical text encoding of node trees.
//!
//! Objects encode as `{"name":value,...}`, lists as `[...]` and scalars as
//! JSON literals. An object whose only field is anonymous encodes as that
//! field's bare value. With `sequential` set, object fields are ordered by
//! case-insensitive name and then by exact name, at every level, which makes
//! the output independent of insertion order.

use std::cmp::Ordering;

use indexmap::IndexMap;

use super::{NodeArena, NodeId, NodeState};
use crate::{Result, value::Value};

/// Canonical field order: case-insensitive first, exact name as tie-break.
pub(crate) fn canonical_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn ordered(children: &IndexMap<String, NodeId>, sequential: bool) -> Vec<(&str, NodeId)> {
    let mut fields: Vec<(&str, NodeId)> = children
        .iter()
        .map(|(name, child)| (name.as_str(), *child))
        .collect();
    if sequential {
        fields.sort_by(|(a, _), (b, _)| canonical_order(a, b));
    }
    fields
}

fn single_anonymous(children: &IndexMap<String, NodeId>) -> Option<NodeId> {
    if children.len() == 1 {
        children.get("").copied()
    } else {
        None
    }
}

/// Appends `s` as a quoted JSON string.
pub(crate) fn write_string(s: &str, out: &mut String) {
    out.push('"');
    let mut last = 0;
    for (i, ch) in s.char_indices() {
        let escaped = match ch {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{0008}' => "\\b",
            '\u{000C}' => "\\f",
            c if u32::from(c) < 0x20 => {
                out.push_str(&s[last..i]);
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
                last = i + c.len_utf8();
                continue;
            }
            _ => continue,
        };
        out.push_str(&s[last..i]);
        out.push_str(escaped);
        last = i + ch.len_utf8();
    }
    out.push_str(&s[last..]);
    out.push('"');
}

pub(crate) fn write_scalar(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(number) => out.push_str(&number.to_string()),
            None => out.push_str("null"),
        },
        Value::Text(s) => write_string(s, out),
    }
}

impl NodeArena {
    /// Encodes the subtree rooted at `id`.
    pub fn encode(&self, id: NodeId, sequential: bool) -> Result<String> {
        let mut out = String::new();
        self.write_body(id, sequential, &mut out)?;
        Ok(out)
    }

    /// Encodes only names and shape: named leaves become `"name"`, an
    /// anonymous leaf becomes `value`, and lists show their template.
    pub fn encode_schema(&self, id: NodeId, sequential: bool) -> Result<String> {
        let mut out = String::new();
        self.write_schema(id, sequential, &mut out)?;
        Ok(out)
    }

    /// Converts the subtree rooted at `id` to JSON, keeping field order.
    pub fn to_json(&self, id: NodeId) -> Result<serde_json::Value> {
        Ok(match &self.node(id)?.state {
            NodeState::Value(value) => value.to_json(),
            NodeState::Object(children) => {
                if let Some(only) = single_anonymous(children) {
                    return self.to_json(only);
                }
                let mut map = serde_json::Map::with_capacity(children.len());
                for (name, child) in children {
                    map.insert(name.clone(), self.to_json(*child)?);
                }
                serde_json::Value::Object(map)
            }
            NodeState::List(list) => serde_json::Value::Array(
                list.members
                    .iter()
                    .map(|member| self.to_json(*member))
                    .collect::<Result<_>>()?,
            ),
        })
    }

    fn write_body(&self, id: NodeId, sequential: bool, out: &mut String) -> Result<()> {
        let mut pending = vec![Piece::Node(id)];
        while let Some(piece) = pending.pop() {
            let at = match piece {
                Piece::Node(at) => at,
                other => {
                    other.write(out);
                    continue;
                }
            };
            match &self.node(at)?.state {
                NodeState::Value(value) => write_scalar(value, out),
                NodeState::Object(children) => {
                    if let Some(only) = single_anonymous(children) {
                        pending.push(Piece::Node(only));
                        continue;
                    }
                    out.push('{');
                    pending.push(Piece::Text("}"));
                    let fields = ordered(children, sequential);
                    for (i, (name, child)) in fields.into_iter().enumerate().rev() {
                        pending.push(Piece::Node(child));
                        pending.push(Piece::Text(":"));
                        pending.push(Piece::Name(name));
                        if i > 0 {
                            pending.push(Piece::Text(","));
                        }
                    }
                }
                NodeState::List(list) => {
                    out.push('[');
                    pending.push(Piece::Text("]"));
                    for (i, member) in list.members.iter().enumerate().rev() {
                        pending.push(Piece::Node(*member));
                        if i > 0 {
                            pending.push(Piece::Text(","));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn write_schema(&self, id: NodeId, sequential: bool, out: &mut String) -> Result<()> {
        let mut pending = vec![Piece::Node(id)];
        while let Some(piece) = pending.pop() {
            let at = match piece {
                Piece::Node(at) => at,
                other => {
                    other.write(out);
                    continue;
                }
            };
            match &self.node(at)?.state {
                NodeState::Value(_) => out.push_str("value"),
                NodeState::Object(children) => {
                    if let Some(only) = single_anonymous(children) {
                        pending.push(Piece::Node(only));
                        continue;
                    }
                    out.push('{');
                    pending.push(Piece::Text("}"));
                    let fields = ordered(children, sequential);
                    for (i, (name, child)) in fields.into_iter().enumerate().rev() {
                        if !matches!(self.node(child)?.state, NodeState::Value(_)) {
                            pending.push(Piece::Node(child));
                            pending.push(Piece::Text(":"));
                        }
                        pending.push(Piece::Name(name));
                        if i > 0 {
                            pending.push(Piece::Text(","));
                        }
                    }
                }
                NodeState::List(list) => {
                    out.push('[');
                    pending.push(Piece::Text("]"));
                    pending.push(Piece::Node(list.template));
                }
            }
        }
        Ok(())
    }
}

/// Pending output of the encoders, consumed from the back.
enum Piece<'a> {
    Node(NodeId),
    Name(&'a str),
    Text(&'static str),
}

impl Piece<'_> {
    fn write(&self, out: &mut String) {
        match self {
            Piece::Node(_) => {}
            Piece::Name(name) => write_string(name, out),
            Piece::Text(text) => out.push_str(text),
        }
    }
}
