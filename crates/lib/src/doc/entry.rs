use super::{Document, DocumentList};
use crate::{node::NodeType, value::Value};

/// Result of a path lookup.
#[derive(Debug)]
pub enum Entry<'s> {
    Value(Value),
    Object(Document<'s>),
    List(DocumentList<'s>),
}

impl<'s> Entry<'s> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Entry::Value(_) => NodeType::Value,
            Entry::Object(_) => NodeType::Object,
            Entry::List(_) => NodeType::List,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entry::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document<'s>> {
        match self {
            Entry::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&DocumentList<'s>> {
        match self {
            Entry::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Entry::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Document<'s>> {
        match self {
            Entry::Object(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<DocumentList<'s>> {
        match self {
            Entry::List(list) => Some(list),
            _ => None,
        }
    }
}
