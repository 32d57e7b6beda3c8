use super::Document;
use crate::{Result, node::NodeArena, node::NodeId, pool::SharedArena, value::Value};

/// Right-hand side of [`Document::set`].
///
/// Built implicitly through `From`: scalars become [`Assign::Value`],
/// document references become [`Assign::Document`], and vectors or arrays
/// become [`Assign::List`].
///
/// ```
/// # use dtree::{Assign, Document, Value};
/// let doc = Document::new();
/// doc.set("n", 1)?;
/// doc.set("tags", vec!["a", "b"])?;
/// doc.set("copy", &doc.clone())?;
/// doc.set("empty", None::<i64>)?;
/// assert_eq!(doc.get_value("empty")?, Value::Null);
/// # Ok::<(), dtree::Error>(())
/// ```
#[derive(Debug)]
pub enum Assign<'a> {
    Value(Value),
    Document(&'a Document<'a>),
    List(Vec<Assign<'a>>),
}

impl Assign<'_> {
    /// Builds a detached node named `name` in `arena`. `own` is the tree
    /// `arena` belongs to; documents from that tree are copied in place.
    pub(crate) fn materialize(
        &self,
        arena: &mut NodeArena,
        name: &str,
        own: &SharedArena,
    ) -> Result<NodeId> {
        match self {
            Assign::Value(value) => Ok(arena.create_value(name, value.clone())),
            Assign::Document(doc) => doc.copy_into(arena, name, own),
            Assign::List(items) => {
                let mut members = arena.member_buffer();
                for item in items {
                    members.push(item.materialize_root(arena, own)?);
                }
                arena.build_list(name, members)
            }
        }
    }

    /// Builds a detached document root: an anonymous object, holding the
    /// value as its anonymous field unless the value is itself a document.
    pub(crate) fn materialize_root(&self, arena: &mut NodeArena, own: &SharedArena) -> Result<NodeId> {
        if let Assign::Document(doc) = self {
            return doc.copy_into(arena, "", own);
        }
        let root = arena.create_object("");
        let child = self.materialize(arena, "", own)?;
        arena.attach(root, child)?;
        Ok(root)
    }
}

impl From<Value> for Assign<'_> {
    fn from(value: Value) -> Self {
        Assign::Value(value)
    }
}

macro_rules! assign_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Assign<'_> {
                fn from(value: $ty) -> Self {
                    Assign::Value(value.into())
                }
            }
        )*
    };
}

assign_scalar!(bool, i64, i32, u32, u64, usize, f64, f32, String, &str);

impl<'a, 's: 'a> From<&'a Document<'s>> for Assign<'a> {
    fn from(doc: &'a Document<'s>) -> Self {
        Assign::Document(doc)
    }
}

impl<'a, 's: 'a> From<&'a [Document<'s>]> for Assign<'a> {
    fn from(docs: &'a [Document<'s>]) -> Self {
        Assign::List(docs.iter().map(Assign::from).collect())
    }
}

impl<'a, T: Into<Assign<'a>>> From<Option<T>> for Assign<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Assign::Value(Value::Null), Into::into)
    }
}

impl<'a, T: Into<Assign<'a>>> From<Vec<T>> for Assign<'a> {
    fn from(items: Vec<T>) -> Self {
        Assign::List(items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: Into<Assign<'a>>, const N: usize> From<[T; N]> for Assign<'a> {
    fn from(items: [T; N]) -> Self {
        Assign::List(items.into_iter().map(Into::into).collect())
    }
}
