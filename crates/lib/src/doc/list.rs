use std::{iter::FusedIterator, rc::Rc};

use super::{Binding, Document, DocumentError};
use crate::{Result, node::NodeId, value::Value};

/// Ordered, read-only, fixed-size view over the members of a list.
///
/// The view is a snapshot: it is taken from the list's cached member array,
/// which the list drops whenever it changes. Two views taken with no change
/// in between share one array (see [`shares_view`](Self::shares_view)).
/// Members removed after the snapshot was taken surface as
/// [`DocumentError::StaleHandle`] when used.
pub struct DocumentList<'s> {
    binding: Binding<'s>,
    items: Rc<[NodeId]>,
}

impl std::fmt::Debug for DocumentList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'s> DocumentList<'s> {
    pub(crate) fn new(binding: Binding<'s>, list: NodeId) -> Result<Self> {
        let items = binding.tree.borrow_mut().list_view(list)?;
        Ok(Self { binding, items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Document<'s>> {
        self.items
            .get(index)
            .map(|id| self.binding.document(*id))
    }

    pub fn first(&self) -> Option<Document<'s>> {
        self.get(0)
    }

    pub fn last(&self) -> Option<Document<'s>> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    pub fn iter(&self) -> Iter<'_, 's> {
        Iter {
            list: self,
            front: 0,
            back: self.items.len(),
        }
    }

    pub fn to_vec(&self) -> Vec<Document<'s>> {
        self.iter().collect()
    }

    /// Returns true if both views were taken from the same cached snapshot.
    pub fn shares_view(&self, other: &DocumentList<'_>) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    /// Position of the first member equal to `doc`.
    pub fn index_of(&self, doc: &Document<'_>) -> Option<usize> {
        self.iter().position(|member| member == *doc)
    }

    pub fn contains(&self, doc: &Document<'_>) -> bool {
        self.index_of(doc).is_some()
    }

    /// Returns true if the list is non-empty and every member is a
    /// single-value document.
    pub fn item_is_single_value(&self) -> Result<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        for member in self.iter() {
            if !member.is_single_value()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The scalars of a list of single-value documents, or `None` if some
    /// member is not single-value.
    pub fn try_single_values(&self) -> Result<Option<Vec<Value>>> {
        let mut values = Vec::with_capacity(self.len());
        for member in self.iter() {
            if !member.is_single_value()? {
                return Ok(None);
            }
            values.push(member.get_value("")?);
        }
        Ok(Some(values))
    }

    /// Converts every member's scalar.
    pub fn to_values<T>(&self) -> Result<Vec<T>>
    where
        T: for<'v> TryFrom<&'v Value, Error = DocumentError>,
    {
        self.iter().map(|member| member.get_as::<T>("")).collect()
    }

    /// Encodes the snapshot as a list.
    pub fn encode(&self, sequential: bool) -> Result<String> {
        let mut out = String::from("[");
        for (i, member) in self.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&member.encode(sequential)?);
        }
        out.push(']');
        Ok(out)
    }
}

impl<'a, 's> IntoIterator for &'a DocumentList<'s> {
    type Item = Document<'s>;
    type IntoIter = Iter<'a, 's>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the members of a [`DocumentList`].
#[derive(Debug)]
pub struct Iter<'a, 's> {
    list: &'a DocumentList<'s>,
    front: usize,
    back: usize,
}

impl<'s> Iterator for Iter<'_, 's> {
    type Item = Document<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let doc = self.list.get(self.front);
        self.front += 1;
        doc
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Iter<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.list.get(self.back)
    }
}

impl ExactSizeIterator for Iter<'_, '_> {}

impl FusedIterator for Iter<'_, '_> {}
