//! Tree entries
//!
//! The top level of a metadata tree maps each name to either a plain field
//! or a [`Group`] holding the dotted children (`Spatial.Scale` lives in
//! group `Spatial` under key `Scale`). A group whose own name is also a
//! field, such as `Distance` next to `Distance.Notes`, carries a value
//! slot besides its children.

use crate::types::value::AvmValue;
use std::collections::BTreeMap;

/// A top-level tree entry
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A field without children; `None` when unset
    Field(Option<AvmValue>),
    /// A group of dotted children
    Group(Group),
}

/// Children sharing a dotted prefix, with an optional value slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub(crate) carries_value: bool,
    pub(crate) value: Option<AvmValue>,
    pub(crate) children: BTreeMap<String, Option<AvmValue>>,
}

impl Group {
    /// Value of the group itself, when it has one
    pub fn value(&self) -> Option<&AvmValue> {
        self.value.as_ref()
    }

    /// Whether the group has a value slot of its own
    pub fn carries_value(&self) -> bool {
        self.carries_value
    }

    /// Value of a child
    pub fn child(&self, key: &str) -> Option<&AvmValue> {
        self.children.get(key).and_then(Option::as_ref)
    }

    /// Keys of all children, set or not
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Children that hold a value
    pub fn children(&self) -> impl Iterator<Item = (&str, &AvmValue)> {
        self.children
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|value| (key.as_str(), value)))
    }

    /// Whether neither the group value nor any child is set
    pub fn is_unset(&self) -> bool {
        self.value.is_none() && self.children.values().all(Option::is_none)
    }
}
