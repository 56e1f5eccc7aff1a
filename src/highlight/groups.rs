//! Group membership of wrappers.

use std::collections::{HashMap, HashSet};

use crate::dom::{ArenaDom, NodeId};

use super::HighlightOptions;

/// Ordered, duplicate-free set of note ids.
///
/// Insertion order matters: a click selects the first group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSet(Vec<String>);

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id`. Returns false when it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.0.push(id.to_string());
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|g| g == id)
    }

    /// True when at least one id is in both sets.
    pub fn shares(&self, other: &GroupSet) -> bool {
        self.0.iter().any(|g| other.contains(g))
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space-joined form used in the rendered tree.
    pub fn to_attr_value(&self) -> String {
        self.0.join(" ")
    }

    pub fn from_attr_value(value: &str) -> Self {
        let mut set = Self::new();
        for id in value.split_whitespace() {
            set.insert(id);
        }
        set
    }
}

/// The container inserted as sole child of a target element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    /// The target element holding the wrapper.
    pub element: NodeId,
    pub groups: GroupSet,
    pub events_attached: bool,
}

/// Wrapper registry of one rendered passage, keyed by wrapper node.
///
/// This is the authoritative membership model. The tree only ever receives a
/// projection of it (classes and data attributes).
#[derive(Debug, Clone, Default)]
pub struct Highlights {
    pub(super) wrappers: HashMap<NodeId, Wrapper>,
    pub(super) active: HashSet<NodeId>,
    pub(super) current: Option<String>,
}

impl Highlights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, wrapper: NodeId) -> Option<&Wrapper> {
        self.wrappers.get(&wrapper)
    }

    pub fn is_wrapper(&self, node: NodeId) -> bool {
        self.wrappers.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }

    /// Groups of a wrapper, empty for unknown nodes.
    pub fn groups(&self, wrapper: NodeId) -> &[String] {
        self.wrappers
            .get(&wrapper)
            .map(|w| w.groups.0.as_slice())
            .unwrap_or(&[])
    }

    /// Wrappers whose groups include `note_id`, in document order.
    pub fn members(&self, dom: &ArenaDom, note_id: &str) -> Vec<NodeId> {
        dom.descendants(dom.document())
            .filter(|node| {
                self.wrappers
                    .get(node)
                    .is_some_and(|w| w.groups.contains(note_id))
            })
            .collect()
    }

    /// Nearest wrapper at or above `node`.
    pub fn closest_wrapper(&self, dom: &ArenaDom, node: NodeId) -> Option<NodeId> {
        dom.closest(node, |id| self.wrappers.contains_key(&id))
    }

    pub(super) fn insert(&mut self, wrapper: NodeId, element: NodeId) {
        self.wrappers.entry(wrapper).or_insert(Wrapper {
            element,
            groups: GroupSet::new(),
            events_attached: false,
        });
    }

    /// Register a wrapper already present in the tree, reading its groups
    /// back from the rendered attributes.
    pub(super) fn adopt(&mut self, dom: &ArenaDom, wrapper: NodeId, opts: &HighlightOptions) {
        if self.wrappers.contains_key(&wrapper) {
            return;
        }
        let groups = GroupSet::from_attr_value(dom.get_attr(wrapper, &opts.groups_attr).unwrap_or_default());
        let events_attached = dom.has_attr(wrapper, &opts.events_attr);
        let element = dom.parent(wrapper).unwrap_or(NodeId::NONE);
        tracing::trace!(?wrapper, groups = %groups.to_attr_value(), "adopted existing wrapper");
        self.wrappers.insert(
            wrapper,
            Wrapper {
                element,
                groups,
                events_attached,
            },
        );
    }

    pub(super) fn wrapper_mut(&mut self, wrapper: NodeId) -> Option<&mut Wrapper> {
        self.wrappers.get_mut(&wrapper)
    }
}
