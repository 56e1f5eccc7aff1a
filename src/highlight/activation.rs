//! Which wrappers are lit.
//!
//! Two states exist. *Active* follows the pointer; *current* is the note
//! selected by navigation and stays lit while the pointer moves around.
//! Every operation recomputes the active set from group membership, so
//! repeated calls never accumulate state.

use std::collections::HashSet;

use crate::dom::{ArenaDom, NodeId};

use super::{HighlightOptions, Highlights};

/// Activation operations over a passage's [`Highlights`].
pub struct ActivationController<'h> {
    highlights: &'h mut Highlights,
}

impl Highlights {
    pub fn activation(&mut self) -> ActivationController<'_> {
        ActivationController { highlights: self }
    }

    pub fn is_active(&self, wrapper: NodeId) -> bool {
        self.active.contains(&wrapper)
    }

    /// Id of the current note, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_current(&self, wrapper: NodeId) -> bool {
        self.current.as_deref().is_some_and(|id| {
            self.wrappers
                .get(&wrapper)
                .is_some_and(|w| w.groups.contains(id))
        })
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn current_members(&self) -> HashSet<NodeId> {
        match self.current.as_deref() {
            Some(id) => self
                .wrappers
                .iter()
                .filter(|(_, w)| w.groups.contains(id))
                .map(|(&node, _)| node)
                .collect(),
            None => HashSet::new(),
        }
    }
}

impl ActivationController<'_> {
    /// Light every wrapper sharing a group with `reference`, plus the
    /// current note's wrappers. Only direct sharing counts: two wrappers that
    /// each share a group with a third but not with each other are not lit
    /// through it.
    ///
    /// Returns the size of the active set.
    pub fn activate_sharing(&mut self, reference: NodeId) -> usize {
        let h = &mut *self.highlights;
        let mut active = h.current_members();

        if let Some(groups) = h.wrappers.get(&reference).map(|w| &w.groups) {
            active.extend(
                h.wrappers
                    .iter()
                    .filter(|(_, w)| w.groups.shares(groups))
                    .map(|(&node, _)| node),
            );
        }

        tracing::trace!(?reference, active = active.len(), "activated sharing wrappers");
        h.active = active;
        h.active.len()
    }

    /// Turn off pointer activation. The current note's wrappers stay lit.
    pub fn deactivate_all(&mut self) -> usize {
        let h = &mut *self.highlights;
        h.active = h.current_members();
        h.active.len()
    }

    /// Make `note_id` the current note.
    ///
    /// Any previous current note is cleared first. Returns the first wrapper
    /// of the note in document order, the one to scroll into view, or `None`
    /// when no wrapper carries the note.
    pub fn set_current(&mut self, dom: &ArenaDom, note_id: &str) -> Option<NodeId> {
        let h = &mut *self.highlights;
        h.current = Some(note_id.to_string());
        h.active = h.current_members();

        let first = h.members(dom, note_id).into_iter().next();
        if first.is_none() {
            tracing::debug!(note_id, "current note has no wrapper in this passage");
        }
        first
    }

    pub fn clear_current(&mut self) {
        let h = &mut *self.highlights;
        if let Some(previous) = h.current.take() {
            h.active.retain(|node| {
                h.wrappers
                    .get(node)
                    .is_some_and(|w| !w.groups.contains(&previous))
            });
        }
    }

    /// Project active and current state onto the tree as classes.
    pub fn sync(&self, dom: &mut ArenaDom, opts: &HighlightOptions) {
        let h = &*self.highlights;
        let current = h.current_members();
        for &node in h.wrappers.keys() {
            if h.active.contains(&node) {
                dom.add_class(node, &opts.active_class);
            } else {
                dom.remove_class(node, &opts.active_class);
            }
            if current.contains(&node) {
                dom.add_class(node, &opts.current_class);
            } else {
                dom.remove_class(node, &opts.current_class);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::GroupSet;

    /// Four sibling wrappers with groups {a}, {a, b}, {b} and {c}.
    fn setup() -> (ArenaDom, Highlights, Vec<NodeId>) {
        let mut dom = ArenaDom::new();
        let root = dom.create_html_element("div", vec![]);
        dom.append(dom.document(), root);

        let mut highlights = Highlights::new();
        let mut wrappers = Vec::new();
        for groups in ["a", "a b", "b", "c"] {
            let element = dom.create_html_element("tei-l", vec![]);
            dom.append(root, element);
            let wrapper = dom.create_html_element("span", vec![]);
            dom.append(element, wrapper);
            highlights.insert(wrapper, element);
            highlights.wrapper_mut(wrapper).expect("registered").groups =
                GroupSet::from_attr_value(groups);
            wrappers.push(wrapper);
        }
        (dom, highlights, wrappers)
    }

    #[test]
    fn test_activation_is_not_chained() {
        let (_dom, mut h, w) = setup();
        assert_eq!(h.activation().activate_sharing(w[0]), 2);
        assert!(h.is_active(w[0]) && h.is_active(w[1]));
        // w3 shares b with w2 only.
        assert!(!h.is_active(w[2]));
        assert!(!h.is_active(w[3]));
    }

    #[test]
    fn test_activation_recomputes() {
        let (_dom, mut h, w) = setup();
        h.activation().activate_sharing(w[0]);
        h.activation().activate_sharing(w[0]);
        assert_eq!(h.active_count(), 2);

        h.activation().activate_sharing(w[3]);
        assert_eq!(h.active_count(), 1);
        assert!(h.is_active(w[3]));
        assert_eq!(h.activation().deactivate_all(), 0);
    }

    #[test]
    fn test_current_survives_deactivation() {
        let (dom, mut h, w) = setup();
        let first = h.activation().set_current(&dom, "b");
        assert_eq!(first, Some(w[1]));
        assert!(h.is_current(w[1]) && h.is_current(w[2]));

        h.activation().activate_sharing(w[3]);
        assert!(h.is_active(w[3]) && h.is_active(w[1]) && h.is_active(w[2]));

        assert_eq!(h.activation().deactivate_all(), 2);
        assert!(!h.is_active(w[3]));

        h.activation().set_current(&dom, "c");
        assert!(!h.is_current(w[1]));
        assert!(h.is_current(w[3]));

        h.activation().clear_current();
        assert_eq!(h.current(), None);
        assert_eq!(h.active_count(), 0);
    }

    #[test]
    fn test_sync_projects_classes() {
        let (mut dom, mut h, w) = setup();
        let opts = HighlightOptions::default();
        h.activation().set_current(&dom, "c");
        h.activation().activate_sharing(w[0]);
        h.activation().sync(&mut dom, &opts);
        h.activation().sync(&mut dom, &opts);

        assert_eq!(dom.get_attr(w[0], "class"), Some("note-active"));
        assert_eq!(dom.get_attr(w[3], "class"), Some("note-active note-current"));
        assert!(!dom.has_class(w[2], "note-active"));

        h.activation().deactivate_all();
        h.activation().sync(&mut dom, &opts);
        assert!(!dom.has_class(w[0], "note-active"));
        assert!(dom.has_class(w[3], "note-active"));
    }

    #[test]
    fn test_set_current_without_wrappers() {
        let (dom, mut h, _w) = setup();
        assert_eq!(h.activation().set_current(&dom, "missing"), None);
        assert_eq!(h.current(), Some("missing"));
        assert_eq!(h.active_count(), 0);
    }
}
