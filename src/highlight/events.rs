//! Pointer handling for wrappers.
//!
//! The engine marks each wrapper once as having handlers; [`dispatch`] is
//! those handlers. Events are consumed by the innermost wrapper holding their
//! target and never bubble to enclosing wrappers.

use crate::dom::NodeId;
use crate::notes::Annotation;
use crate::passage::Fragment;

use super::{HighlightOptions, Highlights, NoteDisplay};

/// A pointer event on the rendered passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// The pointer entered the node.
    Enter(NodeId),
    /// The pointer left `target` towards `related`, `None` when it left the
    /// passage altogether.
    Leave { target: NodeId, related: Option<NodeId> },
    Click(NodeId),
}

/// What a handler did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Not on a wrapper with handlers.
    Ignored,
    /// Wrappers sharing a group were lit; the size of the active set.
    Activated(usize),
    /// The pointer moved to a wrapper sharing a group; nothing changed.
    Kept,
    /// Pointer activation turned off; the size of the remaining active set.
    Deactivated(usize),
    /// The clicked wrapper's first group was shown.
    Selected(String),
    /// The clicked wrapper's first group is not a note of this passage.
    NotFound(String),
}

/// Route `event` to the handlers of the wrapper it hits, then project the
/// resulting state onto the tree.
pub fn dispatch(
    event: PointerEvent,
    fragment: &mut Fragment,
    highlights: &mut Highlights,
    notes: &[Annotation],
    display: &mut dyn NoteDisplay,
    opts: &HighlightOptions,
) -> Response {
    let response = handle(event, fragment, highlights, notes, display, opts);
    if response != Response::Ignored {
        highlights.activation().sync(&mut fragment.dom, opts);
    }
    response
}

fn handle(
    event: PointerEvent,
    fragment: &Fragment,
    highlights: &mut Highlights,
    notes: &[Annotation],
    display: &mut dyn NoteDisplay,
    opts: &HighlightOptions,
) -> Response {
    let dom = &fragment.dom;
    let handled = |h: &Highlights, node: NodeId| {
        h.closest_wrapper(dom, node)
            .filter(|&w| h.get(w).is_some_and(|w| w.events_attached))
    };

    match event {
        PointerEvent::Enter(node) => match handled(&*highlights, node) {
            Some(wrapper) => Response::Activated(highlights.activation().activate_sharing(wrapper)),
            None => Response::Ignored,
        },
        PointerEvent::Leave { target, related } => {
            let Some(wrapper) = handled(&*highlights, target) else {
                return Response::Ignored;
            };
            let destination = related.and_then(|node| highlights.closest_wrapper(dom, node));
            let shares = destination
                .and_then(|dest| highlights.get(dest))
                .zip(highlights.get(wrapper))
                .is_some_and(|(dest, from)| dest.groups.shares(&from.groups));
            if shares {
                Response::Kept
            } else {
                Response::Deactivated(highlights.activation().deactivate_all())
            }
        }
        PointerEvent::Click(node) => {
            let Some(wrapper) = handled(&*highlights, node) else {
                return Response::Ignored;
            };
            // Only the first group is shown, even on a doubly annotated span.
            let Some(selected) = highlights
                .get(wrapper)
                .and_then(|w| w.groups.first())
                .map(str::to_string)
            else {
                return Response::Ignored;
            };

            match notes.iter().find(|n| n.id == selected) {
                Some(note) => {
                    display.show(note);
                    if opts.select_on_click {
                        highlights.activation().set_current(dom, &selected);
                    }
                    Response::Selected(selected)
                }
                None => {
                    display.not_found(&selected);
                    Response::NotFound(selected)
                }
            }
        }
    }
}
