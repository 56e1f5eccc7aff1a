//! The highlight pass: wrapping note targets and recording group membership.
//!
//! Notes are processed most specific first (segment targets, then fewer
//! targets), so that by the time a line-level note wraps its line, the
//! segment wrappers inside it already exist and are moved as a whole.
//!
//! The pass never fails. Unresolvable references are logged and reported in
//! the [`ApplyReport`], and the remaining notes are still processed.

use crate::dom::{ArenaDom, Attribute, NodeId, select::find_by_stable_id};
use crate::notes::Annotation;
use crate::passage::Fragment;

use super::{HighlightOptions, Highlights};

/// A target reference that matched nothing in the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct UnresolvedTarget {
    pub note_id: String,
    pub target: String,
}

/// Outcome of one highlight pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ApplyReport {
    /// Notes with at least one resolved target, in processing order.
    pub processed: Vec<String>,
    /// Notes none of whose targets resolved.
    pub skipped: Vec<String>,
    pub unresolved: Vec<UnresolvedTarget>,
    pub wrappers_created: usize,
    /// Wrappers found in the tree but unknown to the registry.
    pub wrappers_adopted: usize,
    pub handlers_attached: usize,
}

/// Wraps note targets of a rendered fragment.
#[derive(Debug, Clone, Default)]
pub struct HighlightEngine {
    options: HighlightOptions,
}

impl HighlightEngine {
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    /// Notes in processing order: segment-level first, then by number of
    /// targets. The sort is stable, so ties keep their input order.
    pub fn sort_by_specificity<'a, I>(&self, notes: I) -> Vec<&'a Annotation>
    where
        I: IntoIterator<Item = &'a Annotation>,
    {
        let marker = self.options.segment_marker.as_str();
        let mut sorted: Vec<&Annotation> = notes.into_iter().collect();
        sorted.sort_by_key(|note| (!note.is_segment_level(marker), note.target_count()));
        sorted
    }

    /// Run the pass over `fragment`.
    ///
    /// Running it again with the same notes changes nothing, whether or not
    /// `highlights` is the registry of the first run.
    pub fn apply<'a, I>(&self, fragment: &mut Fragment, notes: I, highlights: &mut Highlights) -> ApplyReport
    where
        I: IntoIterator<Item = &'a Annotation>,
    {
        let mut report = ApplyReport::default();
        let root = fragment.root;
        let dom = &mut fragment.dom;

        for note in self.sort_by_specificity(notes) {
            let mut elements: Vec<NodeId> = Vec::new();
            for target in note.targets() {
                match find_by_stable_id(dom, root, &self.options.id_attr, target) {
                    Some(element) if !elements.contains(&element) => elements.push(element),
                    Some(_) => {}
                    None => {
                        tracing::warn!(note = %note.id, target, "note target not found in passage");
                        report.unresolved.push(UnresolvedTarget {
                            note_id: note.id.clone(),
                            target: target.to_string(),
                        });
                    }
                }
            }

            if elements.is_empty() {
                tracing::debug!(note = %note.id, "skipping note without resolvable targets");
                report.skipped.push(note.id.clone());
                continue;
            }

            for element in elements {
                let wrapper = self.ensure_wrapper(dom, element, highlights, &mut report);
                self.add_group(dom, wrapper, &note.id, highlights, &mut report);
                self.attach_handlers(wrapper, highlights, &mut report);
            }
            report.processed.push(note.id.clone());
        }

        self.sync_membership(dom, highlights);

        tracing::debug!(
            processed = report.processed.len(),
            skipped = report.skipped.len(),
            created = report.wrappers_created,
            "highlight pass complete"
        );
        report
    }

    fn is_wrapper_node(&self, dom: &ArenaDom, node: NodeId) -> bool {
        dom.has_class(node, &self.options.wrapper_class)
    }

    /// The wrapper of `element`, created on first use.
    ///
    /// A new wrapper takes every child of the element, text included, in
    /// order, and becomes its only child.
    fn ensure_wrapper(
        &self,
        dom: &mut ArenaDom,
        element: NodeId,
        highlights: &mut Highlights,
        report: &mut ApplyReport,
    ) -> NodeId {
        if let Some(existing) = dom.first_element_child(element)
            && self.is_wrapper_node(dom, existing)
        {
            if !highlights.is_wrapper(existing) {
                highlights.adopt(dom, existing, &self.options);
                report.wrappers_adopted += 1;
            }
            return existing;
        }

        let class = format!("{} {}", self.options.wrapper_class, self.options.target_class);
        let wrapper = dom.create_html_element(&self.options.wrapper_tag, vec![Attribute::html("class", class)]);
        dom.reparent_children(element, wrapper);
        dom.append(element, wrapper);

        highlights.insert(wrapper, element);
        report.wrappers_created += 1;
        tracing::trace!(?element, ?wrapper, "created wrapper");
        wrapper
    }

    /// Add `note_id` to `wrapper` and to every wrapper nested inside it.
    fn add_group(
        &self,
        dom: &ArenaDom,
        wrapper: NodeId,
        note_id: &str,
        highlights: &mut Highlights,
        report: &mut ApplyReport,
    ) {
        if let Some(w) = highlights.wrapper_mut(wrapper) {
            w.groups.insert(note_id);
        }

        let nested: Vec<NodeId> = dom
            .descendants(wrapper)
            .filter(|&node| highlights.is_wrapper(node) || self.is_wrapper_node(dom, node))
            .collect();
        for inner in nested {
            if !highlights.is_wrapper(inner) {
                highlights.adopt(dom, inner, &self.options);
                report.wrappers_adopted += 1;
            }
            if let Some(w) = highlights.wrapper_mut(inner)
                && w.groups.insert(note_id)
            {
                tracing::trace!(note_id, wrapper = ?inner, "propagated group to nested wrapper");
            }
        }
    }

    fn attach_handlers(&self, wrapper: NodeId, highlights: &mut Highlights, report: &mut ApplyReport) {
        if let Some(w) = highlights.wrapper_mut(wrapper)
            && !w.events_attached
        {
            w.events_attached = true;
            report.handlers_attached += 1;
        }
    }

    /// Write membership into the tree: wrapper classes, the space-joined
    /// group list and the handler marker.
    pub fn sync_membership(&self, dom: &mut ArenaDom, highlights: &Highlights) {
        let opts = &self.options;
        for (&node, wrapper) in &highlights.wrappers {
            dom.add_class(node, &opts.wrapper_class);
            dom.add_class(node, &opts.target_class);
            if wrapper.groups.is_empty() {
                dom.remove_attr(node, &opts.groups_attr);
            } else {
                dom.set_attr(node, &opts.groups_attr, wrapper.groups.to_attr_value());
            }
            if wrapper.events_attached {
                dom.set_attr(node, &opts.events_attr, "true");
            }
        }
    }
}
