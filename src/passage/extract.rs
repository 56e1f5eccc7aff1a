//! Cutting a passage out of the source document.
//!
//! Three shapes of range are handled:
//!
//! - the same id at both ends: the element itself;
//! - an end nested inside the start: the start element, which already holds it;
//! - anything else: every child of the common container from the speech (or
//!   stage direction) holding the start to the one holding the end.
//!
//! The result always lives in a fresh arena.

use crate::dom::{ArenaDom, Attribute, NodeId, select::find_by_stable_id};
use crate::error::{Error, Result};

use super::Fragment;

/// Knobs for [`extract`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Stable identifier attribute.
    pub id_attr: String,
    /// Local names of the containers a sibling range snaps to.
    pub boundaries: Vec<String>,
    pub container_tag: String,
    pub container_class: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            id_attr: "xml:id".to_string(),
            boundaries: vec!["sp".to_string(), "stage".to_string()],
            container_tag: "div".to_string(),
            container_class: "pasaje-fragmento".to_string(),
        }
    }
}

impl ExtractOptions {
    pub fn with_id_attr(mut self, attr: impl Into<String>) -> Self {
        self.id_attr = attr.into();
        self
    }

    pub fn with_boundaries<I, S>(mut self, boundaries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boundaries = boundaries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_container(mut self, tag: impl Into<String>, class: impl Into<String>) -> Self {
        self.container_tag = tag.into();
        self.container_class = class.into();
        self
    }

    fn is_boundary(&self, dom: &ArenaDom, node: NodeId) -> bool {
        dom.element_name(node)
            .is_some_and(|name| self.boundaries.iter().any(|b| b == name.as_ref()))
    }
}

/// Extract the range `start_id..=end_id` of `source` into a new fragment.
///
/// Fails with [`Error::MissingElement`] when either id is absent from the
/// document.
pub fn extract(
    source: &ArenaDom,
    start_id: &str,
    end_id: &str,
    opts: &ExtractOptions,
) -> Result<Fragment> {
    let doc = source.document();
    let start = find_by_stable_id(source, doc, &opts.id_attr, start_id);
    let end = find_by_stable_id(source, doc, &opts.id_attr, end_id);

    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (None, _) => {
            tracing::warn!(start_id, end_id, "passage start not found");
            return Err(Error::MissingElement(start_id.to_string()));
        }
        (_, None) => {
            tracing::warn!(start_id, end_id, "passage end not found");
            return Err(Error::MissingElement(end_id.to_string()));
        }
    };

    let captured = if start_id == end_id || source.contains(start, end) {
        vec![start]
    } else {
        sibling_range(source, start, end, opts)
    };

    tracing::debug!(start_id, end_id, nodes = captured.len(), "extracted passage");

    let mut dom = ArenaDom::new();
    let container = dom.create_html_element(
        &opts.container_tag,
        vec![Attribute::html("class", opts.container_class.as_str())],
    );
    let document = dom.document();
    dom.append(document, container);
    for node in captured {
        let copy = dom.import_subtree(source, node);
        dom.append(container, copy);
    }

    Ok(Fragment::new(dom, container))
}

/// Element children of the common container, from the one holding the start
/// anchor through the one holding the end anchor.
fn sibling_range(source: &ArenaDom, start: NodeId, end: NodeId, opts: &ExtractOptions) -> Vec<NodeId> {
    let start_anchor = source
        .closest(start, |id| opts.is_boundary(source, id))
        .unwrap_or(start);
    let end_anchor = source
        .closest(end, |id| opts.is_boundary(source, id))
        .unwrap_or(end);

    // Nearest proper ancestor of the start anchor that also holds the end.
    let Some(common) = source
        .parent(start_anchor)
        .and_then(|parent| source.ancestors(parent).find(|&a| source.contains(a, end_anchor)))
    else {
        return vec![start_anchor];
    };

    let mut captured = Vec::new();
    let mut capturing = false;
    let mut reached_end = false;
    for child in source.children(common).filter(|&c| source.is_element(c)) {
        if source.contains(child, start_anchor) {
            capturing = true;
        }
        if capturing {
            captured.push(child);
        }
        if source.contains(child, end_anchor) {
            reached_end = true;
            break;
        }
    }

    if captured.is_empty() {
        tracing::warn!("passage end precedes its start, fragment is empty");
    } else if !reached_end {
        tracing::warn!("passage end not reached, captured to the last sibling");
    }

    captured
}
