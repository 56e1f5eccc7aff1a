//! Turning an extracted TEI fragment into the tree the highlighter works on.
//!
//! Rendering proper (styling, behaviours) happens elsewhere; all the
//! highlighter needs is that rendered elements keep their stable ids and
//! nesting. [`TeiHtmlRenderer`] does exactly that and no more.

use crate::dom::{ArenaDom, Attribute, NodeData, NodeId, parse_html};
use crate::passage::Fragment;

/// Turns a source fragment into a rendered one.
pub trait Renderer {
    fn render(&self, fragment: &Fragment) -> Fragment;
}

/// Maps each TEI element `x` to a custom element `tei-x`.
///
/// Attributes are copied under their qualified names, so `xml:id` survives
/// as a literal `xml:id` attribute. HTML elements (the fragment container)
/// keep their names.
#[derive(Debug, Clone)]
pub struct TeiHtmlRenderer {
    prefix: String,
}

impl Default for TeiHtmlRenderer {
    fn default() -> Self {
        Self {
            prefix: "tei-".to_string(),
        }
    }
}

impl TeiHtmlRenderer {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    fn copy(&self, src: &ArenaDom, node: NodeId, out: &mut ArenaDom) -> Option<NodeId> {
        let copy = match &src.get(node)?.data {
            NodeData::Element { name, attrs } => {
                let attrs = attrs
                    .iter()
                    .map(|a| Attribute::html(&a.qualified_name(), a.value.as_str()))
                    .collect();
                if name.ns == html5ever::ns!(html) {
                    out.create_html_element(name.local.as_ref(), attrs)
                } else {
                    out.create_html_element(&format!("{}{}", self.prefix, name.local.as_ref()), attrs)
                }
            }
            NodeData::Text(text) => out.create_text(text.as_str()),
            NodeData::Comment(text) => out.create_comment(text.as_str()),
            NodeData::Document | NodeData::Doctype { .. } => return None,
        };

        for child in src.children(node) {
            if let Some(child_copy) = self.copy(src, child, out) {
                out.append(copy, child_copy);
            }
        }
        Some(copy)
    }
}

impl Renderer for TeiHtmlRenderer {
    fn render(&self, fragment: &Fragment) -> Fragment {
        let mut dom = ArenaDom::new();
        let document = dom.document();
        let root = self
            .copy(&fragment.dom, fragment.root, &mut dom)
            .unwrap_or(document);
        if root != document {
            dom.append(document, root);
        }
        Fragment::new(dom, root)
    }
}

/// Parse externally rendered HTML. The fragment root is `<body>`.
pub fn parse_rendered_html(html: &str) -> Fragment {
    let dom = parse_html(html);
    let root = dom.find_by_tag("body").unwrap_or_else(|| dom.document());
    Fragment::new(dom, root)
}
