//! HTML serialization of arena subtrees.

use std::fmt::Write;

use quick_xml::escape::{escape, partial_escape};

use super::arena::{ArenaDom, NodeData, NodeId};

/// Elements that never have an end tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Outer HTML of `node`. A document node serializes its children.
pub fn to_html(dom: &ArenaDom, node: NodeId) -> String {
    let mut out = String::new();
    write_node(dom, node, &mut out);
    out
}

/// Serialized children of `node`, without the node's own tags.
pub fn inner_html(dom: &ArenaDom, node: NodeId) -> String {
    let mut out = String::new();
    for child in dom.children(node) {
        write_node(dom, child, &mut out);
    }
    out
}

fn write_node(dom: &ArenaDom, node: NodeId, out: &mut String) {
    let Some(data) = dom.get(node).map(|n| &n.data) else {
        return;
    };

    match data {
        NodeData::Document => {
            for child in dom.children(node) {
                write_node(dom, child, out);
            }
        }
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                // Writing into a String cannot fail.
                let _ = write!(out, " {}=\"{}\"", attr.qualified_name(), escape(attr.value.as_str()));
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }
            for child in dom.children(node) {
                write_node(dom, child, out);
            }
            let _ = write!(out, "</{tag}>");
        }
        NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
        NodeData::Comment(text) => {
            let _ = write!(out, "<!--{text}-->");
        }
        NodeData::Doctype { name, .. } => {
            let _ = write!(out, "<!DOCTYPE {name}>");
        }
    }
}
