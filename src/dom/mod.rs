//! Document trees for TEI sources and rendered passages.
//!
//! ```
//! use glosa::dom::{parse_xml, select::find_by_stable_id};
//!
//! let dom = parse_xml(r#"<sp><l xml:id="v1">Fuenteovejuna</l></sp>"#).unwrap();
//! let line = find_by_stable_id(&dom, dom.document(), "xml:id", "v1").unwrap();
//! assert_eq!(dom.text(line), "Fuenteovejuna");
//! ```

mod arena;
mod element_ref;
pub mod select;
mod serialize;
mod tree_sink;
mod xml;

pub use arena::{ArenaDom, Attribute, Node, NodeData, NodeId};
pub use element_ref::{ElementRef, GlosaSelectors};
pub use serialize::{inner_html, to_html};
pub use tree_sink::{ArenaSink, parse_html};
pub use xml::{parse_xml, parse_xml_bytes};
