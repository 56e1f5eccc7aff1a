//! Scholarly notes ("notas") and the selection of notes that apply to a
//! passage.

mod filter;
mod model;
mod source;

pub use filter::filter;
pub use model::Annotation;
#[cfg(feature = "json")]
pub use source::parse_notes_json;
pub use source::{parse_notes_xml, parse_notes_xml_bytes};
