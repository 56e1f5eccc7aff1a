//! Loading notes from JSON rows or from a TEI notes file.

use std::collections::HashSet;

use super::Annotation;
use crate::dom::{ArenaDom, parse_xml, parse_xml_bytes};
use crate::error::{Error, Result};

/// Parse a JSON array of note rows.
///
/// Rows may use either the English field names or the database ones
/// (`nota_id`, `texto_nota`, `evaluaciones`).
#[cfg(feature = "json")]
pub fn parse_notes_json(json: &str) -> Result<Vec<Annotation>> {
    let notes: Vec<Annotation> = serde_json::from_str(json)?;
    validate(notes)
}

/// Parse every `<note>` of a TEI notes file.
///
/// The note text is its trimmed text content, markup stripped.
pub fn parse_notes_xml(xml: &str) -> Result<Vec<Annotation>> {
    let dom = parse_xml(xml)?;
    notes_from_dom(&dom)
}

/// Like [`parse_notes_xml`], decoding the bytes first.
pub fn parse_notes_xml_bytes(bytes: &[u8]) -> Result<Vec<Annotation>> {
    let dom = parse_xml_bytes(bytes)?;
    notes_from_dom(&dom)
}

fn notes_from_dom(dom: &ArenaDom) -> Result<Vec<Annotation>> {
    let notes: Vec<Annotation> = dom
        .descendants(dom.document())
        .filter(|&node| dom.element_name(node).is_some_and(|n| n.as_ref() == "note"))
        .map(|node| {
            let attr = |name: &str| dom.get_attr(node, name).map(str::to_string);
            Annotation {
                id: attr("xml:id").unwrap_or_default(),
                target: dom
                    .get_attr(node, "target")
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
                version: attr("version"),
                kind: attr("type"),
                subtype: attr("subtype"),
                text: dom.text(node).trim().to_string(),
                n: attr("n"),
                evaluations: None,
            }
        })
        .collect();

    let notes = validate(notes)?;
    tracing::debug!(count = notes.len(), "loaded TEI notes");
    Ok(notes)
}

/// Drop notes without an id; duplicate ids are an error.
fn validate(notes: Vec<Annotation>) -> Result<Vec<Annotation>> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(notes.len());
    for (index, note) in notes.into_iter().enumerate() {
        if note.id.is_empty() {
            tracing::warn!(index, "skipping note without id");
            continue;
        }
        if !seen.insert(note.id.clone()) {
            return Err(Error::InvalidNotes(format!("duplicate note id {}", note.id)));
        }
        if note.target_count() == 0 {
            tracing::warn!(id = %note.id, "note has no target");
        }
        kept.push(note);
    }
    Ok(kept)
}
