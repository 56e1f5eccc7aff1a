//! Passages: catalogue entries, fragment extraction and id discovery.

mod extract;
mod ids;

pub use extract::{ExtractOptions, extract};
pub use ids::collect_ids;

use crate::dom::{ArenaDom, NodeId, inner_html, to_html};

/// An owned subtree cut out of a larger document.
///
/// `dom` is a tree of its own; nothing in it is shared with the document the
/// fragment was extracted from.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub dom: ArenaDom,
    /// Container element holding the captured content.
    pub root: NodeId,
}

impl Fragment {
    pub fn new(dom: ArenaDom, root: NodeId) -> Self {
        Self { dom, root }
    }

    /// Outer HTML of the container.
    pub fn to_html(&self) -> String {
        to_html(&self.dom, self.root)
    }

    pub fn inner_html(&self) -> String {
        inner_html(&self.dom, self.root)
    }

    /// Concatenated text of the fragment.
    pub fn text(&self) -> String {
        self.dom.text(self.root)
    }
}

/// A catalogue entry: a titled range of the play between two stable ids.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Passage {
    pub id: String,
    #[cfg_attr(feature = "json", serde(alias = "titulo", default))]
    pub title: String,
    #[cfg_attr(
        feature = "json",
        serde(alias = "descripcion", default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,
    #[cfg_attr(feature = "json", serde(alias = "orden", default))]
    pub order: i64,
    #[cfg_attr(feature = "json", serde(alias = "inicio_xmlid"))]
    pub start: String,
    #[cfg_attr(feature = "json", serde(alias = "fin_xmlid"))]
    pub end: String,
}

impl Passage {
    pub fn new(id: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: None,
            order: 0,
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }
}

/// Parse a passage catalogue (a JSON array) and sort it by `order`.
#[cfg(feature = "json")]
pub fn parse_passages_json(json: &str) -> crate::Result<Vec<Passage>> {
    let mut passages: Vec<Passage> = serde_json::from_str(json)?;
    passages.sort_by_key(|p| p.order);
    Ok(passages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "json")]
    #[test]
    fn test_parse_passages_sorted_by_order() {
        let json = r#"[
            {"id": "p2", "titulo": "Acto II", "orden": 2, "inicio_xmlid": "sp10", "fin_xmlid": "sp12"},
            {"id": "p1", "titulo": "Acto I", "descripcion": "Llega el Comendador", "orden": 1,
             "inicio_xmlid": "v1", "fin_xmlid": "v20"}
        ]"#;
        let passages = parse_passages_json(json).expect("valid catalogue");
        assert_eq!(passages[0].id, "p1");
        assert_eq!(passages[0].start, "v1");
        assert_eq!(passages[0].description.as_deref(), Some("Llega el Comendador"));
        assert_eq!(passages[1].title, "Acto II");
        assert_eq!(passages[1].description, None);
    }

    #[test]
    fn test_passage_builder() {
        let passage = Passage::new("p1", "sp1", "sp3").with_title("Inicio").with_order(3);
        assert_eq!(passage.title, "Inicio");
        assert_eq!(passage.order, 3);
        assert_eq!((passage.start.as_str(), passage.end.as_str()), ("sp1", "sp3"));
    }
}
