//! TEI/XML loading into an [`ArenaDom`].
//!
//! Whitespace-only text is kept: inside verse lines it carries the spacing
//! between words and inline elements.

use html5ever::{LocalName, QualName, ns};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::arena::{ArenaDom, Attribute, NodeId};
use crate::error::{Error, Result};

/// Parse an XML document.
///
/// Element names keep only their local part (`tei:l` becomes `l`); attribute
/// names keep their prefix so `xml:id` stays addressable as such.
pub fn parse_xml(xml: &str) -> Result<ArenaDom> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut dom = ArenaDom::new();
    let mut stack: Vec<NodeId> = vec![dom.document()];

    loop {
        let parent = stack.last().copied().unwrap_or_else(|| dom.document());
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = create_element(&mut dom, &e)?;
                dom.append(parent, element);
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                let element = create_element(&mut dom, &e)?;
                dom.append(parent, element);
            }
            Ok(Event::End(_)) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            Ok(Event::Text(e)) => {
                // The document node only holds the root element.
                if parent != dom.document() {
                    dom.append_text(parent, &String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let reference = format!("&{entity};");
                match unescape(&reference) {
                    Ok(resolved) => dom.append_text(parent, &resolved),
                    Err(_) => {
                        tracing::debug!(%entity, "unknown entity kept verbatim");
                        dom.append_text(parent, &reference);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                dom.append_text(parent, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::Comment(e)) => {
                let comment = dom.create_comment(String::from_utf8_lossy(e.as_ref()).into_owned());
                dom.append(parent, comment);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(dom)
}

/// Parse XML bytes, honouring the encoding declared in the XML prolog.
pub fn parse_xml_bytes(bytes: &[u8]) -> Result<ArenaDom> {
    let hint = crate::util::extract_xml_encoding(bytes);
    let text = crate::util::decode_text(bytes, hint);
    parse_xml(&text)
}

fn create_element(dom: &mut ArenaDom, start: &BytesStart<'_>) -> Result<NodeId> {
    let raw_name = start.name();
    let local = local_name(raw_name.as_ref());
    let name = QualName::new(
        None,
        ns!(),
        LocalName::from(String::from_utf8_lossy(local).as_ref()),
    );

    let mut attrs = Vec::new();
    for attr in start.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref());
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)?;
        attrs.push(Attribute::qualified(&key, value.into_owned()));
    }

    Ok(dom.create_element(name, attrs))
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tei_speech() {
        let dom = parse_xml(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0"><sp xml:id="sp-1" who="#comendador"><speaker>COMENDADOR</speaker><l xml:id="v1" n="1">¿Sabe el Maestre que estoy</l></sp></TEI>"##,
        )
        .expect("valid xml");

        let l = dom.find_by_tag("l").expect("should find l");
        assert_eq!(dom.get_attr(l, "xml:id"), Some("v1"));
        assert_eq!(dom.get_attr(l, "n"), Some("1"));
        assert_eq!(dom.text(l), "¿Sabe el Maestre que estoy");

        let sp = dom.parent(l).expect("l has a parent");
        assert_eq!(dom.get_attr(sp, "who"), Some("#comendador"));
    }

    #[test]
    fn test_entities_and_whitespace() {
        let dom = parse_xml("<l>Laurencia &amp; Frondoso <seg>sí</seg> <seg>no</seg></l>")
            .expect("valid xml");
        let l = dom.find_by_tag("l").expect("should find l");
        assert_eq!(dom.text(l), "Laurencia & Frondoso sí no");

        let whitespace: Vec<_> = dom
            .children(l)
            .filter_map(|c| dom.text_content(c))
            .collect();
        assert_eq!(whitespace, vec!["Laurencia & Frondoso ", " "]);
    }

    #[test]
    fn test_prefixed_elements_use_local_name() {
        let dom = parse_xml(r#"<tei:sp xmlns:tei="http://www.tei-c.org/ns/1.0"><tei:l xml:id="v1"/></tei:sp>"#)
            .expect("valid xml");
        assert!(dom.find_by_tag("sp").is_some());
        assert!(dom.find_by_tag("l").is_some());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        assert!(matches!(parse_xml("<sp><l></sp>"), Err(Error::Xml(_))));
    }
}
