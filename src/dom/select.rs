//! Element lookup by stable identifier.
//!
//! Lookups first try a CSS attribute selector (`[xml\:id="v12"]`). Identifiers
//! that cannot be spelled inside a quoted selector value, or that the selector
//! misses, fall back to a linear scan comparing the raw attribute value.

use cssparser::{Parser, ParserInput};
use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{MatchingForInvalidation, MatchingMode, NeedsSelectorFlags};
use selectors::parser::{ParseRelative, Selector, SelectorList};

use super::arena::{ArenaDom, NodeId};
use super::element_ref::{ElementRef, GlosaSelectors};

/// A parsed, comma-separated selector list.
#[derive(Clone)]
pub struct CompiledSelector(Vec<Selector<GlosaSelectors>>);

/// Parse a selector list. Returns `None` for anything the parser rejects.
pub fn parse_selector(source: &str) -> Option<CompiledSelector> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let list = SelectorList::parse(&GlosaSelectors, &mut parser, ParseRelative::No).ok()?;
    parser.expect_exhausted().ok()?;
    Some(CompiledSelector(list.slice().to_vec()))
}

/// True when `elem` matches any selector of the list.
pub fn matches(elem: ElementRef<'_>, selector: &CompiledSelector) -> bool {
    let mut caches = SelectorCaches::default();
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        &mut caches,
        selectors::context::QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );
    selector
        .0
        .iter()
        .any(|s| selectors::matching::matches_selector(s, 0, None, &elem, &mut context))
}

/// First element below `scope` (exclusive, document order) matching `selector`.
pub fn query_selector(dom: &ArenaDom, scope: NodeId, selector: &CompiledSelector) -> Option<NodeId> {
    dom.descendants(scope)
        .filter(|&id| dom.is_element(id))
        .find(|&id| matches(ElementRef::new(dom, id), selector))
}

/// Every element below `scope` matching `selector`, in document order.
pub fn query_selector_all(dom: &ArenaDom, scope: NodeId, selector: &CompiledSelector) -> Vec<NodeId> {
    dom.descendants(scope)
        .filter(|&id| dom.is_element(id))
        .filter(|&id| matches(ElementRef::new(dom, id), selector))
        .collect()
}

/// Attribute-equality selector for `attr="value"`, e.g. `[xml\:id="v1"]`.
///
/// The value is inserted verbatim, so values containing quotes, backslashes
/// or line breaks produce a selector that fails to parse or to match.
pub fn attr_selector(attr: &str, value: &str) -> String {
    let mut escaped = String::new();
    // Writing into a String cannot fail.
    let _ = cssparser::serialize_identifier(attr, &mut escaped);
    format!("[{escaped}=\"{value}\"]")
}

/// Linear scan below `scope` comparing the raw attribute value.
pub fn scan_by_attr(dom: &ArenaDom, scope: NodeId, attr: &str, value: &str) -> Option<NodeId> {
    dom.descendants(scope)
        .find(|&id| dom.get_attr(id, attr) == Some(value))
}

/// Resolve a stable identifier below `scope`, selector first, scan second.
pub fn find_by_stable_id(dom: &ArenaDom, scope: NodeId, attr: &str, id: &str) -> Option<NodeId> {
    let via_selector = parse_selector(&attr_selector(attr, id))
        .and_then(|selector| query_selector(dom, scope, &selector));

    via_selector.or_else(|| {
        let found = scan_by_attr(dom, scope, attr, id);
        if found.is_some() {
            tracing::trace!(%id, "resolved by attribute scan");
        }
        found
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::xml::parse_xml;

    #[test]
    fn test_attr_selector_escapes_name() {
        assert_eq!(attr_selector("xml:id", "v1"), r#"[xml\:id="v1"]"#);
    }

    #[test]
    fn test_find_by_stable_id() {
        let dom = parse_xml(r#"<text><sp xml:id="sp1"><l xml:id="v1">a</l><l xml:id="v2">b</l></sp></text>"#)
            .expect("valid xml");
        let found = find_by_stable_id(&dom, dom.document(), "xml:id", "v2").expect("v2 exists");
        assert_eq!(dom.text(found), "b");
        assert!(find_by_stable_id(&dom, dom.document(), "xml:id", "v3").is_none());
    }

    #[test]
    fn test_unsafe_id_falls_back_to_scan() {
        let dom = parse_xml(r#"<text><l xml:id='odd"id'>a</l></text>"#).expect("valid xml");
        assert!(parse_selector(&attr_selector("xml:id", "odd\"id")).is_none());

        let found = find_by_stable_id(&dom, dom.document(), "xml:id", "odd\"id");
        assert_eq!(found.map(|id| dom.text(id)), Some("a".to_string()));
    }

    #[test]
    fn test_query_selector_all_in_order() {
        let dom = parse_xml(r#"<sp><l n="1"/><stage/><l n="2"/></sp>"#).expect("valid xml");
        let selector = parse_selector("l").expect("valid selector");
        let found = query_selector_all(&dom, dom.document(), &selector);
        let numbers: Vec<_> = found.iter().map(|&id| dom.get_attr(id, "n")).collect();
        assert_eq!(numbers, vec![Some("1"), Some("2")]);
    }
}
