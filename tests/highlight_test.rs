//! Highlight pass and activation on rendered passages.

use glosa::dom::{NodeId, select::find_by_stable_id};
use glosa::notes::{Annotation, parse_notes_json};
use glosa::render::parse_rendered_html;
use glosa::{
    Edition, Fragment, HighlightEngine, Highlights, NotePanel, Passage, PassageView, PointerEvent, Response,
    TeiHtmlRenderer,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> String {
    format!("{}/{}", FIXTURES_DIR, name)
}

fn edition() -> Edition {
    let tei = std::fs::read(fixture_path("fuenteovejuna.xml")).expect("Failed to read TEI");
    let notes = std::fs::read_to_string(fixture_path("notas.json")).expect("Failed to read notes");
    Edition::open(&tei, parse_notes_json(&notes).expect("valid notes")).expect("valid TEI")
}

fn view(start: &str, end: &str) -> PassageView {
    edition()
        .passage(&Passage::new("test", start, end), &TeiHtmlRenderer::default())
        .expect("renders")
}

fn element(fragment: &Fragment, id: &str) -> NodeId {
    find_by_stable_id(&fragment.dom, fragment.root, "xml:id", id).expect("id exists")
}

fn wrapper(fragment: &Fragment, id: &str) -> NodeId {
    fragment
        .dom
        .first_element_child(element(fragment, id))
        .expect("element is wrapped")
}

fn wrapper_count(fragment: &Fragment, id: &str) -> usize {
    let dom = &fragment.dom;
    dom.children(element(fragment, id))
        .filter(|&c| dom.has_class(c, "note-wrapper"))
        .count()
}

// ============================================================================
// The pass
// ============================================================================

#[test]
fn test_pass_is_idempotent() {
    let mut view = view("v1", "v5");
    let first = view.apply_highlights().clone();
    assert_eq!(first.processed, vec!["n2", "n3", "n1", "n5"]);
    assert_eq!(first.wrappers_created, 5);
    let html = view.to_html();

    let second = view.apply_highlights();
    assert_eq!(second.wrappers_created, 0);
    assert_eq!(second.wrappers_adopted, 0);
    assert_eq!(second.handlers_attached, 0);
    assert_eq!(view.to_html(), html);

    for id in ["v1", "v2", "v3", "v4", "seg-1"] {
        assert_eq!(wrapper_count(view.fragment(), id), 1, "{id} wrapped once");
    }
    let fragment = view.fragment();
    assert_eq!(view.highlights().groups(wrapper(fragment, "seg-1")), ["n2", "n3"]);
}

#[test]
fn test_pass_with_fresh_registry_adopts() {
    let mut view = view("v1", "v5");
    view.apply_highlights();
    let html = view.to_html();

    let mut fragment = view.fragment().clone();
    let mut highlights = Highlights::new();
    let report = HighlightEngine::default().apply(&mut fragment, view.notes(), &mut highlights);
    assert_eq!(report.wrappers_created, 0);
    assert_eq!(report.wrappers_adopted, 5);
    assert_eq!(fragment.to_html(), html);
    assert_eq!(highlights.groups(wrapper(&fragment, "seg-1")), ["n2", "n3"]);
}

#[test]
fn test_previously_highlighted_html_is_adopted() {
    let mut view = view("sp3", "sp3");
    view.apply_highlights();

    let mut fragment = parse_rendered_html(&view.to_html());
    let mut highlights = Highlights::new();
    let report = HighlightEngine::default().apply(&mut fragment, view.notes(), &mut highlights);
    assert_eq!(report.wrappers_created, 0);
    assert_eq!(report.wrappers_adopted, 2);
    assert_eq!(wrapper_count(&fragment, "v4"), 1);
    assert!(highlights.get(wrapper(&fragment, "v4")).is_some_and(|w| w.events_attached));
}

#[test]
fn test_line_and_segment_propagation() {
    let mut view = view("sp3", "sp3");
    view.apply_highlights();
    let fragment = view.fragment();

    assert_eq!(view.highlights().groups(wrapper(fragment, "v4")), ["n3"]);
    assert_eq!(view.highlights().groups(wrapper(fragment, "seg-1")), ["n2", "n3"]);
}

#[test]
fn test_wrapping_keeps_text_and_spacing() {
    let mut view = view("sp3", "sp3");
    let before = view.fragment().text();
    view.apply_highlights();
    assert_eq!(view.fragment().text(), before);

    let html = view.to_html();
    assert!(html.contains(r#">Pluguiera a Dios que <tei-seg xml:id="seg-1"><span class="note-wrapper note-target""#));
    assert!(html.contains("nunca</span></tei-seg> volviera</span></tei-l>"));
}

#[test]
fn test_input_order_does_not_matter() {
    let line = Annotation::new("line", "#v4");
    let seg = Annotation::new("seg", "#seg-1");

    let run = |notes: &[Annotation]| {
        let mut fragment = view("sp3", "sp3").fragment().clone();
        let mut highlights = Highlights::new();
        HighlightEngine::default().apply(&mut fragment, notes, &mut highlights);
        fragment.to_html()
    };

    let reversed = run(&[line.clone(), seg.clone()]);
    let sorted = run(&[seg, line]);
    assert_eq!(reversed, sorted);
    assert!(sorted.contains(r#"data-note-groups="seg line""#));
}

#[test]
fn test_unresolved_target_does_not_block() {
    let notes = vec![
        Annotation::new("ghost", "#v999"),
        Annotation::new("real", "#v6"),
    ];
    let mut fragment = view("sp4", "sp4").fragment().clone();
    let mut highlights = Highlights::new();
    let report = HighlightEngine::default().apply(&mut fragment, &notes, &mut highlights);

    assert_eq!(report.skipped, vec!["ghost"]);
    assert_eq!(report.processed, vec!["real"]);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].target, "v999");
    assert_eq!(highlights.len(), 1);
}

#[test]
fn test_partially_outside_note_reports_missing_target() {
    let mut view = view("v1", "v5");
    let report = view.apply_highlights();
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].note_id, "n5");
    assert_eq!(report.unresolved[0].target, "v20");
}

#[test]
fn test_selector_unsafe_id_is_resolved() {
    let mut fragment = parse_rendered_html(r#"<tei-l xml:id='v"1]'>Dijo "ya"</tei-l>"#);
    let mut highlights = Highlights::new();
    let notes = vec![Annotation::new("odd", r#"#v"1]"#)];
    let report = HighlightEngine::default().apply(&mut fragment, &notes, &mut highlights);
    assert_eq!(report.processed, vec!["odd"]);
    assert_eq!(report.wrappers_created, 1);
}

// ============================================================================
// Activation
// ============================================================================

fn lit(view: &PassageView, id: &str) -> bool {
    let fragment = view.fragment();
    fragment.dom.has_class(wrapper(fragment, id), "note-active")
}

#[test]
fn test_group_sharing_symmetry() {
    let mut view = view("v1", "v5");
    view.apply_highlights();
    let mut panel = NotePanel::new();
    let (v1, v2, v3) = {
        let f = view.fragment();
        (wrapper(f, "v1"), wrapper(f, "v2"), wrapper(f, "v3"))
    };

    assert_eq!(view.dispatch(PointerEvent::Enter(v1), &mut panel), Response::Activated(2));
    assert!(lit(&view, "v1") && lit(&view, "v2") && !lit(&view, "v3"));

    let response = view.dispatch(PointerEvent::Leave { target: v1, related: Some(v2) }, &mut panel);
    assert_eq!(response, Response::Kept);
    assert!(lit(&view, "v1") && lit(&view, "v2"));

    let response = view.dispatch(PointerEvent::Leave { target: v2, related: Some(v3) }, &mut panel);
    assert_eq!(response, Response::Deactivated(0));
    assert!(!lit(&view, "v1") && !lit(&view, "v2") && !lit(&view, "v3"));
}

#[test]
fn test_current_survives_pointer() {
    let mut view = view("v1", "v5");
    view.apply_highlights();
    let mut panel = NotePanel::new();

    // n1 is the first note of the passage.
    let scroll_to = view.navigate(0, &mut panel).expect("n1 has wrappers");
    let v3 = wrapper(view.fragment(), "v3");
    assert_eq!(scroll_to, wrapper(view.fragment(), "v1"));
    assert!(panel.html().contains("ID: n1"));

    view.dispatch(PointerEvent::Enter(v3), &mut panel);
    assert!(lit(&view, "v1") && lit(&view, "v2") && lit(&view, "v3"));

    view.dispatch(PointerEvent::Leave { target: v3, related: None }, &mut panel);
    assert!(lit(&view, "v1") && lit(&view, "v2"));
    assert!(!lit(&view, "v3"));
    let fragment = view.fragment();
    assert!(fragment.dom.has_class(wrapper(fragment, "v2"), "note-current"));
}

#[test]
fn test_click_shows_first_group() {
    let mut view = view("sp3", "sp3");
    view.apply_highlights();
    let mut panel = NotePanel::new();

    let seg = wrapper(view.fragment(), "seg-1");
    assert_eq!(
        view.dispatch(PointerEvent::Click(seg), &mut panel),
        Response::Selected("n2".to_string())
    );
    assert!(panel.html().contains("<h5>Nota 2</h5>"));
    assert!(panel.html().contains("Negación enfática."));
}
