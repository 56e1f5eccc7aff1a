//! Stepping through a passage's notes and recording evaluations.

use glosa::evaluation::{EVALUATION_EVENT, EVALUATION_SOURCE};
use glosa::notes::parse_notes_xml_bytes;
use glosa::{
    Edition, Error, Evaluation, EvaluationOutcome, EvaluationSink, NotePanel, Participant, Passage, PassageView,
    TeiHtmlRenderer, Vote,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(format!("{}/{}", FIXTURES_DIR, name)).expect("Failed to read fixture")
}

fn view() -> PassageView {
    let notes = parse_notes_xml_bytes(&fixture("notas.xml")).expect("valid notes");
    let edition = Edition::open(&fixture("fuenteovejuna.xml"), notes).expect("valid TEI");
    let mut view = edition
        .passage(&Passage::new("p1", "v1", "v5"), &TeiHtmlRenderer::default())
        .expect("renders");
    view.apply_highlights();
    view
}

/// Refuses everything, like a store that is down.
struct Offline;

impl EvaluationSink for Offline {
    fn submit(&mut self, _evaluation: &Evaluation) -> bool {
        false
    }
}

#[test]
fn test_navigation_follows_passage_notes() {
    let mut view = view();
    let mut panel = NotePanel::new();

    assert_eq!(view.navigator().len(), 4);
    view.navigate(2, &mut panel).expect("n3 has a wrapper");
    assert_eq!(view.navigator().current(), Some("n3"));
    assert_eq!(view.highlights().current(), Some("n3"));
    assert!(panel.html().contains("ID: n3"));

    // Out of range changes nothing.
    assert!(view.navigate(9, &mut panel).is_none());
    assert_eq!(view.navigator().current(), Some("n3"));
    assert_eq!(view.highlights().current(), Some("n3"));
}

#[test]
fn test_evaluation_record() {
    let mut view = view();
    let mut panel = NotePanel::new();
    let mut sink: Vec<Evaluation> = Vec::new();
    let reader = Participant::Reader {
        session_id: "sesion-1".to_string(),
        education: Some("grado".to_string()),
        discipline: None,
    };

    view.navigate(0, &mut panel);
    let outcome = view
        .evaluate("n1", Vote::Down, Some("  Falta la fecha.  "), &reader, &mut sink)
        .expect("note of the passage");

    let EvaluationOutcome::Recorded { stats, next_pending } = outcome else {
        panic!("accepted by a Vec sink");
    };
    assert_eq!((stats.total, stats.useful, stats.needs_improvement), (1, 0, 1));
    assert_eq!(next_pending, Some(1));

    let record = &sink[0];
    assert_eq!(record.source, EVALUATION_SOURCE);
    assert_eq!(record.event_type, EVALUATION_EVENT);
    assert_eq!(record.session_id, "sesion-1");
    assert_eq!(record.passage_id.as_deref(), Some("p1"));
    assert_eq!(record.note_id, "n1");
    assert_eq!(record.note_version.as_deref(), Some("2"));
    assert_eq!(record.comment.as_deref(), Some("Falta la fecha."));
    assert!(view.navigator().is_evaluated("n1"));
}

#[test]
fn test_rejected_evaluation_is_not_counted() {
    let mut view = view();
    let outcome = view
        .evaluate("n2", Vote::Up, None, &Participant::anonymous("s"), &mut Offline)
        .expect("note of the passage");

    assert_eq!(outcome, EvaluationOutcome::Rejected);
    assert_eq!(view.stats().get("n2").total, 0);
    assert!(!view.navigator().is_evaluated("n2"));
    assert_eq!(view.navigator().progress(), (0, 4));
}

#[test]
fn test_unknown_note() {
    let mut view = view();
    let mut sink: Vec<Evaluation> = Vec::new();
    // n4 exists in the edition but not in this passage.
    let err = view
        .evaluate("n4", Vote::Up, None, &Participant::anonymous("s"), &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownNote(ref id) if id == "n4"));
    assert!(sink.is_empty());
}

#[test]
fn test_pending_search_wraps_to_start() {
    let mut view = view();
    let mut panel = NotePanel::new();
    let mut sink: Vec<Evaluation> = Vec::new();
    let who = Participant::anonymous("s");

    view.navigate(2, &mut panel);
    let mut next = None;
    for id in ["n3", "n5", "n1"] {
        if let EvaluationOutcome::Recorded { next_pending, .. } =
            view.evaluate(id, Vote::Up, None, &who, &mut sink).expect("note of the passage")
        {
            next = next_pending;
        }
    }
    // Current is n3; only n2 (index 1) is left, found after wrapping.
    assert_eq!(next, Some(1));

    view.navigate(1, &mut panel);
    let outcome = view.evaluate("n2", Vote::Up, None, &who, &mut sink).expect("note of the passage");
    assert!(matches!(outcome, EvaluationOutcome::Recorded { next_pending: None, .. }));
    assert!(view.navigator().is_complete());
    assert_eq!(view.stats().totals().useful, 4);
    assert_eq!(sink.len(), 4);
}
