//! An annotated edition and the passages rendered from it.
//!
//! ```
//! use glosa::{Edition, Passage, TeiHtmlRenderer};
//! use glosa::notes::Annotation;
//! use glosa::dom::parse_xml;
//!
//! let tei = parse_xml(r#"<body><sp xml:id="sp1"><l xml:id="v1">Fuenteovejuna</l></sp></body>"#).unwrap();
//! let edition = Edition::from_parts(tei, vec![Annotation::new("n1", "#v1")]);
//!
//! let mut view = edition
//!     .passage(&Passage::new("p1", "sp1", "sp1"), &TeiHtmlRenderer::default())
//!     .unwrap();
//! view.apply_highlights();
//! assert!(view.to_html().contains(r#"data-note-groups="n1""#));
//! ```

use std::collections::HashSet;
use std::path::Path;

use crate::dom::{ArenaDom, NodeId, parse_xml_bytes};
use crate::error::{Error, Result};
use crate::evaluation::{Evaluation, EvaluationSink, EvaluationStats, Participant, StatsLedger, Vote};
use crate::highlight::{
    ApplyReport, HighlightEngine, HighlightOptions, Highlights, NoteDisplay, PointerEvent, Response, dispatch,
};
use crate::navigation::NoteNavigator;
use crate::notes::{Annotation, filter};
use crate::passage::{ExtractOptions, Fragment, Passage, collect_ids, extract};
use crate::render::Renderer;

/// A parsed TEI play with its notes. Read-only once built.
#[derive(Debug, Clone)]
pub struct Edition {
    source: ArenaDom,
    notes: Vec<Annotation>,
    extract_options: ExtractOptions,
    highlight_options: HighlightOptions,
}

impl Edition {
    pub fn from_parts(source: ArenaDom, notes: Vec<Annotation>) -> Self {
        Self {
            source,
            notes,
            extract_options: ExtractOptions::default(),
            highlight_options: HighlightOptions::default(),
        }
    }

    /// Parse TEI bytes (any encoding the prolog declares).
    pub fn open(tei: &[u8], notes: Vec<Annotation>) -> Result<Self> {
        Ok(Self::from_parts(parse_xml_bytes(tei)?, notes))
    }

    /// Read a TEI file from disk.
    pub fn from_file(path: impl AsRef<Path>, notes: Vec<Annotation>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), bytes = bytes.len(), "read TEI source");
        Self::open(&bytes, notes)
    }

    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    pub fn with_highlight_options(mut self, options: HighlightOptions) -> Self {
        self.highlight_options = options;
        self
    }

    pub fn source(&self) -> &ArenaDom {
        &self.source
    }

    pub fn notes(&self) -> &[Annotation] {
        &self.notes
    }

    /// Extract, index, filter and render `passage`.
    ///
    /// Fails only when a boundary id is missing from the source; the caller
    /// should report the passage as unavailable.
    pub fn passage(&self, passage: &Passage, renderer: &dyn Renderer) -> Result<PassageView> {
        let fragment = extract(&self.source, &passage.start, &passage.end, &self.extract_options)?;
        let ids = collect_ids(&fragment, &self.extract_options.id_attr);

        let id_set: HashSet<String> = ids.iter().cloned().collect();
        let notes: Vec<Annotation> = filter(&self.notes, &id_set).into_iter().cloned().collect();
        tracing::debug!(
            passage = %passage.id,
            ids = ids.len(),
            notes = notes.len(),
            "prepared passage"
        );

        Ok(PassageView {
            passage_id: passage.id.clone(),
            fragment: renderer.render(&fragment),
            ids,
            navigator: NoteNavigator::new(&notes),
            stats: StatsLedger::from_notes(&notes),
            notes,
            highlights: Highlights::new(),
            engine: HighlightEngine::new(self.highlight_options.clone()),
            report: None,
        })
    }
}

/// Result of [`PassageView::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationOutcome {
    /// The sink refused the record; nothing was counted.
    Rejected,
    Recorded {
        stats: EvaluationStats,
        /// Next note still to evaluate, if any.
        next_pending: Option<usize>,
    },
}

/// One rendered passage and all state tied to it.
#[derive(Debug, Clone)]
pub struct PassageView {
    passage_id: String,
    fragment: Fragment,
    ids: Vec<String>,
    notes: Vec<Annotation>,
    highlights: Highlights,
    engine: HighlightEngine,
    navigator: NoteNavigator,
    stats: StatsLedger,
    report: Option<ApplyReport>,
}

impl PassageView {
    pub fn passage_id(&self) -> &str {
        &self.passage_id
    }

    /// Stable ids found in the passage, in document order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Notes of this passage, in the order of the edition's note list.
    pub fn notes(&self) -> &[Annotation] {
        &self.notes
    }

    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    pub fn navigator(&self) -> &NoteNavigator {
        &self.navigator
    }

    pub fn stats(&self) -> &StatsLedger {
        &self.stats
    }

    /// Report of the last highlight pass.
    pub fn report(&self) -> Option<&ApplyReport> {
        self.report.as_ref()
    }

    /// Wrap the passage's note targets. Calling it again changes nothing.
    pub fn apply_highlights(&mut self) -> &ApplyReport {
        let report = self
            .engine
            .apply(&mut self.fragment, &self.notes, &mut self.highlights);
        self.report.insert(report)
    }

    /// Route a pointer event to the wrapper it hits.
    pub fn dispatch(&mut self, event: PointerEvent, display: &mut dyn NoteDisplay) -> Response {
        let response = dispatch(
            event,
            &mut self.fragment,
            &mut self.highlights,
            &self.notes,
            display,
            self.engine.options(),
        );
        if let Response::Selected(id) = &response
            && self.engine.options().select_on_click
            && let Some(index) = self.navigator.index_of(id)
        {
            self.navigator.go_to(index);
        }
        response
    }

    /// Make the note at `index` current, show it, and return the wrapper to
    /// scroll into view. Out-of-range indices change nothing.
    pub fn navigate(&mut self, index: usize, display: &mut dyn NoteDisplay) -> Option<NodeId> {
        let id = self.navigator.go_to(index)?.to_string();
        if let Some(note) = self.notes.iter().find(|n| n.id == id) {
            display.show(note);
        }

        let mut activation = self.highlights.activation();
        let scroll_to = activation.set_current(&self.fragment.dom, &id);
        activation.sync(&mut self.fragment.dom, self.engine.options());
        scroll_to
    }

    /// Record a reader's verdict on a note of this passage.
    ///
    /// The record goes to `sink` first; the vote is only counted and the note
    /// only marked evaluated when the sink accepts it.
    pub fn evaluate(
        &mut self,
        note_id: &str,
        vote: Vote,
        comment: Option<&str>,
        participant: &Participant,
        sink: &mut dyn EvaluationSink,
    ) -> Result<EvaluationOutcome> {
        let note = self
            .notes
            .iter()
            .find(|n| n.id == note_id)
            .ok_or_else(|| Error::UnknownNote(note_id.to_string()))?;

        let evaluation = Evaluation::new(participant.session_id(), note, vote, comment)
            .with_passage(self.passage_id.as_str());
        if !sink.submit(&evaluation) {
            tracing::warn!(note_id, mode = participant.mode(), "evaluation rejected");
            return Ok(EvaluationOutcome::Rejected);
        }

        let stats = self.stats.record(note_id, vote);
        self.navigator.mark_evaluated(note_id);
        tracing::debug!(note_id, %vote, total = stats.total, "evaluation recorded");

        Ok(EvaluationOutcome::Recorded {
            stats,
            next_pending: self.navigator.next_pending(),
        })
    }

    /// Current HTML of the rendered passage.
    pub fn to_html(&self) -> String {
        self.fragment.to_html()
    }
}
