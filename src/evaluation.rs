//! Reader evaluations of notes.
//!
//! Storing evaluations is someone else's job: [`EvaluationSink`] is the seam
//! where a persistence layer plugs in. This module builds the records, keeps
//! per-note tallies and identifies who voted.

use std::collections::HashMap;
use std::fmt;

use crate::notes::Annotation;

/// `source` of every record built here.
pub const EVALUATION_SOURCE: &str = "editor-social";
/// `event_type` of every record built here.
pub const EVALUATION_EVENT: &str = "nota_eval";

/// A reader's verdict on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Vote {
    /// Useful.
    Up,
    /// Needs improvement.
    Down,
}

impl Vote {
    /// Parse `up`/`util`/`useful` or `down`/`mejorable` (case-insensitive).
    pub fn parse(s: &str) -> Option<Vote> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "util" | "useful" => Some(Vote::Up),
            "down" | "mejorable" => Some(Vote::Down),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Vote::Up => "up",
            Vote::Down => "down",
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluation event, shaped like the row the persistence layer stores.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub source: String,
    pub event_type: String,
    pub session_id: String,
    #[cfg_attr(feature = "json", serde(rename = "pasaje_id"))]
    pub passage_id: Option<String>,
    #[cfg_attr(feature = "json", serde(rename = "nota_id"))]
    pub note_id: String,
    #[cfg_attr(feature = "json", serde(rename = "nota_version"))]
    pub note_version: Option<String>,
    pub vote: Vote,
    pub comment: Option<String>,
}

impl Evaluation {
    /// Build a record for `note`.
    ///
    /// A comment is only kept on a [`Vote::Down`]; it is trimmed and dropped
    /// when empty.
    pub fn new(session_id: impl Into<String>, note: &Annotation, vote: Vote, comment: Option<&str>) -> Self {
        let comment = match vote {
            Vote::Down => comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            Vote::Up => None,
        };

        Self {
            timestamp: crate::util::time_now_secs(),
            source: EVALUATION_SOURCE.to_string(),
            event_type: EVALUATION_EVENT.to_string(),
            session_id: session_id.into(),
            passage_id: None,
            note_id: note.id.clone(),
            note_version: note.version.clone(),
            vote,
            comment,
        }
    }

    pub fn with_passage(mut self, passage_id: impl Into<String>) -> Self {
        self.passage_id = Some(passage_id.into());
        self
    }
}

/// Vote tally of one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationStats {
    pub total: u32,
    #[cfg_attr(feature = "json", serde(alias = "utiles", default))]
    pub useful: u32,
    #[cfg_attr(feature = "json", serde(alias = "mejorables", default))]
    pub needs_improvement: u32,
}

impl EvaluationStats {
    pub fn record(&mut self, vote: Vote) {
        self.total += 1;
        match vote {
            Vote::Up => self.useful += 1,
            Vote::Down => self.needs_improvement += 1,
        }
    }
}

/// Tallies for every note of a passage, seeded from the loaded notes.
#[derive(Debug, Clone, Default)]
pub struct StatsLedger {
    by_note: HashMap<String, EvaluationStats>,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the tallies the notes were loaded with.
    pub fn from_notes<'a>(notes: impl IntoIterator<Item = &'a Annotation>) -> Self {
        let by_note = notes
            .into_iter()
            .filter_map(|n| n.evaluations.map(|stats| (n.id.clone(), stats)))
            .collect();
        Self { by_note }
    }

    /// Count a vote and return the note's updated tally.
    pub fn record(&mut self, note_id: &str, vote: Vote) -> EvaluationStats {
        let stats = self.by_note.entry(note_id.to_string()).or_default();
        stats.record(vote);
        *stats
    }

    /// Tally of a note; all zeros when it was never evaluated.
    pub fn get(&self, note_id: &str) -> EvaluationStats {
        self.by_note.get(note_id).copied().unwrap_or_default()
    }

    /// Sum over every note.
    pub fn totals(&self) -> EvaluationStats {
        self.by_note
            .values()
            .fold(EvaluationStats::default(), |acc, s| EvaluationStats {
                total: acc.total + s.total,
                useful: acc.useful + s.useful,
                needs_improvement: acc.needs_improvement + s.needs_improvement,
            })
    }
}

/// How a reader chose to take part.
///
/// Only the session id ever reaches an evaluation record; the rest stays
/// with the participant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "modo", rename_all = "lowercase"))]
pub enum Participant {
    #[cfg_attr(feature = "json", serde(rename = "anonimo"))]
    Anonymous { session_id: String },
    #[cfg_attr(feature = "json", serde(rename = "lector"))]
    Reader {
        session_id: String,
        #[cfg_attr(feature = "json", serde(alias = "nivel_estudios", default))]
        education: Option<String>,
        #[cfg_attr(feature = "json", serde(alias = "disciplina", default))]
        discipline: Option<String>,
    },
    #[cfg_attr(feature = "json", serde(rename = "colaborador"))]
    Collaborator {
        session_id: String,
        collaborator_id: String,
        display_name: Option<String>,
    },
}

impl Participant {
    pub fn anonymous(session_id: impl Into<String>) -> Self {
        Participant::Anonymous {
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        match self {
            Participant::Anonymous { session_id }
            | Participant::Reader { session_id, .. }
            | Participant::Collaborator { session_id, .. } => session_id,
        }
    }

    /// Short label for logs.
    pub fn mode(&self) -> &'static str {
        match self {
            Participant::Anonymous { .. } => "anonymous",
            Participant::Reader { .. } => "reader",
            Participant::Collaborator { .. } => "collaborator",
        }
    }
}

/// Receives evaluation records. Returns false when the record was rejected
/// (storage failure, validation), in which case nothing is counted.
pub trait EvaluationSink {
    fn submit(&mut self, evaluation: &Evaluation) -> bool;
}

impl EvaluationSink for Vec<Evaluation> {
    fn submit(&mut self, evaluation: &Evaluation) -> bool {
        self.push(evaluation.clone());
        true
    }
}
