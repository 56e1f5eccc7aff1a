//! # glosa
//!
//! Align scholarly notes with passages of a TEI play and drive grouped
//! highlights over the rendered text.
//!
//! ## Features
//!
//! - Cut a passage out of a TEI document between two stable ids
//! - Find the notes whose targets fall inside the passage
//! - Wrap note targets, grouping spans that share a note
//! - Hover and click activation, note-by-note navigation and reader
//!   evaluations
//!
//! ## Quick Start
//!
//! ```
//! use glosa::{Edition, Passage, TeiHtmlRenderer};
//! use glosa::notes::Annotation;
//!
//! let tei = r#"<TEI><text><body>
//!   <sp xml:id="sp1"><l xml:id="v1">Fuenteovejuna, señor.</l></sp>
//!   <sp xml:id="sp2"><l xml:id="v2">¿Quién mató al Comendador?</l></sp>
//! </body></text></TEI>"#.as_bytes();
//! let notes = vec![Annotation::new("n1", "#v1 #v2").with_text("Pregunta del juez.")];
//!
//! let edition = Edition::open(tei, notes).unwrap();
//! let mut view = edition
//!     .passage(&Passage::new("p1", "sp1", "sp2"), &TeiHtmlRenderer::default())
//!     .unwrap();
//!
//! assert_eq!(view.ids(), ["sp1", "v1", "sp2", "v2"]);
//! let report = view.apply_highlights();
//! assert_eq!(report.wrappers_created, 2);
//! ```
//!
//! ## Working with the pieces
//!
//! [`Edition`] strings the stages together, but each is usable alone:
//! [`passage::extract`], [`passage::collect_ids`], [`notes::filter`],
//! [`HighlightEngine`] and the [`highlight::ActivationController`].

pub mod dom;
pub mod edition;
pub mod error;
pub mod evaluation;
pub mod highlight;
pub mod navigation;
pub mod notes;
pub mod passage;
pub mod render;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use edition::{Edition, EvaluationOutcome, PassageView};
pub use error::{Error, Result};
pub use evaluation::{Evaluation, EvaluationSink, EvaluationStats, Participant, Vote};
pub use highlight::{HighlightEngine, HighlightOptions, Highlights, NotePanel, PointerEvent, Response};
pub use navigation::NoteNavigator;
pub use notes::Annotation;
pub use passage::{ExtractOptions, Fragment, Passage};
pub use render::{Renderer, TeiHtmlRenderer};
