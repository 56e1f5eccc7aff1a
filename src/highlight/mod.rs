//! Note highlighting on a rendered passage.
//!
//! [`HighlightEngine::apply`] wraps every note target and records which notes
//! each wrapper belongs to. The resulting [`Highlights`] registry then drives
//! activation, either through pointer events ([`dispatch`]) or through
//! navigation ([`ActivationController::set_current`]).

mod activation;
mod display;
mod engine;
mod events;
mod groups;
mod options;

pub use activation::ActivationController;
pub use display::{NoteDisplay, NotePanel};
pub use engine::{ApplyReport, HighlightEngine, UnresolvedTarget};
pub use events::{PointerEvent, Response, dispatch};
pub use groups::{GroupSet, Highlights, Wrapper};
pub use options::HighlightOptions;
