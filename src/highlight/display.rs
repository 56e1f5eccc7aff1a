use std::fmt::Write;

use quick_xml::escape::escape;

use crate::notes::Annotation;

/// Whatever shows a note once its wrapper is clicked.
pub trait NoteDisplay {
    fn show(&mut self, note: &Annotation);
    fn not_found(&mut self, note_id: &str);
}

/// Renders the note panel markup into a string.
#[derive(Debug, Clone, Default)]
pub struct NotePanel {
    html: String,
}

impl NotePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup of the last note shown, empty before the first click.
    pub fn html(&self) -> &str {
        &self.html
    }
}

impl NoteDisplay for NotePanel {
    fn show(&mut self, note: &Annotation) {
        self.html.clear();
        let n = note.n.as_deref().unwrap_or_default();
        // Writing into a String cannot fail.
        let _ = write!(
            self.html,
            r#"<div class="note-display"><h5>Nota {}</h5><p>{}</p><div class="note-footer"><small class="note-id">ID: {}</small></div></div>"#,
            escape(n),
            escape(note.text.trim()),
            escape(note.id.as_str()),
        );
    }

    fn not_found(&mut self, note_id: &str) {
        tracing::debug!(note_id, "clicked note not found");
        self.html = "<p>Nota no encontrada.</p>".to_string();
    }
}
