//! WASM bindings for rendering annotated passages in the browser.
//!
//! Notes cross the boundary as the same JSON array the CLI reads.

use wasm_bindgen::prelude::*;

use crate::highlight::{HighlightEngine, Highlights};
use crate::notes::parse_notes_json;
use crate::render::parse_rendered_html;
use crate::{Edition, Passage, TeiHtmlRenderer};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Extract `start..=end` from TEI bytes and return it highlighted.
#[wasm_bindgen]
pub fn render_passage(tei: &[u8], notes_json: &str, start: &str, end: &str) -> Result<String, JsValue> {
    let notes = parse_notes_json(notes_json).map_err(js_err)?;
    let edition = Edition::open(tei, notes).map_err(js_err)?;
    let mut view = edition
        .passage(&Passage::new(format!("{start}-{end}"), start, end), &TeiHtmlRenderer::default())
        .map_err(js_err)?;
    view.apply_highlights();
    Ok(view.to_html())
}

/// Highlight HTML that was rendered elsewhere. Returns the `<body>` markup.
#[wasm_bindgen]
pub fn highlight_rendered_html(html: &str, notes_json: &str) -> Result<String, JsValue> {
    let notes = parse_notes_json(notes_json).map_err(js_err)?;
    let mut fragment = parse_rendered_html(html);
    let mut highlights = Highlights::new();
    HighlightEngine::default().apply(&mut fragment, &notes, &mut highlights);
    Ok(fragment.to_html())
}

/// Stable ids inside `start..=end`, as a JSON array.
#[wasm_bindgen]
pub fn passage_ids(tei: &[u8], start: &str, end: &str) -> Result<String, JsValue> {
    let edition = Edition::open(tei, Vec::new()).map_err(js_err)?;
    let view = edition
        .passage(&Passage::new(format!("{start}-{end}"), start, end), &TeiHtmlRenderer::default())
        .map_err(js_err)?;
    serde_json::to_string(view.ids()).map_err(js_err)
}
