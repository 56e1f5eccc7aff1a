/// Names and markers the highlight pass writes into the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Stable identifier attribute targets are resolved against.
    pub id_attr: String,
    pub wrapper_tag: String,
    pub wrapper_class: String,
    pub target_class: String,
    pub active_class: String,
    pub current_class: String,
    /// Space-joined group ids.
    pub groups_attr: String,
    /// Set once handlers are attached.
    pub events_attr: String,
    /// Substring marking a sub-line target (`seg-12`).
    pub segment_marker: String,
    /// When true a click also makes the clicked note current.
    pub select_on_click: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            id_attr: "xml:id".to_string(),
            wrapper_tag: "span".to_string(),
            wrapper_class: "note-wrapper".to_string(),
            target_class: "note-target".to_string(),
            active_class: "note-active".to_string(),
            current_class: "note-current".to_string(),
            groups_attr: "data-note-groups".to_string(),
            events_attr: "data-note-events".to_string(),
            segment_marker: "seg-".to_string(),
            select_on_click: false,
        }
    }
}

impl HighlightOptions {
    pub fn with_id_attr(mut self, attr: impl Into<String>) -> Self {
        self.id_attr = attr.into();
        self
    }

    pub fn with_wrapper(mut self, tag: impl Into<String>, class: impl Into<String>) -> Self {
        self.wrapper_tag = tag.into();
        self.wrapper_class = class.into();
        self
    }

    pub fn with_state_classes(mut self, active: impl Into<String>, current: impl Into<String>) -> Self {
        self.active_class = active.into();
        self.current_class = current.into();
        self
    }

    pub fn with_segment_marker(mut self, marker: impl Into<String>) -> Self {
        self.segment_marker = marker.into();
        self
    }

    pub fn with_select_on_click(mut self, select: bool) -> Self {
        self.select_on_click = select;
        self
    }
}
