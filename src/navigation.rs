//! Stepping through the notes of a passage one at a time.

use std::collections::HashSet;

use crate::notes::Annotation;

/// Position within a passage's notes plus the set already evaluated.
#[derive(Debug, Clone, Default)]
pub struct NoteNavigator {
    ids: Vec<String>,
    current: Option<usize>,
    evaluated: HashSet<String>,
}

impl NoteNavigator {
    /// Navigator over `notes`, in the order given. Nothing is current yet.
    pub fn new<'a>(notes: impl IntoIterator<Item = &'a Annotation>) -> Self {
        Self {
            ids: notes.into_iter().map(|n| n.id.clone()).collect(),
            current: None,
            evaluated: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Index of the current note.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Id of the current note.
    pub fn current(&self) -> Option<&str> {
        self.current.map(|i| self.ids[i].as_str())
    }

    pub fn index_of(&self, note_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == note_id)
    }

    /// Move to `index`. Out of range leaves the position unchanged.
    pub fn go_to(&mut self, index: usize) -> Option<&str> {
        if index >= self.ids.len() {
            return None;
        }
        self.current = Some(index);
        Some(self.ids[index].as_str())
    }

    /// Move forward; from no position, move to the first note.
    pub fn next(&mut self) -> Option<&str> {
        let index = self.current.map_or(0, |i| i + 1);
        self.go_to(index)
    }

    pub fn previous(&mut self) -> Option<&str> {
        let index = self.current?.checked_sub(1)?;
        self.go_to(index)
    }

    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|i| i > 0)
    }

    pub fn has_next(&self) -> bool {
        match self.current {
            Some(i) => i + 1 < self.ids.len(),
            None => !self.ids.is_empty(),
        }
    }

    pub fn mark_evaluated(&mut self, note_id: &str) {
        self.evaluated.insert(note_id.to_string());
    }

    pub fn is_evaluated(&self, note_id: &str) -> bool {
        self.evaluated.contains(note_id)
    }

    /// `(evaluated, total)` over the notes of this passage.
    pub fn progress(&self) -> (usize, usize) {
        let done = self.ids.iter().filter(|id| self.evaluated.contains(*id)).count();
        (done, self.ids.len())
    }

    pub fn is_complete(&self) -> bool {
        let (done, total) = self.progress();
        done == total
    }

    /// Index of the next note still to evaluate.
    ///
    /// Looks after the current note first, then wraps around to the start,
    /// stopping short of the current note.
    pub fn next_pending(&self) -> Option<usize> {
        let start = self.current.map_or(0, |i| i + 1);
        let end = self.current.unwrap_or(0);
        let pending = |&i: &usize| !self.evaluated.contains(&self.ids[i]);

        (start..self.ids.len())
            .find(pending)
            .or_else(|| (0..end).find(pending))
    }
}
