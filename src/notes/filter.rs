use std::collections::HashSet;

use super::Annotation;

/// Notes with at least one target in `ids`, in input order.
pub fn filter<'a>(all: &'a [Annotation], ids: &HashSet<String>) -> Vec<&'a Annotation> {
    all.iter()
        .filter(|note| note.targets().any(|t| ids.contains(t)))
        .collect()
}
