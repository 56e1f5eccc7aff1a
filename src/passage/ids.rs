use std::collections::HashSet;

use super::Fragment;

/// Every value of `id_attr` in the fragment, in document order.
///
/// The container itself is included. Repeated values are reported once.
pub fn collect_ids(fragment: &Fragment, id_attr: &str) -> Vec<String> {
    let dom = &fragment.dom;
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for node in dom.inclusive_descendants(fragment.root) {
        if let Some(id) = dom.get_attr(node, id_attr)
            && seen.insert(id)
        {
            ids.push(id.to_string());
        }
    }

    ids
}
