//! Arena-based DOM shared by the TEI source, extracted fragments and the
//! rendered passage.
//!
//! All nodes of one tree live in a single vector and link to each other by
//! index. Fragments are always built in a fresh arena, so a rendered passage
//! can be mutated freely without touching the source document.

use std::borrow::Cow;

use html5ever::{LocalName, Namespace, QualName, ns};

/// Index of a node inside an [`ArenaDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node".
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    fn into_option(self) -> Option<NodeId> {
        self.is_some().then_some(self)
    }
}

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// Element attribute.
///
/// XML attributes keep their prefix (`xml:id` is prefix `xml`, local `id`),
/// HTML attributes carry the whole name as their local part. Lookups go
/// through [`Attribute::qualified_name`] so both spellings compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Attribute with XML naming rules: `p:local` splits into a prefix and a
    /// local name, and the `xml` prefix is bound to the XML namespace.
    pub fn qualified(name: &str, value: impl Into<String>) -> Self {
        let name = match name.split_once(':') {
            Some(("xml", local)) => {
                QualName::new(Some("xml".into()), ns!(xml), LocalName::from(local))
            }
            Some((prefix, local)) => {
                QualName::new(Some(prefix.into()), ns!(), LocalName::from(local))
            }
            None => QualName::new(None, ns!(), LocalName::from(name)),
        };
        Self {
            name,
            value: value.into(),
        }
    }

    /// Attribute with HTML naming rules: the name is taken verbatim.
    pub fn html(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }

    /// `prefix:local`, or just `local` when there is no prefix.
    pub fn qualified_name(&self) -> Cow<'_, str> {
        match &self.name.prefix {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix.as_ref(), self.name.local.as_ref())),
            None => Cow::Borrowed(self.name.local.as_ref()),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.qualified_name() == name
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-allocated DOM tree.
#[derive(Debug, Clone)]
pub struct ArenaDom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl ArenaDom {
    /// Create an empty tree holding only the document node.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of allocated nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the document node exists.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create an element in the HTML namespace.
    pub fn create_html_element(&mut self, local: &str, attrs: Vec<Attribute>) -> NodeId {
        self.create_element(QualName::new(None, ns!(html), LocalName::from(local)), attrs)
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text.into())))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`, moving it out of its
    /// current position first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if self.get(child).is_some_and(|n| n.parent.is_some()) {
            self.detach(child);
        }

        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` right before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        if self.get(new_node).is_some_and(|n| n.parent.is_some()) {
            self.detach(new_node);
        }

        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text, merging into the last child when it is already text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map_or(NodeId::NONE, |n| n.last_child);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(existing) = &mut last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings. Its own subtree stays intact.
    pub fn detach(&mut self, node: NodeId) {
        let (parent, prev, next) = match self.get(node) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(n) = self.get_mut(node) {
            n.parent = NodeId::NONE;
            n.prev_sibling = NodeId::NONE;
            n.next_sibling = NodeId::NONE;
        }
    }

    /// Move every child of `from` to the end of `to`, keeping their order.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let children: Vec<_> = self.children(from).collect();
        for child in children {
            self.append(to, child);
        }
    }

    /// Deep-copy `node` from another tree into this one. The copy is returned
    /// detached.
    pub fn import_subtree(&mut self, src: &ArenaDom, node: NodeId) -> NodeId {
        let data = match src.get(node) {
            Some(n) => n.data.clone(),
            None => return NodeId::NONE,
        };
        let copy = self.alloc(Node::new(data));
        for child in src.children(node) {
            let child_copy = self.import_subtree(src, child);
            self.append(copy, child_copy);
        }
        copy
    }

    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self.get(parent).map_or(NodeId::NONE, |n| n.first_child);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Preorder walk of the subtree below `root`, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let first = self.get(root).map_or(NodeId::NONE, |n| n.first_child);
        Descendants {
            dom: self,
            root,
            next: first,
        }
    }

    /// Preorder walk of the subtree rooted at `root`, `root` first.
    pub fn inclusive_descendants(&self, root: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        root.into_option()
            .into_iter()
            .chain(self.descendants(root))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent.into_option())
    }

    /// Inclusive ancestor chain, innermost first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(node.into_option(), move |&id| self.parent(id))
    }

    /// DOM `contains`: true when `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Nearest inclusive ancestor satisfying `predicate`.
    pub fn closest<F>(&self, node: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(NodeId) -> bool,
    {
        self.ancestors(node).find(|&id| predicate(id))
    }

    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).find(|&child| self.is_element(child))
    }

    /// First element (preorder) with the given local name.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.descendants(self.document)
            .find(|&id| self.element_name(id).is_some_and(|n| n.as_ref() == tag))
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.dom.get(id).map_or(NodeId::NONE, |n| n.next_sibling);
        Some(id)
    }
}

/// Preorder iterator that follows sibling links instead of keeping a stack.
pub struct Descendants<'a> {
    dom: &'a ArenaDom,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next;
        let node = self.dom.get(current)?;

        self.next = if node.first_child.is_some() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                match self.dom.get(cursor) {
                    Some(n) if n.next_sibling.is_some() => break n.next_sibling,
                    Some(n) => cursor = n.parent,
                    None => break NodeId::NONE,
                }
                if cursor.is_none() {
                    break NodeId::NONE;
                }
            }
        };

        Some(current)
    }
}

/// Element accessors.
impl ArenaDom {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Attribute value by qualified name (`xml:id`, `class`, ...).
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.is_named(attr_name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, id: NodeId, attr_name: &str) -> bool {
        self.get_attr(id, attr_name).is_some()
    }

    /// Set or replace an attribute. New attributes use HTML naming.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
        {
            match attrs.iter_mut().find(|a| a.is_named(attr_name)) {
                Some(existing) => existing.value = value,
                None => attrs.push(Attribute::html(attr_name, value)),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, attr_name: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
        {
            attrs.retain(|a| !a.is_named(attr_name));
        }
    }

    /// Plain HTML `id` attribute.
    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get_attr(id, "id")
    }

    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.get_attr(id, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    /// Add a class if missing. Returns true when the class list changed.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        if !self.is_element(id) || self.has_class(id, class) {
            return false;
        }
        let mut list: Vec<&str> = self.classes(id).collect();
        list.push(class);
        let joined = list.join(" ");
        self.set_attr(id, "class", joined);
        true
    }

    /// Remove a class if present. Returns true when the class list changed.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        if !self.has_class(id, class) {
            return false;
        }
        let joined = self
            .classes(id)
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", joined);
        true
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Content of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of every text node below `id`, in document order.
    pub fn text(&self, id: NodeId) -> String {
        self.inclusive_descendants(id)
            .filter_map(|n| self.text_content(n))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(dom: &mut ArenaDom, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| Attribute::qualified(k, *v))
            .collect();
        dom.create_element(QualName::new(None, ns!(), LocalName::from(tag)), attrs)
    }

    #[test]
    fn test_xml_id_matches_both_spellings() {
        let xml = Attribute::qualified("xml:id", "v1");
        let html = Attribute::html("xml:id", "v1");
        assert_eq!(xml.name.local.as_ref(), "id");
        assert_eq!(xml.name.ns, ns!(xml));
        assert!(xml.is_named("xml:id"));
        assert!(html.is_named("xml:id"));
        assert!(!xml.is_named("id"));
    }

    #[test]
    fn test_append_moves_attached_child() {
        let mut dom = ArenaDom::new();
        let a = el(&mut dom, "a", &[]);
        let b = el(&mut dom, "b", &[]);
        let c = el(&mut dom, "c", &[]);
        dom.append(dom.document(), a);
        dom.append(a, c);
        dom.append(dom.document(), b);

        dom.append(b, c);

        assert_eq!(dom.children(a).count(), 0);
        assert_eq!(dom.children(b).collect::<Vec<_>>(), vec![c]);
        assert_eq!(dom.parent(c), Some(b));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut dom = ArenaDom::new();
        let sp = el(&mut dom, "sp", &[]);
        let l1 = el(&mut dom, "l", &[]);
        let seg = el(&mut dom, "seg", &[]);
        let l2 = el(&mut dom, "l", &[]);
        dom.append(dom.document(), sp);
        dom.append(sp, l1);
        dom.append(l1, seg);
        dom.append(sp, l2);
        let after = el(&mut dom, "after", &[]);
        dom.append(dom.document(), after);

        let walked: Vec<_> = dom.descendants(sp).collect();
        assert_eq!(walked, vec![l1, seg, l2]);

        let inclusive: Vec<_> = dom.inclusive_descendants(l1).collect();
        assert_eq!(inclusive, vec![l1, seg]);
    }

    #[test]
    fn test_reparent_keeps_text_order() {
        let mut dom = ArenaDom::new();
        let l = el(&mut dom, "l", &[]);
        dom.append(dom.document(), l);
        dom.append_text(l, "Fuente");
        let seg = el(&mut dom, "seg", &[]);
        dom.append(l, seg);
        let space = dom.create_text(" ");
        dom.append(l, space);

        let wrapper = el(&mut dom, "span", &[]);
        dom.reparent_children(l, wrapper);
        dom.append(l, wrapper);

        assert_eq!(dom.children(l).collect::<Vec<_>>(), vec![wrapper]);
        let moved: Vec<_> = dom.children(wrapper).collect();
        assert_eq!(moved.len(), 3);
        assert_eq!(dom.text_content(moved[0]), Some("Fuente"));
        assert_eq!(moved[1], seg);
        assert_eq!(dom.text_content(moved[2]), Some(" "));
    }

    #[test]
    fn test_import_is_independent() {
        let mut src = ArenaDom::new();
        let l = el(&mut src, "l", &[("xml:id", "v10")]);
        src.append(src.document(), l);
        src.append_text(l, "Ovejuna");

        let mut copy = ArenaDom::new();
        let cloned = copy.import_subtree(&src, l);
        copy.append(copy.document(), cloned);
        copy.set_attr(cloned, "xml:id", "changed");
        copy.add_class(cloned, "note-active");

        assert_eq!(src.get_attr(l, "xml:id"), Some("v10"));
        assert!(!src.has_class(l, "note-active"));
        assert_eq!(copy.text(cloned), "Ovejuna");
    }

    #[test]
    fn test_class_editing() {
        let mut dom = ArenaDom::new();
        let span = el(&mut dom, "span", &[("class", "note-wrapper")]);
        assert!(dom.add_class(span, "note-active"));
        assert!(!dom.add_class(span, "note-active"));
        assert_eq!(dom.get_attr(span, "class"), Some("note-wrapper note-active"));
        assert!(dom.remove_class(span, "note-wrapper"));
        assert_eq!(dom.get_attr(span, "class"), Some("note-active"));
    }

    #[test]
    fn test_contains_and_closest() {
        let mut dom = ArenaDom::new();
        let sp = el(&mut dom, "sp", &[]);
        let l = el(&mut dom, "l", &[]);
        dom.append(dom.document(), sp);
        dom.append(sp, l);

        assert!(dom.contains(sp, l));
        assert!(dom.contains(l, l));
        assert!(!dom.contains(l, sp));
        let found = dom.closest(l, |id| dom.element_name(id).is_some_and(|n| n.as_ref() == "sp"));
        assert_eq!(found, Some(sp));
    }
}
