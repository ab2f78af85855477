use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// Handle into a [`Document`]. Stale once the node is removed, even if the
/// slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    pub key: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub hidden: bool,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Element>,
}

/// Arena-backed element tree. Keys play the role of element ids.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    keys: HashMap<String, NodeId>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            keys: HashMap::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        doc.root = doc.alloc(Element::new("body"));
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, element: Element) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(element);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(element),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.slots
            .get(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn by_key(&self, key: &str) -> Option<NodeId> {
        self.keys.get(key).copied().filter(|id| self.contains(*id))
    }

    /// Attach `element` as the last child of `parent`. `None` if the parent is gone.
    pub fn append(&mut self, parent: NodeId, mut element: Element) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        element.parent = Some(parent);
        element.children.clear();
        let key = element.key.clone();
        let id = self.alloc(element);
        if let Some(key) = key {
            self.keys.insert(key, id);
        }
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Detach and free `id` and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        let parent = self.get(id).and_then(|e| e.parent);
        if let Some(p) = parent.and_then(|p| self.get_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        self.free_subtree(id);
        true
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = match self.get_mut(id) {
            Some(e) => std::mem::take(&mut e.children),
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|s| s.generation == current.generation)
            else {
                continue;
            };
            let Some(element) = slot.node.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
            if let Some(key) = &element.key {
                if self.keys.get(key) == Some(&current) {
                    self.keys.remove(key);
                }
            }
            stack.extend(element.children);
        }
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(e) => {
                e.text = Some(text.into());
                true
            }
            None => false,
        }
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> bool {
        match self.get_mut(id) {
            Some(e) => {
                e.hidden = hidden;
                true
            }
            None => false,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: Option<&str>) -> bool {
        match self.get_mut(id) {
            Some(e) => {
                match value {
                    Some(v) => e.attrs.insert(name.to_string(), v.to_string()),
                    None => e.attrs.remove(name),
                };
                true
            }
            None => false,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Element::children).unwrap_or(&[])
    }

    /// `id` followed by each ancestor up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.contains(id).then_some(id), move |n| {
            self.get(*n).and_then(Element::parent)
        })
    }

    /// Nearest node, starting at `id` itself, carrying `class`.
    pub fn closest(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.ancestors(id)
            .find(|n| self.get(*n).is_some_and(|e| e.has_class(class)))
    }

    /// Live nodes carrying `class`, in tree order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(e) = self.get(id) else { continue };
            if e.has_class(class) {
                found.push(id);
            }
            stack.extend(e.children.iter().rev().copied());
        }
        found
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text_of(&self, key: &str) -> Option<&str> {
        self.by_key(key)
            .and_then(|id| self.get(id))
            .and_then(|e| e.text.as_deref())
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(self.root, 0, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(e) = self.get(id) else { return };
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{}<{}", indent, e.tag);
        if let Some(key) = &e.key {
            let _ = write!(out, " id=\"{}\"", escape(key));
        }
        if !e.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&e.classes.join(" ")));
        }
        for (name, value) in &e.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if e.hidden {
            out.push_str(" hidden");
        }
        out.push('>');
        if let Some(text) = &e.text {
            out.push_str(&escape(text));
        }
        if e.children.is_empty() {
            let _ = writeln!(out, "</{}>", e.tag);
            return;
        }
        out.push('\n');
        for child in &e.children {
            self.write_html(*child, depth + 1, out);
        }
        let _ = writeln!(out, "{}</{}>", indent, e.tag);
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
