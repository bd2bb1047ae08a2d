use super::style::{ElementStyle, Size};
use smartstring::{LazyCompact, SmartString};

/// Unique identifier for a visual element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

#[derive(Debug, Clone, Default)]
pub struct ElementData {
    pub tag: SmartString<LazyCompact>,
    pub text: String,
    pub style: ElementStyle,
    /// Content box reported by layout; hosts feed this in.
    pub client_size: Size,
    pub children: Vec<ElementId>,
}

/// Arena-based visual tree.
///
/// Elements are created detached and attached with [`Dom::append_child`] or
/// [`Dom::insert_before`]. An element has at most one parent; attaching it
/// elsewhere detaches it first.
pub struct Dom {
    nodes: Vec<Option<ElementData>>,
    parents: Vec<Option<ElementId>>,
    free_list: Vec<u32>,
}

impl Dom {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            parents: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let data = ElementData {
            tag: tag.into(),
            ..ElementData::default()
        };

        let index = if let Some(idx) = self.free_list.pop() {
            idx as usize
        } else {
            self.nodes.len()
        };

        if index >= self.nodes.len() {
            self.nodes.push(Some(data));
            self.parents.push(None);
        } else {
            self.nodes[index] = Some(data);
            self.parents[index] = None;
        }

        ElementId(index as u32)
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementData> {
        self.nodes.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id.0 as usize)?.as_mut()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        *self.parents.get(id.0 as usize)?
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// Detach `child` from its current parent, if any.
    pub fn detach(&mut self, child: ElementId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != child);
        }
        self.parents[child.0 as usize] = None;
    }

    /// Append `child` as the last child of `parent`.
    /// Returns false when either element is missing or the move would create a cycle.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if !self.can_adopt(parent, child) {
            return false;
        }
        self.detach(child);
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        self.parents[child.0 as usize] = Some(parent);
        true
    }

    /// Insert `child` into `parent` immediately before `reference`.
    /// `reference` must already be a child of `parent`.
    pub fn insert_before(&mut self, parent: ElementId, child: ElementId, reference: ElementId) -> bool {
        if child == reference || self.parent(reference) != Some(parent) {
            return false;
        }
        if !self.can_adopt(parent, child) {
            return false;
        }
        self.detach(child);
        let Some(p) = self.get_mut(parent) else {
            return false;
        };
        let index = p
            .children
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(p.children.len());
        p.children.insert(index, child);
        self.parents[child.0 as usize] = Some(parent);
        true
    }

    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// Replace all content of `id` with a text run.
    pub fn set_text_content(&mut self, id: ElementId, text: impl Into<String>) {
        let children: Vec<ElementId> = self.children(id).to_vec();
        for child in children {
            self.detach(child);
        }
        if let Some(e) = self.get_mut(id) {
            e.text = text.into();
        }
    }

    /// Own text followed by descendants' text, in tree order.
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        if let Some(e) = self.get(id) {
            out.push_str(&e.text);
            for child in &e.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// Remove an element and its whole subtree.
    pub fn dispose(&mut self, id: ElementId) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let idx = current.0 as usize;
            if let Some(data) = self.nodes[idx].take() {
                stack.extend(data.children);
                self.parents[idx] = None;
                self.free_list.push(current.0);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn can_adopt(&self, parent: ElementId, child: ElementId) -> bool {
        if !self.contains(parent) || !self.contains(child) {
            return false;
        }
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return false;
            }
            cursor = self.parent(current);
        }
        true
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}
