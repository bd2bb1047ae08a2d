use super::arena::{Dom, ElementId};
use super::style::{CssLength, ElementStyle, Size};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to the visual tree.
///
/// Cloning is cheap; every clone sees the same elements. Borrows are scoped
/// to each call, so callbacks handed a `Document` may mutate it freely.
#[derive(Clone, Default)]
pub struct Document {
    inner: Rc<RefCell<Dom>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&self, tag: &str) -> ElementId {
        self.inner.borrow_mut().create_element(tag)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.inner.borrow().contains(id)
    }

    pub fn tag(&self, id: ElementId) -> Option<String> {
        self.inner.borrow().get(id).map(|e| e.tag.to_string())
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.inner.borrow().parent(id)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.inner.borrow().children(id).to_vec()
    }

    pub fn append_child(&self, parent: ElementId, child: ElementId) -> bool {
        self.inner.borrow_mut().append_child(parent, child)
    }

    pub fn insert_before(&self, parent: ElementId, child: ElementId, reference: ElementId) -> bool {
        self.inner.borrow_mut().insert_before(parent, child, reference)
    }

    pub fn remove_child(&self, parent: ElementId, child: ElementId) -> bool {
        self.inner.borrow_mut().remove_child(parent, child)
    }

    pub fn detach(&self, id: ElementId) {
        self.inner.borrow_mut().detach(id);
    }

    pub fn dispose(&self, id: ElementId) {
        self.inner.borrow_mut().dispose(id);
    }

    pub fn set_text_content(&self, id: ElementId, text: impl Into<String>) {
        self.inner.borrow_mut().set_text_content(id, text);
    }

    pub fn text_content(&self, id: ElementId) -> String {
        self.inner.borrow().text_content(id)
    }

    pub fn style(&self, id: ElementId) -> ElementStyle {
        self.inner
            .borrow()
            .get(id)
            .map(|e| e.style.clone())
            .unwrap_or_default()
    }

    pub fn set_width(&self, id: ElementId, width: CssLength) {
        if let Some(e) = self.inner.borrow_mut().get_mut(id) {
            e.style.width = Some(width);
        }
    }

    pub fn set_height(&self, id: ElementId, height: CssLength) {
        if let Some(e) = self.inner.borrow_mut().get_mut(id) {
            e.style.height = Some(height);
        }
    }

    pub fn client_size(&self, id: ElementId) -> Size {
        self.inner
            .borrow()
            .get(id)
            .map(|e| e.client_size)
            .unwrap_or_default()
    }

    pub fn set_client_size(&self, id: ElementId, size: Size) {
        if let Some(e) = self.inner.borrow_mut().get_mut(id) {
            e.client_size = size;
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.inner.borrow().len())
            .finish()
    }
}
