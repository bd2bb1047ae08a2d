use crate::dom::{Document, ElementId};
use crate::native::NativeHandle;
use tracing::debug;

/// Visual element backing a native object: its element, else its container.
pub fn visual_element(native: &NativeHandle) -> Option<ElementId> {
    native.with(|object| object.element().or_else(|| object.container()))
}

/// Move `subject`'s visual element right before `reference`'s.
///
/// Only works when both resolve to an element and the two share a parent.
/// Returns false without touching the document otherwise.
pub fn try_reorder(document: &Document, subject: &NativeHandle, reference: &NativeHandle) -> bool {
    let (Some(element), Some(before)) = (visual_element(subject), visual_element(reference)) else {
        debug!("reorder skipped: no visual element");
        return false;
    };
    if element == before {
        return false;
    }
    let parent = match (document.parent(element), document.parent(before)) {
        (Some(a), Some(b)) if a == b => a,
        _ => {
            debug!(?element, ?before, "reorder skipped: elements have different parents");
            return false;
        }
    };
    document.insert_before(parent, element, before)
}
