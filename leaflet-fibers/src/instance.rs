use crate::applier::{apply_prop, Applied, Subscriptions};
use crate::dom::ElementId;
use crate::kind::{Category, ElementKind};
use crate::native::{NativeHandle, SharedMap};
use crate::props::Props;
use tracing::trace;

/// One live native object plus the bookkeeping the host needs.
///
/// The category is fixed by the kind at creation. `declared_props` is the
/// last applied prop set; handlers subscribed from it are tracked so a
/// later update can replace or drop them.
#[derive(Debug)]
pub struct Instance {
    kind: ElementKind,
    category: Category,
    native: NativeHandle,
    declared_props: Props,
    subscriptions: Subscriptions,
    content: Option<ElementId>,
}

impl Instance {
    pub(crate) fn new(
        kind: ElementKind,
        native: NativeHandle,
        declared_props: Props,
        subscriptions: Subscriptions,
    ) -> Self {
        Self {
            category: kind.category(),
            kind,
            native,
            declared_props,
            subscriptions,
            content: None,
        }
    }

    /// Detached element this instance created for its content.
    pub(crate) fn with_content(mut self, content: ElementId) -> Self {
        self.content = Some(content);
        self
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn native(&self) -> &NativeHandle {
        &self.native
    }

    /// The native map, for map-category instances.
    pub fn map(&self) -> Option<&SharedMap> {
        self.native.as_map()
    }

    pub fn declared_props(&self) -> &Props {
        &self.declared_props
    }

    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Content element of a popup or tooltip.
    pub fn content(&self) -> Option<ElementId> {
        self.content
    }

    /// Apply `changed` onto the live object and drop handlers for `removed`.
    ///
    /// A callable prop that changes replaces the handler it subscribed
    /// earlier. Setters are not reverted for removed keys.
    pub fn commit_update(&mut self, changed: &Props, removed: &[&str]) {
        for key in removed {
            self.unsubscribe(key);
            self.declared_props.remove(key);
        }

        for (key, value) in changed.iter() {
            self.unsubscribe(key);
            let applied = self.native.with_mut(|native| apply_prop(native, key, value));
            if let Applied::Subscribed(subscription) = applied {
                self.subscriptions.push(subscription);
            }
        }
        self.declared_props.merge(changed);
    }

    /// Remove every handler this instance subscribed.
    pub fn dispose(mut self) -> NativeHandle {
        let subscriptions = std::mem::take(&mut self.subscriptions);
        self.native.with_mut(|native| {
            for sub in &subscriptions {
                native.off(&sub.event, sub.id);
            }
        });
        self.native
    }

    fn unsubscribe(&mut self, key: &str) {
        let Some(index) = self.subscriptions.iter().position(|s| s.key.as_str() == key) else {
            return;
        };
        let sub = self.subscriptions.remove(index);
        let removed = self.native.with_mut(|native| native.off(&sub.event, sub.id));
        trace!(key, event = %sub.event, removed, "unsubscribed handler");
    }
}
