use crate::geo::LatLng;
use smallvec::SmallVec;
use smartstring::{LazyCompact, SmartString};
use std::fmt;
use std::rc::Rc;

pub type EventName = SmartString<LazyCompact>;

/// Event delivered to subscribed handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEvent {
    pub kind: EventName,
    pub latlng: Option<LatLng>,
    pub data: serde_json::Value,
}

impl MapEvent {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.into(),
            latlng: None,
            data: serde_json::Value::Null,
        }
    }

    pub fn at(kind: &str, latlng: LatLng) -> Self {
        Self {
            latlng: Some(latlng),
            ..Self::new(kind)
        }
    }
}

/// Callable prop value wired as an event listener.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&MapEvent)>);

impl EventHandler {
    pub fn new(f: impl Fn(&MapEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, event: &MapEvent) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &EventHandler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}

/// Identifies one subscription so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) u64);

struct Listener {
    event: EventName,
    id: HandlerId,
    handler: EventHandler,
}

/// Per-object listener table, in subscription order.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: SmallVec<[Listener; 4]>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, event: &str, handler: EventHandler) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Listener {
            event: event.into(),
            id,
            handler,
        });
        id
    }

    pub fn off(&mut self, event: &str, id: HandlerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| !(l.id == id && l.event.as_str() == event));
        self.entries.len() != before
    }

    /// Call every handler subscribed to `event.kind`; returns how many ran.
    ///
    /// Handlers are snapshotted first, so a handler may subscribe or
    /// unsubscribe without affecting the current dispatch.
    pub fn fire(&self, event: &MapEvent) -> usize {
        let handlers: SmallVec<[EventHandler; 4]> = self
            .entries
            .iter()
            .filter(|l| l.event == event.kind)
            .map(|l| l.handler.clone())
            .collect();
        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    pub fn count(&self, event: &str) -> usize {
        self.entries.iter().filter(|l| l.event.as_str() == event).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|l| (&l.event, l.id)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_fire_reaches_only_matching_event() {
        let hits = Rc::new(Cell::new(0));
        let mut listeners = Listeners::new();
        let h = hits.clone();
        listeners.on("click", EventHandler::new(move |_| h.set(h.get() + 1)));
        listeners.on("move", EventHandler::new(|_| panic!("wrong event")));

        assert_eq!(listeners.fire(&MapEvent::new("click")), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_off_removes_single_subscription() {
        let mut listeners = Listeners::new();
        let first = listeners.on("click", EventHandler::new(|_| {}));
        listeners.on("click", EventHandler::new(|_| {}));

        assert!(listeners.off("click", first));
        assert!(!listeners.off("click", first));
        assert_eq!(listeners.count("click"), 1);
    }

    #[test]
    fn test_off_requires_matching_event_name() {
        let mut listeners = Listeners::new();
        let id = listeners.on("click", EventHandler::new(|_| {}));

        assert!(!listeners.off("dblclick", id));
        assert_eq!(listeners.len(), 1);
    }
}
