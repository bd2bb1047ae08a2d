//! Applies declared props onto a live native object.
//!
//! Callable values become event subscriptions, everything else goes through
//! the object's `set<Key>` setter when it has one. Keys that match neither are
//! inert.

use crate::event::{EventName, HandlerId};
use crate::native::NativeObject;
use crate::props::{PropKey, PropValue, Props};
use smallvec::SmallVec;
use tracing::trace;

pub const HANDLER_PREFIX: &str = "on";
pub const SETTER_PREFIX: &str = "set";

/// Native event name for a handler prop key.
///
/// `onClick` becomes `click`. Keys without the prefix are lower-cased as a
/// whole. Lower-casing is Unicode-aware and locale independent.
pub fn event_name(key: &str) -> EventName {
    let stripped = match key.strip_prefix(HANDLER_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => key,
    };
    stripped.to_lowercase().as_str().into()
}

/// Setter name for a prop key: `zIndex` becomes `setZIndex`.
pub fn setter_name(key: &str) -> String {
    let mut chars = key.chars();
    let mut name = String::with_capacity(SETTER_PREFIX.len() + key.len());
    name.push_str(SETTER_PREFIX);
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

/// A handler the applier subscribed, kept so it can be removed later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub key: PropKey,
    pub event: EventName,
    pub id: HandlerId,
}

pub type Subscriptions = SmallVec<[Subscription; 4]>;

/// Outcome of applying one prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Subscribed(Subscription),
    Set,
    Ignored,
}

pub fn apply_prop(native: &mut dyn NativeObject, key: &str, value: &PropValue) -> Applied {
    if let Some(handler) = value.as_handler() {
        let event = event_name(key);
        let id = native.on(&event, handler.clone());
        trace!(key, event = %event, native = native.type_name(), "wired event handler");
        return Applied::Subscribed(Subscription {
            key: key.into(),
            event,
            id,
        });
    }

    let setter = setter_name(key);
    if native.call_setter(&setter, value) {
        trace!(key, setter = %setter, native = native.type_name(), "applied prop");
        Applied::Set
    } else {
        trace!(key, native = native.type_name(), "no setter for prop");
        Applied::Ignored
    }
}

/// Apply every prop in declaration order, returning the subscriptions made.
pub fn apply_props(native: &mut dyn NativeObject, props: &Props) -> Subscriptions {
    let mut subscriptions = Subscriptions::new();
    for (key, value) in props.iter() {
        if let Applied::Subscribed(subscription) = apply_prop(native, key, value) {
            subscriptions.push(subscription);
        }
    }
    subscriptions
}
