use super::options::Options;
use crate::dom::ElementId;
use crate::event::EventHandler;
use crate::geo::{LatLng, LatLngBounds};
use crate::native::{ExtensionClass, MapReadyHandler, NativeHandle};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Nested declarative content, opaque to the bridge.
///
/// Only the content-rendering service knows how to mount it.
#[derive(Clone, Default)]
pub enum Children {
    #[default]
    None,
    Text(String),
    Node(Rc<dyn Any>),
}

impl Children {
    pub fn node<T: Any>(value: T) -> Self {
        Self::Node(Rc::new(value))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Children::Node(node) => node.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Display for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::None => Ok(()),
            Children::Text(text) => f.write_str(text),
            Children::Node(_) => f.write_str("[object]"),
        }
    }
}

impl fmt::Debug for Children {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::None => f.write_str("None"),
            Children::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Children::Node(_) => f.write_str("Node(..)"),
        }
    }
}

/// A declared prop value.
#[derive(Clone)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    LatLng(LatLng),
    LatLngs(Vec<LatLng>),
    Rings(Vec<Vec<LatLng>>),
    Bounds(LatLngBounds),
    Json(Value),
    Element(ElementId),
    Children(Children),
    List(Vec<PropValue>),
    Layers(Vec<NativeHandle>),
    Handler(EventHandler),
    MapReady(MapReadyHandler),
    Class(ExtensionClass),
}

impl PropValue {
    /// Only plain handlers are wired as events; ready callbacks and
    /// extension classes are consumed by the factory before props are applied.
    pub fn is_callable(&self) -> bool {
        matches!(self, PropValue::Handler(_))
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            PropValue::Json(v) => v.as_bool(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            PropValue::Json(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            PropValue::Json(v) => v.as_str(),
            _ => None,
        }
    }

    pub fn as_latlng(&self) -> Option<LatLng> {
        match self {
            PropValue::LatLng(ll) => Some(*ll),
            PropValue::Json(v) => latlng_from_json(v),
            _ => None,
        }
    }

    pub fn as_bounds(&self) -> Option<LatLngBounds> {
        match self {
            PropValue::Bounds(b) => Some(*b),
            PropValue::Json(Value::Array(corners)) if corners.len() == 2 => Some(LatLngBounds::new(
                latlng_from_json(&corners[0])?,
                latlng_from_json(&corners[1])?,
            )),
            _ => None,
        }
    }

    pub fn as_latlngs(&self) -> Option<Vec<LatLng>> {
        match self {
            PropValue::LatLngs(v) => Some(v.clone()),
            PropValue::Json(Value::Array(items)) => items.iter().map(latlng_from_json).collect(),
            _ => None,
        }
    }

    /// Polygon rings. A flat coordinate list is a single ring.
    pub fn as_rings(&self) -> Option<Vec<Vec<LatLng>>> {
        match self {
            PropValue::Rings(r) => Some(r.clone()),
            PropValue::LatLngs(v) => Some(vec![v.clone()]),
            PropValue::Json(Value::Array(items)) => {
                if let Some(flat) = items.iter().map(latlng_from_json).collect::<Option<Vec<_>>>() {
                    return Some(vec![flat]);
                }
                items
                    .iter()
                    .map(|ring| match ring {
                        Value::Array(points) => points.iter().map(latlng_from_json).collect(),
                        _ => None,
                    })
                    .collect()
            }
            _ => None,
        }
    }

    pub fn as_options(&self) -> Option<Options> {
        match self {
            PropValue::Null => Some(Options::new()),
            PropValue::Json(v) => Options::from_value(v),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            PropValue::Element(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_children(&self) -> Option<Children> {
        match self {
            PropValue::Null => Some(Children::None),
            PropValue::Children(c) => Some(c.clone()),
            PropValue::String(s) => Some(Children::Text(s.clone())),
            _ => None,
        }
    }

    pub fn as_layers(&self) -> Option<Vec<NativeHandle>> {
        match self {
            PropValue::Null => Some(Vec::new()),
            PropValue::Layers(layers) => Some(layers.clone()),
            _ => None,
        }
    }

    /// Plain data view of the value, when it has one.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            PropValue::Null => Some(Value::Null),
            PropValue::Bool(b) => Some(Value::Bool(*b)),
            PropValue::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
            PropValue::String(s) => Some(Value::String(s.clone())),
            PropValue::LatLng(ll) => Some(serde_json::json!([ll.lat, ll.lng])),
            PropValue::Bounds(b) => Some(serde_json::json!([
                [b.north_west.lat, b.north_west.lng],
                [b.south_east.lat, b.south_east.lng]
            ])),
            PropValue::LatLngs(points) => Some(Value::Array(
                points.iter().map(|p| serde_json::json!([p.lat, p.lng])).collect(),
            )),
            PropValue::Json(v) => Some(v.clone()),
            PropValue::List(items) => items.iter().map(PropValue::to_json).collect::<Option<Vec<_>>>().map(Value::Array),
            _ => None,
        }
    }
}

fn latlng_from_json(value: &Value) -> Option<LatLng> {
    match value {
        Value::Array(pair) if pair.len() >= 2 => Some(LatLng::new(pair[0].as_f64()?, pair[1].as_f64()?)),
        Value::Object(map) => {
            let lat = map.get("lat")?.as_f64()?;
            let lng = map.get("lng").or_else(|| map.get("lon"))?.as_f64()?;
            Some(LatLng::new(lat, lng))
        }
        _ => None,
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("Null"),
            PropValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            PropValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            PropValue::String(s) => f.debug_tuple("String").field(s).finish(),
            PropValue::LatLng(ll) => f.debug_tuple("LatLng").field(ll).finish(),
            PropValue::LatLngs(v) => f.debug_tuple("LatLngs").field(v).finish(),
            PropValue::Rings(v) => f.debug_tuple("Rings").field(v).finish(),
            PropValue::Bounds(b) => f.debug_tuple("Bounds").field(b).finish(),
            PropValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
            PropValue::Element(id) => f.debug_tuple("Element").field(id).finish(),
            PropValue::Children(c) => f.debug_tuple("Children").field(c).finish(),
            PropValue::List(items) => f.debug_tuple("List").field(items).finish(),
            PropValue::Layers(layers) => write!(f, "Layers({})", layers.len()),
            PropValue::Handler(_) => f.write_str("Handler(..)"),
            PropValue::MapReady(_) => f.write_str("MapReady(..)"),
            PropValue::Class(_) => f.write_str("Class(..)"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Number(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        PropValue::Number(v as f64)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::String(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::String(v)
    }
}

impl From<LatLng> for PropValue {
    fn from(v: LatLng) -> Self {
        PropValue::LatLng(v)
    }
}

impl From<LatLngBounds> for PropValue {
    fn from(v: LatLngBounds) -> Self {
        PropValue::Bounds(v)
    }
}

impl From<Vec<LatLng>> for PropValue {
    fn from(v: Vec<LatLng>) -> Self {
        PropValue::LatLngs(v)
    }
}

impl From<Value> for PropValue {
    fn from(v: Value) -> Self {
        PropValue::Json(v)
    }
}

impl From<Options> for PropValue {
    fn from(v: Options) -> Self {
        PropValue::Json(v.into_value())
    }
}

impl From<ElementId> for PropValue {
    fn from(v: ElementId) -> Self {
        PropValue::Element(v)
    }
}

impl From<Children> for PropValue {
    fn from(v: Children) -> Self {
        PropValue::Children(v)
    }
}

impl From<EventHandler> for PropValue {
    fn from(v: EventHandler) -> Self {
        PropValue::Handler(v)
    }
}

impl From<MapReadyHandler> for PropValue {
    fn from(v: MapReadyHandler) -> Self {
        PropValue::MapReady(v)
    }
}

impl From<ExtensionClass> for PropValue {
    fn from(v: ExtensionClass) -> Self {
        PropValue::Class(v)
    }
}
