//! The native map library as the bridge sees it.
//!
//! The bridge never names concrete native types. It talks to a
//! [`NativeLibrary`] (one constructor per catalog kind) and to the objects it
//! returns through the [`NativeObject`] capability probe: event subscription,
//! named setters, and the element/container accessors. Maps add
//! [`NativeMap`] on top.

mod handle;
mod library;
pub mod memory;

pub use handle::{NativeHandle, SharedMap, SharedNative};
pub use library::{NativeLibrary, NativeResult, VideoSource};

use crate::dom::{Document, ElementId};
use crate::error::NativeError;
use crate::event::{EventHandler, HandlerId};
use crate::geo::{LatLng, Point};
use crate::props::{Children, PropValue, Props};
use crate::registry::ContentRenderer;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Panes a map exposes to its layers, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pane {
    Tile,
    Overlay,
    Shadow,
    Marker,
    Tooltip,
    Popup,
    Control,
}

impl Pane {
    pub const ALL: [Pane; 7] = [
        Pane::Tile,
        Pane::Overlay,
        Pane::Shadow,
        Pane::Marker,
        Pane::Tooltip,
        Pane::Popup,
        Pane::Control,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            Pane::Tile => "tilePane",
            Pane::Overlay => "overlayPane",
            Pane::Shadow => "shadowPane",
            Pane::Marker => "markerPane",
            Pane::Tooltip => "tooltipPane",
            Pane::Popup => "popupPane",
            Pane::Control => "controlContainer",
        }
    }
}

/// What a map hands to a layer being added to it.
#[derive(Debug, Clone)]
pub struct LayerHost {
    pub document: Document,
    pub container: ElementId,
    /// Shared group that vector paths render into.
    pub vector_root: ElementId,
    panes: Vec<(Pane, ElementId)>,
}

impl LayerHost {
    pub fn new(document: Document, container: ElementId, vector_root: ElementId) -> Self {
        Self {
            document,
            container,
            vector_root,
            panes: Vec::new(),
        }
    }

    pub fn with_pane(mut self, pane: Pane, element: ElementId) -> Self {
        self.panes.retain(|(p, _)| *p != pane);
        self.panes.push((pane, element));
        self
    }

    pub fn pane(&self, pane: Pane) -> Option<ElementId> {
        self.panes.iter().find(|(p, _)| *p == pane).map(|(_, e)| *e)
    }
}

/// Capability probe over a live native object.
pub trait NativeObject: Any {
    /// Native class name, for diagnostics.
    fn type_name(&self) -> &'static str;

    fn on(&mut self, event: &str, handler: EventHandler) -> HandlerId;

    fn off(&mut self, event: &str, id: HandlerId) -> bool;

    /// Invoke the setter called `setter` with `value`.
    /// Returns false when the object has no such setter.
    fn call_setter(&mut self, _setter: &str, _value: &PropValue) -> bool {
        false
    }

    /// The "get element" accessor.
    fn element(&self) -> Option<ElementId> {
        None
    }

    /// The "get container" accessor.
    fn container(&self) -> Option<ElementId> {
        None
    }

    /// Add a child layer. `Ok(false)` means this object cannot hold children.
    fn add_layer(&mut self, _layer: &NativeHandle) -> NativeResult<bool> {
        Ok(false)
    }

    fn remove_layer(&mut self, _layer: &NativeHandle) -> bool {
        false
    }

    /// Put `layer` right before `before` in this object's layer list, adding
    /// it when it is not a child yet. `Ok(false)` leaves everything as it was:
    /// `before` is not a child, or this object cannot hold children.
    fn insert_layer(&mut self, _layer: &NativeHandle, _before: &NativeHandle) -> NativeResult<bool> {
        Ok(false)
    }

    /// Called by a map when this object is added to it.
    fn on_add(&mut self, _host: &LayerHost) -> NativeResult<()> {
        Ok(())
    }

    fn on_remove(&mut self, _host: &LayerHost) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// One-shot callback run when a map signals it is ready.
pub type ReadyCallback = Box<dyn FnOnce(&mut dyn NativeMap)>;

/// Root map object.
pub trait NativeMap: NativeObject {
    fn as_object(&self) -> &dyn NativeObject;

    fn as_object_mut(&mut self) -> &mut dyn NativeObject;

    /// Run `callback` once the map is initialized; immediately if it already is.
    fn when_ready(&mut self, callback: ReadyCallback);

    fn is_ready(&self) -> bool;

    fn lat_lng_to_container_point(&self, latlng: LatLng) -> Point;

    /// Re-read the container size and re-layout.
    fn invalidate_size(&mut self);
}

/// Declared `whenReady` callback of a map element.
#[derive(Clone)]
pub struct MapReadyHandler(Rc<dyn Fn(&mut dyn NativeMap)>);

impl MapReadyHandler {
    pub fn new(f: impl Fn(&mut dyn NativeMap) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, map: &mut dyn NativeMap) {
        (self.0)(map)
    }
}

impl fmt::Debug for MapReadyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MapReadyHandler(..)")
    }
}

/// Arguments handed to a user-defined extension class.
#[derive(Clone)]
pub struct ExtensionParams {
    pub params: Props,
    pub children: Children,
    pub content_renderer: Option<ContentRenderer>,
    pub document: Document,
}

type Constructor = dyn Fn(ExtensionParams) -> NativeResult<NativeHandle>;

/// Constructor reference for `*Layer`, `*Control` and `*Handler` elements.
#[derive(Clone)]
pub struct ExtensionClass(Rc<Constructor>);

impl ExtensionClass {
    pub fn new(f: impl Fn(ExtensionParams) -> Result<NativeHandle, NativeError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn instantiate(&self, params: ExtensionParams) -> NativeResult<NativeHandle> {
        (self.0)(params)
    }
}

impl fmt::Debug for ExtensionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExtensionClass(..)")
    }
}
