use super::slot_before;
use crate::dom::{Document, ElementId, Size};
use crate::event::{EventHandler, HandlerId, Listeners, MapEvent};
use crate::geo::{LatLng, LatLngBounds, Point};
use crate::native::{
    LayerHost, NativeHandle, NativeMap, NativeObject, NativeResult, Pane, ReadyCallback,
};
use crate::props::{Options, PropValue};
use serde_json::json;
use std::any::Any;
use std::f64::consts::PI;
use std::fmt;
use tracing::debug;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// How geographic coordinates map onto pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// `x = lng`, `y = lat`, ignoring zoom.
    Identity,
    /// Flat plane with y pointing down, scaled by `2^zoom`.
    Simple,
    /// Spherical Mercator on 256px tiles.
    WebMercator,
}

impl Projection {
    /// Pick the projection named by a map's `crs` option.
    pub fn from_options(options: &Options) -> Self {
        match options.get_str("crs") {
            Some("Simple") => Projection::Simple,
            Some("Identity") => Projection::Identity,
            _ => Projection::WebMercator,
        }
    }

    pub fn project(self, latlng: LatLng, zoom: f64) -> Point {
        match self {
            Projection::Identity => Point::new(latlng.lng, latlng.lat),
            Projection::Simple => {
                let scale = 2f64.powf(zoom);
                Point::new(latlng.lng * scale, -latlng.lat * scale)
            }
            Projection::WebMercator => {
                let scale = TILE_SIZE * 2f64.powf(zoom);
                let lat = latlng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
                let sin = (lat * PI / 180.0).sin();
                let x = scale * (latlng.lng / 360.0 + 0.5);
                let y = scale * (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI));
                Point::new(x, y)
            }
        }
    }
}

/// Headless map root.
///
/// Becomes ready on its first [`MemoryMap::set_view`]; ready callbacks queued
/// before that run then, in registration order.
pub struct MemoryMap {
    document: Document,
    container: ElementId,
    options: Options,
    host: LayerHost,
    projection: Projection,
    center: Option<LatLng>,
    zoom: Option<f64>,
    max_bounds: Option<LatLngBounds>,
    min_zoom: Option<f64>,
    max_zoom: Option<f64>,
    ready: bool,
    ready_queue: Vec<ReadyCallback>,
    listeners: Listeners,
    layers: Vec<NativeHandle>,
    size: Size,
    invalidations: usize,
}

impl MemoryMap {
    pub(crate) fn new(
        document: Document,
        container: ElementId,
        options: &Options,
        projection: Projection,
    ) -> Self {
        let mut panes = Vec::with_capacity(Pane::ALL.len());
        for pane in Pane::ALL {
            let element = document.create_element("div");
            document.append_child(container, element);
            panes.push((pane, element));
        }

        let overlay = panes
            .iter()
            .find(|(p, _)| *p == Pane::Overlay)
            .map(|(_, e)| *e)
            .unwrap_or(container);
        let svg = document.create_element("svg");
        let vector_root = document.create_element("g");
        document.append_child(overlay, svg);
        document.append_child(svg, vector_root);

        let host = panes
            .into_iter()
            .fold(LayerHost::new(document.clone(), container, vector_root), |host, (pane, el)| {
                host.with_pane(pane, el)
            });

        let mut map = Self {
            size: document.client_size(container),
            document,
            container,
            options: options.clone(),
            host,
            projection,
            center: None,
            zoom: None,
            max_bounds: options_bounds(options),
            min_zoom: options.get_f64("minZoom"),
            max_zoom: options.get_f64("maxZoom"),
            ready: false,
            ready_queue: Vec::new(),
            listeners: Listeners::new(),
            layers: Vec::new(),
            invalidations: 0,
        };

        let center = options
            .get("center")
            .and_then(|v| PropValue::Json(v.clone()).as_latlng());
        if let (Some(center), Some(zoom)) = (center, options.get_f64("zoom")) {
            map.set_view(center, zoom);
        } else {
            map.zoom = options.get_f64("zoom");
        }
        map
    }

    /// Center the map; the first call makes it ready.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = Some(center);
        self.zoom = Some(self.clamp_zoom(zoom));

        if !self.ready {
            self.ready = true;
            debug!(container = ?self.container, "map ready");
            for callback in std::mem::take(&mut self.ready_queue) {
                callback(self);
            }
            self.listeners.fire(&MapEvent::new("load"));
        }
        self.listeners.fire(&MapEvent::at("moveend", center));
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        let zoom = self.min_zoom.map_or(zoom, |min| zoom.max(min));
        self.max_zoom.map_or(zoom, |max| zoom.min(max))
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn center(&self) -> Option<LatLng> {
        self.center
    }

    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    pub fn max_bounds(&self) -> Option<LatLngBounds> {
        self.max_bounds
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// How many times `invalidate_size` ran.
    pub fn invalidations(&self) -> usize {
        self.invalidations
    }

    pub fn pane(&self, pane: Pane) -> Option<ElementId> {
        self.host.pane(pane)
    }

    pub fn vector_root(&self) -> ElementId {
        self.host.vector_root
    }

    pub fn layers(&self) -> &[NativeHandle] {
        &self.layers
    }

    pub fn has_layer(&self, layer: &NativeHandle) -> bool {
        self.layers.iter().any(|l| l.ptr_eq(layer))
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    pub fn fire(&self, event: &MapEvent) -> usize {
        self.listeners.fire(event)
    }

    fn pixel_origin(&self) -> Point {
        let Some(center) = self.center else {
            return Point::default();
        };
        let projected = self.projection.project(center, self.zoom.unwrap_or(0.0));
        Point::new(
            projected.x - self.size.width / 2.0,
            projected.y - self.size.height / 2.0,
        )
    }
}

fn options_bounds(options: &Options) -> Option<LatLngBounds> {
    options
        .get("maxBounds")
        .and_then(|v| PropValue::Json(v.clone()).as_bounds())
}

impl NativeObject for MemoryMap {
    fn type_name(&self) -> &'static str {
        "Map"
    }

    fn on(&mut self, event: &str, handler: EventHandler) -> HandlerId {
        self.listeners.on(event, handler)
    }

    fn off(&mut self, event: &str, id: HandlerId) -> bool {
        self.listeners.off(event, id)
    }

    fn call_setter(&mut self, setter: &str, value: &PropValue) -> bool {
        match setter {
            "setZoom" => {
                if let Some(zoom) = value.as_f64() {
                    let zoom = self.clamp_zoom(zoom);
                    self.zoom = Some(zoom);
                    if self.ready {
                        self.listeners.fire(&MapEvent::new("zoomend"));
                    }
                }
                true
            }
            "setMaxBounds" => {
                self.max_bounds = value.as_bounds();
                true
            }
            "setMinZoom" => {
                self.min_zoom = value.as_f64();
                true
            }
            "setMaxZoom" => {
                self.max_zoom = value.as_f64();
                true
            }
            _ => false,
        }
    }

    fn container(&self) -> Option<ElementId> {
        Some(self.container)
    }

    fn add_layer(&mut self, layer: &NativeHandle) -> NativeResult<bool> {
        if self.has_layer(layer) {
            return Ok(true);
        }
        layer.with_mut(|l| l.on_add(&self.host))?;
        self.layers.push(layer.clone());
        self.listeners.fire(&MapEvent::new("layeradd"));
        Ok(true)
    }

    fn insert_layer(&mut self, layer: &NativeHandle, before: &NativeHandle) -> NativeResult<bool> {
        let Some((slot, present)) = slot_before(&mut self.layers, layer, before) else {
            return Ok(false);
        };
        if !present {
            layer.with_mut(|l| l.on_add(&self.host))?;
        }
        self.layers.insert(slot, layer.clone());
        if !present {
            self.listeners.fire(&MapEvent::new("layeradd"));
        }
        Ok(true)
    }

    fn remove_layer(&mut self, layer: &NativeHandle) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.ptr_eq(layer)) else {
            return false;
        };
        let removed = self.layers.remove(index);
        removed.with_mut(|l| l.on_remove(&self.host));
        self.listeners.fire(&MapEvent::new("layerremove"));
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl NativeMap for MemoryMap {
    fn as_object(&self) -> &dyn NativeObject {
        self
    }

    fn as_object_mut(&mut self) -> &mut dyn NativeObject {
        self
    }

    fn when_ready(&mut self, callback: ReadyCallback) {
        if self.ready {
            callback(self);
        } else {
            self.ready_queue.push(callback);
        }
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn lat_lng_to_container_point(&self, latlng: LatLng) -> Point {
        let projected = self.projection.project(latlng, self.zoom.unwrap_or(0.0));
        let origin = self.pixel_origin();
        Point::new(projected.x - origin.x, projected.y - origin.y)
    }

    fn invalidate_size(&mut self) {
        self.invalidations += 1;
        let size = self.document.client_size(self.container);
        if size != self.size {
            self.size = size;
            let mut event = MapEvent::new("resize");
            event.data = json!({ "width": size.width, "height": size.height });
            self.listeners.fire(&event);
        }
    }
}

impl fmt::Debug for MemoryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryMap")
            .field("container", &self.container)
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("ready", &self.ready)
            .field("layers", &self.layers.len())
            .finish()
    }
}
