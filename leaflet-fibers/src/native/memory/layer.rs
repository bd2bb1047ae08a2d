use crate::dom::ElementId;
use crate::event::{EventHandler, HandlerId, Listeners, MapEvent};
use crate::geo::{LatLng, LatLngBounds};
use crate::native::{LayerHost, NativeObject, NativeResult, Pane, VideoSource};
use crate::props::{Children, Options, PropValue};
use serde_json::Value;
use smartstring::{LazyCompact, SmartString};
use std::any::Any;
use tracing::trace;

/// Concrete class of a [`MemoryLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    ImageOverlay,
    Popup,
    Tooltip,
    Rectangle,
    Marker,
    TileLayer,
    TileLayerWms,
    VideoOverlay,
    Polyline,
    Polygon,
    Circle,
    CircleMarker,
    SvgOverlay,
    GeoJson,
    GridLayer,
}

impl LayerType {
    pub fn name(self) -> &'static str {
        match self {
            LayerType::ImageOverlay => "ImageOverlay",
            LayerType::Popup => "Popup",
            LayerType::Tooltip => "Tooltip",
            LayerType::Rectangle => "Rectangle",
            LayerType::Marker => "Marker",
            LayerType::TileLayer => "TileLayer",
            LayerType::TileLayerWms => "TileLayer.WMS",
            LayerType::VideoOverlay => "VideoOverlay",
            LayerType::Polyline => "Polyline",
            LayerType::Polygon => "Polygon",
            LayerType::Circle => "Circle",
            LayerType::CircleMarker => "CircleMarker",
            LayerType::SvgOverlay => "SVGOverlay",
            LayerType::GeoJson => "GeoJSON",
            LayerType::GridLayer => "GridLayer",
        }
    }

    /// Setters this class exposes.
    pub fn setters(self) -> &'static [&'static str] {
        match self {
            LayerType::ImageOverlay | LayerType::VideoOverlay => {
                &["setOpacity", "setUrl", "setBounds", "setZIndex"]
            }
            LayerType::SvgOverlay => &["setOpacity", "setBounds", "setZIndex"],
            LayerType::Popup => &["setLatLng", "setContent"],
            LayerType::Tooltip => &["setLatLng", "setContent", "setOpacity"],
            LayerType::Marker => &["setLatLng", "setIcon", "setOpacity", "setZIndexOffset"],
            LayerType::TileLayer => &["setUrl", "setOpacity", "setZIndex"],
            LayerType::TileLayerWms => &["setUrl", "setParams", "setOpacity", "setZIndex"],
            LayerType::GridLayer => &["setOpacity", "setZIndex"],
            LayerType::Polyline | LayerType::Polygon => &["setLatLngs", "setStyle"],
            LayerType::Rectangle => &["setBounds", "setLatLngs", "setStyle"],
            LayerType::Circle | LayerType::CircleMarker => &["setLatLng", "setRadius", "setStyle"],
            LayerType::GeoJson => &["setStyle", "setZIndex"],
        }
    }

    fn is_path(self) -> bool {
        matches!(
            self,
            LayerType::Polyline
                | LayerType::Polygon
                | LayerType::Rectangle
                | LayerType::Circle
                | LayerType::CircleMarker
        )
    }

    fn is_grid(self) -> bool {
        matches!(
            self,
            LayerType::TileLayer | LayerType::TileLayerWms | LayerType::GridLayer
        )
    }
}

/// Popup/tooltip content.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Element(ElementId),
}

/// Headless stand-in for every non-map, non-group native layer.
///
/// State set by constructors and setters is kept in plain fields so tests can
/// inspect it. The visual element is created the first time the layer is
/// added to a map and survives removal, so re-adding re-appends it.
#[derive(Debug)]
pub struct MemoryLayer {
    pub(crate) layer_type: LayerType,
    pub(crate) options: Options,
    pub(crate) latlng: Option<LatLng>,
    pub(crate) rings: Vec<Vec<LatLng>>,
    pub(crate) bounds: Option<LatLngBounds>,
    pub(crate) url: Option<String>,
    pub(crate) video: Option<VideoSource>,
    pub(crate) svg: Option<ElementId>,
    pub(crate) geojson: Option<Value>,
    pub(crate) content: Option<Content>,
    pub(crate) icon: Options,
    pub(crate) params: Options,
    pub(crate) style: Options,
    pub(crate) radius: Option<f64>,
    pub(crate) opacity: Option<f64>,
    pub(crate) z_index: Option<f64>,
    listeners: Listeners,
    element: Option<ElementId>,
    shadow: Option<ElementId>,
    container: Option<ElementId>,
    host: Option<LayerHost>,
    setter_calls: Vec<SmartString<LazyCompact>>,
}

impl MemoryLayer {
    pub(crate) fn new(layer_type: LayerType, options: &Options) -> Self {
        Self {
            layer_type,
            options: options.clone(),
            latlng: None,
            rings: Vec::new(),
            bounds: None,
            url: None,
            video: None,
            svg: None,
            geojson: None,
            content: None,
            icon: options.get_options("icon").unwrap_or_default(),
            params: Options::new(),
            style: Options::new(),
            radius: options.get_f64("radius"),
            opacity: options.get_f64("opacity"),
            z_index: options.get_f64("zIndex"),
            listeners: Listeners::new(),
            element: None,
            shadow: None,
            container: None,
            host: None,
            setter_calls: Vec::new(),
        }
    }

    pub fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn latlng(&self) -> Option<LatLng> {
        self.latlng
    }

    pub fn rings(&self) -> &[Vec<LatLng>] {
        &self.rings
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.bounds
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn video(&self) -> Option<&VideoSource> {
        self.video.as_ref()
    }

    pub fn geojson(&self) -> Option<&Value> {
        self.geojson.as_ref()
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn icon(&self) -> &Options {
        &self.icon
    }

    pub fn params(&self) -> &Options {
        &self.params
    }

    pub fn style(&self) -> &Options {
        &self.style
    }

    pub fn radius(&self) -> Option<f64> {
        self.radius
    }

    pub fn opacity(&self) -> Option<f64> {
        self.opacity
    }

    pub fn z_index(&self) -> Option<f64> {
        self.z_index
    }

    pub fn is_added(&self) -> bool {
        self.host.is_some()
    }

    /// Setter names invoked so far, in call order.
    pub fn setter_calls(&self) -> Vec<&str> {
        self.setter_calls.iter().map(|s| s.as_str()).collect()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.count(event)
    }

    pub fn fire(&self, event: &MapEvent) -> usize {
        self.listeners.fire(event)
    }

    fn apply_setter(&mut self, setter: &str, value: &PropValue) {
        match setter {
            "setOpacity" => self.opacity = value.as_f64(),
            "setZIndex" => self.z_index = value.as_f64(),
            "setZIndexOffset" => {
                if let Some(offset) = value.as_f64() {
                    self.options.insert("zIndexOffset", offset);
                }
            }
            "setUrl" => self.url = value.as_str().map(str::to_string),
            "setBounds" => {
                self.bounds = value.as_bounds();
                if self.layer_type == LayerType::Rectangle {
                    self.rings = self.bounds.map(rectangle_ring).into_iter().collect();
                }
            }
            "setLatLng" => self.latlng = value.as_latlng(),
            "setLatLngs" => self.rings = value.as_rings().unwrap_or_default(),
            "setRadius" => self.radius = value.as_f64(),
            "setIcon" => self.icon = value.as_options().unwrap_or_default(),
            "setParams" => {
                if let Some(params) = value.as_options() {
                    self.params = params.over(&self.params);
                }
            }
            "setStyle" => {
                if let Some(style) = value.as_options() {
                    self.style = style.over(&self.style);
                }
            }
            "setContent" => self.set_content(value),
            _ => {}
        }
    }

    fn set_content(&mut self, value: &PropValue) {
        let content = match value {
            PropValue::Element(id) => Some(Content::Element(*id)),
            PropValue::Children(Children::Text(text)) => Some(Content::Text(text.clone())),
            other => other.as_str().map(|s| Content::Text(s.to_string())),
        };
        if let (Some(host), Some(Content::Element(old))) = (&self.host, &self.content) {
            host.document.detach(*old);
        }
        self.content = content;
        if let Some(host) = self.host.clone() {
            self.mount_content(&host);
        }
    }

    fn mount_content(&self, host: &LayerHost) {
        let Some(wrapper) = self.element else {
            return;
        };
        match &self.content {
            Some(Content::Element(content)) => {
                host.document.append_child(wrapper, *content);
            }
            Some(Content::Text(text)) => host.document.set_text_content(wrapper, text.clone()),
            None => {}
        }
    }

    fn ensure_element(&mut self, host: &LayerHost) -> Option<ElementId> {
        if let Some(id) = self.element {
            return Some(id);
        }
        let id = match self.layer_type {
            LayerType::Marker | LayerType::ImageOverlay => host.document.create_element("img"),
            LayerType::VideoOverlay => match &self.video {
                Some(VideoSource::Element(video)) => *video,
                _ => host.document.create_element("video"),
            },
            LayerType::SvgOverlay => self.svg?,
            LayerType::Popup | LayerType::Tooltip => host.document.create_element("div"),
            t if t.is_path() => host.document.create_element("path"),
            _ => return None,
        };
        self.element = Some(id);
        Some(id)
    }

    fn target_parent(&self, host: &LayerHost) -> Option<ElementId> {
        match self.layer_type {
            LayerType::Marker => host.pane(Pane::Marker),
            LayerType::Popup => host.pane(Pane::Popup),
            LayerType::Tooltip => host.pane(Pane::Tooltip),
            LayerType::ImageOverlay | LayerType::VideoOverlay | LayerType::SvgOverlay => {
                host.pane(Pane::Overlay)
            }
            t if t.is_path() => Some(host.vector_root),
            _ => None,
        }
    }
}

pub(crate) fn rectangle_ring(bounds: LatLngBounds) -> Vec<LatLng> {
    let nw = bounds.north_west;
    let se = bounds.south_east;
    vec![
        nw,
        LatLng::new(nw.lat, se.lng),
        se,
        LatLng::new(se.lat, nw.lng),
    ]
}

impl NativeObject for MemoryLayer {
    fn type_name(&self) -> &'static str {
        self.layer_type.name()
    }

    fn on(&mut self, event: &str, handler: EventHandler) -> HandlerId {
        self.listeners.on(event, handler)
    }

    fn off(&mut self, event: &str, id: HandlerId) -> bool {
        self.listeners.off(event, id)
    }

    fn call_setter(&mut self, setter: &str, value: &PropValue) -> bool {
        if !self.layer_type.setters().iter().any(|s| *s == setter) {
            return false;
        }
        trace!(layer = self.layer_type.name(), setter, "setter");
        self.setter_calls.push(setter.into());
        self.apply_setter(setter, value);
        true
    }

    fn element(&self) -> Option<ElementId> {
        if self.layer_type.is_grid() || self.layer_type == LayerType::GeoJson {
            None
        } else {
            self.element
        }
    }

    fn container(&self) -> Option<ElementId> {
        if self.layer_type.is_grid() {
            self.container
        } else {
            None
        }
    }

    fn on_add(&mut self, host: &LayerHost) -> NativeResult<()> {
        if self.layer_type.is_grid() {
            let container = match self.container {
                Some(id) => id,
                None => {
                    let id = host.document.create_element("div");
                    self.container = Some(id);
                    id
                }
            };
            if let Some(pane) = host.pane(Pane::Tile) {
                host.document.append_child(pane, container);
            }
        } else if let Some(element) = self.ensure_element(host) {
            if let Some(parent) = self.target_parent(host) {
                host.document.append_child(parent, element);
            }
            if self.layer_type == LayerType::Marker {
                self.add_shadow(host);
            }
            self.mount_content(host);
        }

        self.host = Some(host.clone());
        self.listeners.fire(&MapEvent::new("add"));
        Ok(())
    }

    fn on_remove(&mut self, host: &LayerHost) {
        for id in [self.element, self.shadow, self.container].into_iter().flatten() {
            host.document.detach(id);
        }
        self.host = None;
        self.listeners.fire(&MapEvent::new("remove"));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl MemoryLayer {
    fn add_shadow(&mut self, host: &LayerHost) {
        if self.icon.get_str("shadowUrl").is_none() {
            return;
        }
        let shadow = match self.shadow {
            Some(id) => id,
            None => {
                let id = host.document.create_element("img");
                self.shadow = Some(id);
                id
            }
        };
        if let Some(pane) = host.pane(Pane::Shadow) {
            host.document.append_child(pane, shadow);
        }
    }
}
