//! Typed element descriptions.
//!
//! Each catalog kind carries the fields its native constructor needs; what
//! is left over stays in `props` and goes through the prop applier.

use crate::dom::ElementId;
use crate::error::{BridgeError, Result};
use crate::geo::{LatLng, LatLngBounds};
use crate::kind::{CatalogKind, ElementKind, ExtensionCategory};
use crate::native::{ExtensionClass, MapReadyHandler, NativeHandle, VideoSource};
use crate::props::{Children, Options, PropValue, Props};
use serde_json::Value;
use smartstring::{LazyCompact, SmartString};

#[derive(Debug, Clone, Default)]
pub struct MapElement {
    pub options: Options,
    pub when_ready: Option<MapReadyHandler>,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub struct ImageElement {
    pub image_url: String,
    pub bounds: LatLngBounds,
    pub options: Options,
    pub props: Props,
}

/// Popup or tooltip. Tooltips ignore `latlng`; they follow their source layer.
#[derive(Debug, Clone, Default)]
pub struct ContentElement {
    pub children: Children,
    pub latlng: Option<LatLng>,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub struct RectangleElement {
    pub bounds: LatLngBounds,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub struct MarkerElement {
    pub latlng: LatLng,
    pub options: Options,
    pub icon_options: Option<Options>,
    pub props: Props,
}

/// Tile layer; `url` is the URL template, or the service URL for WMS.
#[derive(Debug, Clone)]
pub struct TilesElement {
    pub url: String,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub struct VideoElement {
    pub video: VideoSource,
    pub bounds: LatLngBounds,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub struct PolylineElement {
    pub latlngs: Vec<LatLng>,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub struct PolygonElement {
    pub latlngs: Vec<Vec<LatLng>>,
    pub options: Options,
    pub props: Props,
}

/// Circle or circle marker.
#[derive(Debug, Clone)]
pub struct CircleElement {
    pub latlng: LatLng,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub struct SvgElement {
    pub svg_image: ElementId,
    pub bounds: LatLngBounds,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone, Default)]
pub struct GroupElement {
    pub layers: Vec<NativeHandle>,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone, Default)]
pub struct GeoJsonElement {
    pub geojson: Option<Value>,
    pub options: Options,
    pub props: Props,
}

#[derive(Debug, Clone, Default)]
pub struct GridLayerElement {
    pub options: Options,
    pub props: Props,
}

/// User-defined layer, control or handler.
#[derive(Debug, Clone)]
pub struct ExtensionElement {
    pub category: ExtensionCategory,
    pub tag: SmartString<LazyCompact>,
    pub klass: ExtensionClass,
    pub params: Props,
    pub children: Children,
    pub props: Props,
}

#[derive(Debug, Clone)]
pub enum Element {
    Map(MapElement),
    Image(ImageElement),
    Popup(ContentElement),
    Tooltip(ContentElement),
    Rectangle(RectangleElement),
    Marker(MarkerElement),
    Tiles(TilesElement),
    TilesWms(TilesElement),
    Video(VideoElement),
    Polyline(PolylineElement),
    Polygon(PolygonElement),
    Circle(CircleElement),
    CircleMarker(CircleElement),
    Svg(SvgElement),
    LayerGroup(GroupElement),
    FeatureGroup(GroupElement),
    GeoJson(GeoJsonElement),
    GridLayer(GridLayerElement),
    Extension(ExtensionElement),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        let catalog = match self {
            Element::Map(_) => CatalogKind::Map,
            Element::Image(_) => CatalogKind::Image,
            Element::Popup(_) => CatalogKind::Popup,
            Element::Tooltip(_) => CatalogKind::Tooltip,
            Element::Rectangle(_) => CatalogKind::Rectangle,
            Element::Marker(_) => CatalogKind::Marker,
            Element::Tiles(_) => CatalogKind::Tiles,
            Element::TilesWms(_) => CatalogKind::TilesWms,
            Element::Video(_) => CatalogKind::Video,
            Element::Polyline(_) => CatalogKind::Polyline,
            Element::Polygon(_) => CatalogKind::Polygon,
            Element::Circle(_) => CatalogKind::Circle,
            Element::CircleMarker(_) => CatalogKind::CircleMarker,
            Element::Svg(_) => CatalogKind::Svg,
            Element::LayerGroup(_) => CatalogKind::LayerGroup,
            Element::FeatureGroup(_) => CatalogKind::FeatureGroup,
            Element::GeoJson(_) => CatalogKind::GeoJson,
            Element::GridLayer(_) => CatalogKind::GridLayer,
            Element::Extension(ext) => {
                return ElementKind::Extension {
                    category: ext.category,
                    tag: ext.tag.clone(),
                };
            }
        };
        ElementKind::Catalog(catalog)
    }

    /// The generic props left after the required fields were taken out.
    pub fn props(&self) -> &Props {
        match self {
            Element::Map(e) => &e.props,
            Element::Image(e) => &e.props,
            Element::Popup(e) | Element::Tooltip(e) => &e.props,
            Element::Rectangle(e) => &e.props,
            Element::Marker(e) => &e.props,
            Element::Tiles(e) | Element::TilesWms(e) => &e.props,
            Element::Video(e) => &e.props,
            Element::Polyline(e) => &e.props,
            Element::Polygon(e) => &e.props,
            Element::Circle(e) | Element::CircleMarker(e) => &e.props,
            Element::Svg(e) => &e.props,
            Element::LayerGroup(e) | Element::FeatureGroup(e) => &e.props,
            Element::GeoJson(e) => &e.props,
            Element::GridLayer(e) => &e.props,
            Element::Extension(e) => &e.props,
        }
    }

    /// Build the typed element for `kind` out of a dynamic prop map.
    ///
    /// Required fields are removed from `props`; a missing one is
    /// [`BridgeError::MissingProp`], one of the wrong shape is
    /// [`BridgeError::InvalidProp`]. `children` is dropped for groups, whose
    /// children are attached through the host instead.
    pub fn from_props(kind: &ElementKind, props: Props) -> Result<Element> {
        let mut fields = Fields::new(kind, props);
        let element = match kind {
            ElementKind::Catalog(catalog) => match catalog {
                CatalogKind::Map => Element::Map(MapElement {
                    options: fields.options()?,
                    when_ready: fields.optional("whenReady", |v| match v {
                        PropValue::MapReady(h) => Some(h.clone()),
                        _ => None,
                    })?,
                    props: Props::new(),
                }),
                CatalogKind::Image => Element::Image(ImageElement {
                    image_url: fields.required("imageUrl", |v| v.as_str().map(str::to_string))?,
                    bounds: fields.required("bounds", PropValue::as_bounds)?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::Popup | CatalogKind::Tooltip => {
                    let content = ContentElement {
                        children: fields.children()?,
                        latlng: if *catalog == CatalogKind::Popup {
                            fields.optional("latlng", PropValue::as_latlng)?
                        } else {
                            None
                        },
                        options: fields.options()?,
                        props: Props::new(),
                    };
                    if *catalog == CatalogKind::Popup {
                        Element::Popup(content)
                    } else {
                        Element::Tooltip(content)
                    }
                }
                CatalogKind::Rectangle => Element::Rectangle(RectangleElement {
                    bounds: fields.required("bounds", PropValue::as_bounds)?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::Marker => Element::Marker(MarkerElement {
                    latlng: fields.required("latlng", PropValue::as_latlng)?,
                    options: fields.options()?,
                    icon_options: fields.optional("iconOptions", PropValue::as_options)?,
                    props: Props::new(),
                }),
                CatalogKind::Tiles => Element::Tiles(TilesElement {
                    url: fields.required("urlTemplate", |v| v.as_str().map(str::to_string))?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::TilesWms => Element::TilesWms(TilesElement {
                    url: fields.required("baseUrl", |v| v.as_str().map(str::to_string))?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::Video => Element::Video(VideoElement {
                    video: fields.required("video", video_source)?,
                    bounds: fields.required("bounds", PropValue::as_bounds)?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::Polyline => Element::Polyline(PolylineElement {
                    latlngs: fields.required("latlngs", PropValue::as_latlngs)?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::Polygon => Element::Polygon(PolygonElement {
                    latlngs: fields.required("latlngs", PropValue::as_rings)?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::Circle | CatalogKind::CircleMarker => {
                    let circle = CircleElement {
                        latlng: fields.required("latlng", PropValue::as_latlng)?,
                        options: fields.options()?,
                        props: Props::new(),
                    };
                    if *catalog == CatalogKind::Circle {
                        Element::Circle(circle)
                    } else {
                        Element::CircleMarker(circle)
                    }
                }
                CatalogKind::Svg => Element::Svg(SvgElement {
                    svg_image: fields.required("svgImage", PropValue::as_element)?,
                    bounds: fields.required("bounds", PropValue::as_bounds)?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::LayerGroup | CatalogKind::FeatureGroup => {
                    fields.discard("children");
                    let group = GroupElement {
                        layers: fields.optional("layers", PropValue::as_layers)?.unwrap_or_default(),
                        options: fields.options()?,
                        props: Props::new(),
                    };
                    if *catalog == CatalogKind::LayerGroup {
                        Element::LayerGroup(group)
                    } else {
                        Element::FeatureGroup(group)
                    }
                }
                CatalogKind::GeoJson => Element::GeoJson(GeoJsonElement {
                    geojson: fields.optional("geojson", |v| match v {
                        PropValue::Null => None,
                        other => other.to_json(),
                    })?,
                    options: fields.options()?,
                    props: Props::new(),
                }),
                CatalogKind::GridLayer => Element::GridLayer(GridLayerElement {
                    options: fields.options()?,
                    props: Props::new(),
                }),
            },
            ElementKind::Extension { category, tag } => Element::Extension(ExtensionElement {
                category: *category,
                tag: tag.clone(),
                klass: fields.required("klass", |v| match v {
                    PropValue::Class(class) => Some(class.clone()),
                    _ => None,
                })?,
                params: fields.optional("params", params_from_value)?.unwrap_or_default(),
                children: fields.children()?,
                props: Props::new(),
            }),
        };
        Ok(element.with_rest(fields.into_rest()))
    }

    fn with_rest(mut self, rest: Props) -> Self {
        let slot = match &mut self {
            Element::Map(e) => &mut e.props,
            Element::Image(e) => &mut e.props,
            Element::Popup(e) | Element::Tooltip(e) => &mut e.props,
            Element::Rectangle(e) => &mut e.props,
            Element::Marker(e) => &mut e.props,
            Element::Tiles(e) | Element::TilesWms(e) => &mut e.props,
            Element::Video(e) => &mut e.props,
            Element::Polyline(e) => &mut e.props,
            Element::Polygon(e) => &mut e.props,
            Element::Circle(e) | Element::CircleMarker(e) => &mut e.props,
            Element::Svg(e) => &mut e.props,
            Element::LayerGroup(e) | Element::FeatureGroup(e) => &mut e.props,
            Element::GeoJson(e) => &mut e.props,
            Element::GridLayer(e) => &mut e.props,
            Element::Extension(e) => &mut e.props,
        };
        *slot = rest;
        self
    }
}

fn video_source(value: &PropValue) -> Option<VideoSource> {
    match value {
        PropValue::Element(id) => Some(VideoSource::Element(*id)),
        PropValue::List(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(VideoSource::Urls),
        PropValue::Json(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(VideoSource::Urls),
        other => other.as_str().map(|url| VideoSource::Url(url.to_string())),
    }
}

fn params_from_value(value: &PropValue) -> Option<Props> {
    match value {
        PropValue::Null => Some(Props::new()),
        PropValue::Json(Value::Object(map)) => Some(
            map.iter()
                .map(|(k, v)| (k.as_str(), PropValue::Json(v.clone())))
                .collect(),
        ),
        _ => None,
    }
}

/// Takes required fields out of a prop map, tracking the kind for errors.
struct Fields<'a> {
    kind: &'a ElementKind,
    props: Props,
}

impl<'a> Fields<'a> {
    fn new(kind: &'a ElementKind, props: Props) -> Self {
        Self { kind, props }
    }

    fn required<T>(
        &mut self,
        prop: &'static str,
        convert: impl FnOnce(&PropValue) -> Option<T>,
    ) -> Result<T> {
        match self.props.remove(prop) {
            None | Some(PropValue::Null) => Err(BridgeError::MissingProp {
                kind: self.kind.to_string(),
                prop,
            }),
            Some(value) => convert(&value).ok_or_else(|| self.invalid(prop)),
        }
    }

    fn optional<T>(
        &mut self,
        prop: &'static str,
        convert: impl FnOnce(&PropValue) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.props.remove(prop) {
            None | Some(PropValue::Null) => Ok(None),
            Some(value) => convert(&value).map(Some).ok_or_else(|| self.invalid(prop)),
        }
    }

    fn options(&mut self) -> Result<Options> {
        Ok(self
            .optional("options", PropValue::as_options)?
            .unwrap_or_default())
    }

    fn children(&mut self) -> Result<Children> {
        Ok(self
            .optional("children", PropValue::as_children)?
            .unwrap_or_default())
    }

    fn discard(&mut self, prop: &str) {
        self.props.remove(prop);
    }

    fn invalid(&self, prop: &'static str) -> BridgeError {
        BridgeError::InvalidProp {
            kind: self.kind.to_string(),
            prop,
        }
    }

    fn into_rest(self) -> Props {
        self.props
    }
}
