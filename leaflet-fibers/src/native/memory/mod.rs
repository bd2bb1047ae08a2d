//! In-memory implementation of the native map library.
//!
//! Renders into a [`Document`] instead of a browser. Used by the test suite
//! and by headless hosts that only need the object graph.

mod group;
mod layer;
mod map;

pub use group::{GroupType, MemoryGroup};
pub use layer::{Content, LayerType, MemoryLayer};
pub use map::{MemoryMap, Projection};

use crate::dom::{Document, ElementId};
use crate::error::NativeError;
use crate::geo::{LatLng, LatLngBounds};
use crate::native::{NativeHandle, NativeLibrary, NativeResult, SharedMap, VideoSource};
use crate::props::Options;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Index `layer` takes to sit right before `before`. A layer already in
/// `layers` is taken out first; the flag says whether it was there. `None`
/// when `before` is not in `layers` or is `layer` itself.
fn slot_before(
    layers: &mut Vec<NativeHandle>,
    layer: &NativeHandle,
    before: &NativeHandle,
) -> Option<(usize, bool)> {
    if layer.ptr_eq(before) {
        return None;
    }
    let target = layers.iter().position(|l| l.ptr_eq(before))?;
    match layers.iter().position(|l| l.ptr_eq(layer)) {
        Some(index) => {
            layers.remove(index);
            Some((if index < target { target - 1 } else { target }, true))
        }
        None => Some((target, false)),
    }
}

pub struct MemoryLibrary {
    document: Document,
    projection: Option<Projection>,
    containers: RefCell<HashSet<ElementId>>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            projection: None,
            containers: RefCell::new(HashSet::new()),
        }
    }

    /// Force every map created from now on to use `projection`, whatever
    /// its `crs` option says.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Mark `container` as free again so a new map may be created on it.
    pub fn release(&self, container: ElementId) -> bool {
        self.containers.borrow_mut().remove(&container)
    }

    fn layer(&self, layer: MemoryLayer) -> NativeResult<NativeHandle> {
        Ok(NativeHandle::object(layer))
    }
}

impl Default for MemoryLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn require_radius(constructor: &'static str, options: &Options) -> NativeResult<()> {
    match options.get_f64("radius") {
        Some(r) if r.is_finite() => Ok(()),
        _ => Err(NativeError::InvalidArgument {
            constructor,
            reason: "radius cannot be NaN".to_string(),
        }),
    }
}

impl NativeLibrary for MemoryLibrary {
    fn document(&self) -> &Document {
        &self.document
    }

    fn map(&self, container: ElementId, options: &Options) -> NativeResult<SharedMap> {
        if !self.document.contains(container) {
            return Err(NativeError::ContainerNotFound);
        }
        if !self.containers.borrow_mut().insert(container) {
            return Err(NativeError::ContainerInUse);
        }
        let projection = self
            .projection
            .unwrap_or_else(|| Projection::from_options(options));
        let map = MemoryMap::new(self.document.clone(), container, options, projection);
        Ok(Rc::new(RefCell::new(map)))
    }

    fn image_overlay(
        &self,
        image_url: &str,
        bounds: LatLngBounds,
        options: &Options,
    ) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::ImageOverlay, options);
        layer.url = Some(image_url.to_string());
        layer.bounds = Some(bounds);
        self.layer(layer)
    }

    fn popup(&self, options: &Options) -> NativeResult<NativeHandle> {
        self.layer(MemoryLayer::new(LayerType::Popup, options))
    }

    fn tooltip(&self, options: &Options) -> NativeResult<NativeHandle> {
        self.layer(MemoryLayer::new(LayerType::Tooltip, options))
    }

    fn rectangle(&self, bounds: LatLngBounds, options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::Rectangle, options);
        layer.bounds = Some(bounds);
        layer.rings = vec![layer::rectangle_ring(bounds)];
        self.layer(layer)
    }

    fn marker(&self, latlng: LatLng, options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::Marker, options);
        layer.latlng = Some(latlng);
        self.layer(layer)
    }

    fn tile_layer(&self, url_template: &str, options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::TileLayer, options);
        layer.url = Some(url_template.to_string());
        self.layer(layer)
    }

    fn tile_layer_wms(&self, base_url: &str, options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::TileLayerWms, options);
        layer.url = Some(base_url.to_string());
        // every option that is not a tile-layer setting becomes a WMS request parameter
        let mut params = Options::new();
        for (key, value) in options.iter() {
            if !matches!(key.as_str(), "opacity" | "zIndex" | "attribution" | "tileSize") {
                params.insert(key, value.clone());
            }
        }
        layer.params = params;
        self.layer(layer)
    }

    fn video_overlay(
        &self,
        video: &VideoSource,
        bounds: LatLngBounds,
        options: &Options,
    ) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::VideoOverlay, options);
        if let VideoSource::Url(url) = video {
            layer.url = Some(url.clone());
        }
        layer.video = Some(video.clone());
        layer.bounds = Some(bounds);
        self.layer(layer)
    }

    fn polyline(&self, latlngs: &[LatLng], options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::Polyline, options);
        layer.rings = vec![latlngs.to_vec()];
        self.layer(layer)
    }

    fn polygon(&self, rings: &[Vec<LatLng>], options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::Polygon, options);
        layer.rings = rings.to_vec();
        self.layer(layer)
    }

    fn circle(&self, latlng: LatLng, options: &Options) -> NativeResult<NativeHandle> {
        require_radius("circle", options)?;
        let mut layer = MemoryLayer::new(LayerType::Circle, options);
        layer.latlng = Some(latlng);
        self.layer(layer)
    }

    fn circle_marker(&self, latlng: LatLng, options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::CircleMarker, options);
        layer.latlng = Some(latlng);
        layer.radius = Some(options.get_f64("radius").unwrap_or(10.0));
        self.layer(layer)
    }

    fn svg_overlay(
        &self,
        svg_image: ElementId,
        bounds: LatLngBounds,
        options: &Options,
    ) -> NativeResult<NativeHandle> {
        if !self.document.contains(svg_image) {
            return Err(NativeError::InvalidArgument {
                constructor: "svgOverlay",
                reason: "svg element is not part of the document".to_string(),
            });
        }
        let mut layer = MemoryLayer::new(LayerType::SvgOverlay, options);
        layer.svg = Some(svg_image);
        layer.bounds = Some(bounds);
        self.layer(layer)
    }

    fn layer_group(&self, layers: &[NativeHandle], options: &Options) -> NativeResult<NativeHandle> {
        Ok(NativeHandle::object(MemoryGroup::new(
            GroupType::LayerGroup,
            layers,
            options,
        )))
    }

    fn feature_group(&self, layers: &[NativeHandle], options: &Options) -> NativeResult<NativeHandle> {
        Ok(NativeHandle::object(MemoryGroup::new(
            GroupType::FeatureGroup,
            layers,
            options,
        )))
    }

    fn geo_json(&self, geojson: Option<&Value>, options: &Options) -> NativeResult<NativeHandle> {
        let mut layer = MemoryLayer::new(LayerType::GeoJson, options);
        if let Some(data) = geojson {
            match data.get("type").and_then(Value::as_str) {
                Some(_) => layer.geojson = Some(data.clone()),
                None if data.is_array() => layer.geojson = Some(data.clone()),
                None => {
                    return Err(NativeError::InvalidArgument {
                        constructor: "geoJSON",
                        reason: "Invalid GeoJSON object.".to_string(),
                    });
                }
            }
        }
        self.layer(layer)
    }

    fn grid_layer(&self, options: &Options) -> NativeResult<NativeHandle> {
        self.layer(MemoryLayer::new(LayerType::GridLayer, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_second_map_on_same_container_fails() {
        let library = MemoryLibrary::new();
        let container = library.document().create_element("div");

        assert!(library.map(container, &Options::new()).is_ok());
        assert_eq!(
            library.map(container, &Options::new()).err(),
            Some(NativeError::ContainerInUse)
        );

        assert!(library.release(container));
        assert!(library.map(container, &Options::new()).is_ok());
    }

    #[test]
    fn test_circle_requires_radius() {
        let library = MemoryLibrary::new();
        let err = library.circle(LatLng::new(0.0, 0.0), &Options::new()).err();
        assert!(matches!(err, Some(NativeError::InvalidArgument { .. })));

        let ok = library.circle(LatLng::new(0.0, 0.0), &Options::new().with("radius", 20));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_wms_options_become_params() {
        let library = MemoryLibrary::new();
        let options = Options::new().with("layers", "roads").with("opacity", 0.5);
        let handle = library.tile_layer_wms("https://example.test/wms", &options).unwrap();

        let (params, opacity) = handle
            .downcast::<MemoryLayer, _>(|l| (l.params().clone(), l.opacity()))
            .unwrap();
        assert_eq!(params.get_str("layers"), Some("roads"));
        assert!(!params.contains_key("opacity"));
        assert_eq!(opacity, Some(0.5));
    }

    #[test]
    fn test_insert_layer_places_before_reference() {
        let library = MemoryLibrary::new();
        let marker = || library.marker(LatLng::new(0.0, 0.0), &Options::new()).unwrap();
        let (a, b, c) = (marker(), marker(), marker());
        let group = library.layer_group(&[a.clone(), b.clone()], &Options::new()).unwrap();

        let inserted = group.with_mut(|g| g.insert_layer(&c, &a)).unwrap();
        assert!(inserted);
        let moved = group.with_mut(|g| g.insert_layer(&a, &c)).unwrap();
        assert!(moved);
        let missing = group.with_mut(|g| g.insert_layer(&b, &marker())).unwrap();
        assert!(!missing);

        let order: Vec<usize> = group
            .downcast::<MemoryGroup, _>(|g| {
                g.layers()
                    .iter()
                    .filter_map(|l| [&a, &b, &c].iter().position(|x| x.ptr_eq(l)))
                    .collect()
            })
            .unwrap();
        assert_eq!(order, vec![0, 2, 1]);
    }

    #[test]
    fn test_insert_layer_into_added_group_adds_new_child() {
        let library = MemoryLibrary::new();
        let container = library.document().create_element("div");
        let map = NativeHandle::Map(library.map(container, &Options::new()).unwrap());
        let first = library.marker(LatLng::new(0.0, 0.0), &Options::new()).unwrap();
        let group = library.feature_group(&[first.clone()], &Options::new()).unwrap();
        map.with_mut(|m| m.add_layer(&group)).unwrap();

        let late = library.marker(LatLng::new(1.0, 1.0), &Options::new()).unwrap();
        assert!(group.with_mut(|g| g.insert_layer(&late, &first)).unwrap());
        assert!(late.downcast::<MemoryLayer, _>(MemoryLayer::is_added).unwrap());
    }

    #[test]
    fn test_geojson_rejects_untyped_objects() {
        let library = MemoryLibrary::new();
        let bad = json!({ "features": [] });
        assert!(library.geo_json(Some(&bad), &Options::new()).is_err());

        let good = json!({ "type": "FeatureCollection", "features": [] });
        assert!(library.geo_json(Some(&good), &Options::new()).is_ok());
    }
}
