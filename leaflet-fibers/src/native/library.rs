use super::{NativeHandle, SharedMap};
use crate::dom::{Document, ElementId};
use crate::error::NativeError;
use crate::geo::{LatLng, LatLngBounds};
use crate::props::Options;
use serde_json::Value;

pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// Source of a video overlay: one URL, several alternatives, or an existing
/// video element.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoSource {
    Url(String),
    Urls(Vec<String>),
    Element(ElementId),
}

/// Constructor family of the native map library.
///
/// One method per catalog kind; arguments mirror the positional parameters
/// of the native factories.
pub trait NativeLibrary {
    /// Document the library renders into. Detached content elements are
    /// created here.
    fn document(&self) -> &Document;

    fn map(&self, container: ElementId, options: &Options) -> NativeResult<SharedMap>;

    fn image_overlay(&self, image_url: &str, bounds: LatLngBounds, options: &Options)
    -> NativeResult<NativeHandle>;

    fn popup(&self, options: &Options) -> NativeResult<NativeHandle>;

    fn tooltip(&self, options: &Options) -> NativeResult<NativeHandle>;

    fn rectangle(&self, bounds: LatLngBounds, options: &Options) -> NativeResult<NativeHandle>;

    fn marker(&self, latlng: LatLng, options: &Options) -> NativeResult<NativeHandle>;

    fn tile_layer(&self, url_template: &str, options: &Options) -> NativeResult<NativeHandle>;

    fn tile_layer_wms(&self, base_url: &str, options: &Options) -> NativeResult<NativeHandle>;

    fn video_overlay(
        &self,
        video: &VideoSource,
        bounds: LatLngBounds,
        options: &Options,
    ) -> NativeResult<NativeHandle>;

    fn polyline(&self, latlngs: &[LatLng], options: &Options) -> NativeResult<NativeHandle>;

    fn polygon(&self, rings: &[Vec<LatLng>], options: &Options) -> NativeResult<NativeHandle>;

    fn circle(&self, latlng: LatLng, options: &Options) -> NativeResult<NativeHandle>;

    fn circle_marker(&self, latlng: LatLng, options: &Options) -> NativeResult<NativeHandle>;

    fn svg_overlay(
        &self,
        svg_image: ElementId,
        bounds: LatLngBounds,
        options: &Options,
    ) -> NativeResult<NativeHandle>;

    fn layer_group(&self, layers: &[NativeHandle], options: &Options) -> NativeResult<NativeHandle>;

    fn feature_group(&self, layers: &[NativeHandle], options: &Options) -> NativeResult<NativeHandle>;

    fn geo_json(&self, geojson: Option<&Value>, options: &Options) -> NativeResult<NativeHandle>;

    fn grid_layer(&self, options: &Options) -> NativeResult<NativeHandle>;
}
