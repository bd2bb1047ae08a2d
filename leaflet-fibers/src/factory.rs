//! Instance factory: typed element in, live native object out.

use crate::applier::{apply_props, Subscriptions};
use crate::config::BridgeConfig;
use crate::dom::ElementId;
use crate::element::{ContentElement, Element, ExtensionElement, MapElement, MarkerElement};
use crate::error::Result;
use crate::instance::Instance;
use crate::native::{ExtensionParams, NativeHandle, NativeLibrary};
use crate::props::{Options, PropValue, Props};
use crate::registry::{ContentRenderer, RootRegistry};
use tracing::debug;

/// Everything creation needs from the render root.
pub struct CreateContext<'a> {
    pub library: &'a dyn NativeLibrary,
    pub registry: &'a mut RootRegistry,
    pub config: &'a BridgeConfig,
    /// Container of the root the element is created under.
    pub root_container: ElementId,
}

impl CreateContext<'_> {
    fn content_renderer(&self) -> Option<ContentRenderer> {
        self.registry.content_renderer(&self.config.content_renderer_key)
    }
}

/// Construct the native object for `element`, apply its generic props and
/// wrap it. `declared` is what the instance remembers as its props.
pub fn create(cx: &mut CreateContext<'_>, element: Element, declared: Props) -> Result<Instance> {
    let kind = element.kind();
    let lib = cx.library;

    let mut content = None;
    let (native, subscriptions) = match element {
        Element::Map(e) => create_map(cx, e)?,
        Element::Image(e) => {
            with_props(lib.image_overlay(&e.image_url, e.bounds, &e.options)?, &e.props)
        }
        Element::Popup(e) => {
            let native = lib.popup(&e.options)?;
            let (created, host) = create_content(cx, native, e);
            content = Some(host);
            created
        }
        Element::Tooltip(e) => {
            let native = lib.tooltip(&e.options)?;
            let (created, host) = create_content(cx, native, e);
            content = Some(host);
            created
        }
        Element::Rectangle(e) => with_props(lib.rectangle(e.bounds, &e.options)?, &e.props),
        Element::Marker(e) => create_marker(cx, e)?,
        Element::Tiles(e) => with_props(lib.tile_layer(&e.url, &e.options)?, &e.props),
        Element::TilesWms(e) => with_props(lib.tile_layer_wms(&e.url, &e.options)?, &e.props),
        Element::Video(e) => {
            with_props(lib.video_overlay(&e.video, e.bounds, &e.options)?, &e.props)
        }
        Element::Polyline(e) => with_props(lib.polyline(&e.latlngs, &e.options)?, &e.props),
        Element::Polygon(e) => with_props(lib.polygon(&e.latlngs, &e.options)?, &e.props),
        Element::Circle(e) => with_props(lib.circle(e.latlng, &e.options)?, &e.props),
        Element::CircleMarker(e) => {
            with_props(lib.circle_marker(e.latlng, &e.options)?, &e.props)
        }
        Element::Svg(e) => {
            with_props(lib.svg_overlay(e.svg_image, e.bounds, &e.options)?, &e.props)
        }
        Element::LayerGroup(e) => with_props(lib.layer_group(&e.layers, &e.options)?, &e.props),
        Element::FeatureGroup(e) => {
            with_props(lib.feature_group(&e.layers, &e.options)?, &e.props)
        }
        Element::GeoJson(e) => {
            with_props(lib.geo_json(e.geojson.as_ref(), &e.options)?, &e.props)
        }
        Element::GridLayer(e) => with_props(lib.grid_layer(&e.options)?, &e.props),
        Element::Extension(e) => create_extension(cx, e)?,
    };

    debug!(kind = %kind, category = %kind.category(), handlers = subscriptions.len(), "created instance");
    let instance = Instance::new(kind, native, declared, subscriptions);
    Ok(match content {
        Some(host) => instance.with_content(host),
        None => instance,
    })
}

fn with_props(native: NativeHandle, props: &Props) -> (NativeHandle, Subscriptions) {
    let subscriptions = native.with_mut(|object| apply_props(object, props));
    (native, subscriptions)
}

fn create_map(cx: &mut CreateContext<'_>, e: MapElement) -> Result<(NativeHandle, Subscriptions)> {
    let map = cx.library.map(cx.root_container, &e.options)?;
    if let Some(handler) = e.when_ready {
        map.borrow_mut().when_ready(Box::new(move |m| handler.call(m)));
    }
    cx.registry.register_map(cx.root_container, map.clone());
    Ok(with_props(NativeHandle::Map(map), &e.props))
}

/// Popups and tooltips: content goes into a detached `section` that the
/// content renderer, when registered, mounts the children into.
fn create_content(
    cx: &CreateContext<'_>,
    native: NativeHandle,
    e: ContentElement,
) -> ((NativeHandle, Subscriptions), ElementId) {
    let document = cx.library.document();
    let host = document.create_element("section");
    native.with_mut(|object| {
        object.call_setter("setContent", &PropValue::Element(host));
        if let Some(latlng) = e.latlng {
            object.call_setter("setLatLng", &PropValue::LatLng(latlng));
        }
    });

    let created = with_props(native, &e.props);

    match cx.content_renderer() {
        Some(renderer) => renderer.render(&e.children, document, host),
        None => debug!(?host, "no content renderer registered, content left empty"),
    }
    (created, host)
}

fn create_marker(cx: &CreateContext<'_>, e: MarkerElement) -> Result<(NativeHandle, Subscriptions)> {
    let default_icon = Options::new()
        .with("iconUrl", cx.config.marker_icon_url.as_str())
        .with("shadowUrl", cx.config.marker_shadow_url.as_str());
    let icon = e.icon_options.unwrap_or_default().over(&default_icon);
    let options = e.options.over(&Options::new().with("icon", icon));

    let native = cx.library.marker(e.latlng, &options)?;
    Ok(with_props(native, &e.props))
}

fn create_extension(
    cx: &CreateContext<'_>,
    e: ExtensionElement,
) -> Result<(NativeHandle, Subscriptions)> {
    let params = ExtensionParams {
        params: e.params,
        children: e.children,
        content_renderer: cx.content_renderer(),
        document: cx.library.document().clone(),
    };
    let native = e.klass.instantiate(params)?;
    if e.category.applies_props() {
        Ok(with_props(native, &e.props))
    } else {
        Ok((native, Subscriptions::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{Category, CatalogKind, ElementKind};
    use crate::native::memory::{MemoryLayer, MemoryLibrary};
    use crate::registry::RegistryValue;
    use serde_json::json;

    fn build(library: &MemoryLibrary, registry: &mut RootRegistry, tag: &str, props: Props) -> Result<Instance> {
        let config = BridgeConfig::default();
        let root_container = library.document().create_element("div");
        let kind = ElementKind::parse(tag)?.unwrap();
        let element = Element::from_props(&kind, props.clone())?;
        let mut cx = CreateContext {
            library,
            registry,
            config: &config,
            root_container,
        };
        create(&mut cx, element, props)
    }

    #[test]
    fn test_user_icon_options_win() {
        let library = MemoryLibrary::new();
        let mut registry = RootRegistry::new();
        let props = Props::new()
            .with("latlng", json!([0, 0]))
            .with("iconOptions", json!({ "iconUrl": "pin.svg" }));

        let instance = build(&library, &mut registry, "lfMarker", props).unwrap();
        let icon = instance
            .native()
            .downcast::<MemoryLayer, _>(|m| m.icon().clone())
            .unwrap();
        assert_eq!(icon.get_str("iconUrl"), Some("pin.svg"));
        assert_eq!(icon.get_str("shadowUrl"), Some("marker-shadow.png"));
    }

    #[test]
    fn test_explicit_icon_option_overrides_merged_icon() {
        let library = MemoryLibrary::new();
        let mut registry = RootRegistry::new();
        let props = Props::new()
            .with("latlng", json!([0, 0]))
            .with("options", json!({ "icon": { "iconUrl": "custom.png" } }));

        let instance = build(&library, &mut registry, "lfMarker", props).unwrap();
        let icon = instance
            .native()
            .downcast::<MemoryLayer, _>(|m| m.icon().clone())
            .unwrap();
        assert_eq!(icon.get_str("iconUrl"), Some("custom.png"));
        assert!(!icon.contains_key("shadowUrl"));
    }

    #[test]
    fn test_map_is_registered_under_its_container() {
        let library = MemoryLibrary::new();
        let mut registry = RootRegistry::new();
        let config = BridgeConfig::default();
        let container = library.document().create_element("div");
        let mut cx = CreateContext {
            library: &library,
            registry: &mut registry,
            config: &config,
            root_container: container,
        };

        let instance = create(&mut cx, Element::Map(MapElement::default()), Props::new()).unwrap();
        assert_eq!(instance.category(), Category::Map);
        assert!(registry.map(container).is_some());
    }

    #[test]
    fn test_tooltip_without_renderer_keeps_empty_section() {
        let library = MemoryLibrary::new();
        let mut registry = RootRegistry::new();
        let props = Props::new().with("children", "ignored");

        let instance = build(&library, &mut registry, "lfTooltip", props).unwrap();
        let content = instance
            .native()
            .downcast::<MemoryLayer, _>(|m| m.content().cloned())
            .unwrap();
        let Some(crate::native::memory::Content::Element(section)) = content else {
            panic!("tooltip content should be an element");
        };
        assert_eq!(library.document().tag(section).as_deref(), Some("section"));
        assert_eq!(library.document().text_content(section), "");
    }

    #[test]
    fn test_popup_renders_children_through_service() {
        let library = MemoryLibrary::new();
        let mut registry = RootRegistry::new();
        registry.register_service(
            "jsxRenderer",
            RegistryValue::ContentRenderer(ContentRenderer::new(|children, document, el| {
                document.set_text_content(el, children.to_string());
            })),
        );
        let props = Props::new().with("children", "hi").with("latlng", json!([1, 2]));

        let instance = build(&library, &mut registry, "lfPopup", props).unwrap();
        let (content, latlng) = instance
            .native()
            .downcast::<MemoryLayer, _>(|m| (m.content().cloned(), m.latlng()))
            .unwrap();
        let Some(crate::native::memory::Content::Element(section)) = content else {
            panic!("popup content should be an element");
        };
        assert_eq!(library.document().text_content(section), "hi");
        assert_eq!(latlng, Some(crate::geo::LatLng::new(1.0, 2.0)));
        assert_eq!(instance.kind(), &ElementKind::Catalog(CatalogKind::Popup));
    }

    #[test]
    fn test_native_failure_propagates() {
        let library = MemoryLibrary::new();
        let mut registry = RootRegistry::new();
        let props = Props::new().with("latlng", json!([0, 0]));
        let err = build(&library, &mut registry, "lfCircle", props).unwrap_err();
        assert!(matches!(err, crate::error::BridgeError::Native(_)));
    }
}
