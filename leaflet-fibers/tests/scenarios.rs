use leaflet_fibers::dom::{CssLength, ElementId, ElementStyle, Size};
use leaflet_fibers::event::{EventHandler, MapEvent};
use leaflet_fibers::geo::{LatLng, LatLngBounds};
use leaflet_fibers::native::memory::{
    Content, MemoryGroup, MemoryLayer, MemoryLibrary, MemoryMap, Projection,
};
use leaflet_fibers::native::{MapReadyHandler, NativeHandle, NativeMap, Pane};
use leaflet_fibers::reorder::{try_reorder, visual_element};
use leaflet_fibers::{
    Bridge, BridgeConfig, BridgeError, CatalogKind, Category, ContentRenderer, Instance, Options,
    Props,
};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

fn bridge() -> Bridge<MemoryLibrary> {
    Bridge::new(MemoryLibrary::new().with_projection(Projection::Identity))
}

fn create(bridge: &mut Bridge<MemoryLibrary>, tag: &str, props: Props) -> Instance {
    let root = bridge.document().create_element("div");
    bridge
        .create_instance(tag, props, root)
        .unwrap()
        .unwrap_or_else(|| panic!("{tag} should be a bridge element"))
}

fn create_map(bridge: &mut Bridge<MemoryLibrary>, container: ElementId, props: Props) -> Instance {
    bridge.create_instance("lfMap", props, container).unwrap().unwrap()
}

fn counter() -> (Rc<Cell<u32>>, EventHandler) {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    (hits, EventHandler::new(move |_| h.set(h.get() + 1)))
}

fn minimal_props(bridge: &Bridge<MemoryLibrary>, kind: CatalogKind) -> Props {
    let bounds = json!([[0, 0], [1, 1]]);
    match kind {
        CatalogKind::Image => Props::new().with("imageUrl", "overlay.png").with("bounds", bounds),
        CatalogKind::Rectangle => Props::new().with("bounds", bounds),
        CatalogKind::Marker | CatalogKind::CircleMarker => Props::new().with("latlng", json!([0, 0])),
        CatalogKind::Circle => Props::new()
            .with("latlng", json!([0, 0]))
            .with("options", json!({ "radius": 200 })),
        CatalogKind::Tiles => Props::new().with("urlTemplate", "https://tiles.test/{z}/{x}/{y}.png"),
        CatalogKind::TilesWms => Props::new().with("baseUrl", "https://wms.test/service"),
        CatalogKind::Video => Props::new().with("video", "clip.webm").with("bounds", bounds),
        CatalogKind::Polyline | CatalogKind::Polygon => {
            Props::new().with("latlngs", json!([[0, 0], [0, 1], [1, 1]]))
        }
        CatalogKind::Svg => {
            let svg = bridge.document().create_element("svg");
            Props::new().with("svgImage", svg).with("bounds", bounds)
        }
        _ => Props::new(),
    }
}

#[test]
fn test_every_catalog_kind_gets_its_category() {
    let mut bridge = bridge();
    for kind in CatalogKind::ALL {
        let props = minimal_props(&bridge, kind);
        let instance = create(&mut bridge, kind.tag(), props);
        let expected = match kind {
            CatalogKind::Map => Category::Map,
            CatalogKind::LayerGroup => Category::LayerGroup,
            CatalogKind::FeatureGroup => Category::FeatureGroup,
            _ => Category::Layer,
        };
        assert_eq!(instance.category(), expected, "{}", kind.tag());
        assert_eq!(instance.kind().tag(), kind.tag());
    }
}

#[test]
fn test_declared_props_keep_everything() {
    let mut bridge = bridge();
    let props = Props::new()
        .with("latlng", json!([1, 2]))
        .with("opacity", 0.5);
    let instance = create(&mut bridge, "lfMarker", props);

    let keys: Vec<_> = instance.declared_props().keys().collect();
    assert_eq!(keys, ["latlng", "opacity"]);
}

#[test]
fn test_handler_prop_subscribes_lowercased_event() {
    let mut bridge = bridge();
    let (clicks, on_click) = counter();
    let (overs, on_over) = counter();
    let props = Props::new()
        .with("latlng", json!([0, 0]))
        .with("onClick", on_click)
        .with("onMouseOver", on_over);
    let marker = create(&mut bridge, "lfMarker", props);

    marker
        .native()
        .downcast::<MemoryLayer, _>(|m| {
            assert_eq!(m.listener_count("click"), 1);
            assert_eq!(m.listener_count("mouseover"), 1);
            m.fire(&MapEvent::new("click"));
            m.fire(&MapEvent::new("mouseover"));
            m.fire(&MapEvent::new("mouseover"));
        })
        .unwrap();
    assert_eq!(clicks.get(), 1);
    assert_eq!(overs.get(), 2);
}

#[test]
fn test_handler_without_prefix_still_wired() {
    let mut bridge = bridge();
    let (hits, handler) = counter();
    let props = Props::new().with("latlng", json!([0, 0])).with("dragEnd", handler);
    let marker = create(&mut bridge, "lfMarker", props);

    marker
        .native()
        .downcast::<MemoryLayer, _>(|m| m.fire(&MapEvent::new("dragend")))
        .unwrap();
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_setter_invoked_once() {
    let mut bridge = bridge();
    let props = Props::new()
        .with("urlTemplate", "t/{z}/{x}/{y}")
        .with("opacity", 0.25)
        .with("unknownThing", true);
    let tiles = create(&mut bridge, "lfTiles", props);

    tiles
        .native()
        .downcast::<MemoryLayer, _>(|t| {
            assert_eq!(t.setter_calls(), ["setOpacity"]);
            assert_eq!(t.opacity(), Some(0.25));
            assert_eq!(t.listener_count("opacity"), 0);
        })
        .unwrap();
    assert!(tiles.subscriptions().is_empty());
}

#[test]
fn test_marker_default_icon() {
    let mut bridge = bridge();
    let marker = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([10, 20])));

    let icon = marker
        .native()
        .downcast::<MemoryLayer, _>(|m| m.icon().clone())
        .unwrap();
    assert_eq!(
        icon,
        Options::new()
            .with("iconUrl", "marker-icon.png")
            .with("shadowUrl", "marker-shadow.png")
    );
}

#[test]
fn test_marker_icon_from_config() {
    let config = BridgeConfig::from_json(r#"{ "markerIconUrl": "/assets/pin.png" }"#).unwrap();
    let mut bridge = Bridge::with_config(MemoryLibrary::new(), config);
    let marker = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([0, 0])));

    let icon = marker
        .native()
        .downcast::<MemoryLayer, _>(|m| m.icon().clone())
        .unwrap();
    assert_eq!(icon.get_str("iconUrl"), Some("/assets/pin.png"));
    assert_eq!(icon.get_str("shadowUrl"), Some("marker-shadow.png"));
}

#[test]
fn test_popup_content_rendered_by_service() {
    let mut bridge = bridge();
    bridge.set_content_renderer(ContentRenderer::new(|children, document, el| {
        document.set_text_content(el, children.to_string());
    }));
    let popup = create(&mut bridge, "lfPopup", Props::new().with("children", "hi"));

    let content = popup
        .native()
        .downcast::<MemoryLayer, _>(|p| p.content().cloned())
        .unwrap();
    let Some(Content::Element(section)) = content else {
        panic!("popup content should be the detached section");
    };
    assert_eq!(bridge.document().tag(section).as_deref(), Some("section"));
    assert_eq!(bridge.document().text_content(section), "hi");
}

#[test]
fn test_renderer_under_custom_key() {
    let config = BridgeConfig::from_json(r#"{ "contentRendererKey": "htmlRenderer" }"#).unwrap();
    let mut bridge = Bridge::with_config(MemoryLibrary::new(), config);
    bridge.set_content_renderer(ContentRenderer::new(|children, document, el| {
        document.set_text_content(el, format!("<{children}>"));
    }));
    assert!(bridge.registry().content_renderer("htmlRenderer").is_some());
    assert!(bridge.registry().content_renderer("jsxRenderer").is_none());

    let tooltip = create(&mut bridge, "lfTooltip", Props::new().with("children", "tip"));
    let content = tooltip
        .native()
        .downcast::<MemoryLayer, _>(|t| t.content().cloned())
        .unwrap();
    let Some(Content::Element(section)) = content else {
        panic!("tooltip content should be an element");
    };
    assert_eq!(bridge.document().text_content(section), "<tip>");
}

#[test]
fn test_unknown_kind_is_fatal() {
    let mut bridge = bridge();
    let root = bridge.document().create_element("div");
    let err = bridge
        .create_instance("lfBanana", Props::new(), root)
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::UnknownKind {
            kind: "lfBanana".to_string()
        }
    );
    assert!(err.to_string().contains("lfBanana"));
}

#[test]
fn test_when_ready_called_once_after_view() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let on_ready = MapReadyHandler::new(move |map: &mut dyn NativeMap| {
        assert!(map.is_ready());
        assert!(map.as_any().downcast_ref::<MemoryMap>().is_some());
        c.set(c.get() + 1);
    });

    let map = create_map(&mut bridge, container, Props::new().with("whenReady", on_ready));
    assert_eq!(calls.get(), 0);

    map.native()
        .downcast_mut::<MemoryMap, _>(|m| m.set_view(LatLng::new(0.0, 0.0), 3.0))
        .unwrap();
    assert_eq!(calls.get(), 1);

    map.native()
        .downcast_mut::<MemoryMap, _>(|m| m.set_view(LatLng::new(5.0, 5.0), 4.0))
        .unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_when_ready_runs_immediately_for_initialized_map() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let calls = Rc::new(Cell::new(0));
    let c = calls.clone();
    let props = Props::new()
        .with("options", json!({ "center": [51.5, -0.1], "zoom": 12 }))
        .with("whenReady", MapReadyHandler::new(move |_| c.set(c.get() + 1)));

    let map = create_map(&mut bridge, container, props);
    assert_eq!(calls.get(), 1);
    assert!(bridge.registry().map(container).is_some());
    assert_eq!(map.category(), Category::Map);
}

#[test]
fn test_map_container_already_in_use() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    create_map(&mut bridge, container, Props::new());

    let err = bridge
        .create_instance("lfMap", Props::new(), container)
        .unwrap_err();
    assert_eq!(err.to_string(), "Map container is already initialized.");
}

#[test]
fn test_reorder_within_shared_pane() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let map = create_map(&mut bridge, container, Props::new());
    let a = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([1, 1])));
    let b = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([2, 2])));
    assert!(bridge.append_child(&map, &a).unwrap());
    assert!(bridge.append_child(&map, &b).unwrap());

    let document = bridge.document();
    let (ea, eb) = (
        visual_element(a.native()).unwrap(),
        visual_element(b.native()).unwrap(),
    );
    let pane = document.parent(ea).unwrap();

    assert!(bridge.insert_before(&map, &b, &a).unwrap());
    assert_eq!(document.children(pane), vec![eb, ea]);
}

#[test]
fn test_reorder_across_panes_changes_nothing() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let map = create_map(&mut bridge, container, Props::new());
    let marker = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([1, 1])));
    let line = create(
        &mut bridge,
        "lfPolyline",
        Props::new().with("latlngs", json!([[0, 0], [1, 1]])),
    );
    bridge.append_child(&map, &marker).unwrap();
    bridge.append_child(&map, &line).unwrap();

    let document = bridge.document();
    let marker_el = visual_element(marker.native()).unwrap();
    let line_el = visual_element(line.native()).unwrap();
    let marker_siblings = document.children(document.parent(marker_el).unwrap());
    let line_siblings = document.children(document.parent(line_el).unwrap());

    assert!(!try_reorder(document, marker.native(), line.native()));
    assert_eq!(document.children(document.parent(marker_el).unwrap()), marker_siblings);
    assert_eq!(document.children(document.parent(line_el).unwrap()), line_siblings);
}

#[test]
fn test_reorder_without_element_reports_false() {
    let mut bridge = bridge();
    let group = create(&mut bridge, "lfGeoJSON", Props::new());
    let marker = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([0, 0])));
    assert!(!try_reorder(bridge.document(), group.native(), marker.native()));
}

#[test]
fn test_insert_before_adds_new_child() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let map = create_map(&mut bridge, container, Props::new());
    let first = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([1, 1])));
    let late = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([2, 2])));
    bridge.append_child(&map, &first).unwrap();

    assert!(bridge.insert_before(&map, &late, &first).unwrap());

    let document = bridge.document();
    let pane = document.parent(visual_element(first.native()).unwrap()).unwrap();
    assert_eq!(
        document.children(pane),
        vec![
            visual_element(late.native()).unwrap(),
            visual_element(first.native()).unwrap()
        ]
    );
    assert_eq!(map_order(&map, &[&first, &late]), vec![1, 0]);
}

fn marker(bridge: &mut Bridge<MemoryLibrary>) -> Instance {
    create(bridge, "lfMarker", Props::new().with("latlng", json!([0, 0])))
}

/// Positions of the group's layers within `children`.
fn group_order(group: &Instance, children: &[&Instance]) -> Vec<usize> {
    group
        .native()
        .downcast::<MemoryGroup, _>(|g| positions(g.layers(), children))
        .unwrap()
}

fn map_order(map: &Instance, children: &[&Instance]) -> Vec<usize> {
    map.native()
        .downcast::<MemoryMap, _>(|m| positions(m.layers(), children))
        .unwrap()
}

fn positions(layers: &[NativeHandle], children: &[&Instance]) -> Vec<usize> {
    layers
        .iter()
        .filter_map(|l| children.iter().position(|c| c.native().ptr_eq(l)))
        .collect()
}

#[test]
fn test_insert_before_keeps_group_order() {
    let mut bridge = bridge();
    let group = create(&mut bridge, "lfLayerGroup", Props::new());
    let (a, b, c) = (marker(&mut bridge), marker(&mut bridge), marker(&mut bridge));
    for child in [&a, &b, &c] {
        assert!(bridge.append_child(&group, child).unwrap());
    }

    assert!(bridge.insert_before(&group, &c, &a).unwrap());
    assert_eq!(group_order(&group, &[&a, &b, &c]), vec![2, 0, 1]);

    assert!(bridge.insert_before(&group, &a, &b).unwrap());
    assert_eq!(group_order(&group, &[&a, &b, &c]), vec![2, 0, 1]);

    assert!(bridge.insert_before(&group, &b, &a).unwrap());
    assert_eq!(group_order(&group, &[&a, &b, &c]), vec![2, 1, 0]);
}

#[test]
fn test_insert_before_unknown_reference_changes_nothing() {
    let mut bridge = bridge();
    let group = create(&mut bridge, "lfFeatureGroup", Props::new());
    let (a, b, stranger) = (marker(&mut bridge), marker(&mut bridge), marker(&mut bridge));
    bridge.append_child(&group, &a).unwrap();
    bridge.append_child(&group, &b).unwrap();

    assert!(!bridge.insert_before(&group, &a, &stranger).unwrap());
    assert!(!bridge.insert_before(&group, &a, &a).unwrap());
    assert_eq!(group_order(&group, &[&a, &b]), vec![0, 1]);
}

#[test]
fn test_mount_sizes_from_bounds() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let map = create_map(&mut bridge, container, Props::new());

    bridge
        .commit_mount(&map, None, Some(LatLngBounds::new((0.0, 0.0), (1.0, 1.0))))
        .unwrap();

    let style = bridge.document().style(container);
    assert_eq!(style.width, Some(CssLength::Px(1.0)));
    assert_eq!(style.height, Some(CssLength::Px(1.0)));
    let invalidations = map
        .native()
        .downcast::<MemoryMap, _>(MemoryMap::invalidations)
        .unwrap();
    assert_eq!(invalidations, 1);
}

#[test]
fn test_mount_uses_declared_max_bounds() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let props = Props::new().with("options", json!({ "maxBounds": [[0, 0], [3, 4]] }));
    let map = create_map(&mut bridge, container, props);

    bridge.commit_mount(&map, None, None).unwrap();

    let style = bridge.document().style(container);
    assert_eq!(style.width, Some(CssLength::Px(4.0)));
    assert_eq!(style.height, Some(CssLength::Px(3.0)));
}

#[test]
fn test_mount_without_parent_is_missing_size() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let map = create_map(&mut bridge, container, Props::new());

    let err = bridge.commit_mount(&map, None, None).unwrap_err();
    assert_eq!(err, BridgeError::MissingSize);
    assert_eq!(bridge.document().style(container), ElementStyle::default());
}

#[test]
fn test_mount_fills_parent_and_reports_resize() {
    let mut bridge = bridge();
    let document = bridge.document().clone();
    let parent = document.create_element("main");
    let container = document.create_element("div");
    document.append_child(parent, container);
    document.set_client_size(parent, Size::new(800.0, 600.0));
    let mut map = create_map(&mut bridge, container, Props::new());

    let (resizes, on_resize) = counter();
    bridge.commit_update(&mut map, &Props::new().with("onResize", on_resize), &[]);

    // the host layout engine is expected to lay the container out at 100%
    document.set_client_size(container, Size::new(800.0, 600.0));
    bridge.commit_mount(&map, None, None).unwrap();

    let style = document.style(container);
    assert_eq!(style.width, Some(CssLength::Percent(100.0)));
    assert_eq!(style.height, Some(CssLength::Percent(100.0)));
    assert_eq!(resizes.get(), 1);
}

#[test]
fn test_update_replaces_handler() {
    let mut bridge = bridge();
    let (first_hits, first) = counter();
    let (second_hits, second) = counter();
    let mut marker = create(
        &mut bridge,
        "lfMarker",
        Props::new().with("latlng", json!([0, 0])).with("onClick", first),
    );

    bridge.commit_update(&mut marker, &Props::new().with("onClick", second), &[]);
    marker
        .native()
        .downcast::<MemoryLayer, _>(|m| {
            assert_eq!(m.listener_count("click"), 1);
            m.fire(&MapEvent::new("click"));
        })
        .unwrap();
    assert_eq!(first_hits.get(), 0);
    assert_eq!(second_hits.get(), 1);

    bridge.commit_update(&mut marker, &Props::new(), &["onClick"]);
    let remaining = marker
        .native()
        .downcast::<MemoryLayer, _>(|m| m.listener_count("click"))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn test_update_reaches_only_matching_setters() {
    let mut bridge = bridge();
    let mut marker = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([0, 0])));

    // `latlng` maps to `setLatlng`, which markers do not have
    bridge.commit_update(&mut marker, &Props::new().with("latlng", LatLng::new(4.0, 5.0)), &[]);
    let (latlng, calls) = marker
        .native()
        .downcast::<MemoryLayer, _>(|m| (m.latlng(), m.setter_calls().len()))
        .unwrap();
    assert_eq!(latlng, Some(LatLng::new(0.0, 0.0)));
    assert_eq!(calls, 0);
    assert!(marker.declared_props().contains_key("latlng"));

    bridge.commit_update(&mut marker, &Props::new().with("zIndexOffset", 250), &[]);
    let (offset, calls) = marker
        .native()
        .downcast::<MemoryLayer, _>(|m| {
            let offset = m.options().get("zIndexOffset").and_then(|v| v.as_f64());
            let calls: Vec<String> = m.setter_calls().iter().map(|s| s.to_string()).collect();
            (offset, calls)
        })
        .unwrap();
    assert_eq!(offset, Some(250.0));
    assert_eq!(calls, vec!["setZIndexOffset".to_string()]);
}

#[test]
fn test_group_children_follow_the_group() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let map = create_map(&mut bridge, container, Props::new());
    let group = create(&mut bridge, "lfFeatureGroup", Props::new());
    let marker = create(&mut bridge, "lfMarker", Props::new().with("latlng", json!([0, 0])));

    assert!(bridge.append_child(&group, &marker).unwrap());
    assert!(visual_element(marker.native()).is_none());

    assert!(bridge.append_child(&map, &group).unwrap());
    let marker_el = visual_element(marker.native()).unwrap();
    let pane = map
        .native()
        .downcast::<MemoryMap, _>(|m| m.pane(Pane::Marker))
        .unwrap();
    assert_eq!(bridge.document().parent(marker_el), pane);

    assert!(bridge.remove_child(&map, &group));
    assert_eq!(bridge.document().parent(marker_el), None);
}

#[test]
fn test_destroy_disposes_popup_content() {
    let mut bridge = bridge();
    let popup = create(&mut bridge, "lfPopup", Props::new().with("children", "hi"));
    let section = popup.content().unwrap();
    assert!(bridge.document().contains(section));

    bridge.destroy_instance(popup);
    assert!(!bridge.document().contains(section));

    let plain = marker(&mut bridge);
    assert_eq!(plain.content(), None);
}

#[test]
fn test_destroy_map_releases_registry_entry() {
    let mut bridge = bridge();
    let container = bridge.document().create_element("div");
    let map = create_map(&mut bridge, container, Props::new());
    assert!(bridge.registry().map(container).is_some());

    bridge.destroy_instance(map);
    assert!(bridge.registry().map(container).is_none());
}
