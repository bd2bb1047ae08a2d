//! The render root driven by a reconciliation runtime.

use crate::config::BridgeConfig;
use crate::dom::{Document, ElementId, ElementStyle};
use crate::element::Element;
use crate::error::{BridgeError, Result};
use crate::factory::{self, CreateContext};
use crate::geo::LatLngBounds;
use crate::instance::Instance;
use crate::kind::{Category, ElementKind};
use crate::native::{NativeHandle, NativeLibrary};
use crate::props::{PropValue, Props};
use crate::registry::{ContentRenderer, RegistryKey, RegistryValue, RootRegistry};
use crate::reorder::{try_reorder, visual_element};
use crate::size::resolve_size;
use tracing::{debug, trace};

/// One render root: the native library, its registry and its settings.
///
/// The runtime creates instances through [`Bridge::create_instance`] and
/// wires them together with the child operations. Everything runs on one
/// thread.
pub struct Bridge<L: NativeLibrary> {
    library: L,
    registry: RootRegistry,
    config: BridgeConfig,
}

impl<L: NativeLibrary> Bridge<L> {
    pub fn new(library: L) -> Self {
        Self::with_config(library, BridgeConfig::default())
    }

    pub fn with_config(library: L, config: BridgeConfig) -> Self {
        Self {
            library,
            registry: RootRegistry::new(),
            config,
        }
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    pub fn document(&self) -> &Document {
        self.library.document()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &RootRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RootRegistry {
        &mut self.registry
    }

    /// Register the service popups, tooltips and extensions render their
    /// children with. Replaces any earlier one.
    pub fn set_content_renderer(&mut self, renderer: ContentRenderer) {
        let key = self.config.content_renderer_key.clone();
        self.registry
            .register_service(&key, RegistryValue::ContentRenderer(renderer));
    }

    pub fn content_renderer(&self) -> Option<ContentRenderer> {
        self.registry.content_renderer(&self.config.content_renderer_key)
    }

    /// Create an instance from a tag and its declared props.
    ///
    /// Returns `Ok(None)` for tags that are not bridge elements. The instance
    /// remembers `props` in full as its declared props.
    pub fn create_instance(
        &mut self,
        tag: &str,
        props: Props,
        root_container: ElementId,
    ) -> Result<Option<Instance>> {
        let Some(kind) = ElementKind::parse(tag)? else {
            trace!(tag, "not a bridge element");
            return Ok(None);
        };
        let element = Element::from_props(&kind, props.clone())?;
        self.build(element, props, root_container).map(Some)
    }

    /// Create an instance from an already typed element. Its generic props
    /// are what the instance remembers.
    pub fn create(&mut self, element: Element, root_container: ElementId) -> Result<Instance> {
        let declared = element.props().clone();
        self.build(element, declared, root_container)
    }

    fn build(&mut self, element: Element, declared: Props, root_container: ElementId) -> Result<Instance> {
        let mut cx = CreateContext {
            library: &self.library,
            registry: &mut self.registry,
            config: &self.config,
            root_container,
        };
        factory::create(&mut cx, element, declared)
    }

    /// Attach `child` to `parent`. Returns false when `parent` cannot hold
    /// children of that kind.
    pub fn append_child(&self, parent: &Instance, child: &Instance) -> Result<bool> {
        if !accepts(parent.category(), child.category()) {
            debug!(parent = %parent.kind(), child = %child.kind(), "parent does not take children");
            return Ok(false);
        }
        let added = add_layer(parent.native(), child.native())?;
        trace!(parent = %parent.kind(), child = %child.kind(), added, "appended child");
        Ok(added)
    }

    pub fn remove_child(&self, parent: &Instance, child: &Instance) -> bool {
        let removed = parent
            .native()
            .with_mut(|p| p.remove_layer(child.native()));
        trace!(parent = %parent.kind(), child = %child.kind(), removed, "removed child");
        removed
    }

    /// Place `child` right before `before` inside `parent`.
    ///
    /// The parent's layer list is reordered first, adding `child` when it is
    /// new. Then the visual elements are moved when both share a parent
    /// element; layers in different panes keep their element order. Returns
    /// false, with nothing changed, when `before` is not a child of `parent`
    /// or `parent` cannot hold `child`.
    pub fn insert_before(&self, parent: &Instance, child: &Instance, before: &Instance) -> Result<bool> {
        if !accepts(parent.category(), child.category()) {
            debug!(parent = %parent.kind(), child = %child.kind(), "parent does not take children");
            return Ok(false);
        }
        let placed = parent
            .native()
            .with_mut(|p| p.insert_layer(child.native(), before.native()))?;
        if !placed {
            debug!(child = %child.kind(), before = %before.kind(), "reference is not a child, order unchanged");
            return Ok(false);
        }
        let moved = try_reorder(self.document(), child.native(), before.native());
        trace!(child = %child.kind(), before = %before.kind(), moved, "inserted child");
        Ok(true)
    }

    /// Apply changed props to a live instance and drop handlers of removed ones.
    pub fn commit_update(&self, instance: &mut Instance, changed: &Props, removed: &[&str]) {
        instance.commit_update(changed, removed);
    }

    /// Size a mounted map root. Other categories are left alone.
    ///
    /// Without explicit `bounds` the map's declared `options.maxBounds` are
    /// used when present.
    pub fn commit_mount(
        &self,
        instance: &Instance,
        style: Option<&ElementStyle>,
        bounds: Option<LatLngBounds>,
    ) -> Result<()> {
        let Some(map) = instance.map() else {
            return Ok(());
        };
        let container = visual_element(instance.native()).ok_or(BridgeError::MissingSize)?;
        let bounds = bounds.or_else(|| declared_max_bounds(instance.declared_props()));
        resolve_size(
            &mut *map.borrow_mut(),
            self.document(),
            container,
            style,
            bounds,
            self.config.min_parent_size,
        )
    }

    /// Drop an instance: unsubscribe its handlers, dispose the content
    /// element of popups and tooltips and, for maps, forget the registry
    /// entry for its container.
    pub fn destroy_instance(&mut self, instance: Instance) -> NativeHandle {
        if instance.category().is_root() {
            if let Some(container) = visual_element(instance.native()) {
                self.registry.remove(&RegistryKey::Container(container));
            }
        }
        if let Some(content) = instance.content() {
            self.document().dispose(content);
        }
        instance.dispose()
    }
}

/// Maps take anything but another map; groups take layers and groups.
/// Controls and handlers only live on maps.
fn accepts(parent: Category, child: Category) -> bool {
    match parent {
        Category::Map => !child.is_root(),
        Category::LayerGroup | Category::FeatureGroup => matches!(
            child,
            Category::Layer | Category::LayerGroup | Category::FeatureGroup
        ),
        _ => false,
    }
}

fn add_layer(parent: &NativeHandle, child: &NativeHandle) -> Result<bool> {
    Ok(parent.with_mut(|p| p.add_layer(child))?)
}

fn declared_max_bounds(props: &Props) -> Option<LatLngBounds> {
    let options = props.get("options")?.as_options()?;
    PropValue::Json(options.get("maxBounds")?.clone()).as_bounds()
}
