use crate::error::{BridgeError, Result};
use smartstring::{LazyCompact, SmartString};
use std::fmt;

/// Prefix every catalog tag carries. Unknown tags with this prefix are errors.
pub const RESERVED_PREFIX: &str = "lf";

/// Coarse role of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Map,
    Layer,
    LayerGroup,
    FeatureGroup,
    Control,
    Handler,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Map => "map",
            Category::Layer => "layer",
            Category::LayerGroup => "layergroup",
            Category::FeatureGroup => "featuregroup",
            Category::Control => "control",
            Category::Handler => "handler",
        }
    }

    /// Only map instances are roots.
    pub fn is_root(self) -> bool {
        self == Category::Map
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed catalog of built-in element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Map,
    Image,
    Popup,
    Tooltip,
    Rectangle,
    Marker,
    Tiles,
    TilesWms,
    Video,
    Polyline,
    Polygon,
    Circle,
    CircleMarker,
    Svg,
    LayerGroup,
    FeatureGroup,
    GeoJson,
    GridLayer,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 18] = [
        CatalogKind::Map,
        CatalogKind::Image,
        CatalogKind::Popup,
        CatalogKind::Tooltip,
        CatalogKind::Rectangle,
        CatalogKind::Marker,
        CatalogKind::Tiles,
        CatalogKind::TilesWms,
        CatalogKind::Video,
        CatalogKind::Polyline,
        CatalogKind::Polygon,
        CatalogKind::Circle,
        CatalogKind::CircleMarker,
        CatalogKind::Svg,
        CatalogKind::LayerGroup,
        CatalogKind::FeatureGroup,
        CatalogKind::GeoJson,
        CatalogKind::GridLayer,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            CatalogKind::Map => "lfMap",
            CatalogKind::Image => "lfImage",
            CatalogKind::Popup => "lfPopup",
            CatalogKind::Tooltip => "lfTooltip",
            CatalogKind::Rectangle => "lfRectangle",
            CatalogKind::Marker => "lfMarker",
            CatalogKind::Tiles => "lfTiles",
            CatalogKind::TilesWms => "lfTilesWMS",
            CatalogKind::Video => "lfVideo",
            CatalogKind::Polyline => "lfPolyline",
            CatalogKind::Polygon => "lfPolygon",
            CatalogKind::Circle => "lfCircle",
            CatalogKind::CircleMarker => "lfCircleMarker",
            CatalogKind::Svg => "lfSVG",
            CatalogKind::LayerGroup => "lfLayerGroup",
            CatalogKind::FeatureGroup => "lfFeatureGroup",
            CatalogKind::GeoJson => "lfGeoJSON",
            CatalogKind::GridLayer => "lfGridLayer",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn category(self) -> Category {
        match self {
            CatalogKind::Map => Category::Map,
            CatalogKind::LayerGroup => Category::LayerGroup,
            CatalogKind::FeatureGroup => Category::FeatureGroup,
            _ => Category::Layer,
        }
    }
}

/// User-defined element families, recognised by tag suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionCategory {
    Layer,
    Control,
    Handler,
}

impl ExtensionCategory {
    pub const ALL: [ExtensionCategory; 3] = [
        ExtensionCategory::Layer,
        ExtensionCategory::Control,
        ExtensionCategory::Handler,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            ExtensionCategory::Layer => "Layer",
            ExtensionCategory::Control => "Control",
            ExtensionCategory::Handler => "Handler",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| tag.ends_with(c.suffix()))
    }

    pub fn category(self) -> Category {
        match self {
            ExtensionCategory::Layer => Category::Layer,
            ExtensionCategory::Control => Category::Control,
            ExtensionCategory::Handler => Category::Handler,
        }
    }

    /// Layer extensions get their generic props applied; controls and
    /// handlers configure themselves from constructor params.
    pub fn applies_props(self) -> bool {
        self == ExtensionCategory::Layer
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Catalog(CatalogKind),
    Extension {
        category: ExtensionCategory,
        tag: SmartString<LazyCompact>,
    },
}

impl ElementKind {
    /// Classify a tag.
    ///
    /// The catalog is consulted first, so `lfGridLayer` is a catalog kind even
    /// though it ends in `Layer`. `Ok(None)` means the tag is not a bridge
    /// element at all.
    pub fn parse(tag: &str) -> Result<Option<Self>> {
        if let Some(kind) = CatalogKind::from_tag(tag) {
            return Ok(Some(ElementKind::Catalog(kind)));
        }
        if let Some(category) = ExtensionCategory::from_tag(tag) {
            return Ok(Some(ElementKind::Extension {
                category,
                tag: tag.into(),
            }));
        }
        if tag.starts_with(RESERVED_PREFIX) {
            return Err(BridgeError::UnknownKind {
                kind: tag.to_string(),
            });
        }
        Ok(None)
    }

    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Catalog(kind) => kind.tag(),
            ElementKind::Extension { tag, .. } => tag.as_str(),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ElementKind::Catalog(kind) => kind.category(),
            ElementKind::Extension { category, .. } => category.category(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
