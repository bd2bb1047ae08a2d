use crate::dom::{CssLength, Document, ElementId, ElementStyle};
use crate::error::{BridgeError, Result};
use crate::geo::{LatLngBounds, Point};
use crate::native::NativeMap;
use tracing::{debug, warn};

/// Give a map container a size and make the map re-read it.
///
/// In order: explicit width and height hints are left as they are; bounds
/// are projected and their pixel extent becomes the container size; else the
/// container fills its parent. Without a parent this fails with
/// [`BridgeError::MissingSize`] before anything is touched. Every other path
/// ends with exactly one `invalidate_size`.
pub fn resolve_size(
    map: &mut dyn NativeMap,
    document: &Document,
    container: ElementId,
    style: Option<&ElementStyle>,
    bounds: Option<LatLngBounds>,
    min_parent_size: f64,
) -> Result<()> {
    let explicit = style.is_some_and(|s| s.width.is_some() && s.height.is_some());

    if explicit {
        debug!(?container, "map container is sized by style");
    } else if let Some(bounds) = bounds {
        let nw = map.lat_lng_to_container_point(bounds.north_west);
        let se = map.lat_lng_to_container_point(bounds.south_east);
        let width = nw.distance_to(Point::new(se.x, nw.y));
        let height = nw.distance_to(Point::new(nw.x, se.y));
        debug!(width, height, "map container sized from bounds");
        document.set_width(container, CssLength::Px(width));
        document.set_height(container, CssLength::Px(height));
    } else {
        let parent = document.parent(container).ok_or(BridgeError::MissingSize)?;
        let size = document.client_size(parent);
        if size.width < min_parent_size || size.height < min_parent_size {
            warn!(
                width = size.width,
                height = size.height,
                "width or height is less than {}px. The parent element used for the map dimensions is too small",
                min_parent_size
            );
        }
        document.set_width(container, CssLength::Percent(100.0));
        document.set_height(container, CssLength::Percent(100.0));
    }

    map.invalidate_size();
    Ok(())
}
