use serde::{Deserialize, Serialize};

/// Geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

/// Rectangular area given by two opposite corners.
///
/// `north_west` and `south_east` are the corners as declared; no normalisation
/// happens here because the size resolver projects them as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub north_west: LatLng,
    pub south_east: LatLng,
}

impl LatLngBounds {
    pub fn new(north_west: impl Into<LatLng>, south_east: impl Into<LatLng>) -> Self {
        Self {
            north_west: north_west.into(),
            south_east: south_east.into(),
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        let (min_lat, max_lat) = min_max(self.north_west.lat, self.south_east.lat);
        let (min_lng, max_lng) = min_max(self.north_west.lng, self.south_east.lng);
        point.lat >= min_lat && point.lat <= max_lat && point.lng >= min_lng && point.lng <= max_lng
    }
}

fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Pixel coordinate relative to a map container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_planar() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(b.distance_to(a), 5.0);
    }

    #[test]
    fn test_bounds_contains_either_corner_order() {
        let bounds = LatLngBounds::new((10.0, -5.0), (-10.0, 5.0));
        assert!(bounds.contains(LatLng::new(0.0, 0.0)));
        assert!(!bounds.contains(LatLng::new(11.0, 0.0)));
    }
}
