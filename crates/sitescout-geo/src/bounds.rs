//! Bounding boxes over loaded boundaries and the map view derived from them.

/// Axis-aligned box in degrees. Starts empty and grows with `extend`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon || self.min_lat > self.max_lat
    }

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lon = self.max_lon.max(lon);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn merge(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }
        self.extend(other.min_lon, other.min_lat);
        self.extend(other.max_lon, other.max_lat);
    }

    /// Midpoint as `(lat, lon)`, or None for an empty box.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some((
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        ))
    }
}

pub const DEFAULT_CENTER: (f64, f64) = (38.0, -98.0);
pub const DEFAULT_ZOOM: u8 = 4;

/// Initial map position handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lat: DEFAULT_CENTER.0,
            center_lon: DEFAULT_CENTER.1,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapView {
    /// Centre on the loaded bounds, or the continental default when nothing is loaded.
    pub fn from_bounds(bounds: Option<&Bounds>) -> Self {
        match bounds.and_then(Bounds::center) {
            Some((lat, lon)) => Self { center_lat: lat, center_lon: lon, zoom: DEFAULT_ZOOM },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds_have_no_center() {
        let b = Bounds::empty();
        assert!(b.is_empty());
        assert_eq!(b.center(), None);
        assert_eq!(MapView::from_bounds(Some(&b)), MapView::default());
    }

    #[test]
    fn test_extend_and_center() {
        let mut b = Bounds::empty();
        b.extend(-78.0, 38.0);
        b.extend(-76.0, 40.0);
        assert!(!b.is_empty());
        assert_eq!(b.center(), Some((39.0, -77.0)));

        let view = MapView::from_bounds(Some(&b));
        assert_eq!(view.center_lat, 39.0);
        assert_eq!(view.center_lon, -77.0);
        assert_eq!(view.zoom, 4);
    }

    #[test]
    fn test_merge_ignores_empty() {
        let mut b = Bounds::empty();
        b.extend(1.0, 1.0);
        let before = b;
        b.merge(&Bounds::empty());
        assert_eq!(b, before);

        let mut other = Bounds::empty();
        other.extend(3.0, -2.0);
        b.merge(&other);
        assert_eq!(b.max_lon, 3.0);
        assert_eq!(b.min_lat, -2.0);
    }

    #[test]
    fn test_default_view() {
        let view = MapView::from_bounds(None);
        assert_eq!((view.center_lat, view.center_lon), (38.0, -98.0));
    }
}
