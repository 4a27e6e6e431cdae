use crate::core::waypoint::{Waypoint, LATITUDE_RANGE, LONGITUDE_RANGE};
use serde::Serialize;

/// Smallest span, in degrees, given to a viewport around a single point
const MIN_SPAN: f64 = 0.01;

/// Geographic bounds a map view should show
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Viewport {
    /// Bounds fitting every waypoint, grown by `padding` (a fraction of the
    /// span) on each side. `None` for an empty path.
    pub fn fit(path: &[Waypoint], padding: f64) -> Option<Self> {
        let first = path.first()?;
        let mut bounds = Self {
            min_lon: first.lon(),
            min_lat: first.lat(),
            max_lon: first.lon(),
            max_lat: first.lat(),
        };
        for wp in &path[1..] {
            bounds.min_lon = bounds.min_lon.min(wp.lon());
            bounds.min_lat = bounds.min_lat.min(wp.lat());
            bounds.max_lon = bounds.max_lon.max(wp.lon());
            bounds.max_lat = bounds.max_lat.max(wp.lat());
        }

        let padding = padding.max(0.0);
        let pad_lon = (bounds.max_lon - bounds.min_lon).max(MIN_SPAN) * padding;
        let pad_lat = (bounds.max_lat - bounds.min_lat).max(MIN_SPAN) * padding;
        Some(
            Self {
                min_lon: bounds.min_lon - pad_lon,
                min_lat: bounds.min_lat - pad_lat,
                max_lon: bounds.max_lon + pad_lon,
                max_lat: bounds.max_lat + pad_lat,
            }
            .ensure_min_span()
            .clamped(),
        )
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn contains(&self, wp: &Waypoint) -> bool {
        (self.min_lon..=self.max_lon).contains(&wp.lon())
            && (self.min_lat..=self.max_lat).contains(&wp.lat())
    }

    /// Same-sized view centred on `wp`
    pub fn pan_to(&self, wp: &Waypoint) -> Self {
        let half_lon = (self.max_lon - self.min_lon) / 2.0;
        let half_lat = (self.max_lat - self.min_lat) / 2.0;
        Self {
            min_lon: wp.lon() - half_lon,
            min_lat: wp.lat() - half_lat,
            max_lon: wp.lon() + half_lon,
            max_lat: wp.lat() + half_lat,
        }
        .clamped()
    }

    fn ensure_min_span(self) -> Self {
        let (lon, lat) = self.center();
        let half_lon = ((self.max_lon - self.min_lon) / 2.0).max(MIN_SPAN / 2.0);
        let half_lat = ((self.max_lat - self.min_lat) / 2.0).max(MIN_SPAN / 2.0);
        Self {
            min_lon: lon - half_lon,
            min_lat: lat - half_lat,
            max_lon: lon + half_lon,
            max_lat: lat + half_lat,
        }
    }

    fn clamped(self) -> Self {
        Self {
            min_lon: self.min_lon.max(LONGITUDE_RANGE.0),
            min_lat: self.min_lat.max(LATITUDE_RANGE.0),
            max_lon: self.max_lon.min(LONGITUDE_RANGE.1),
            max_lat: self.max_lat.min(LATITUDE_RANGE.1),
        }
    }
}
