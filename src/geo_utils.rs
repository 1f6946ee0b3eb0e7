//! # Geographic Utilities
//!
//! Distance and position helpers shared by the metrics, detector and summary.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two track points |
//! | [`distance`] | Same, validating both coordinates first |
//! | [`validate_points`] | Reject the first out-of-range coordinate in a track |
//! | [`compute_center`] | Centroid of a run of track points |
//!
//! ## Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use track_pauses::{TrackPoint, geo_utils};
//!
//! let t = Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap();
//! let a = TrackPoint::new(t, 45.0000, 6.0);
//! let b = TrackPoint::new(t, 45.0010, 6.0);
//!
//! let d = geo_utils::distance(&a, &b).unwrap();
//! assert!((d - 111.19).abs() < 0.01);
//! ```
//!
//! ## Haversine Formula
//!
//! Distances assume a spherical Earth of radius [`EARTH_RADIUS_M`]. Over the few
//! tens of meters the pause windows look at, the spherical error is far below
//! GPS noise.

use geo::{Centroid, MultiPoint};

use crate::error::{PauseError, Result};
use crate::TrackPoint;

/// Mean Earth radius used for all great-circle distances, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two track points in meters.
///
/// Does not check the coordinates; use [`distance`] for unvalidated input.
/// [`TrackMetrics`](crate::TrackMetrics) validates the whole track once and
/// then calls this directly.
#[inline]
pub fn haversine_distance(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (p2.longitude - p1.longitude).to_radians();

    // Rounding can push `a` just past 1.0 for near-antipodal points
    let a = ((dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2))
        .clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Great-circle distance between two track points, validating both first.
///
/// # Errors
///
/// [`PauseError::InvalidCoordinate`] if either point is out of range. The
/// error's `index` is 0 for `p1` and 1 for `p2`.
pub fn distance(p1: &TrackPoint, p2: &TrackPoint) -> Result<f64> {
    validate_points(&[*p1, *p2])?;
    Ok(haversine_distance(p1, p2))
}

/// Check every point of a track, failing at the first invalid coordinate.
pub fn validate_points(points: &[TrackPoint]) -> Result<()> {
    match points.iter().position(|p| !p.is_valid()) {
        Some(index) => {
            let p = &points[index];
            Err(PauseError::InvalidCoordinate {
                index,
                latitude: p.latitude,
                longitude: p.longitude,
            })
        }
        None => Ok(()),
    }
}

// =============================================================================
// Center/Centroid Functions
// =============================================================================

/// Centroid of a run of track points as `(latitude, longitude)`.
///
/// Returns `None` for an empty slice. Pauses cover a few meters, so the planar
/// centroid is accurate enough for reporting where the stop happened.
pub fn compute_center(points: &[TrackPoint]) -> Option<(f64, f64)> {
    let multi: MultiPoint<f64> = points.iter().map(TrackPoint::to_point).collect();
    multi.centroid().map(|c| (c.y(), c.x()))
}

// =============================================================================
// Unit Tests
// =============================================================================
