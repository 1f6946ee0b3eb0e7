//! # Track Pauses
//!
//! Pause detection for GPS tracks of running and other endurance activities.
//!
//! Finds the stretches of a recorded track where the athlete stopped (aid
//! stations, traffic lights, rest breaks) using only positions and timestamps,
//! so that distance and pace statistics can leave them out.
//!
//! ## How it works
//!
//! 1. [`TrackMetrics`] builds cumulative distance over the track and answers
//!    three windowed queries at any index: forward distance, trailing pace and
//!    trailing sample density.
//! 2. [`PauseDetector`] walks the indices in order with a two-state machine,
//!    entering a pause when all three signals agree and leaving it when the
//!    athlete moves away at running pace again.
//! 3. [`summarize`] splits the track totals into moving and paused parts.
//!
//! ## Features
//!
//! - **`parallel`** - Analyze independent tracks in parallel with rayon
//! - **`serde`** - Serialize configs and results
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use track_pauses::{analyze_track, PauseConfig, TrackPoint};
//!
//! let start = Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap();
//! let points: Vec<TrackPoint> = (0..100)
//!     .map(|i| TrackPoint::new(start + Duration::seconds(5 * i), 45.0 + i as f64 * 0.00015, 6.0))
//!     .collect();
//!
//! let analysis = analyze_track(&points, &PauseConfig::default()).unwrap();
//! println!(
//!     "{} pauses, {:.0}m moving of {:.0}m",
//!     analysis.pauses.len(),
//!     analysis.summary.moving_distance,
//!     analysis.summary.total_distance,
//! );
//! ```

use chrono::{DateTime, Utc};
use geo::Point;
use log::info;

pub mod error;
pub use error::{PauseError, Result};

pub mod geo_utils;

pub mod metrics;
pub use metrics::{ForwardWindow, TrackMetrics, TrailingDensity, TrailingPace, WindowMetric};

pub mod detector;
pub use detector::{
    detect_pauses, should_end, should_start, DetectorState, PauseConfig, PauseDetector,
    PendingPause,
};

pub mod summary;
pub use summary::{summarize, PauseStats, TrackSummary};

#[cfg(test)]
mod test_tracks;

// ============================================================================
// Core Types
// ============================================================================

/// A timestamped GPS sample.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use track_pauses::TrackPoint;
/// let point = TrackPoint::new(Utc::now(), 45.1885, 5.7245); // Grenoble
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackPoint {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl TrackPoint {
    /// Create a new track point.
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self { timestamp, latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// The position as a `geo` point (x = longitude, y = latitude).
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A detected pause, bounded by track indices.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pause {
    /// Index where the start conditions first held
    pub start_index: usize,
    /// Index where the end conditions held, or the last index if `incomplete`
    pub end_index: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Cumulative track distance at `start_index` (m)
    pub start_distance_marker: f64,
    /// Cumulative track distance at `end_index` (m)
    pub end_distance_marker: f64,
    /// Distance recorded between start and end (m)
    pub distance_during_pause: f64,
    /// Average pace between start and end (min/km); `None` if stationary
    pub avg_pace_during_pause: Option<f64>,
    /// The track ended before the pause did
    pub incomplete: bool,
}

impl Pause {
    pub fn duration_seconds(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Points from start to end, inclusive. At least 1.
    pub fn point_count(&self) -> usize {
        self.end_index.saturating_sub(self.start_index) + 1
    }
}

/// Pauses found in one track and the totals derived from them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackAnalysis {
    pub pauses: Vec<Pause>,
    pub summary: TrackSummary,
}

// ============================================================================
// Core Functions
// ============================================================================

/// Detect pauses in one track and summarize them.
///
/// # Errors
///
/// - [`PauseError::InvalidConfig`] if a threshold is not positive
/// - [`PauseError::InvalidTrack`] for fewer than 2 points or decreasing timestamps
/// - [`PauseError::InvalidCoordinate`] for an out-of-range point
pub fn analyze_track(points: &[TrackPoint], config: &PauseConfig) -> Result<TrackAnalysis> {
    config.validate()?;
    let metrics = TrackMetrics::new(points)?;
    let pauses = PauseDetector::new(&metrics, config)?.detect();
    let summary = summarize(&metrics, &pauses)?;

    Ok(TrackAnalysis { pauses, summary })
}

/// Analyze several independent tracks with the same config.
///
/// Results are in input order; a bad track does not stop the others.
pub fn analyze_tracks(tracks: &[Vec<TrackPoint>], config: &PauseConfig) -> Vec<Result<TrackAnalysis>> {
    let results: Vec<_> = tracks.iter().map(|t| analyze_track(t, config)).collect();
    log_batch(&results);
    results
}

/// Analyze several independent tracks in parallel.
///
/// Same results as [`analyze_tracks`]; each track is still scanned
/// sequentially on a single thread.
#[cfg(feature = "parallel")]
pub fn analyze_tracks_parallel(
    tracks: &[Vec<TrackPoint>],
    config: &PauseConfig,
) -> Vec<Result<TrackAnalysis>> {
    use rayon::prelude::*;

    let results: Vec<_> = tracks.par_iter().map(|t| analyze_track(t, config)).collect();
    log_batch(&results);
    results
}

fn log_batch(results: &[Result<TrackAnalysis>]) {
    let failed = results.iter().filter(|r| r.is_err()).count();
    let pauses: usize = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|a| a.pauses.len())
        .sum();
    info!(
        "[TrackPauses] Analyzed {} tracks: {} pauses, {} rejected",
        results.len(),
        pauses,
        failed
    );
}

// ============================================================================
// Tests
// ============================================================================
