//! # Track Metrics
//!
//! Per-index signals over a validated track: cumulative distance plus three
//! time- or count-bounded windows.
//!
//! | Query | Direction | Bounded by |
//! |-------|-----------|------------|
//! | [`TrackMetrics::forward_window_distance`] | forward from `i` | seconds |
//! | [`TrackMetrics::trailing_pace`] | back to `i`, inclusive | point count |
//! | [`TrackMetrics::trailing_density`] | back to `i`, inclusive | seconds |
//!
//! Every query is a pure function of the index. When a window would run past
//! either end of the track its result carries `complete == false`; callers
//! treat that as "not evaluated" rather than as a failure.

use crate::error::{PauseError, Result};
use crate::geo_utils::{haversine_distance, validate_points};
use crate::TrackPoint;

/// Maximum distance reached from an anchor point within a forward time window.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForwardWindow {
    /// Largest great-circle distance from the anchor to any point in the window (m)
    pub max_distance: f64,
    /// Seconds between the anchor and the last point inside the window
    pub elapsed: f64,
    /// False if the track ends before the window closes
    pub complete: bool,
}

/// Average pace from `n` points before an index up to the index itself.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrailingPace {
    /// min/km, `f64::INFINITY` when no distance was covered
    pub pace_min_per_km: f64,
    /// Distance along the track over the span (m)
    pub distance: f64,
    /// Duration of the span (s)
    pub elapsed: f64,
    /// False if fewer than `n` points precede the index
    pub complete: bool,
}

/// Sample rate over a trailing time window.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrailingDensity {
    /// Points in the window divided by the window length
    pub points_per_second: f64,
    /// Points with a timestamp in `[t_i - window, t_i]`
    pub sample_count: usize,
    /// False if the track starts less than one window before the index
    pub complete: bool,
}

/// All three windowed signals at one index.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowMetric {
    pub index: usize,
    pub forward: ForwardWindow,
    pub pace: TrailingPace,
    pub density: TrailingDensity,
}

/// Cumulative distance and time offsets for a borrowed track.
///
/// Construction validates the track once so that the window queries can stay
/// infallible.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use track_pauses::{TrackMetrics, TrackPoint};
///
/// let start = Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap();
/// let points: Vec<TrackPoint> = (0..20)
///     .map(|i| TrackPoint::new(start + Duration::seconds(5 * i), 45.0 + i as f64 * 0.0001, 6.0))
///     .collect();
///
/// let metrics = TrackMetrics::new(&points).unwrap();
/// let window = metrics.forward_window_distance(0, 30.0);
/// assert!(window.complete);
/// assert!(window.max_distance > 60.0);
/// ```
#[derive(Debug, Clone)]
pub struct TrackMetrics<'a> {
    points: &'a [TrackPoint],
    cumulative: Vec<f64>,
    offsets: Vec<f64>,
}

impl<'a> TrackMetrics<'a> {
    /// Build metrics for a track.
    ///
    /// # Errors
    ///
    /// - [`PauseError::InvalidTrack`] for fewer than 2 points or a decreasing timestamp
    /// - [`PauseError::InvalidCoordinate`] at the first out-of-range point
    pub fn new(points: &'a [TrackPoint]) -> Result<Self> {
        if points.len() < 2 {
            return Err(PauseError::InvalidTrack(format!(
                "need at least 2 points, got {}",
                points.len()
            )));
        }

        if let Some(i) = points.windows(2).position(|w| w[1].timestamp < w[0].timestamp) {
            return Err(PauseError::InvalidTrack(format!(
                "timestamp at point {} is earlier than point {}",
                i + 1,
                i
            )));
        }

        validate_points(points)?;

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(total);
        for w in points.windows(2) {
            total += haversine_distance(&w[0], &w[1]);
            cumulative.push(total);
        }

        let origin = points[0].timestamp;
        let offsets = points
            .iter()
            .map(|p| (p.timestamp - origin).num_milliseconds() as f64 / 1000.0)
            .collect();

        Ok(Self { points, cumulative, offsets })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a valid track has at least two points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &'a [TrackPoint] {
        self.points
    }

    pub fn point(&self, i: usize) -> &'a TrackPoint {
        &self.points[i]
    }

    /// Distance along the track from the first point to point `i` (m).
    pub fn cumulative_distance(&self, i: usize) -> f64 {
        self.cumulative[i]
    }

    pub fn cumulative_distances(&self) -> &[f64] {
        &self.cumulative
    }

    /// Distance of the whole track (m).
    pub fn total_distance(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Seconds from the first point to point `i`.
    pub fn elapsed_seconds(&self, i: usize) -> f64 {
        self.offsets[i]
    }

    /// Seconds from the first to the last point.
    pub fn total_duration(&self) -> f64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Largest distance from point `i` to any point at most `window_seconds` later.
    pub fn forward_window_distance(&self, i: usize, window_seconds: f64) -> ForwardWindow {
        let anchor = &self.points[i];
        let t0 = self.offsets[i];

        let mut max_distance: f64 = 0.0;
        let mut elapsed = 0.0;
        for j in (i + 1)..self.points.len() {
            let dt = self.offsets[j] - t0;
            if dt > window_seconds {
                break;
            }
            max_distance = max_distance.max(haversine_distance(anchor, &self.points[j]));
            elapsed = dt;
        }

        ForwardWindow {
            max_distance,
            elapsed,
            complete: self.total_duration() - t0 >= window_seconds,
        }
    }

    /// Pace from point `i - n_points` to point `i` (`n_points` segments),
    /// clamped at the track start.
    ///
    /// A span that covers no distance has infinite pace: it is never "faster"
    /// than any threshold.
    pub fn trailing_pace(&self, i: usize, n_points: usize) -> TrailingPace {
        let start = i.saturating_sub(n_points);
        let distance = self.cumulative[i] - self.cumulative[start];
        let elapsed = self.offsets[i] - self.offsets[start];

        let pace_min_per_km = if distance > 0.0 {
            (elapsed / 60.0) / (distance / 1000.0)
        } else {
            f64::INFINITY
        };

        TrailingPace {
            pace_min_per_km,
            distance,
            elapsed,
            complete: i >= n_points,
        }
    }

    /// Points per second over the `window_seconds` ending at `i`.
    pub fn trailing_density(&self, i: usize, window_seconds: f64) -> TrailingDensity {
        let t = self.offsets[i];
        let sample_count = self.offsets[..=i]
            .iter()
            .rev()
            .take_while(|&&o| t - o <= window_seconds)
            .count();

        TrailingDensity {
            points_per_second: sample_count as f64 / window_seconds,
            sample_count,
            complete: t >= window_seconds,
        }
    }

    /// Forward distance, trailing pace and trailing density at `i`.
    pub fn window_metric(
        &self,
        i: usize,
        distance_window: f64,
        pace_points: usize,
        density_window: f64,
    ) -> WindowMetric {
        WindowMetric {
            index: i,
            forward: self.forward_window_distance(i, distance_window),
            pace: self.trailing_pace(i, pace_points),
            density: self.trailing_density(i, density_window),
        }
    }

    /// Instantaneous pace (min/km) of each segment between `start` and `end`.
    ///
    /// Segments with no distance or no elapsed time are skipped.
    pub fn segment_paces(&self, start: usize, end: usize) -> impl Iterator<Item = f64> + '_ {
        (start..end).filter_map(move |k| {
            let distance = self.cumulative[k + 1] - self.cumulative[k];
            let elapsed = self.offsets[k + 1] - self.offsets[k];
            (distance > 0.0 && elapsed > 0.0).then(|| (elapsed / 60.0) / (distance / 1000.0))
        })
    }
}
