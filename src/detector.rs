//! # Pause Detection
//!
//! Two-state machine over point indices. A pause starts when the athlete has
//! barely moved, is slow, and the device is sampling sparsely; it ends when the
//! athlete moves clearly away again at running pace.
//!
//! ## Transitions
//!
//! | From | To | When (all conditions) |
//! |------|----|------------------------|
//! | Running | Paused | forward distance over `time_window` < `threshold_start`, trailing pace over `nb_points_pace` > `pace_threshold`, trailing density over `density_window` < `density_threshold` |
//! | Paused | Running | forward distance over `time_window_end` > `threshold_end`, trailing pace over `nb_points_pace_end` < `pace_threshold_end` |
//!
//! A window that runs off either end of the track never satisfies a
//! condition. Exit thresholds are looser than entry thresholds so GPS jitter
//! around a stop does not toggle the state.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::error::{PauseError, Result};
use crate::metrics::{TrackMetrics, WindowMetric};
use crate::Pause;

/// Distances below this are treated as no movement when computing pause pace (m).
const STATIONARY_DISTANCE_M: f64 = 1e-6;

/// Thresholds for one detection run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PauseConfig {
    /// Maximum forward distance (m) over `time_window` to start a pause.
    /// Default: 30.0
    pub threshold_start: f64,

    /// Minimum forward distance (m) over `time_window_end` to end a pause.
    /// Default: 30.0
    pub threshold_end: f64,

    /// Forward window (s) for the start distance check.
    /// Default: 45.0
    pub time_window: f64,

    /// Forward window (s) for the end distance check. Shorter than
    /// `time_window` so the end is not anticipated.
    /// Default: 30.0
    pub time_window_end: f64,

    /// Trailing pace (min/km) must be slower than this to start a pause.
    /// Default: 15.0
    pub pace_threshold: f64,

    /// Trailing pace (min/km) must be faster than this to end a pause.
    /// Default: 20.0
    pub pace_threshold_end: f64,

    /// Points looked back over for the start pace check.
    /// Default: 10
    pub nb_points_pace: u32,

    /// Points looked back over for the end pace check.
    /// Default: 7
    pub nb_points_pace_end: u32,

    /// Trailing sample density (points/s) must be below this to start a pause.
    /// Default: 1.0
    pub density_threshold: f64,

    /// Trailing window (s) for the density check.
    /// Default: 30.0
    pub density_window: f64,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            threshold_start: 30.0,
            threshold_end: 30.0,
            time_window: 45.0,
            time_window_end: 30.0,
            pace_threshold: 15.0,
            pace_threshold_end: 20.0,
            nb_points_pace: 10,
            nb_points_pace_end: 7,
            density_threshold: 1.0,
            density_window: 30.0,
        }
    }
}

impl PauseConfig {
    /// Check that every threshold, window and count is positive and finite.
    ///
    /// # Errors
    ///
    /// [`PauseError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("threshold_start", self.threshold_start),
            ("threshold_end", self.threshold_end),
            ("time_window", self.time_window),
            ("time_window_end", self.time_window_end),
            ("pace_threshold", self.pace_threshold),
            ("pace_threshold_end", self.pace_threshold_end),
            ("nb_points_pace", f64::from(self.nb_points_pace)),
            ("nb_points_pace_end", f64::from(self.nb_points_pace_end)),
            ("density_threshold", self.density_threshold),
            ("density_window", self.density_window),
        ];

        match fields.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            Some(&(field, value)) => Err(PauseError::InvalidConfig { field, value }),
            None => Ok(()),
        }
    }

    /// Signals needed to decide whether a pause starts at `i`.
    pub fn start_metric(&self, metrics: &TrackMetrics, i: usize) -> WindowMetric {
        metrics.window_metric(
            i,
            self.time_window,
            self.nb_points_pace as usize,
            self.density_window,
        )
    }

    /// Signals needed to decide whether a pause ends at `i`.
    ///
    /// Density is not part of the end rule; it is computed for logging only.
    pub fn end_metric(&self, metrics: &TrackMetrics, i: usize) -> WindowMetric {
        metrics.window_metric(
            i,
            self.time_window_end,
            self.nb_points_pace_end as usize,
            self.density_window,
        )
    }
}

/// True if all three start conditions hold on complete windows.
pub fn should_start(m: &WindowMetric, config: &PauseConfig) -> bool {
    m.forward.complete
        && m.pace.complete
        && m.density.complete
        && m.forward.max_distance < config.threshold_start
        && m.pace.pace_min_per_km > config.pace_threshold
        && m.density.points_per_second < config.density_threshold
}

/// True if both end conditions hold on complete windows.
pub fn should_end(m: &WindowMetric, config: &PauseConfig) -> bool {
    m.forward.complete
        && m.pace.complete
        && m.forward.max_distance > config.threshold_end
        && m.pace.pace_min_per_km < config.pace_threshold_end
}

/// Start of a pause whose end has not been seen yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPause {
    pub start_index: usize,
    pub start_time: DateTime<Utc>,
    pub start_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectorState {
    Running,
    Paused(PendingPause),
}

/// Sequential pause detector over one track.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, TimeZone, Utc};
/// use track_pauses::{PauseConfig, PauseDetector, TrackMetrics, TrackPoint};
///
/// let start = Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap();
/// // Steady 5 min/km, one point every 5 seconds
/// let points: Vec<TrackPoint> = (0..60)
///     .map(|i| TrackPoint::new(start + Duration::seconds(5 * i), 45.0 + i as f64 * 0.00015, 6.0))
///     .collect();
///
/// let metrics = TrackMetrics::new(&points).unwrap();
/// let config = PauseConfig::default();
/// let detector = PauseDetector::new(&metrics, &config).unwrap();
/// assert!(detector.detect().is_empty());
/// ```
#[derive(Debug)]
pub struct PauseDetector<'m, 'a> {
    metrics: &'m TrackMetrics<'a>,
    config: &'m PauseConfig,
}

impl<'m, 'a> PauseDetector<'m, 'a> {
    /// Create a detector, validating the config before any scan.
    pub fn new(metrics: &'m TrackMetrics<'a>, config: &'m PauseConfig) -> Result<Self> {
        if let Err(e) = config.validate() {
            warn!("[PauseDetector] Rejected config: {}", e);
            return Err(e);
        }
        Ok(Self { metrics, config })
    }

    /// Next state after looking at index `i`, plus the pause closed there, if any.
    pub fn step(&self, state: DetectorState, i: usize) -> (DetectorState, Option<Pause>) {
        match state {
            DetectorState::Running => {
                let m = self.config.start_metric(self.metrics, i);
                if !should_start(&m, self.config) {
                    return (DetectorState::Running, None);
                }

                let point = self.metrics.point(i);
                let pending = PendingPause {
                    start_index: i,
                    start_time: point.timestamp,
                    start_distance: self.metrics.cumulative_distance(i),
                };
                debug!(
                    "[PauseDetector] Pause start at {} ({}, {:.0}m): {:.1}m over {}s, pace {:.2} min/km, {:.3} pts/s",
                    i,
                    point.timestamp,
                    pending.start_distance,
                    m.forward.max_distance,
                    self.config.time_window,
                    m.pace.pace_min_per_km,
                    m.density.points_per_second
                );
                (DetectorState::Paused(pending), None)
            }
            DetectorState::Paused(pending) => {
                let m = self.config.end_metric(self.metrics, i);
                if !should_end(&m, self.config) {
                    return (DetectorState::Paused(pending), None);
                }

                let pause = self.close(pending, i, false);
                debug!(
                    "[PauseDetector] Pause end at {} ({}): {:.0}s, {:.1}m moved, {:.1}m over {}s, pace {:.2} min/km",
                    i,
                    pause.end_time,
                    pause.duration_seconds(),
                    pause.distance_during_pause,
                    m.forward.max_distance,
                    self.config.time_window_end,
                    m.pace.pace_min_per_km
                );
                (DetectorState::Running, Some(pause))
            }
        }
    }

    /// Scan the whole track in index order and return the pauses found.
    pub fn detect(&self) -> Vec<Pause> {
        let mut pauses = Vec::new();
        let mut state = DetectorState::Running;

        for i in 0..self.metrics.len() {
            let (next, closed) = self.step(state, i);
            pauses.extend(closed);
            state = next;
        }

        if let DetectorState::Paused(pending) = state {
            let last = self.metrics.len() - 1;
            debug!(
                "[PauseDetector] Track ended during pause started at {}",
                pending.start_index
            );
            pauses.push(self.close(pending, last, true));
        }

        info!(
            "[PauseDetector] {} pauses in {} points",
            pauses.len(),
            self.metrics.len()
        );
        pauses
    }

    fn close(&self, pending: PendingPause, end_index: usize, incomplete: bool) -> Pause {
        let end_time = self.metrics.point(end_index).timestamp;
        let end_distance = self.metrics.cumulative_distance(end_index);
        let distance = end_distance - pending.start_distance;
        let minutes = (end_time - pending.start_time).num_milliseconds() as f64 / 60_000.0;

        let avg_pace = if distance < STATIONARY_DISTANCE_M {
            None
        } else {
            Some(minutes / (distance / 1000.0))
        };

        Pause {
            start_index: pending.start_index,
            end_index,
            start_time: pending.start_time,
            end_time,
            start_distance_marker: pending.start_distance,
            end_distance_marker: end_distance,
            distance_during_pause: distance,
            avg_pace_during_pause: avg_pace,
            incomplete,
        }
    }
}

/// Validate `config`, build metrics for `points` and run the detector.
pub fn detect_pauses(points: &[crate::TrackPoint], config: &PauseConfig) -> Result<Vec<Pause>> {
    let metrics = TrackMetrics::new(points)?;
    let detector = PauseDetector::new(&metrics, config)?;
    Ok(detector.detect())
}
