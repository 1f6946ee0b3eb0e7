//! Track totals with pauses split out, and per-pause statistics for reports.

use log::warn;

use crate::error::{PauseError, Result};
use crate::geo_utils::compute_center;
use crate::metrics::TrackMetrics;
use crate::Pause;

/// Where and how long one pause was, relative to the whole track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PauseStats {
    /// 1-based position in the pause list
    pub number: usize,
    /// Distance marker at the pause start (km)
    pub start_km: f64,
    /// Distance marker at the pause end (km)
    pub end_km: f64,
    /// Seconds from the first point of the track to the pause start
    pub time_from_start_seconds: f64,
    pub duration_seconds: f64,
    /// Distance recorded while paused (m)
    pub distance_meters: f64,
    /// Points from start to end, inclusive
    pub point_count: usize,
    /// Average sampling interval during the pause (s)
    pub seconds_per_point: f64,
    /// Mean of per-segment paces (min/km); `None` if nothing moved
    pub mean_segment_pace: Option<f64>,
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub incomplete: bool,
}

/// Distance and time totals for a track, with and without pauses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackSummary {
    /// Meters
    pub total_distance: f64,
    pub pause_distance: f64,
    pub moving_distance: f64,
    /// Seconds
    pub total_duration_seconds: f64,
    pub pause_duration_seconds: f64,
    pub moving_duration_seconds: f64,
    /// Share of the total distance recorded during pauses (0-100)
    pub pause_distance_percentage: f64,
    /// Pace over the moving part of the track (min/km)
    pub moving_pace_min_per_km: Option<f64>,
    pub pauses: Vec<PauseStats>,
}

/// Aggregate `pauses` detected on the track behind `metrics`.
///
/// # Errors
///
/// [`PauseError::InvalidPause`] if a pause does not index into this track with
/// `start_index < end_index`.
pub fn summarize(metrics: &TrackMetrics, pauses: &[Pause]) -> Result<TrackSummary> {
    if let Some(pause) = pauses
        .iter()
        .find(|p| p.start_index >= p.end_index || p.end_index >= metrics.len())
    {
        warn!(
            "[TrackPauses] Pause {}..={} does not fit a {}-point track",
            pause.start_index,
            pause.end_index,
            metrics.len()
        );
        return Err(PauseError::InvalidPause {
            start_index: pause.start_index,
            end_index: pause.end_index,
            point_count: metrics.len(),
        });
    }

    let total_distance = metrics.total_distance();
    let total_duration = metrics.total_duration();

    let stats: Vec<PauseStats> = pauses
        .iter()
        .enumerate()
        .map(|(k, pause)| pause_stats(metrics, pause, k + 1))
        .collect();

    let pause_distance: f64 = pauses.iter().map(|p| p.distance_during_pause).sum();
    let pause_duration: f64 = pauses.iter().map(Pause::duration_seconds).sum();
    let moving_distance = total_distance - pause_distance;
    let moving_duration = total_duration - pause_duration;

    let pause_distance_percentage = if total_distance > 0.0 {
        pause_distance / total_distance * 100.0
    } else {
        0.0
    };

    let moving_pace_min_per_km = (moving_distance > 0.0)
        .then(|| (moving_duration / 60.0) / (moving_distance / 1000.0));

    Ok(TrackSummary {
        total_distance,
        pause_distance,
        moving_distance,
        total_duration_seconds: total_duration,
        pause_duration_seconds: pause_duration,
        moving_duration_seconds: moving_duration,
        pause_distance_percentage,
        moving_pace_min_per_km,
        pauses: stats,
    })
}

/// Expects `start_index < end_index < metrics.len()`.
fn pause_stats(metrics: &TrackMetrics, pause: &Pause, number: usize) -> PauseStats {
    let span = &metrics.points()[pause.start_index..=pause.end_index];
    let first = &span[0];
    let (center_latitude, center_longitude) =
        compute_center(span).unwrap_or((first.latitude, first.longitude));

    let paces: Vec<f64> = metrics.segment_paces(pause.start_index, pause.end_index).collect();
    let mean_segment_pace =
        (!paces.is_empty()).then(|| paces.iter().sum::<f64>() / paces.len() as f64);

    let duration = pause.duration_seconds();
    let point_count = pause.point_count();

    PauseStats {
        number,
        start_km: pause.start_distance_marker / 1000.0,
        end_km: pause.end_distance_marker / 1000.0,
        time_from_start_seconds: metrics.elapsed_seconds(pause.start_index),
        duration_seconds: duration,
        distance_meters: pause.distance_during_pause,
        point_count,
        seconds_per_point: duration / (point_count - 1) as f64,
        mean_segment_pace,
        center_latitude,
        center_longitude,
        incomplete: pause.incomplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{PauseConfig, PauseDetector};
    use crate::test_tracks::{build, running_with_stop, steady_run, Segment};

    fn run(points: &[crate::TrackPoint]) -> (TrackMetrics<'_>, Vec<Pause>) {
        let metrics = TrackMetrics::new(points).unwrap();
        let config = PauseConfig::default();
        let pauses = PauseDetector::new(&metrics, &config).unwrap().detect();
        (metrics, pauses)
    }

    fn relative_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_no_pauses() {
        let points = steady_run(60, 5, 5.0);
        let (metrics, pauses) = run(&points);
        let summary = summarize(&metrics, &pauses).unwrap();

        assert!(summary.pauses.is_empty());
        assert_eq!(summary.pause_distance, 0.0);
        assert_eq!(summary.moving_distance, summary.total_distance);
        assert_eq!(summary.pause_duration_seconds, 0.0);
        assert_eq!(summary.total_duration_seconds, 295.0);
        assert_eq!(summary.pause_distance_percentage, 0.0);
        let pace = summary.moving_pace_min_per_km.unwrap();
        assert!((pace - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_distances_add_up() {
        let points = build(
            5,
            &[
                Segment::Run { seconds: 90, pace: 6.5 },
                Segment::Stop { seconds: 120 },
                Segment::Run { seconds: 120, pace: 6.5 },
                Segment::Stop { seconds: 180 },
                Segment::Run { seconds: 90, pace: 6.5 },
            ],
        );
        let (metrics, pauses) = run(&points);
        let summary = summarize(&metrics, &pauses).unwrap();

        assert_eq!(summary.pauses.len(), 2);
        assert!(relative_eq(
            summary.moving_distance + summary.pause_distance,
            summary.total_distance
        ));
        assert!(relative_eq(
            summary.moving_duration_seconds + summary.pause_duration_seconds,
            summary.total_duration_seconds
        ));
        assert!(summary.pause_distance_percentage > 0.0);
        assert!(summary.pause_distance_percentage < 100.0);
    }

    #[test]
    fn test_pause_stats() {
        let points = running_with_stop(5, 6.5, 60, 120, 60);
        let (metrics, pauses) = run(&points);
        let summary = summarize(&metrics, &pauses).unwrap();

        assert_eq!(summary.pauses.len(), 1);
        let pause = &pauses[0];
        let stats = &summary.pauses[0];

        assert_eq!(stats.number, 1);
        assert_eq!(stats.start_km, pause.start_distance_marker / 1000.0);
        assert_eq!(stats.end_km, pause.end_distance_marker / 1000.0);
        assert!(stats.start_km < stats.end_km);
        assert_eq!(stats.time_from_start_seconds, 90.0);
        assert_eq!(stats.duration_seconds, 105.0);
        assert_eq!(stats.point_count, 22);
        assert_eq!(stats.seconds_per_point, 5.0);
        assert_eq!(stats.distance_meters, pause.distance_during_pause);
        assert!(!stats.incomplete);

        // Mostly drift segments, so the mean instantaneous pace is very slow
        assert!(stats.mean_segment_pace.unwrap() > 100.0);

        let start = &points[pause.start_index];
        let end = &points[pause.end_index];
        assert!(stats.center_latitude >= start.latitude && stats.center_latitude <= end.latitude);
        assert!((stats.center_longitude - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_stationary_pause_has_no_segment_pace() {
        let points = build(
            5,
            &[Segment::Run { seconds: 60, pace: 6.5 }, Segment::Hold { seconds: 120 }],
        );
        let (metrics, pauses) = run(&points);
        let summary = summarize(&metrics, &pauses).unwrap();

        let stats = &summary.pauses[0];
        assert!(stats.incomplete);
        assert!(stats.mean_segment_pace.is_none());
        assert_eq!(stats.distance_meters, 0.0);
        assert_eq!(summary.moving_distance, summary.total_distance);
    }

    #[test]
    fn test_stationary_track_has_no_moving_pace() {
        let points = build(5, &[Segment::Hold { seconds: 60 }]);
        let metrics = TrackMetrics::new(&points).unwrap();
        let summary = summarize(&metrics, &[]).unwrap();

        assert_eq!(summary.total_distance, 0.0);
        assert_eq!(summary.pause_distance_percentage, 0.0);
        assert!(summary.moving_pace_min_per_km.is_none());
    }

    #[test]
    fn test_rejects_pause_from_another_track() {
        let long = running_with_stop(5, 6.5, 60, 120, 60);
        let (_, pauses) = run(&long);
        assert_eq!(pauses[0].end_index, 39);

        let short = steady_run(30, 5, 6.5);
        let metrics = TrackMetrics::new(&short).unwrap();
        assert_eq!(
            summarize(&metrics, &pauses),
            Err(PauseError::InvalidPause { start_index: 18, end_index: 39, point_count: 30 })
        );
    }

    #[test]
    fn test_rejects_inverted_pause() {
        let points = running_with_stop(5, 6.5, 60, 120, 60);
        let (metrics, pauses) = run(&points);

        let mut inverted = pauses[0].clone();
        std::mem::swap(&mut inverted.start_index, &mut inverted.end_index);
        assert!(matches!(
            summarize(&metrics, &[inverted]),
            Err(PauseError::InvalidPause { start_index: 39, end_index: 18, .. })
        ));

        let mut single = pauses[0].clone();
        single.end_index = single.start_index;
        assert!(summarize(&metrics, &[single]).is_err());
    }
}
