//! Synthetic tracks shared by the unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::geo_utils::EARTH_RADIUS_M;
use crate::TrackPoint;

const M_PER_DEG: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Slow drift while standing still (m/s), well under a meter per stop.
const STOP_DRIFT_MPS: f64 = 0.008;

#[derive(Debug, Clone, Copy)]
pub enum Segment {
    /// Head north at `pace` min/km
    Run { seconds: i64, pace: f64 },
    /// Stand still with a few centimeters of drift per sample
    Stop { seconds: i64 },
    /// Stand exactly still
    Hold { seconds: i64 },
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap()
}

/// Track starting at (45, 6) with one point every `interval` seconds.
pub fn build(interval: i64, segments: &[Segment]) -> Vec<TrackPoint> {
    let mut lat = 45.0;
    let mut t = 0;
    let mut points = vec![TrackPoint::new(start_time(), lat, 6.0)];

    for segment in segments {
        let (seconds, meters_per_sample) = match *segment {
            Segment::Run { seconds, pace } => {
                (seconds, 1000.0 / (pace * 60.0) * interval as f64)
            }
            Segment::Stop { seconds } => (seconds, STOP_DRIFT_MPS * interval as f64),
            Segment::Hold { seconds } => (seconds, 0.0),
        };

        for _ in 0..seconds / interval {
            t += interval;
            lat += meters_per_sample / M_PER_DEG;
            points.push(TrackPoint::new(start_time() + Duration::seconds(t), lat, 6.0));
        }
    }

    points
}

/// `n` points at constant `pace` min/km.
pub fn steady_run(n: usize, interval: i64, pace: f64) -> Vec<TrackPoint> {
    let seconds = (n as i64 - 1) * interval;
    build(interval, &[Segment::Run { seconds, pace }])
}

pub fn running_with_stop(
    interval: i64,
    pace: f64,
    run_before: i64,
    stop: i64,
    run_after: i64,
) -> Vec<TrackPoint> {
    build(
        interval,
        &[
            Segment::Run { seconds: run_before, pace },
            Segment::Stop { seconds: stop },
            Segment::Run { seconds: run_after, pace },
        ],
    )
}

/// Running followed by a stop that lasts until the end of the track.
pub fn stop_then_tail(interval: i64, pace: f64, run: i64, stop: i64) -> Vec<TrackPoint> {
    build(
        interval,
        &[Segment::Run { seconds: run, pace }, Segment::Stop { seconds: stop }],
    )
}
