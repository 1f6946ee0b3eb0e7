//! Detect pauses in a synthetic run and print a break report.
//!
//! Run with: cargo run --example pause_report

use chrono::{Duration, TimeZone, Utc};
use track_pauses::{analyze_track, PauseConfig, TrackPoint};

/// Meters per degree of latitude
const M_PER_DEG: f64 = 111_194.93;

/// Pace in decimal minutes as M:SS.
fn format_pace(pace_min_per_km: f64) -> String {
    let minutes = pace_min_per_km.trunc() as u64;
    let seconds = ((pace_min_per_km - pace_min_per_km.trunc()) * 60.0) as u64;
    format!("{}:{:02}", minutes, seconds)
}

/// Seconds as H:MM:SS, or M:SS under an hour.
fn format_time(seconds: f64) -> String {
    let total = seconds as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

fn main() {
    // 10 min at 5:30 min/km, 2 min at an aid station, 8 min at 5:45 min/km,
    // a 90 s traffic light, then 5 min to the finish. One point every 5 s.
    let start = Utc.with_ymd_and_hms(2024, 5, 12, 8, 0, 0).unwrap();
    let plan: [(u32, Option<f64>); 5] = [
        (600, Some(5.5)),
        (120, None),
        (480, Some(5.75)),
        (90, None),
        (300, Some(5.5)),
    ];

    let mut points = vec![TrackPoint::new(start, 45.1885, 5.7245)];
    let mut t = 0;
    let mut lat = 45.1885;
    for (seconds, pace) in plan {
        for _ in 0..seconds / 5 {
            t += 5;
            lat += match pace {
                Some(p) => 1000.0 / (p * 60.0) * 5.0 / M_PER_DEG,
                None => 0.05 / M_PER_DEG,
            };
            points.push(TrackPoint::new(start + Duration::seconds(t), lat, 5.7245));
        }
    }

    let config = PauseConfig::default();
    let analysis = match analyze_track(&points, &config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };
    let summary = &analysis.summary;

    println!("Analyzed {} points\n", points.len());
    println!("=== BREAK SUMMARY ===");
    if summary.pauses.is_empty() {
        println!("No breaks detected in this track.");
    }

    for stats in &summary.pauses {
        println!("Break #{}:", stats.number);
        println!(
            "  Position in race: from {:.3}km to {:.3}km",
            stats.start_km, stats.end_km
        );
        println!("  Time from start: {}", format_time(stats.time_from_start_seconds));
        println!(
            "  Duration: {:.0}s ({:.1} min){}",
            stats.duration_seconds,
            stats.duration_seconds / 60.0,
            if stats.incomplete { " (track ended)" } else { "" }
        );
        println!("  Distance during break: {:.2}m", stats.distance_meters);
        println!(
            "  Location: {:.6}, {:.6}",
            stats.center_latitude, stats.center_longitude
        );
        println!(
            "  Point density: 1 point every {:.2} seconds ({} points total)",
            stats.seconds_per_point, stats.point_count
        );
        if let Some(pace) = stats.mean_segment_pace {
            println!("  Average pace during break: {} min/km", format_pace(pace));
        }
        println!();
    }

    println!("=== DISTANCE COMPARISON ===");
    println!("Total GPS distance: {:.2}m", summary.total_distance);
    println!("Distance during breaks: {:.2}m", summary.pause_distance);
    println!("Distance without breaks: {:.2}m", summary.moving_distance);
    println!(
        "Percentage of distance during breaks: {:.2}%",
        summary.pause_distance_percentage
    );
    println!(
        "Total break time: {}",
        format_time(summary.pause_duration_seconds)
    );
    if let Some(pace) = summary.moving_pace_min_per_km {
        println!("Moving pace: {} min/km", format_pace(pace));
    }
}
