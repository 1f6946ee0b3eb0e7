//! Error types for pause detection.
//!
//! Only malformed input fails a run. Windows that run past either end of the
//! track are not errors: they suppress a transition at that index and, for a
//! pause still open when the track ends, show up as [`Pause::incomplete`].
//!
//! [`Pause::incomplete`]: crate::Pause::incomplete

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PauseError {
    /// Fewer than two points, or a timestamp earlier than its predecessor.
    #[error("invalid track: {0}")]
    InvalidTrack(String),

    /// Latitude outside [-90, 90], longitude outside [-180, 180], or not finite.
    #[error("invalid coordinate at point {index}: ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// A threshold, window or point count that must be positive is not.
    #[error("invalid config: {field} must be positive and finite, got {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    /// A pause whose indices do not fit the track it is summarized against.
    #[error("invalid pause: indices {start_index}..={end_index} on a track of {point_count} points")]
    InvalidPause {
        start_index: usize,
        end_index: usize,
        point_count: usize,
    },
}

pub type Result<T> = std::result::Result<T, PauseError>;
