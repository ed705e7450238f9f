use thiserror::Error;

use crate::pose::keypoint::BodyPart;

/// Errors surfaced by the tracking pipeline.
///
/// Missing data is not an error: an unresolved part or an empty bounding
/// volume comes back as `None` from the tracker. This enum covers caller
/// contract violations and malformed wire input only.
#[derive(Debug, Error)]
pub enum TrackError {
    /// A frame arrived with a timestamp not later than the previous one for
    /// the same channel. The adaptive filter needs positive elapsed time.
    #[error("non-monotonic timestamp: {current} follows {previous}")]
    NonMonotonicTimestamp { previous: f64, current: f64 },

    /// A wire pose did not carry one row per body part.
    #[error("malformed pose: expected {expected} keypoint rows, got {got}")]
    MalformedPose { expected: usize, got: usize },

    /// A keypoint row was too short to carry x, y and confidence.
    #[error("malformed keypoint row for {part}: {len} values, need at least 3")]
    MalformedKeypoint { part: BodyPart, len: usize },

    /// The pose wire message was not valid JSON.
    #[error("pose message decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The pose source backend hung up.
    #[error("pose source disconnected")]
    SourceClosed,
}
