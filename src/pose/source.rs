//! Pose delivery from the detector backend.
//!
//! The detector runs on its own thread (or process); requests and results
//! cross a bounded channel pair. At most one request is in flight per
//! source at any time, so a slow detector backs pressure up to the caller
//! instead of queueing stale frames.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::error::TrackError;
use crate::pose::keypoint::Pose;

// --- Frame types ---

/// One detected body with its upstream-assigned identity.
#[derive(Debug, Clone)]
pub struct TrackedPose {
    pub identity: i32,
    pub pose: Pose,
}

/// One frame's worth of detector output.
#[derive(Debug, Clone)]
pub struct PoseFrame {
    /// Capture timestamp in seconds.
    pub timestamp: f64,
    pub poses: Vec<TrackedPose>,
}

// --- Source seam ---

/// Where pose frames come from, as seen by the tracking driver.
pub trait PoseSource {
    /// Ask the backend for the next frame. Returns `Ok(false)` when a
    /// request is already in flight.
    fn request(&mut self) -> Result<bool, TrackError>;

    /// Non-blocking poll for a completed frame.
    fn try_next(&mut self) -> Option<PoseFrame>;

    /// Whether a request is still being processed.
    fn processing(&self) -> bool;
}

/// Channel-backed [`PoseSource`] paired with a [`PoseBackend`].
pub struct ChannelPoseSource {
    requests: Sender<()>,
    results: Receiver<PoseFrame>,
    in_flight: bool,
}

/// Backend half of the channel pair; moved into the detector thread.
pub struct PoseBackend {
    pub requests: Receiver<()>,
    pub results: Sender<PoseFrame>,
}

impl ChannelPoseSource {
    /// Create a connected source/backend pair.
    pub fn channel() -> (Self, PoseBackend) {
        let (request_tx, request_rx) = bounded(1);
        let (result_tx, result_rx) = bounded(1);
        (
            Self {
                requests: request_tx,
                results: result_rx,
                in_flight: false,
            },
            PoseBackend {
                requests: request_rx,
                results: result_tx,
            },
        )
    }
}

impl PoseSource for ChannelPoseSource {
    fn request(&mut self) -> Result<bool, TrackError> {
        if self.in_flight {
            return Ok(false);
        }
        match self.requests.try_send(()) {
            Ok(()) => {
                self.in_flight = true;
                Ok(true)
            }
            Err(TrySendError::Full(())) => Ok(false),
            Err(TrySendError::Disconnected(())) => Err(TrackError::SourceClosed),
        }
    }

    fn try_next(&mut self) -> Option<PoseFrame> {
        match self.results.try_recv() {
            Ok(frame) => {
                self.in_flight = false;
                Some(frame)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                // A dead backend never answers; clear the guard so the next
                // request surfaces the disconnect instead of short-circuiting.
                self.in_flight = false;
                None
            }
        }
    }

    fn processing(&self) -> bool {
        self.in_flight
    }
}
