//! Observation seam for per-frame tracking output.
//!
//! Debug visualization and logging hang off this trait instead of being
//! woven into the tracking update itself. Observers receive the same
//! smoothed state the registry hands back to its caller.

use log::debug;

use crate::tracker::body::BodyTracker;

/// Receives registry events after each mutation.
pub trait TrackingObserver {
    /// A body was created or updated this frame.
    fn body_updated(&mut self, identity: i32, body: &BodyTracker);

    /// A body was removed from the registry.
    fn body_removed(&mut self, _identity: i32) {}
}

/// Writes center and scale per body to the debug log.
pub struct LogObserver;

impl TrackingObserver for LogObserver {
    fn body_updated(&mut self, identity: i32, body: &BodyTracker) {
        match (body.center(), body.scale()) {
            (Some(center), Some(scale)) => debug!(
                "body {}: center ({:.3}, {:.3}, {:.3}) scale ({:.3}, {:.3}, {:.3})",
                identity, center[0], center[1], center[2], scale[0], scale[1], scale[2]
            ),
            _ => debug!("body {}: no bounds this frame", identity),
        }
    }

    fn body_removed(&mut self, identity: i32) {
        debug!("body {} removed", identity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    struct Counting {
        updates: usize,
    }

    impl TrackingObserver for Counting {
        fn body_updated(&mut self, _identity: i32, _body: &BodyTracker) {
            self.updates += 1;
        }
    }

    #[test]
    fn test_default_removed_is_noop() {
        // Implementations that only care about updates need not handle
        // removal.
        let mut observer = Counting { updates: 0 };
        let body = BodyTracker::new(&Config::default());

        observer.body_updated(1, &body);
        observer.body_removed(1);
        assert_eq!(observer.updates, 1);
    }
}
