//! Identity-keyed registry of tracked bodies.

use std::collections::HashMap;

use log::{debug, info};

use crate::config::Config;
use crate::error::TrackError;
use crate::pose::keypoint::Pose;
use crate::tracker::body::BodyTracker;
use crate::tracker::observer::TrackingObserver;
use crate::tracker::resolve::{DepthQuery, ScreenMapper};

/// Owns every tracked body, keyed by the upstream-assigned identity.
///
/// Holds the single session configuration and screen geometry. Trackers
/// are created lazily on first sight of an identity and live until the
/// caller's lost-tracking signal removes them.
pub struct TrackerRegistry {
    config: Config,
    mapper: ScreenMapper,
    trackers: HashMap<i32, BodyTracker>,
    observers: Vec<Box<dyn TrackingObserver>>,
}

impl TrackerRegistry {
    pub fn new(config: Config) -> Self {
        let mapper = ScreenMapper::new(config.tracking.screen, config.tracking.capture);
        Self {
            config,
            mapper,
            trackers: HashMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn TrackingObserver>) {
        self.observers.push(observer);
    }

    /// Feed one frame's pose for `identity`, creating its tracker on first
    /// sight. Observers are notified after a successful update; a failed
    /// update leaves the tracker untouched and notifies nobody.
    pub fn create_or_update(
        &mut self,
        identity: i32,
        pose: &Pose,
        timestamp: Option<f64>,
        depth: &mut dyn DepthQuery,
    ) -> Result<&BodyTracker, TrackError> {
        if !self.trackers.contains_key(&identity) {
            info!("tracking new body {}", identity);
        }
        let tracker = self
            .trackers
            .entry(identity)
            .or_insert_with(|| BodyTracker::new(&self.config));
        tracker.update(pose, timestamp, &self.mapper, depth, &self.config)?;

        for observer in &mut self.observers {
            observer.body_updated(identity, tracker);
        }
        Ok(tracker)
    }

    /// Drop a body on the upstream lost-tracking signal. Removing an
    /// unknown identity is a no-op.
    pub fn remove(&mut self, identity: i32) -> bool {
        if self.trackers.remove(&identity).is_some() {
            info!("body {} removed", identity);
            for observer in &mut self.observers {
                observer.body_removed(identity);
            }
            true
        } else {
            debug!("remove for unknown body {}", identity);
            false
        }
    }

    pub fn get(&self, identity: i32) -> Option<&BodyTracker> {
        self.trackers.get(&identity)
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Tracked identities, sorted for stable iteration.
    pub fn identities(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.trackers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
