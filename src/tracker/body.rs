//! Per-body tracking state: smoothed part positions and bounding volume.

use log::debug;

use crate::config::Config;
use crate::error::TrackError;
use crate::pose::keypoint::{BodyPart, Pose};
use crate::tracker::one_euro::PointFilter;
use crate::tracker::resolve::{resolve_keypoint, DepthQuery, ScreenMapper};

/// Derived anchor frame for attaching content to a tracked body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    pub position: [f32; 3],
    /// Identity; body orientation is not estimated.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

/// Tracking state for one body identity.
///
/// Holds a smoothed world position per part plus a smoothed bounding
/// center and scale. Every slot is overwritten on every accepted frame;
/// a part that fails to resolve is absent, never carried over.
pub struct BodyTracker {
    points: [Option<[f32; 3]>; BodyPart::COUNT],
    filters: [PointFilter; BodyPart::COUNT],
    center_filter: PointFilter,
    scale_filter: PointFilter,
    center: Option<[f32; 3]>,
    scale: Option<[f32; 3]>,
    last_timestamp: Option<f64>,
}

impl BodyTracker {
    pub fn new(config: &Config) -> Self {
        let frequency = config.tracking.frequency;
        Self {
            points: [None; BodyPart::COUNT],
            filters: std::array::from_fn(|_| PointFilter::from_config(frequency, &config.filter)),
            center_filter: PointFilter::from_config(frequency, &config.filter),
            scale_filter: PointFilter::from_config(frequency, &config.filter),
            center: None,
            scale: None,
            last_timestamp: None,
        }
    }

    /// Ingest one frame's pose for this body.
    ///
    /// Timestamps are seconds and must be strictly increasing per body;
    /// a non-increasing timestamp fails before any state is touched.
    pub fn update(
        &mut self,
        pose: &Pose,
        timestamp: Option<f64>,
        mapper: &ScreenMapper,
        depth: &mut dyn DepthQuery,
        config: &Config,
    ) -> Result<(), TrackError> {
        if let (Some(current), Some(previous)) = (timestamp, self.last_timestamp) {
            if current <= previous {
                return Err(TrackError::NonMonotonicTimestamp { previous, current });
            }
        }
        if timestamp.is_some() {
            self.last_timestamp = timestamp;
        }

        self.update_points(pose, timestamp, mapper, depth, config)?;
        self.update_bounds(timestamp, config)
    }

    fn update_points(
        &mut self,
        pose: &Pose,
        timestamp: Option<f64>,
        mapper: &ScreenMapper,
        depth: &mut dyn DepthQuery,
        config: &Config,
    ) -> Result<(), TrackError> {
        let tracking = &config.tracking;
        for part in BodyPart::all() {
            let keypoint = pose.get(part);
            if !keypoint.is_valid(tracking.confidence_cutoff) {
                debug!(
                    "skipping {} at confidence {:.2}",
                    part, keypoint.confidence
                );
                self.points[part as usize] = None;
                continue;
            }

            let resolved = resolve_keypoint(
                keypoint,
                mapper,
                depth,
                tracking.confidence_cutoff,
                tracking.min_distance,
            );
            self.points[part as usize] = match resolved {
                Some(raw) => Some(self.filters[part as usize].filter(raw, timestamp)?),
                None => None,
            };
        }
        Ok(())
    }

    fn update_bounds(&mut self, timestamp: Option<f64>, config: &Config) -> Result<(), TrackError> {
        let tracking = &config.tracking;
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut any = false;
        let mut any_z = false;

        for part in BodyPart::all() {
            if tracking.bounds_skip.contains(&part) {
                continue;
            }
            if let Some(point) = self.points[part as usize] {
                min[0] = min[0].min(point[0]);
                min[1] = min[1].min(point[1]);
                max[0] = max[0].max(point[0]);
                max[1] = max[1].max(point[1]);
                any = true;

                if !tracking.depth_skip.contains(&part) {
                    min[2] = min[2].min(point[2]);
                    max[2] = max[2].max(point[2]);
                    any_z = true;
                }
            }
        }

        if !any {
            self.center = None;
            self.scale = None;
            debug!("no parts contributed to bounds");
            return Ok(());
        }

        // Only depth-unreliable parts resolved this frame; take their Z so
        // the bounds stay anchored at the points instead of the sentinels.
        if !any_z {
            for part in BodyPart::all() {
                if tracking.bounds_skip.contains(&part) {
                    continue;
                }
                if let Some(point) = self.points[part as usize] {
                    min[2] = min[2].min(point[2]);
                    max[2] = max[2].max(point[2]);
                }
            }
        }

        let limit = tracking.max_body_size;
        let raw_scale = [
            (max[0] - min[0]).min(limit[0]),
            (max[1] - min[1]).min(limit[1]),
            (max[2] - min[2]).min(limit[2]),
        ];
        let raw_center = [
            (max[0] + min[0]) / 2.0,
            (max[1] + min[1]) / 2.0,
            (max[2] + min[2]) / 2.0,
        ];

        self.scale = Some(self.scale_filter.filter(raw_scale, timestamp)?);
        self.center = Some(self.center_filter.filter(raw_center, timestamp)?);
        Ok(())
    }

    /// Smoothed world position of one part, absent when unresolved.
    pub fn position(&self, part: BodyPart) -> Option<[f32; 3]> {
        self.points[part as usize]
    }

    /// All part positions, indexed by part.
    pub fn positions(&self) -> &[Option<[f32; 3]>; BodyPart::COUNT] {
        &self.points
    }

    /// Smoothed bounding center, absent until a frame contributed bounds.
    pub fn center(&self) -> Option<[f32; 3]> {
        self.center
    }

    /// Smoothed bounding scale (axis-aligned extent, per-axis capped).
    pub fn scale(&self) -> Option<[f32; 3]> {
        self.scale
    }

    /// Anchor frame at the body center, valid only while a center exists.
    pub fn frame(&self) -> Option<BodyFrame> {
        match (self.center, self.scale) {
            (Some(position), Some(scale)) => Some(BodyFrame {
                position,
                rotation: [0.0, 0.0, 0.0, 1.0],
                scale,
            }),
            _ => None,
        }
    }
}
