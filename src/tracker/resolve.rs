//! Resolving 2D keypoints to 3D world positions via the host depth service.

use crate::pose::keypoint::Keypoint;

/// Result of a depth query at one screen point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthHit {
    /// Hit position in world space.
    pub position: [f32; 3],
    /// Distance from the session origin to the hit.
    pub distance: f32,
}

/// Seam to the host depth/surface estimation service.
pub trait DepthQuery {
    /// Cast into the scene at a device screen point (pixels). Returns zero
    /// or more hits; their order carries no meaning.
    fn raycast(&mut self, screen_point: [f32; 2]) -> Vec<DepthHit>;
}

/// Maps normalized capture-image coordinates onto the device screen.
///
/// The capture sensor is mounted 90 degrees from the display (right-oriented
/// camera), so the capture resolution enters the mapping with its axes
/// swapped. The image is scaled uniformly to fit the screen width and
/// re-centered vertically.
#[derive(Debug, Clone, Copy)]
pub struct ScreenMapper {
    screen: [f32; 2],
    /// Capture resolution after the 90 degree swap.
    resolution: [f32; 2],
}

impl ScreenMapper {
    /// `screen` is the device screen size in pixels (width, height);
    /// `capture` the camera image size (width, height). Without a configured
    /// capture size the screen size with swapped axes is assumed, which makes
    /// the mapping a plain vertical flip.
    pub fn new(screen: [u32; 2], capture: Option<[u32; 2]>) -> Self {
        let capture = capture.unwrap_or([screen[1], screen[0]]);
        Self {
            screen: [screen[0] as f32, screen[1] as f32],
            resolution: [capture[1] as f32, capture[0] as f32],
        }
    }

    /// Map a normalized detector coordinate (y down) to viewport space
    /// (y up, [0,1] on screen).
    pub fn viewport_point(&self, point: [f32; 2]) -> [f32; 2] {
        let point = [point[0], 1.0 - point[1]];

        let mut scaled = [
            point[0] * self.resolution[0],
            point[1] * self.resolution[1],
        ];
        let x_scale = self.screen[0] / self.resolution[0];
        scaled[0] *= x_scale;
        scaled[1] *= x_scale;

        let scaled_height = self.resolution[1] * x_scale;
        let y_delta = (scaled_height - self.screen[1]) / 2.0;
        scaled[1] -= y_delta;

        [scaled[0] / self.screen[0], scaled[1] / self.screen[1]]
    }

    /// Map a normalized detector coordinate to device screen pixels.
    pub fn screen_point(&self, point: [f32; 2]) -> [f32; 2] {
        let viewport = self.viewport_point(point);
        [viewport[0] * self.screen[0], viewport[1] * self.screen[1]]
    }
}

/// Resolve a single keypoint to a raw (pre-filter) 3D world position.
///
/// Absent when the keypoint is below the confidence cutoff (in which case
/// no depth query is issued at all), when the query returns no hits, or
/// when every hit is closer than `min_distance`.
pub fn resolve_keypoint(
    keypoint: &Keypoint,
    mapper: &ScreenMapper,
    depth: &mut dyn DepthQuery,
    confidence_cutoff: f32,
    min_distance: f32,
) -> Option<[f32; 3]> {
    if !keypoint.is_valid(confidence_cutoff) {
        return None;
    }

    let screen_point = mapper.screen_point([keypoint.x, keypoint.y]);
    let hits = depth.raycast(screen_point);

    let mut sum = [0.0f32; 3];
    let mut accepted = 0usize;
    for hit in &hits {
        if hit.distance < min_distance {
            continue;
        }
        sum[0] += hit.position[0];
        sum[1] += hit.position[1];
        sum[2] += hit.position[2];
        accepted += 1;
    }
    if accepted == 0 {
        return None;
    }

    // Mean over the accepted hits only.
    let n = accepted as f32;
    Some([sum[0] / n, sum[1] / n, sum[2] / n])
}
