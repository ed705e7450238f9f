//! Off-screen debug overlay for tracking output.
//!
//! Draws part markers and bounding boxes into a plain pixel buffer; no
//! window is opened. The buffer can be exported as an image by the host.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::DebugConfig;
use crate::tracker::body::BodyTracker;
use crate::tracker::observer::TrackingObserver;

/// マーカーの色 (RGB)
pub const MARKER_COLOR: u32 = 0x00FF00; // 緑

/// バウンディングボックスの色 (RGB)
pub const BOX_COLOR: u32 = 0xFFFF00; // 黄色

/// u32 RGBピクセルバッファ
pub struct OverlayCanvas {
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl OverlayCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![0u32; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buffer
    }

    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// ピクセルをセット（境界チェック付き）
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }

    /// Bresenhamのアルゴリズムで線を描画
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// 矩形の輪郭を描画
    pub fn draw_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        self.draw_line(x0, y0, x1, y0, color);
        self.draw_line(x1, y0, x1, y1, color);
        self.draw_line(x1, y1, x0, y1, color);
        self.draw_line(x0, y1, x0, y0, color);
    }

    /// Copy the canvas into an RGB image for export.
    pub fn to_image(&self) -> image::RgbImage {
        let mut img = image::RgbImage::new(self.width as u32, self.height as u32);
        for y in 0..self.height {
            for x in 0..self.width {
                let px = self.buffer[y * self.width + x];
                let r = ((px >> 16) & 0xFF) as u8;
                let g = ((px >> 8) & 0xFF) as u8;
                let b = (px & 0xFF) as u8;
                img.put_pixel(x as u32, y as u32, image::Rgb([r, g, b]));
            }
        }
        img
    }
}

/// Face-on orthographic projection of world space onto the canvas.
/// World X runs right, world Y runs up; Z is dropped.
#[derive(Debug, Clone, Copy)]
pub struct OverlayView {
    center: [f32; 2],
    pixels_per_meter: f32,
}

impl OverlayView {
    /// `center` is the world point shown at the middle of the canvas.
    pub fn new(center: [f32; 2], pixels_per_meter: f32) -> Self {
        Self {
            center,
            pixels_per_meter,
        }
    }

    pub fn project(&self, canvas: &OverlayCanvas, point: [f32; 3]) -> (i32, i32) {
        let x = canvas.width() as f32 / 2.0 + (point[0] - self.center[0]) * self.pixels_per_meter;
        let y = canvas.height() as f32 / 2.0 - (point[1] - self.center[1]) * self.pixels_per_meter;
        (x.round() as i32, y.round() as i32)
    }
}

/// Tracking observer that draws each update into an [`OverlayCanvas`].
///
/// Markers and the bounding box follow the debug toggles. Draws
/// accumulate across frames, so an exported image shows the motion
/// trail of the whole run.
pub struct OverlayObserver {
    canvas: Rc<RefCell<OverlayCanvas>>,
    view: OverlayView,
    markers: bool,
    bounding_box: bool,
    marker_radius: i32,
}

impl OverlayObserver {
    pub fn new(config: &DebugConfig) -> Self {
        let canvas = OverlayCanvas::new(config.canvas[0] as usize, config.canvas[1] as usize);
        Self {
            canvas: Rc::new(RefCell::new(canvas)),
            view: OverlayView::new([0.0, 1.0], config.pixels_per_meter),
            markers: config.markers,
            bounding_box: config.bounding_box,
            marker_radius: config.marker_radius as i32,
        }
    }

    /// Shared handle to the canvas, kept by the host for export.
    pub fn canvas(&self) -> Rc<RefCell<OverlayCanvas>> {
        self.canvas.clone()
    }
}

impl TrackingObserver for OverlayObserver {
    fn body_updated(&mut self, _identity: i32, body: &BodyTracker) {
        let mut canvas = self.canvas.borrow_mut();

        if self.markers {
            for point in body.positions().iter().flatten() {
                let (x, y) = self.view.project(&canvas, *point);
                canvas.draw_circle(x, y, self.marker_radius, MARKER_COLOR);
            }
        }

        if self.bounding_box {
            if let (Some(center), Some(scale)) = (body.center(), body.scale()) {
                let half = [scale[0] / 2.0, scale[1] / 2.0];
                let (x0, y0) =
                    self.view
                        .project(&canvas, [center[0] - half[0], center[1] + half[1], 0.0]);
                let (x1, y1) =
                    self.view
                        .project(&canvas, [center[0] + half[0], center[1] - half[1], 0.0]);
                canvas.draw_rect(x0, y0, x1, y1, BOX_COLOR);
            }
        }
    }
}
