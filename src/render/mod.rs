pub mod overlay;

pub use overlay::{OverlayCanvas, OverlayObserver, OverlayView};
