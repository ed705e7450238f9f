pub mod body;
pub mod observer;
pub mod one_euro;
pub mod registry;
pub mod resolve;

pub use body::{BodyFrame, BodyTracker};
pub use observer::{LogObserver, TrackingObserver};
pub use one_euro::PointFilter;
pub use registry::TrackerRegistry;
pub use resolve::{resolve_keypoint, DepthHit, DepthQuery, ScreenMapper};
