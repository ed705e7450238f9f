pub mod decode;
pub mod keypoint;
pub mod source;

pub use decode::{decode_poses, encode_poses};
pub use keypoint::{BodyPart, Keypoint, Pose};
pub use source::{ChannelPoseSource, PoseBackend, PoseFrame, PoseSource, TrackedPose};
