//! Wire decoding for pose messages.
//!
//! The detector runtime delivers each frame's poses across the process
//! boundary as JSON nested float arrays: one entry per pose, one row per
//! body part in detection order, each row at least `[x, y, confidence]`.
//! A JSON `null` message means no poses were detected.

use crate::error::TrackError;
use crate::pose::keypoint::{BodyPart, Keypoint, Pose};

/// Decode an encoded pose message into a list of poses.
///
/// Rows longer than three values are tolerated; the extra values are
/// ignored. A pose with the wrong row count or a short row is rejected.
pub fn decode_poses(encoded: &str) -> Result<Vec<Pose>, TrackError> {
    let raw: Option<Vec<Vec<Vec<f32>>>> = serde_json::from_str(encoded)?;
    let raw = raw.unwrap_or_default();

    let mut poses = Vec::with_capacity(raw.len());
    for rows in &raw {
        poses.push(decode_pose(rows)?);
    }
    Ok(poses)
}

/// Encode poses back into the wire format. Used by loopback drivers and
/// tests standing in for the native detector side.
pub fn encode_poses(poses: &[Pose]) -> Result<String, TrackError> {
    let raw: Vec<Vec<Vec<f32>>> = poses
        .iter()
        .map(|pose| {
            pose.keypoints
                .iter()
                .map(|k| vec![k.x, k.y, k.confidence])
                .collect()
        })
        .collect();
    serde_json::to_string(&raw).map_err(TrackError::Decode)
}

fn decode_pose(rows: &[Vec<f32>]) -> Result<Pose, TrackError> {
    if rows.len() != BodyPart::COUNT {
        return Err(TrackError::MalformedPose {
            expected: BodyPart::COUNT,
            got: rows.len(),
        });
    }

    let mut pose = Pose::default();
    for (part, row) in BodyPart::all().into_iter().zip(rows) {
        if row.len() < 3 {
            return Err(TrackError::MalformedKeypoint {
                part,
                len: row.len(),
            });
        }
        pose.keypoints[part as usize] = Keypoint::new(row[0], row[1], row[2]);
    }
    Ok(pose)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 指定の行数・列数のJSONメッセージを組み立てる（姿勢1体分）
    fn pose_json(rows: usize, cols: usize) -> String {
        let row: Vec<String> = (0..cols).map(|c| format!("0.{}", c + 1)).collect();
        let row = format!("[{}]", row.join(","));
        let all: Vec<String> = (0..rows).map(|_| row.clone()).collect();
        format!("[[{}]]", all.join(","))
    }

    #[test]
    fn test_decode_null_is_empty() {
        let poses = decode_poses("null").unwrap();
        assert!(poses.is_empty(), "null message should decode to no poses");
    }

    #[test]
    fn test_decode_empty_list() {
        let poses = decode_poses("[]").unwrap();
        assert!(poses.is_empty());
    }

    #[test]
    fn test_decode_single_pose() {
        let poses = decode_poses(&pose_json(17, 3)).unwrap();
        assert_eq!(poses.len(), 1);

        let nose = poses[0].get(BodyPart::Nose);
        assert!((nose.x - 0.1).abs() < 1e-6);
        assert!((nose.y - 0.2).abs() < 1e-6);
        assert!((nose.confidence - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_decode_extra_columns_ignored() {
        let poses = decode_poses(&pose_json(17, 5)).unwrap();
        let ankle = poses[0].get(BodyPart::RightAnkle);
        assert!((ankle.confidence - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_decode_wrong_row_count() {
        let err = decode_poses(&pose_json(12, 3)).unwrap_err();
        match err {
            TrackError::MalformedPose { expected, got } => {
                assert_eq!(expected, 17);
                assert_eq!(got, 12);
            }
            other => panic!("expected MalformedPose, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_short_row() {
        // 3行目だけ2要素にする
        let mut rows: Vec<String> = (0..17).map(|_| "[0.5,0.5,0.9]".to_string()).collect();
        rows[2] = "[0.5,0.5]".to_string();
        let encoded = format!("[[{}]]", rows.join(","));

        let err = decode_poses(&encoded).unwrap_err();
        match err {
            TrackError::MalformedKeypoint { part, len } => {
                assert_eq!(part, BodyPart::RightEye);
                assert_eq!(len, 2);
            }
            other => panic!("expected MalformedKeypoint, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode_poses("{not json").unwrap_err();
        assert!(matches!(err, TrackError::Decode(_)));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut pose = Pose::default();
        pose.keypoints[BodyPart::LeftHip as usize] = Keypoint::new(0.25, 0.75, 0.95);

        let encoded = encode_poses(&[pose]).unwrap();
        let decoded = decode_poses(&encoded).unwrap();
        assert_eq!(decoded.len(), 1);

        let hip = decoded[0].get(BodyPart::LeftHip);
        assert!((hip.x - 0.25).abs() < 1e-6);
        assert!((hip.y - 0.75).abs() < 1e-6);
        assert!((hip.confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_decode_two_poses() {
        let one = pose_json(17, 3);
        // 1体分のJSONを2体分に複製する
        let inner = &one[1..one.len() - 1];
        let encoded = format!("[{},{}]", inner, inner);

        let poses = decode_poses(&encoded).unwrap();
        assert_eq!(poses.len(), 2);
    }
}
