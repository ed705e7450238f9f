use serde::{Deserialize, Serialize};

/// 検出モデルの17ボディパーツ（検出順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyPart {
    pub const COUNT: usize = 17;

    /// 全パーツを検出順で返す
    pub fn all() -> [Self; Self::COUNT] {
        [
            Self::Nose,
            Self::LeftEye,
            Self::RightEye,
            Self::LeftEar,
            Self::RightEar,
            Self::LeftShoulder,
            Self::RightShoulder,
            Self::LeftElbow,
            Self::RightElbow,
            Self::LeftWrist,
            Self::RightWrist,
            Self::LeftHip,
            Self::RightHip,
            Self::LeftKnee,
            Self::RightKnee,
            Self::LeftAnkle,
            Self::RightAnkle,
        ]
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "Nose",
            Self::LeftEye => "LeftEye",
            Self::RightEye => "RightEye",
            Self::LeftEar => "LeftEar",
            Self::RightEar => "RightEar",
            Self::LeftShoulder => "LeftShoulder",
            Self::RightShoulder => "RightShoulder",
            Self::LeftElbow => "LeftElbow",
            Self::RightElbow => "RightElbow",
            Self::LeftWrist => "LeftWrist",
            Self::RightWrist => "RightWrist",
            Self::LeftHip => "LeftHip",
            Self::RightHip => "RightHip",
            Self::LeftKnee => "LeftKnee",
            Self::RightKnee => "RightKnee",
            Self::LeftAnkle => "LeftAnkle",
            Self::RightAnkle => "RightAnkle",
        }
    }

    /// 顔パーツか（深度推定が不安定なパーツ群）
    pub fn is_face(&self) -> bool {
        matches!(
            self,
            Self::Nose | Self::LeftEye | Self::RightEye | Self::LeftEar | Self::RightEar
        )
    }
}

impl std::fmt::Display for BodyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 単一キーポイント
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0、画像上端が0)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

/// 17キーポイントからなる姿勢。パーツラベルは配列位置で決まる。
#[derive(Debug, Clone)]
pub struct Pose {
    pub keypoints: [Keypoint; BodyPart::COUNT],
}

impl Pose {
    pub fn new(keypoints: [Keypoint; BodyPart::COUNT]) -> Self {
        Self { keypoints }
    }

    /// パーツでキーポイントを取得
    pub fn get(&self, part: BodyPart) -> &Keypoint {
        &self.keypoints[part as usize]
    }

    /// 全キーポイントの平均信頼度
    pub fn average_confidence(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.confidence).sum();
        sum / BodyPart::COUNT as f32
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); BodyPart::COUNT],
        }
    }
}
