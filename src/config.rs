use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::pose::keypoint::BodyPart;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrackingConfig {
    /// パーツ採用の信頼度下限
    #[serde(default = "default_confidence_cutoff")]
    pub confidence_cutoff: f32,
    /// 受け入れる深度ヒットの最小距離（メートル）
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    /// 身体スケールの軸ごとの上限（メートル）
    #[serde(default = "default_max_body_size")]
    pub max_body_size: [f32; 3],
    /// 検出フレームレート (Hz)
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// バウンディング計算から完全に除外するパーツ
    #[serde(default = "default_bounds_skip")]
    pub bounds_skip: Vec<BodyPart>,
    /// 奥行き（Z軸）だけ除外するパーツ
    #[serde(default = "default_depth_skip")]
    pub depth_skip: Vec<BodyPart>,
    /// スクリーンサイズ（ピクセル）
    #[serde(default = "default_screen")]
    pub screen: [u32; 2],
    /// キャプチャ解像度。未設定ならスクリーンサイズの縦横入れ替えで代用
    #[serde(default)]
    pub capture: Option<[u32; 2]>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    /// 最小カットオフ周波数 (Hz)
    #[serde(default = "default_min_cutoff")]
    pub min_cutoff: f32,
    /// 速度係数。大きいほど速い動きに追従する
    #[serde(default = "default_beta")]
    pub beta: f32,
    /// 微分推定のカットオフ (Hz)
    #[serde(default = "default_d_cutoff")]
    pub d_cutoff: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// パーツマーカーを描画するか
    #[serde(default)]
    pub markers: bool,
    /// バウンディングボックスを描画するか
    #[serde(default)]
    pub bounding_box: bool,
    /// マーカー半径（ピクセル）
    #[serde(default = "default_marker_radius")]
    pub marker_radius: u32,
    /// オーバーレイキャンバスのサイズ
    #[serde(default = "default_canvas")]
    pub canvas: [u32; 2],
    /// 投影スケール（ピクセル/メートル）
    #[serde(default = "default_pixels_per_meter")]
    pub pixels_per_meter: f32,
    /// 実行終了時に書き出すオーバーレイPNGのパス
    #[serde(default = "default_overlay_path")]
    pub overlay_path: String,
}

fn default_confidence_cutoff() -> f32 { 0.2 }
fn default_min_distance() -> f32 { 0.3 }
fn default_max_body_size() -> [f32; 3] { [0.5, 3.0, 0.5] }
fn default_frequency() -> f32 { 30.0 }
fn default_bounds_skip() -> Vec<BodyPart> {
    vec![
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
    ]
}
fn default_depth_skip() -> Vec<BodyPart> {
    BodyPart::all().into_iter().filter(|p| p.is_face()).collect()
}
fn default_screen() -> [u32; 2] { [1170, 2532] }
fn default_min_cutoff() -> f32 { 1.0 }
fn default_beta() -> f32 { 0.0 }
fn default_d_cutoff() -> f32 { 1.0 }
fn default_marker_radius() -> u32 { 4 }
fn default_canvas() -> [u32; 2] { [640, 480] }
fn default_pixels_per_meter() -> f32 { 100.0 }
fn default_overlay_path() -> String { "overlay.png".to_string() }

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            confidence_cutoff: default_confidence_cutoff(),
            min_distance: default_min_distance(),
            max_body_size: default_max_body_size(),
            frequency: default_frequency(),
            bounds_skip: default_bounds_skip(),
            depth_skip: default_depth_skip(),
            screen: default_screen(),
            capture: None,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_cutoff: default_min_cutoff(),
            beta: default_beta(),
            d_cutoff: default_d_cutoff(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            markers: false,
            bounding_box: false,
            marker_radius: default_marker_radius(),
            canvas: default_canvas(),
            pixels_per_meter: default_pixels_per_meter(),
            overlay_path: default_overlay_path(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// 設定ファイルが読めなければデフォルト設定で起動する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("config {} not found, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{:#}, using defaults", err);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.tracking.confidence_cutoff, 0.2);
        assert_eq!(config.tracking.min_distance, 0.3);
        assert_eq!(config.tracking.max_body_size, [0.5, 3.0, 0.5]);
        assert_eq!(config.tracking.frequency, 30.0);
        assert_eq!(config.tracking.capture, None);
        assert_eq!(config.filter.min_cutoff, 1.0);
        assert_eq!(config.filter.beta, 0.0);
        assert_eq!(config.filter.d_cutoff, 1.0);
        assert!(!config.debug.markers);
        assert!(!config.debug.bounding_box);
    }

    #[test]
    fn test_default_exclusion_sets() {
        let config = Config::default();
        let bounds_skip = &config.tracking.bounds_skip;
        assert_eq!(bounds_skip.len(), 4);
        assert!(bounds_skip.contains(&BodyPart::LeftElbow));
        assert!(bounds_skip.contains(&BodyPart::RightWrist));

        let depth_skip = &config.tracking.depth_skip;
        assert_eq!(depth_skip.len(), 5);
        assert!(depth_skip.contains(&BodyPart::Nose));
        assert!(depth_skip.contains(&BodyPart::RightEar));
        assert!(!depth_skip.contains(&BodyPart::LeftHip));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tracking.confidence_cutoff, 0.2);
        assert_eq!(config.filter.min_cutoff, 1.0);
        assert_eq!(config.debug.marker_radius, 4);
    }

    #[test]
    fn test_parse_overrides() {
        let toml_str = r#"
[tracking]
confidence_cutoff = 0.5
screen = [800, 600]
capture = [1440, 1920]
bounds_skip = ["LeftWrist"]

[filter]
beta = 0.7

[debug]
markers = true
overlay_path = "debug/run.png"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tracking.confidence_cutoff, 0.5);
        assert_eq!(config.tracking.screen, [800, 600]);
        assert_eq!(config.tracking.capture, Some([1440, 1920]));
        assert_eq!(config.tracking.bounds_skip, vec![BodyPart::LeftWrist]);
        // Unspecified fields keep their defaults.
        assert_eq!(config.tracking.min_distance, 0.3);
        assert_eq!(config.filter.beta, 0.7);
        assert_eq!(config.filter.min_cutoff, 1.0);
        assert!(config.debug.markers);
        assert!(!config.debug.bounding_box);
        assert_eq!(config.debug.overlay_path, "debug/run.png");
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = Config::load_or_default("does_not_exist.toml");
        assert_eq!(config.tracking.confidence_cutoff, 0.2);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load("does_not_exist.toml").is_err());
    }
}
