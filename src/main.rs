use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, warn};

use arbody_tracker::config::Config;
use arbody_tracker::error::TrackError;
use arbody_tracker::pose::{
    decode_poses, encode_poses, BodyPart, ChannelPoseSource, Keypoint, Pose, PoseBackend,
    PoseFrame, PoseSource, TrackedPose,
};
use arbody_tracker::render::OverlayObserver;
use arbody_tracker::tracker::{DepthHit, DepthQuery, LogObserver, TrackerRegistry};

const CONFIG_PATH: &str = "config.toml";
const DEMO_FRAMES: usize = 90;

/// 固定奥行きの壁に向かって投影する合成深度クエリ。
/// スクリーン全幅を1.6m、全高を2.0mとして扱う。
struct PlanarDepth {
    screen: [f32; 2],
    depth: f32,
}

impl DepthQuery for PlanarDepth {
    fn raycast(&mut self, screen_point: [f32; 2]) -> Vec<DepthHit> {
        let x = (screen_point[0] / self.screen[0] - 0.5) * 1.6;
        let y = (1.0 - screen_point[1] / self.screen[1]) * 2.0;
        vec![DepthHit {
            position: [x, y, self.depth],
            distance: self.depth,
        }]
    }
}

/// 直立した人物の合成ポーズ。ゆっくり左右に揺れ、たまにパーツが
/// 低信頼度に落ちる。
fn synthetic_pose(frame: u64, center_x: f32) -> Pose {
    let t = frame as f32 / 30.0;
    let sway = 0.05 * (t * 2.0 + center_x * 6.0).sin();

    let layout: [(BodyPart, f32, f32); 17] = [
        (BodyPart::Nose, 0.0, 0.20),
        (BodyPart::LeftEye, 0.02, 0.19),
        (BodyPart::RightEye, -0.02, 0.19),
        (BodyPart::LeftEar, 0.04, 0.20),
        (BodyPart::RightEar, -0.04, 0.20),
        (BodyPart::LeftShoulder, 0.08, 0.32),
        (BodyPart::RightShoulder, -0.08, 0.32),
        (BodyPart::LeftElbow, 0.12, 0.42),
        (BodyPart::RightElbow, -0.12, 0.42),
        (BodyPart::LeftWrist, 0.13, 0.52),
        (BodyPart::RightWrist, -0.13, 0.52),
        (BodyPart::LeftHip, 0.06, 0.55),
        (BodyPart::RightHip, -0.06, 0.55),
        (BodyPart::LeftKnee, 0.06, 0.70),
        (BodyPart::RightKnee, -0.06, 0.70),
        (BodyPart::LeftAnkle, 0.06, 0.85),
        (BodyPart::RightAnkle, -0.06, 0.85),
    ];

    let mut pose = Pose::default();
    for (i, (part, dx, y)) in layout.into_iter().enumerate() {
        let confidence = if (frame as usize + i) % 13 == 0 { 0.1 } else { 0.9 };
        pose.keypoints[part as usize] = Keypoint::new(center_x + dx + sway, y, confidence);
    }
    pose
}

/// 1フレーム分の合成検出結果。検出境界と同じくワイヤ形式を経由させる。
fn synthetic_frame(frame: u64) -> Result<Vec<TrackedPose>, TrackError> {
    let encoded = encode_poses(&[synthetic_pose(frame, 0.35), synthetic_pose(frame, 0.65)])?;
    let poses = decode_poses(&encoded)?;
    Ok(poses
        .into_iter()
        .enumerate()
        .map(|(index, pose)| TrackedPose {
            identity: index as i32 + 1,
            pose,
        })
        .collect())
}

/// 合成検出バックエンド。ネイティブ検出器の代役としてリクエストごとに
/// 2体分のポーズを返す。リクエストには必ず応答する。
fn run_synthetic_backend(backend: PoseBackend, frequency: f32) {
    let mut frame = 0u64;
    while backend.requests.recv().is_ok() {
        let timestamp = frame as f64 / frequency as f64;
        let poses = match synthetic_frame(frame) {
            Ok(poses) => poses,
            Err(err) => {
                warn!("synthetic frame failed: {}", err);
                Vec::new()
            }
        };

        if backend
            .results
            .send(PoseFrame { timestamp, poses })
            .is_err()
        {
            break;
        }
        frame += 1;
    }
}

fn print_bodies(registry: &TrackerRegistry) {
    for identity in registry.identities() {
        if let Some(tracker) = registry.get(identity) {
            match tracker.frame() {
                Some(frame) => println!(
                    "  body {}: 中心 ({:+.2}, {:+.2}, {:+.2}) スケール ({:.2}, {:.2}, {:.2})",
                    identity,
                    frame.position[0],
                    frame.position[1],
                    frame.position[2],
                    frame.scale[0],
                    frame.scale[1],
                    frame.scale[2]
                ),
                None => println!("  body {}: バウンディングなし", identity),
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);

    println!("=== AR Body Tracker ({}) ===", env!("GIT_VERSION"));
    println!("設定: {}", config_path);
    println!(
        "スクリーン: {}x{}",
        config.tracking.screen[0], config.tracking.screen[1]
    );
    println!("信頼度カットオフ: {}", config.tracking.confidence_cutoff);
    println!();

    // 設定が壊れていてもデモが止まらないよう公称レートに戻す
    let frequency = if config.tracking.frequency > 0.0 {
        config.tracking.frequency
    } else {
        30.0
    };
    let overlay_enabled = config.debug.markers || config.debug.bounding_box;

    // --- ポーズソースと合成検出スレッド ---
    let (mut source, backend) = ChannelPoseSource::channel();
    let backend_handle = thread::spawn(move || run_synthetic_backend(backend, frequency));

    let mut registry = TrackerRegistry::new(config.clone());
    registry.add_observer(Box::new(LogObserver));

    let overlay = if overlay_enabled {
        let observer = OverlayObserver::new(&config.debug);
        let canvas = observer.canvas();
        registry.add_observer(Box::new(observer));
        Some(canvas)
    } else {
        None
    };

    let mut depth = PlanarDepth {
        screen: [
            config.tracking.screen[0] as f32,
            config.tracking.screen[1] as f32,
        ],
        depth: 2.0,
    };

    // --- フレームループ ---
    let period = Duration::from_secs_f32(1.0 / frequency);
    for received in 1..=DEMO_FRAMES {
        source.request()?;
        let frame = loop {
            match source.try_next() {
                Some(frame) => break frame,
                None => thread::sleep(Duration::from_millis(1)),
            }
        };

        for tracked in &frame.poses {
            debug!(
                "identity {} avg confidence {:.2}",
                tracked.identity,
                tracked.pose.average_confidence()
            );
            registry.create_or_update(
                tracked.identity,
                &tracked.pose,
                Some(frame.timestamp),
                &mut depth,
            )?;
        }

        if received % 30 == 0 {
            println!("frame {} (t={:.2}s)", received, frame.timestamp);
            print_bodies(&registry);
        }

        // 上流のトラッキング喪失を模してbody 2を一度外す
        if received == 60 {
            registry.remove(2);
        }

        thread::sleep(period);
    }

    println!();
    println!("追跡終了: {}体", registry.len());
    print_bodies(&registry);

    drop(source);
    if backend_handle.join().is_err() {
        warn!("synthetic backend thread panicked");
    }

    if let Some(canvas) = overlay {
        let image = canvas.borrow().to_image();
        image
            .save(&config.debug.overlay_path)
            .with_context(|| format!("failed to write {}", config.debug.overlay_path))?;
        println!("オーバーレイ画像: {}", config.debug.overlay_path);
    }

    Ok(())
}
