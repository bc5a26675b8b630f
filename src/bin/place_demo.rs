//! Places a model in front of a simulated camera.
//!
//! A background task stands in for world tracking and publishes a camera slowly turning in
//! place at head height. Set `RUST_LOG=debug` to see every computed anchor.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anchor_place::nalgebra::{UnitQuaternion, Vector3};
use anchor_place::{
    AssetProvider, AssetSourceConfig, BundledAssets, PlacementConfig, PlacementOutcome,
    PlacementSession, Pose, PoseFeed, RecordStoreAssets, SceneGraph, TrackedPoseSource,
};
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const CAMERA_HEIGHT: f32 = 1.5;
/// Radians of yaw per frame.
const TURN_RATE: f32 = 0.01;

#[derive(Parser, Debug)]
#[command(name = "place_demo", about = "Place a model in front of a simulated AR camera")]
struct Args {
    /// TOML placement config; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model to place, overriding the config.
    #[arg(long)]
    model: Option<String>,

    /// How many placements to request.
    #[arg(long, default_value_t = 1)]
    placements: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PlacementConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlacementConfig::default(),
    };
    if let Some(model) = args.model {
        config.model_name = model;
    }

    let (feed, poses) = TrackedPoseSource::channel(config.max_pose_age());
    let tracking = tokio::spawn(run_tracking(feed));

    poses
        .wait_for_pose()
        .await
        .context("tracking stopped before producing a pose")?;

    let scene = Arc::new(SceneGraph::new());
    match &config.assets {
        AssetSourceConfig::Bundled { directory } => {
            info!(?directory, "resolving bundled models");
            let assets = BundledAssets::new(directory);
            place(&config, poses, assets, scene.clone(), args.placements).await;
        }
        AssetSourceConfig::RecordStore { path, record_type } => {
            info!(?path, record_type, "resolving models from record store");
            let assets = RecordStoreAssets::open(path, record_type.as_str())
                .with_context(|| format!("opening record store {}", path.display()))?;
            place(&config, poses, assets, scene.clone(), args.placements).await;
        }
    }

    tracking.abort();

    for entity in scene.entities() {
        info!(
            id = entity.id,
            model = %entity.asset.name,
            location = %entity.asset.location.display(),
            position = ?entity.anchor.position,
            facing = ?entity.anchor.forward(),
            "scene entity"
        );
    }
    Ok(())
}

/// Publishes a camera at head height turning slowly about world up, one pose per frame.
async fn run_tracking(feed: PoseFeed) {
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut yaw = 0.0f32;

    loop {
        frames.tick().await;
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);
        feed.publish(Pose::from_rotation(
            rotation,
            Vector3::new(0.0, CAMERA_HEIGHT, 0.0),
        ));
        yaw += TURN_RATE;
    }
}

async fn place<A: AssetProvider>(
    config: &PlacementConfig,
    poses: TrackedPoseSource,
    assets: A,
    scene: Arc<SceneGraph>,
    placements: u32,
) {
    let session = PlacementSession::from_config(config, poses, assets, scene);

    for request in 0..placements {
        if request > 0 {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        match session.place_default_model().await {
            Ok(PlacementOutcome::Placed(anchor)) => {
                info!(request, position = ?anchor.position, "model placed");
            }
            Ok(PlacementOutcome::Superseded) => info!(request, "placement superseded"),
            Err(e) if e.is_pose_failure() => {
                warn!(request, error = %e, "pose unusable; move the device and try again");
            }
            Err(e) => warn!(request, error = %e, "placement failed"),
        }
    }
}
