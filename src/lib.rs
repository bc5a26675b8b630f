//! Camera-relative model placement.
//!
//! This crate defines:
//! - [`compute_anchor`]: the pure computation that turns a camera [`Pose`] and a
//!   [`StandoffDistance`] into a world-space [`Anchor`] facing back at the camera.
//! - [`PoseSource`], [`AssetProvider`] and [`SceneMutator`]: the narrow seams to the tracking
//!   loop, the model store and the renderer.
//! - [`PlacementSession`]: the "place model in front of the camera" flow wiring the three
//!   together, where the latest request always wins.

pub mod assets;
pub mod config;
pub mod error;
pub mod geometry;
pub mod placement;
pub mod scene;
pub mod session;
pub mod tracking;

// Re-export so callers can build poses without declaring a direct dependency on `nalgebra`.
pub use nalgebra;

pub use assets::{
    AssetHandle, AssetOrigin, AssetProvider, AssetRecord, BundledAssets, RecordStoreAssets,
};
pub use config::{AssetSourceConfig, PlacementConfig};
pub use error::{AssetStoreError, ConfigError, PlacementError};
pub use geometry::{Anchor, ModelScale, Pose, StandoffDistance};
pub use placement::{compute_anchor, PlacementCalculator};
pub use scene::{AttachedEntity, SceneGraph, SceneMutator};
pub use session::{PlacementOutcome, PlacementSession};
pub use tracking::{FixedPoseSource, PoseFeed, PoseSource, TrackedPoseSource};

/// Default distance in front of the camera, in world units (metres for AR tracking).
pub const DEFAULT_STANDOFF: f32 = 0.5;

/// Tolerance used for degenerate-vector and orthonormality checks.
pub const PLACEMENT_EPSILON: f32 = 1e-4;

/// The model placed when no name is configured.
pub const DEFAULT_MODEL_NAME: &str = "FeedBack Now";

/// Record type (sled tree name) holding model records in the asset record store.
pub const USDZ_RECORD_TYPE: &str = "USDZModels";
