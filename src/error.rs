//! Error types.
//!
//! Nothing here is fatal: every failure means "no anchor placed this time" and is returned as
//! a value for the caller (usually a UI layer) to report.

use std::path::PathBuf;

/// Why a placement request produced no anchor.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// Tracking has not produced a usable pose yet (or the latest one is stale).
    #[error("no camera pose available yet")]
    NoPoseAvailable,

    /// The pose's viewing axis is (close to) zero length.
    #[error("pose forward vector is degenerate (magnitude {magnitude})")]
    DegenerateForwardVector { magnitude: f32 },

    /// The pose, or the anchor derived from it, contains NaN or infinite components.
    #[error("pose contains non-finite values")]
    NonFinitePose,

    /// The pose's rotation carries scale or skew.
    #[error("pose rotation is not orthonormal")]
    NonOrthonormalPose,

    /// The anchor coincides with the pose position, so there is nothing to look at.
    #[error("anchor coincides with the pose position; use a standoff greater than zero")]
    DegenerateLookDirection,

    #[error("standoff distance must be finite and non-negative, got {0}")]
    InvalidStandoff(f32),

    #[error("model scale must be finite and positive, got {0}")]
    InvalidModelScale(f32),

    /// The asset provider reported failure. The cause is deliberately opaque.
    #[error("model '{model_name}' is unavailable")]
    AssetResolutionFailed { model_name: String },
}

impl PlacementError {
    /// True when the pose itself was unusable and the caller should re-query the pose source
    /// instead of retrying with the same input.
    pub fn is_pose_failure(&self) -> bool {
        matches!(
            self,
            Self::NoPoseAvailable
                | Self::NonFinitePose
                | Self::DegenerateForwardVector { .. }
                | Self::NonOrthonormalPose
        )
    }
}

/// Failures writing to the asset record store.
#[derive(thiserror::Error, Debug)]
pub enum AssetStoreError {
    #[error(transparent)]
    Store(#[from] sled::Error),

    #[error("failed to encode asset record: {0}")]
    Record(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
