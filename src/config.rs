//! Placement configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! standoff = 0.5
//! model_name = "FeedBack Now"
//! model_scale = 1.0
//! max_pose_age_ms = 250
//!
//! [assets]
//! kind = "record_store"
//! path = "model_records"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::{ModelScale, StandoffDistance};
use crate::{DEFAULT_MODEL_NAME, USDZ_RECORD_TYPE};

/// Where models are resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetSourceConfig {
    /// Models shipped in a local directory.
    Bundled {
        #[serde(default = "default_bundle_directory")]
        directory: PathBuf,
    },
    /// Models looked up by name in a sled record store.
    RecordStore {
        path: PathBuf,
        #[serde(default = "default_record_type")]
        record_type: String,
    },
}

fn default_bundle_directory() -> PathBuf {
    PathBuf::from("assets")
}

fn default_record_type() -> String {
    USDZ_RECORD_TYPE.to_string()
}

impl Default for AssetSourceConfig {
    fn default() -> Self {
        Self::Bundled {
            directory: default_bundle_directory(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub standoff: StandoffDistance,
    pub model_name: String,
    pub model_scale: ModelScale,
    /// Poses older than this are treated as absent. Unset accepts any age.
    pub max_pose_age_ms: Option<u64>,
    pub assets: AssetSourceConfig,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            standoff: StandoffDistance::default(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_scale: ModelScale::default(),
            max_pose_age_ms: None,
            assets: AssetSourceConfig::default(),
        }
    }
}

impl PlacementConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn max_pose_age(&self) -> Option<Duration> {
        self.max_pose_age_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = PlacementConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, PlacementConfig::default());
        assert_eq!(config.standoff.get(), 0.5);
        assert_eq!(config.model_name, "FeedBack Now");
        assert_eq!(config.max_pose_age(), None);
    }

    #[test]
    fn record_store_source_parses() {
        let config = PlacementConfig::from_toml_str(
            r#"
            standoff = 1.25
            model_name = "chair"
            max_pose_age_ms = 250

            [assets]
            kind = "record_store"
            path = "model_records"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.standoff.get(), 1.25);
        assert_eq!(config.model_name, "chair");
        assert_eq!(config.max_pose_age(), Some(Duration::from_millis(250)));
        assert_eq!(
            config.assets,
            AssetSourceConfig::RecordStore {
                path: PathBuf::from("model_records"),
                record_type: "USDZModels".to_string(),
            }
        );
    }

    #[test]
    fn negative_standoff_is_rejected() {
        let err = PlacementConfig::from_toml_str("standoff = -0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_model_scale_is_rejected() {
        for raw in [
            "model_scale = -1.0",
            "model_scale = 0.0",
            "model_scale = nan",
            "model_scale = inf",
        ] {
            let err = PlacementConfig::from_toml_str(raw).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{raw} should not parse");
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.toml");

        match PlacementConfig::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("placement.toml");
        std::fs::write(&path, "model_scale = 0.1\n[assets]\nkind = \"bundled\"\n")
            .expect("write config");

        let config = PlacementConfig::load(&path).expect("config loads");
        assert_eq!(config.model_scale.get(), 0.1);
        assert_eq!(config.assets, AssetSourceConfig::default());
    }
}
