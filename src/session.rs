//! The "place model in front of the camera" flow.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, warn};

use crate::assets::AssetProvider;
use crate::config::PlacementConfig;
use crate::error::PlacementError;
use crate::geometry::{Anchor, ModelScale, StandoffDistance};
use crate::placement::PlacementCalculator;
use crate::scene::SceneMutator;
use crate::tracking::PoseSource;
use crate::DEFAULT_MODEL_NAME;

/// Result of a placement request that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    /// The model was attached at this anchor.
    Placed(Anchor),
    /// A newer request was issued while this one was resolving its asset; nothing attached.
    Superseded,
}

/// Wires a pose source, an asset provider and a scene together.
///
/// Requests may overlap (the asset fetch is asynchronous). The most recently issued request
/// wins: an older request whose asset arrives late is dropped instead of attached.
pub struct PlacementSession<P, A, S> {
    calculator: PlacementCalculator<P>,
    assets: A,
    scene: S,
    model_name: String,
    model_scale: ModelScale,
    /// Ticket of the latest issued request.
    generation: AtomicU64,
}

impl<P, A, S> std::fmt::Debug for PlacementSession<P, A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementSession")
            .field("standoff", &self.calculator.standoff())
            .field("model_name", &self.model_name)
            .field("model_scale", &self.model_scale)
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

impl<P: PoseSource, A: AssetProvider, S: SceneMutator> PlacementSession<P, A, S> {
    pub fn new(pose_source: P, standoff: StandoffDistance, assets: A, scene: S) -> Self {
        Self {
            calculator: PlacementCalculator::new(pose_source, standoff),
            assets,
            scene,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            model_scale: ModelScale::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &PlacementConfig, pose_source: P, assets: A, scene: S) -> Self {
        Self::new(pose_source, config.standoff, assets, scene)
            .with_model(config.model_name.clone(), config.model_scale)
    }

    /// Sets the model placed by [`PlacementSession::place_default_model`] and its scale.
    pub fn with_model(mut self, model_name: impl Into<String>, scale: ModelScale) -> Self {
        self.model_name = model_name.into();
        self.model_scale = scale;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn calculator(&self) -> &PlacementCalculator<P> {
        &self.calculator
    }

    pub async fn place_default_model(&self) -> Result<PlacementOutcome, PlacementError> {
        self.place_model(&self.model_name).await
    }

    /// Places `model_name` in front of the camera.
    ///
    /// The anchor is computed from the pose at request time; pose failures return before any
    /// asset is requested. A failed asset resolution is reported once and never retried.
    #[tracing::instrument(skip(self))]
    pub async fn place_model(&self, model_name: &str) -> Result<PlacementOutcome, PlacementError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let anchor = self.calculator.place()?;
        let asset = self.assets.resolve(model_name).await;

        let latest = self.generation.load(Ordering::SeqCst);
        if latest != ticket {
            warn!(ticket, latest, "placement superseded; dropping late asset");
            return Ok(PlacementOutcome::Superseded);
        }

        let Some(asset) = asset else {
            warn!("model unavailable");
            return Err(PlacementError::AssetResolutionFailed {
                model_name: model_name.to_string(),
            });
        };

        info!(ticket, location = ?asset.location, "placing model");
        self.scene.attach(anchor, asset, self.model_scale.get());
        Ok(PlacementOutcome::Placed(anchor))
    }
}
