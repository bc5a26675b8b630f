//! Scene attachment.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::info;

use crate::assets::AssetHandle;
use crate::geometry::Anchor;

/// Inserts a loaded model into the render graph at an anchor.
///
/// Fire-and-forget: the placement flow observes nothing about the outcome.
pub trait SceneMutator: Send + Sync {
    fn attach(&self, anchor: Anchor, asset: AssetHandle, scale: f32);
}

impl<T: SceneMutator + ?Sized> SceneMutator for &T {
    fn attach(&self, anchor: Anchor, asset: AssetHandle, scale: f32) {
        (**self).attach(anchor, asset, scale)
    }
}

impl<T: SceneMutator + ?Sized> SceneMutator for Arc<T> {
    fn attach(&self, anchor: Anchor, asset: AssetHandle, scale: f32) {
        (**self).attach(anchor, asset, scale)
    }
}

/// A model attached to the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachedEntity {
    pub id: u64,
    pub anchor: Anchor,
    pub asset: AssetHandle,
    /// Uniform scale applied to the model.
    pub scale: f32,
}

/// Headless scene that records every attachment in insertion order.
#[derive(Debug, Default)]
pub struct SceneGraph {
    entities: Mutex<Vec<AttachedEntity>>,
    next_id: AtomicU64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the attached entities.
    pub fn entities(&self) -> Vec<AttachedEntity> {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SceneMutator for SceneGraph {
    fn attach(&self, anchor: Anchor, asset: AssetHandle, scale: f32) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        info!(
            id,
            model = %asset.name,
            position = ?anchor.position,
            "attached model to scene"
        );

        self.entities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(AttachedEntity {
                id,
                anchor,
                asset,
                scale,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetOrigin;
    use nalgebra::{UnitQuaternion, Vector3};
    use std::path::PathBuf;

    fn asset(name: &str) -> AssetHandle {
        AssetHandle {
            name: name.to_string(),
            location: PathBuf::from(format!("{name}.usdz")),
            origin: AssetOrigin::Bundled,
        }
    }

    #[test]
    fn attachments_are_recorded_in_order_with_fresh_ids() {
        let scene = SceneGraph::new();
        assert!(scene.is_empty());

        let anchor = Anchor {
            position: Vector3::new(0.0, 0.0, -0.5),
            orientation: UnitQuaternion::identity(),
        };
        scene.attach(anchor, asset("a"), 1.0);
        scene.attach(anchor, asset("b"), 2.0);

        let entities = scene.entities();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].asset.name, "a");
        assert_eq!(entities[1].asset.name, "b");
        assert_eq!(entities[1].scale, 2.0);
        assert_ne!(entities[0].id, entities[1].id);
    }
}
