//! Anchor placement in front of a tracked camera.

use nalgebra::{UnitQuaternion, Vector3};
use tracing::debug;

use crate::error::PlacementError;
use crate::geometry::{Anchor, Pose, StandoffDistance};
use crate::tracking::PoseSource;
use crate::PLACEMENT_EPSILON;

/// Below this `|look x up|` the look direction counts as vertical and world up can no longer
/// define the roll.
const VERTICAL_LOOK_THRESHOLD: f32 = 1e-3;

/// Computes an anchor `standoff` units along the pose's viewing direction, oriented so its
/// local +Z axis points back at the pose position with world up (0, 1, 0) as the up reference.
///
/// When the camera looks straight up or down the camera's own up axis is used instead, which
/// keeps the orientation defined without introducing roll relative to the camera.
///
/// Anchor and pose positions closer than [`PLACEMENT_EPSILON`] count as coincident, so any
/// standoff below that tolerance fails with [`PlacementError::DegenerateLookDirection`].
pub fn compute_anchor(pose: &Pose, standoff: StandoffDistance) -> Result<Anchor, PlacementError> {
    if !pose.is_finite() {
        return Err(PlacementError::NonFinitePose);
    }

    let view_axis = pose.view_axis();
    let forward = view_axis
        .try_normalize(PLACEMENT_EPSILON)
        .ok_or(PlacementError::DegenerateForwardVector {
            magnitude: view_axis.norm(),
        })?;

    if !pose.is_orthonormal(PLACEMENT_EPSILON) {
        return Err(PlacementError::NonOrthonormalPose);
    }

    let origin = pose.position();
    let position = origin + forward * standoff.get();
    if !position.iter().all(|c| c.is_finite()) {
        return Err(PlacementError::NonFinitePose);
    }

    let look = (origin - position)
        .try_normalize(PLACEMENT_EPSILON)
        .ok_or(PlacementError::DegenerateLookDirection)?;

    let world_up = Vector3::y();
    let up = if look.cross(&world_up).norm() > VERTICAL_LOOK_THRESHOLD {
        world_up
    } else {
        pose.up()
    };

    Ok(Anchor {
        position,
        orientation: UnitQuaternion::face_towards(&look, &up),
    })
}

/// Places anchors relative to whatever pose the injected source currently reports.
///
/// Holds no session state of its own; every call reads a fresh pose snapshot.
#[derive(Debug, Clone)]
pub struct PlacementCalculator<P> {
    pose_source: P,
    standoff: StandoffDistance,
}

impl<P> PlacementCalculator<P> {
    pub fn new(pose_source: P, standoff: StandoffDistance) -> Self {
        Self {
            pose_source,
            standoff,
        }
    }

    pub fn standoff(&self) -> StandoffDistance {
        self.standoff
    }

    pub fn pose_source(&self) -> &P {
        &self.pose_source
    }
}

impl<P: PoseSource> PlacementCalculator<P> {
    /// Queries the pose source and computes an anchor in front of it.
    ///
    /// Never waits for tracking: an absent pose fails immediately with
    /// [`PlacementError::NoPoseAvailable`].
    pub fn place(&self) -> Result<Anchor, PlacementError> {
        let pose = self
            .pose_source
            .current_pose()
            .ok_or(PlacementError::NoPoseAvailable)?;

        let anchor = compute_anchor(&pose, self.standoff)?;
        debug!(
            position = ?anchor.position,
            standoff = self.standoff.get(),
            "computed anchor in front of camera"
        );
        Ok(anchor)
    }
}
