//! Geometry primitives exchanged between the pose source, the placement calculator and the
//! scene.
//!
//! All types are plain values: a [`Pose`] is a read-only snapshot, an [`Anchor`] is created
//! once per placement request and handed straight to the scene.

use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::{DEFAULT_STANDOFF, PLACEMENT_EPSILON};

/// A rigid camera-to-world transform.
///
/// Camera-space convention: the viewing direction is the negated local Z axis, so the
/// third rotation column points *behind* the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: Matrix3<f32>,
    pub translation: Vector3<f32>,
}

impl Pose {
    pub fn new(rotation: Matrix3<f32>, translation: Vector3<f32>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Builds a pose from a rotation quaternion and a world position.
    pub fn from_rotation(rotation: UnitQuaternion<f32>, translation: Vector3<f32>) -> Self {
        Self::new(rotation.to_rotation_matrix().into_inner(), translation)
    }

    /// Builds a pose from a homogeneous 4x4 transform as tracking frameworks report it:
    /// columns 0..2 hold the rotation, column 3 the translation. The bottom row is ignored.
    pub fn from_homogeneous(transform: &Matrix4<f32>) -> Self {
        Self::new(
            transform.fixed_view::<3, 3>(0, 0).into_owned(),
            transform.fixed_view::<3, 1>(0, 3).into_owned(),
        )
    }

    /// World-space position.
    pub fn position(&self) -> Vector3<f32> {
        self.translation
    }

    /// The un-normalised viewing axis (negated third rotation column).
    pub fn view_axis(&self) -> Vector3<f32> {
        -self.rotation.column(2).into_owned()
    }

    /// Normalised viewing direction, or `None` if the third column is (nearly) zero.
    pub fn forward(&self) -> Option<Vector3<f32>> {
        self.view_axis().try_normalize(PLACEMENT_EPSILON)
    }

    /// The camera's local up axis in world space.
    pub fn up(&self) -> Vector3<f32> {
        self.rotation.column(1).into_owned()
    }

    /// True when every rotation and translation component is finite.
    pub fn is_finite(&self) -> bool {
        self.rotation.iter().chain(self.translation.iter()).all(|c| c.is_finite())
    }

    /// Checks unit column norms and pairwise orthogonality within `eps`.
    pub fn is_orthonormal(&self, eps: f32) -> bool {
        let columns: [Vector3<f32>; 3] = [
            self.rotation.column(0).into_owned(),
            self.rotation.column(1).into_owned(),
            self.rotation.column(2).into_owned(),
        ];

        let unit = columns.iter().all(|c| (c.norm() - 1.0).abs() <= eps);
        let orthogonal = [(0, 1), (0, 2), (1, 2)]
            .iter()
            .all(|&(i, j)| columns[i].dot(&columns[j]).abs() <= eps);

        unit && orthogonal
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// A world-space attachment point for a model, facing back toward the pose it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Anchor {
    /// The object's local forward axis (+Z) in world space.
    pub fn forward(&self) -> Vector3<f32> {
        self.orientation * Vector3::z()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.orientation * Vector3::y()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation * Vector3::x()
    }
}

/// How far in front of the pose an anchor is placed, in world units.
///
/// Always finite and non-negative. Serialises as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct StandoffDistance(f32);

impl StandoffDistance {
    pub fn new(distance: f32) -> Result<Self, PlacementError> {
        if distance.is_finite() && distance >= 0.0 {
            Ok(Self(distance))
        } else {
            Err(PlacementError::InvalidStandoff(distance))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for StandoffDistance {
    fn default() -> Self {
        Self(DEFAULT_STANDOFF)
    }
}

impl TryFrom<f32> for StandoffDistance {
    type Error = PlacementError;

    fn try_from(distance: f32) -> Result<Self, Self::Error> {
        Self::new(distance)
    }
}

impl From<StandoffDistance> for f32 {
    fn from(distance: StandoffDistance) -> Self {
        distance.0
    }
}

/// Uniform scale applied to an attached model. Always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct ModelScale(f32);

impl ModelScale {
    pub fn new(scale: f32) -> Result<Self, PlacementError> {
        if scale.is_finite() && scale > 0.0 {
            Ok(Self(scale))
        } else {
            Err(PlacementError::InvalidModelScale(scale))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for ModelScale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f32> for ModelScale {
    type Error = PlacementError;

    fn try_from(scale: f32) -> Result<Self, Self::Error> {
        Self::new(scale)
    }
}

impl From<ModelScale> for f32 {
    fn from(scale: ModelScale) -> Self {
        scale.0
    }
}
