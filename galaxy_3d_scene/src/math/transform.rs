/// Transform — translation, linear part and non-uniform scale.
///
/// A point is mapped as `p' = L * (s ⊙ p) + t`: scale first, then the
/// linear part (usually an orthonormal rotation), then the translation.
/// Transforms are plain `Copy` values; composing or inverting always
/// produces a new value.

use std::ops::Mul;
use glam::{Mat3, Mat4, Quat, Vec3};
use crate::error::{Error, Result};

/// Below this absolute determinant the linear part is treated as singular.
const SINGULAR_EPSILON: f32 = 1e-12;

/// Local axis of a transform's linear part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Affine transform with non-uniform scale applied before the linear part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Linear part: rotation for rigid placements, any matrix otherwise
    pub rotation: Mat3,
    /// Translation applied last
    pub translation: Vec3,
    /// Per-axis scale applied first
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        rotation: Mat3::IDENTITY,
        translation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn new(rotation: Mat3, translation: Vec3, scale: Vec3) -> Self {
        Self { rotation, translation, scale }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            rotation: Mat3::from_quat(rotation),
            translation,
            scale: Vec3::ONE,
        }
    }

    pub fn from_scale(scale: Vec3) -> Self {
        Self { scale, ..Self::IDENTITY }
    }

    /// Combined linear map `L * diag(s)`.
    pub fn linear(&self) -> Mat3 {
        self.rotation * Mat3::from_diagonal(self.scale)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    /// Transform a direction (translation ignored).
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    /// `self ∘ other`: the result applies `other` first, then `self`.
    pub fn compose(&self, other: &Transform) -> Transform {
        Transform {
            rotation: self.rotation * Mat3::from_diagonal(self.scale) * other.rotation,
            translation: self.transform_point(other.translation),
            scale: other.scale,
        }
    }

    /// Inverse transform.
    ///
    /// # Errors
    ///
    /// `Error::Arithmetic` if any scale component is zero or the linear part
    /// is singular.
    pub fn inverse(&self) -> Result<Transform> {
        if self.scale.x == 0.0 || self.scale.y == 0.0 || self.scale.z == 0.0 {
            return Err(Error::Arithmetic(format!(
                "cannot invert transform with zero scale {:?}", self.scale
            )));
        }
        let det = self.rotation.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return Err(Error::Arithmetic(format!(
                "cannot invert singular transform (det = {})", det
            )));
        }

        let rotation = Mat3::from_diagonal(self.scale.recip()) * self.rotation.inverse();
        Ok(Transform {
            rotation,
            translation: -(rotation * self.translation),
            scale: Vec3::ONE,
        })
    }

    /// Largest factor by which the transform can stretch a length.
    ///
    /// Upper bound taken as the longest column of the linear map; exact for
    /// rotations combined with any scale.
    pub fn max_scale_factor(&self) -> f32 {
        let m = self.linear();
        m.x_axis.length().max(m.y_axis.length()).max(m.z_axis.length())
    }

    /// Rotate so that local `axis` points along `direction`.
    ///
    /// The next axis (cyclically) is kept as close as possible to its current
    /// direction and the third completes a right-handed basis.
    ///
    /// # Errors
    ///
    /// `Error::Arithmetic` if `direction` is zero or parallel to the next axis.
    pub fn orient_axis(&mut self, axis: Axis, direction: Vec3) -> Result<()> {
        let o = axis.index();
        let d = direction.try_normalize().ok_or_else(|| {
            Error::Arithmetic(format!("cannot orient {:?} along {:?}", axis, direction))
        })?;
        let next = self.rotation.col((o + 1) % 3);
        let a = (next - d * next.dot(d)).try_normalize().ok_or_else(|| {
            Error::Arithmetic(format!(
                "orientation of {:?} along {:?} is parallel to the next axis", axis, direction
            ))
        })?;

        *self.rotation.col_mut(o) = d;
        *self.rotation.col_mut((o + 1) % 3) = a;
        *self.rotation.col_mut((o + 2) % 3) = d.cross(a);
        Ok(())
    }

    pub fn is_finite(&self) -> bool {
        self.rotation.is_finite() && self.translation.is_finite() && self.scale.is_finite()
    }

    /// Column-major 4x4 matrix equivalent, for the render queue.
    pub fn to_mat4(&self) -> Mat4 {
        let m = self.linear();
        Mat4::from_cols(
            m.x_axis.extend(0.0),
            m.y_axis.extend(0.0),
            m.z_axis.extend(0.0),
            self.translation.extend(1.0),
        )
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
