/// Axis-Aligned Bounding Box.
///
/// Used as element bounds, partition regions and octree node extents.

use glam::{Mat3, Vec3};
use crate::error::{Error, Result};
use crate::math::Transform;
use super::sphere::Sphere;

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Create a box, rejecting `min > max` on any axis and non-finite corners.
    pub fn new(min: Vec3, max: Vec3) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "AABB corners must be finite (min {:?}, max {:?})", min, max
            )));
        }
        if min.cmpgt(max).any() {
            return Err(Error::InvalidArgument(format!(
                "AABB min {:?} exceeds max {:?}", min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = half_extents.abs();
        Self { min: center - half_extents, max: center + half_extents }
    }

    /// Tight box around a point set.
    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        let (first, rest) = points.split_first().ok_or_else(|| {
            Error::InvalidArgument("cannot bound an empty point set".to_string())
        })?;
        let mut aabb = AABB { min: *first, max: *first };
        for p in rest {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        if !aabb.min.is_finite() || !aabb.max.is_finite() {
            return Err(Error::Arithmetic("point set contains non-finite values".to_string()));
        }
        Ok(aabb)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Test if this AABB fully contains another AABB.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Point of the box closest to `point` (the point itself when inside).
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Sphere/box overlap via closest-point projection.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        let closest = self.closest_point(sphere.center);
        closest.distance_squared(sphere.center) <= sphere.radius * sphere.radius
    }

    /// Corner furthest along `direction`, or against it when `reverse`.
    pub fn extent(&self, direction: Vec3, reverse: bool) -> Vec3 {
        let toward_max = if reverse { direction.cmplt(Vec3::ZERO) } else { direction.cmpge(Vec3::ZERO) };
        Vec3::select(toward_max, self.max, self.min)
    }

    /// Grow to contain `other`.
    pub fn merge(&mut self, other: &AABB) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Grow to contain a sphere: its extremal points along each axis are `center ± r`.
    pub fn merge_sphere(&mut self, sphere: &Sphere) {
        self.min = self.min.min(sphere.center - Vec3::splat(sphere.radius));
        self.max = self.max.max(sphere.center + Vec3::splat(sphere.radius));
    }

    /// Smallest sphere centered on the box that contains it.
    pub fn circumscribed_sphere(&self) -> Sphere {
        Sphere { center: self.center(), radius: self.half_extents().length() }
    }

    /// Box in the parent space of `transform`.
    ///
    /// Half-extents go through the absolute value of the linear map so the
    /// result stays axis-aligned and tight.
    pub fn transformed(&self, transform: &Transform) -> Result<AABB> {
        let linear = transform.linear();
        let abs = Mat3::from_cols(linear.x_axis.abs(), linear.y_axis.abs(), linear.z_axis.abs());
        let center = transform.transform_point(self.center());
        let half_extents = abs * self.half_extents();

        if !center.is_finite() || !half_extents.is_finite() {
            return Err(Error::Arithmetic(format!(
                "transformed AABB is not finite (center {:?}, half extents {:?})",
                center, half_extents
            )));
        }
        Ok(AABB { min: center - half_extents, max: center + half_extents })
    }
}
