/// BoundingVolume — the bounds variants understood by the scene.
///
/// "No bounds" (unbounded, always visible) is not a variant: it is expressed
/// as `Option<BoundingVolume>::None` by the owners of a volume.

use glam::Vec3;
use crate::camera::{Frustum, FrustumTest, PlaneHint, PlaneMask};
use crate::error::Result;
use crate::math::Transform;
use super::aabb::AABB;
use super::sphere::Sphere;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundingVolume {
    Sphere(Sphere),
    Aabb(AABB),
}

impl From<Sphere> for BoundingVolume {
    fn from(sphere: Sphere) -> Self {
        BoundingVolume::Sphere(sphere)
    }
}

impl From<AABB> for BoundingVolume {
    fn from(aabb: AABB) -> Self {
        BoundingVolume::Aabb(aabb)
    }
}

impl BoundingVolume {
    pub fn sphere(center: Vec3, radius: f32) -> Result<Self> {
        Ok(BoundingVolume::Sphere(Sphere::new(center, radius)?))
    }

    pub fn aabb(min: Vec3, max: Vec3) -> Result<Self> {
        Ok(BoundingVolume::Aabb(AABB::new(min, max)?))
    }

    pub fn center(&self) -> Vec3 {
        match self {
            BoundingVolume::Sphere(s) => s.center,
            BoundingVolume::Aabb(b) => b.center(),
        }
    }

    /// Axis-aligned box around the volume.
    pub fn bounding_box(&self) -> AABB {
        match self {
            BoundingVolume::Sphere(s) => s.bounding_box(),
            BoundingVolume::Aabb(b) => *b,
        }
    }

    /// Support point furthest along `direction` (against it when `reverse`).
    pub fn extent(&self, direction: Vec3, reverse: bool) -> Vec3 {
        match self {
            BoundingVolume::Sphere(s) => s.extent(direction, reverse),
            BoundingVolume::Aabb(b) => b.extent(direction, reverse),
        }
    }

    /// Grow to contain `other`, keeping this volume's variant.
    pub fn enclose(&mut self, other: &BoundingVolume) {
        match (self, other) {
            (BoundingVolume::Sphere(s), BoundingVolume::Sphere(o)) => s.merge(o),
            (BoundingVolume::Sphere(s), BoundingVolume::Aabb(o)) => s.merge_aabb(o),
            (BoundingVolume::Aabb(b), BoundingVolume::Aabb(o)) => b.merge(o),
            (BoundingVolume::Aabb(b), BoundingVolume::Sphere(o)) => b.merge_sphere(o),
        }
    }

    /// Grow to contain a raw point set.
    ///
    /// Spheres merge with the minimal sphere of the points; boxes take the
    /// componentwise min/max.
    pub fn enclose_points(&mut self, points: &[Vec3]) -> Result<()> {
        match self {
            BoundingVolume::Sphere(s) => s.merge(&Sphere::from_points(points)?),
            BoundingVolume::Aabb(b) => b.merge(&AABB::from_points(points)?),
        }
        Ok(())
    }

    /// Volume in the parent space of `transform`.
    ///
    /// # Errors
    ///
    /// `Error::Arithmetic` if the result is not finite.
    pub fn transformed(&self, transform: &Transform) -> Result<BoundingVolume> {
        Ok(match self {
            BoundingVolume::Sphere(s) => BoundingVolume::Sphere(s.transformed(transform)?),
            BoundingVolume::Aabb(b) => BoundingVolume::Aabb(b.transformed(transform)?),
        })
    }

    /// Symmetric overlap test across every variant pair.
    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        match (self, other) {
            (BoundingVolume::Sphere(a), BoundingVolume::Sphere(b)) => a.intersects(b),
            (BoundingVolume::Aabb(a), BoundingVolume::Aabb(b)) => a.intersects(b),
            (BoundingVolume::Sphere(s), BoundingVolume::Aabb(b))
            | (BoundingVolume::Aabb(b), BoundingVolume::Sphere(s)) => b.intersects_sphere(s),
        }
    }

    /// True if `other` lies entirely inside this volume.
    pub fn contains(&self, other: &BoundingVolume) -> bool {
        match (self, other) {
            (BoundingVolume::Sphere(a), BoundingVolume::Sphere(b)) => a.contains(b),
            (BoundingVolume::Aabb(a), BoundingVolume::Aabb(b)) => a.contains(b),
            (BoundingVolume::Aabb(a), BoundingVolume::Sphere(s)) => a.contains(&s.bounding_box()),
            (BoundingVolume::Sphere(s), BoundingVolume::Aabb(b)) => {
                // A box is inside a sphere iff its furthest corner is.
                let corner = b.extent(b.center() - s.center, false);
                s.contains_point(corner)
            }
        }
    }

    /// Classify against a frustum.
    ///
    /// Planes in `mask` are already known to contain the volume and are
    /// skipped. The returned mask adds every plane that fully contains this
    /// volume. `hint` remembers the last rejecting plane and is tested first.
    pub fn classify(
        &self,
        frustum: &Frustum,
        mask: PlaneMask,
        hint: &PlaneHint,
    ) -> (FrustumTest, PlaneMask) {
        match self {
            BoundingVolume::Sphere(s) => frustum.classify_sphere(s.center, s.radius, mask, hint),
            BoundingVolume::Aabb(b) => frustum.classify_aabb(b, mask, hint),
        }
    }
}
