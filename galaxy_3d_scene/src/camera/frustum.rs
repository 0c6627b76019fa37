/// Frustum — six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the unit inward-pointing normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all
///   active planes
///
/// Planes outside the active mask (the far plane of an infinite projection)
/// never reject anything.

use std::cell::Cell;
use bitflags::bitflags;
use glam::{Mat3, Mat4, Vec3, Vec4};
use crate::bounds::AABB;
use crate::error::{Error, Result};
use crate::math::Transform;

/// Result of a 3-way frustum classification.
///
/// Used by spatial structures for hierarchical culling:
/// - `Outside` → skip the entire subtree
/// - `Inside` → collect everything below without further testing
/// - `Intersect` → test individual objects and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// Volume is entirely outside the frustum
    Outside,
    /// Volume is entirely inside the frustum
    Inside,
    /// Volume straddles at least one plane
    Intersect,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Number of frustum planes
pub const PLANE_COUNT: usize = 6;

bitflags! {
    /// Set of frustum planes, one bit per plane index.
    ///
    /// During classification a set bit means "volume known to be fully on
    /// the inside of this plane"; children of a volume inherit the mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlaneMask: u8 {
        const LEFT   = 1 << PLANE_LEFT;
        const RIGHT  = 1 << PLANE_RIGHT;
        const BOTTOM = 1 << PLANE_BOTTOM;
        const TOP    = 1 << PLANE_TOP;
        const NEAR   = 1 << PLANE_NEAR;
        const FAR    = 1 << PLANE_FAR;
    }
}

impl PlaneMask {
    /// Mask holding only plane `index`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an index outside `0..6`.
    pub fn plane(index: usize) -> Result<PlaneMask> {
        if index < PLANE_COUNT {
            Ok(Self::bit(index))
        } else {
            Err(Error::InvalidArgument(format!("frustum plane index {} out of range", index)))
        }
    }

    /// `index` must be below `PLANE_COUNT`.
    #[inline]
    pub(crate) fn bit(index: usize) -> PlaneMask {
        PlaneMask::from_bits_truncate(1 << index)
    }
}

/// Last plane that rejected a volume.
///
/// Interior mutability lets read-only queries refresh the hint of the
/// element they are testing.
#[derive(Debug, Clone, Default)]
pub struct PlaneHint(Cell<Option<u8>>);

impl PlaneHint {
    pub fn new() -> Self {
        Self(Cell::new(None))
    }

    pub fn get(&self) -> Option<usize> {
        self.0.get().map(usize::from)
    }

    pub fn set(&self, plane: usize) {
        self.0.set(Some(plane as u8));
    }

    pub fn clear(&self) {
        self.0.set(None);
    }
}

/// Where a volume lies relative to one plane.
enum PlaneSide {
    Outside,
    Straddling,
    Inside,
}

/// Six frustum planes for culling.
///
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; PLANE_COUNT],
    /// Planes taking part in classification
    pub active: PlaneMask,
}

impl Frustum {
    /// Build from explicit planes, normalizing each one.
    ///
    /// # Errors
    ///
    /// `Error::Arithmetic` if an active plane has a zero-length normal.
    pub fn from_planes(planes: [Vec4; PLANE_COUNT], active: PlaneMask) -> Result<Self> {
        let mut normalized = planes;
        for (index, plane) in normalized.iter_mut().enumerate() {
            let len = plane.truncate().length();
            if len > 0.0 && len.is_finite() {
                *plane /= len;
            } else if active.contains(PlaneMask::bit(index)) {
                return Err(Error::Arithmetic(format!(
                    "frustum plane {} has a degenerate normal", index
                )));
            }
        }
        Ok(Self { planes: normalized, active })
    }

    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method for projections mapping depth to
    /// [0, 1] (glam `*_rh` conventions). A far plane with no normal (infinite
    /// projection) is deactivated.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let r0 = vp.row(0);
        let r1 = vp.row(1);
        let r2 = vp.row(2);
        let r3 = vp.row(3);

        let mut planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2];
        let mut active = PlaneMask::all();

        for (index, plane) in planes.iter_mut().enumerate() {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            } else {
                active.remove(PlaneMask::bit(index));
            }
        }

        Self { planes, active }
    }

    /// Plane by index.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an index outside `0..6`.
    pub fn plane(&self, index: usize) -> Result<Vec4> {
        self.planes.get(index).copied().ok_or_else(|| {
            Error::InvalidArgument(format!("frustum plane index {} out of range", index))
        })
    }

    /// Signed distance from an (active or not) plane to a point.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an index outside `0..6`.
    pub fn distance(&self, index: usize, point: Vec3) -> Result<f32> {
        let plane = self.plane(index)?;
        Ok(plane.truncate().dot(point) + plane.w)
    }

    #[inline]
    fn signed_distance(&self, index: usize, point: Vec3) -> f32 {
        let plane = self.planes[index];
        plane.truncate().dot(point) + plane.w
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..PLANE_COUNT)
            .filter(|&i| self.active.contains(PlaneMask::bit(i)))
            .all(|i| self.signed_distance(i, point) >= 0.0)
    }

    /// Frustum moved by a general transform (planes use the inverse transpose).
    pub fn transformed(&self, transform: &Transform) -> Result<Frustum> {
        let inverse_t = transform.inverse()?.to_mat4().transpose();
        let planes = self.planes.map(|p| inverse_t * p);
        Frustum::from_planes(planes, self.active)
    }

    /// Frustum moved by a rigid placement (orthonormal rotation, no scale).
    pub(crate) fn moved(&self, rotation: Mat3, translation: Vec3) -> Frustum {
        let planes = self.planes.map(|p| {
            let normal = rotation * p.truncate();
            normal.extend(p.w - normal.dot(translation))
        });
        Frustum { planes, active: self.active }
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the AABB corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the AABB is fully outside. Conservative: may report false positives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        (0..PLANE_COUNT)
            .filter(|&i| self.active.contains(PlaneMask::bit(i)))
            .all(|i| {
                let normal = self.planes[i].truncate();
                self.signed_distance(i, aabb.extent(normal, false)) >= 0.0
            })
    }

    /// Classify a sphere.
    ///
    /// For every tested plane with signed distance `d` to the center:
    /// `radius <= -d` rejects (and is remembered in `hint`), `d < radius`
    /// straddles, otherwise the plane fully contains the sphere and its bit
    /// is added to the returned mask.
    pub fn classify_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: PlaneMask,
        hint: &PlaneHint,
    ) -> (FrustumTest, PlaneMask) {
        self.classify_with(mask, hint, |index| {
            let d = self.signed_distance(index, center);
            if radius <= -d {
                PlaneSide::Outside
            } else if d < radius {
                PlaneSide::Straddling
            } else {
                PlaneSide::Inside
            }
        })
    }

    /// Classify an AABB with p-vertex / n-vertex distances, same protocol as
    /// [`Frustum::classify_sphere`].
    pub fn classify_aabb(
        &self,
        aabb: &AABB,
        mask: PlaneMask,
        hint: &PlaneHint,
    ) -> (FrustumTest, PlaneMask) {
        self.classify_with(mask, hint, |index| {
            let normal = self.planes[index].truncate();
            if self.signed_distance(index, aabb.extent(normal, false)) < 0.0 {
                PlaneSide::Outside
            } else if self.signed_distance(index, aabb.extent(normal, true)) < 0.0 {
                PlaneSide::Straddling
            } else {
                PlaneSide::Inside
            }
        })
    }

    /// Shared plane loop: hint plane first, then the rest in index order.
    fn classify_with(
        &self,
        mask: PlaneMask,
        hint: &PlaneHint,
        side: impl Fn(usize) -> PlaneSide,
    ) -> (FrustumTest, PlaneMask) {
        let skip = mask | !self.active;
        let mut result_mask = mask;
        let mut straddling = false;

        let first = hint.get().filter(|&i| i < PLANE_COUNT);
        let order = first.into_iter().chain((0..PLANE_COUNT).filter(|&i| Some(i) != first));

        for index in order {
            let bit = PlaneMask::bit(index);
            if skip.contains(bit) {
                continue;
            }
            match side(index) {
                PlaneSide::Outside => {
                    hint.set(index);
                    return (FrustumTest::Outside, result_mask);
                }
                PlaneSide::Straddling => straddling = true,
                PlaneSide::Inside => result_mask |= bit,
            }
        }

        if straddling {
            (FrustumTest::Intersect, result_mask)
        } else {
            (FrustumTest::Inside, result_mask)
        }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
