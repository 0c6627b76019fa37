/// Bounding sphere with closed-form merge and minimal enclosing
/// construction (move-to-front Welzl) over raw points.

use glam::Vec3;
use crate::error::{Error, Result};
use crate::math::Transform;
use super::aabb::AABB;

/// Containment slack applied to the radius while building a minimal sphere.
const RADIUS_EPSILON: f32 = 1.00001;

/// Support sets whose circumsphere determinant falls below this are degenerate.
const DEGENERATE_EPSILON: f32 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a sphere, rejecting negative or non-finite radii.
    pub fn new(center: Vec3, radius: f32) -> Result<Self> {
        if !center.is_finite() || !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "invalid sphere (center {:?}, radius {})", center, radius
            )));
        }
        Ok(Self { center, radius })
    }

    /// Smallest sphere containing every point.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidArgument` on an empty point set
    /// - `Error::Arithmetic` when the support set is degenerate or a point
    ///   is not finite
    pub fn from_points(points: &[Vec3]) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InvalidArgument("cannot bound an empty point set".to_string()));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(Error::Arithmetic("point set contains non-finite values".to_string()));
        }

        let mut scratch = points.to_vec();
        let mut support = Vec::with_capacity(4);
        let end = scratch.len();
        let sphere = minidisk(&mut scratch, end, &mut support)?;
        Ok(Sphere { center: sphere.center, radius: sphere.radius.max(0.0) })
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    pub fn contains(&self, other: &Sphere) -> bool {
        self.center.distance(other.center) + other.radius <= self.radius
    }

    pub fn intersects(&self, other: &Sphere) -> bool {
        let sum = self.radius + other.radius;
        self.center.distance_squared(other.center) <= sum * sum
    }

    /// Grow to the smallest sphere containing both spheres.
    pub fn merge(&mut self, other: &Sphere) {
        let offset = other.center - self.center;
        let distance = offset.length();

        if distance + other.radius <= self.radius {
            return;
        }
        if distance + self.radius <= other.radius || distance == 0.0 {
            *self = *other;
            return;
        }

        let radius = (distance + self.radius + other.radius) * 0.5;
        self.center += offset * ((radius - self.radius) / distance);
        self.radius = radius;
    }

    /// Grow to contain a box, represented by its circumscribed sphere.
    pub fn merge_aabb(&mut self, aabb: &AABB) {
        self.merge(&aabb.circumscribed_sphere());
    }

    /// Tight axis-aligned box around the sphere.
    pub fn bounding_box(&self) -> AABB {
        AABB::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }

    /// Point on the sphere furthest along `direction`, or against it when `reverse`.
    pub fn extent(&self, direction: Vec3, reverse: bool) -> Vec3 {
        let dir = direction.normalize_or_zero();
        if reverse { self.center - dir * self.radius } else { self.center + dir * self.radius }
    }

    /// Sphere in the parent space of `transform`.
    ///
    /// The radius is scaled by the largest stretch of the linear part, so the
    /// result stays conservative under non-uniform scale.
    pub fn transformed(&self, transform: &Transform) -> Result<Sphere> {
        let center = transform.transform_point(self.center);
        let radius = self.radius * transform.max_scale_factor();
        if !center.is_finite() || !radius.is_finite() {
            return Err(Error::Arithmetic(format!(
                "transformed sphere is not finite (center {:?}, radius {})", center, radius
            )));
        }
        Ok(Sphere { center, radius })
    }
}

// ===== MINIMAL ENCLOSING SPHERE =====

/// Move-to-front minimal sphere of `points[..end]` with `support` on its boundary.
fn minidisk(points: &mut [Vec3], end: usize, support: &mut Vec<Vec3>) -> Result<Sphere> {
    let mut sphere = circumsphere(support)?;
    if support.len() == 4 {
        return Ok(sphere);
    }

    for i in 0..end {
        let p = points[i];
        if encloses(&sphere, p) {
            continue;
        }
        support.push(p);
        let rebuilt = minidisk(points, i, support);
        support.pop();
        sphere = rebuilt?;
        points[..=i].rotate_right(1);
    }
    Ok(sphere)
}

/// Containment with slack. The empty sphere (radius < 0) contains nothing.
fn encloses(sphere: &Sphere, point: Vec3) -> bool {
    if sphere.radius < 0.0 {
        return false;
    }
    let r = sphere.radius * RADIUS_EPSILON;
    sphere.center.distance_squared(point) <= r * r
}

/// Sphere passing through every support point (0 to 4 points).
fn circumsphere(support: &[Vec3]) -> Result<Sphere> {
    match *support {
        [] => Ok(Sphere { center: Vec3::ZERO, radius: -1.0 }),
        [a] => Ok(Sphere { center: a, radius: 0.0 }),
        [a, b] => Ok(Sphere { center: (a + b) * 0.5, radius: a.distance(b) * 0.5 }),
        [o, p1, p2] => {
            let a = p1 - o;
            let b = p2 - o;
            let axb = a.cross(b);
            let denom = 2.0 * axb.length_squared();
            if denom.abs() < DEGENERATE_EPSILON {
                return Err(Error::Arithmetic(
                    "collinear support points for minimal sphere".to_string(),
                ));
            }
            let offset = (b.cross(axb) * a.length_squared() + axb.cross(a) * b.length_squared()) / denom;
            Ok(Sphere { center: o + offset, radius: offset.length() })
        }
        [o, p1, p2, p3] => {
            let a = p1 - o;
            let b = p2 - o;
            let c = p3 - o;
            let denom = 2.0 * a.dot(b.cross(c));
            if denom.abs() < DEGENERATE_EPSILON {
                return Err(Error::Arithmetic(
                    "coplanar support points for minimal sphere".to_string(),
                ));
            }
            let offset = (b.cross(c) * a.length_squared()
                + c.cross(a) * b.length_squared()
                + a.cross(b) * c.length_squared())
                / denom;
            Ok(Sphere { center: o + offset, radius: offset.length() })
        }
        _ => Err(Error::InvalidArgument("minimal sphere support exceeds 4 points".to_string())),
    }
}
