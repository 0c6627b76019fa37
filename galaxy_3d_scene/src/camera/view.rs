/// View — a camera placement plus a projection, with a lazily cached frustum.
///
/// Two caches are kept apart:
/// - projection matrix and camera-space planes, invalidated by projection
///   changes only
/// - view matrix and world-space planes, invalidated by placement changes
///   (world planes are rebuilt from the cached camera-space planes)
///
/// The camera looks down its local -Z axis with +Y up (glam `*_rh`
/// conventions, depth mapped to [0, 1]).

use glam::{Mat3, Mat4, Vec3, Vec4};
use crate::engine_error;
use crate::error::{Error, Result};
use crate::math::Transform;
use super::frustum::{Frustum, PlaneMask};

/// Projection descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Symmetric perspective. `far` may be `f32::INFINITY`.
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    /// Off-center perspective given by the near-plane window. `far` may be
    /// `f32::INFINITY`.
    PerspectiveOffCenter {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    /// Parallel projection.
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Check the descriptor describes a non-empty frustum.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                if !(fov_y.is_finite() && fov_y > 0.0 && fov_y < std::f32::consts::PI) {
                    return Err(invalid(format!("field of view {} outside (0, pi)", fov_y)));
                }
                if !(aspect.is_finite() && aspect > 0.0) {
                    return Err(invalid(format!("aspect ratio {} must be > 0", aspect)));
                }
                check_depth(near, far, true)
            }
            Projection::PerspectiveOffCenter { left, right, bottom, top, near, far } => {
                check_window(left, right, bottom, top)?;
                check_depth(near, far, true)
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                check_window(left, right, bottom, top)?;
                check_depth(near, far, false)
            }
        }
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self, Projection::Orthographic { .. })
    }

    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { near, .. }
            | Projection::PerspectiveOffCenter { near, .. }
            | Projection::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { far, .. }
            | Projection::PerspectiveOffCenter { far, .. }
            | Projection::Orthographic { far, .. } => far,
        }
    }

    /// Near-plane window (left, right, bottom, top).
    pub fn window(&self) -> (f32, f32, f32, f32) {
        match *self {
            Projection::Perspective { fov_y, aspect, near, .. } => {
                let top = (fov_y * 0.5).tan() * near;
                let right = top * aspect;
                (-right, right, -top, top)
            }
            Projection::PerspectiveOffCenter { left, right, bottom, top, .. }
            | Projection::Orthographic { left, right, bottom, top, .. } => (left, right, bottom, top),
        }
    }

    /// Projection matrix (right-handed, depth in [0, 1]).
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                if far.is_infinite() {
                    Mat4::perspective_infinite_rh(fov_y, aspect, near)
                } else {
                    Mat4::perspective_rh(fov_y, aspect, near, far)
                }
            }
            Projection::PerspectiveOffCenter { left, right, bottom, top, near, far } => {
                let (z, w) = if far.is_infinite() {
                    (-1.0, -near)
                } else {
                    let r = far / (near - far);
                    (r, r * near)
                };
                Mat4::from_cols(
                    Vec4::new(2.0 * near / (right - left), 0.0, 0.0, 0.0),
                    Vec4::new(0.0, 2.0 * near / (top - bottom), 0.0, 0.0),
                    Vec4::new(
                        (right + left) / (right - left),
                        (top + bottom) / (top - bottom),
                        z,
                        -1.0,
                    ),
                    Vec4::new(0.0, 0.0, w, 0.0),
                )
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Mat4::orthographic_rh(left, right, bottom, top, near, far)
            }
        }
    }

    /// Camera-space planes, computed from the near window directly.
    fn camera_planes(&self) -> Result<Frustum> {
        let (left, right, bottom, top) = self.window();
        let near = self.near();
        let far = self.far();

        let mut active = PlaneMask::all();
        let far_plane = if far.is_infinite() {
            active.remove(PlaneMask::FAR);
            Vec4::new(0.0, 0.0, 1.0, 0.0)
        } else {
            Vec4::new(0.0, 0.0, 1.0, far)
        };

        let planes = if self.is_orthographic() {
            [
                Vec4::new(1.0, 0.0, 0.0, -left),
                Vec4::new(-1.0, 0.0, 0.0, right),
                Vec4::new(0.0, 1.0, 0.0, -bottom),
                Vec4::new(0.0, -1.0, 0.0, top),
                Vec4::new(0.0, 0.0, -1.0, -near),
                far_plane,
            ]
        } else {
            // Side planes pass through the eye and an edge of the near window
            [
                Vec4::new(near, 0.0, left, 0.0),
                Vec4::new(-near, 0.0, -right, 0.0),
                Vec4::new(0.0, near, bottom, 0.0),
                Vec4::new(0.0, -near, -top, 0.0),
                Vec4::new(0.0, 0.0, -1.0, -near),
                far_plane,
            ]
        };

        Frustum::from_planes(planes, active)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_3,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

fn invalid(message: String) -> Error {
    engine_error!("galaxy3d::View", "{}", message);
    Error::InvalidFrustum(message)
}

fn check_window(left: f32, right: f32, bottom: f32, top: f32) -> Result<()> {
    if ![left, right, bottom, top].iter().all(|v| v.is_finite()) {
        return Err(invalid("frustum window must be finite".to_string()));
    }
    if left >= right {
        return Err(invalid(format!("left ({}) must be < right ({})", left, right)));
    }
    if bottom >= top {
        return Err(invalid(format!("bottom ({}) must be < top ({})", bottom, top)));
    }
    Ok(())
}

fn check_depth(near: f32, far: f32, perspective: bool) -> Result<()> {
    let far_ok = far.is_finite() || (perspective && far == f32::INFINITY);
    if !near.is_finite() || !far_ok {
        return Err(invalid(format!("invalid depth range [{}, {}]", near, far)));
    }
    if near >= far {
        return Err(invalid(format!("near ({}) must be < far ({})", near, far)));
    }
    if perspective && near <= 0.0 {
        return Err(invalid(format!("perspective near ({}) must be > 0", near)));
    }
    Ok(())
}

/// Orthonormal (right, up) basis for a view direction.
fn orthonormal_basis(direction: Vec3, up: Vec3) -> Result<(Vec3, Vec3, Vec3)> {
    let direction = direction.try_normalize().ok_or_else(|| {
        Error::Arithmetic(format!("view direction {:?} cannot be normalized", direction))
    })?;
    let right = direction.cross(up).try_normalize().ok_or_else(|| {
        Error::Arithmetic(format!(
            "view up {:?} is zero or parallel to direction {:?}", up, direction
        ))
    })?;
    let up = right.cross(direction);
    Ok((direction, up, right))
}

/// A camera: placement, projection and cached derived state.
#[derive(Debug, Clone)]
pub struct View {
    location: Vec3,
    direction: Vec3,
    up: Vec3,
    right: Vec3,
    projection: Projection,

    projection_dirty: bool,
    placement_dirty: bool,
    world_planes_dirty: bool,

    projection_matrix: Mat4,
    camera_frustum: Frustum,
    view_matrix: Mat4,
    frustum: Frustum,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    /// Perspective 60°, aspect 1, depth [0.1, 100], at the origin looking down -Z.
    pub fn new() -> Self {
        let placeholder = Frustum { planes: [Vec4::ZERO; 6], active: PlaneMask::all() };
        Self {
            location: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            projection: Projection::default(),
            projection_dirty: true,
            placement_dirty: true,
            world_planes_dirty: true,
            projection_matrix: Mat4::IDENTITY,
            camera_frustum: placeholder,
            view_matrix: Mat4::IDENTITY,
            frustum: placeholder,
        }
    }

    /// View with an explicit projection.
    pub fn with_projection(projection: Projection) -> Result<Self> {
        let mut view = Self::new();
        view.set_projection(projection)?;
        Ok(view)
    }

    // ===== PLACEMENT =====

    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Unit up vector, orthogonal to the direction.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit right vector (`direction × up`).
    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn set_location(&mut self, location: Vec3) {
        self.location = location;
        self.placement_dirty = true;
    }

    /// Orient the view. `up` only needs to be non-parallel to `direction`.
    ///
    /// # Errors
    ///
    /// `Error::Arithmetic` for a zero direction or an up vector parallel to
    /// it; the view is left unchanged.
    pub fn set_orientation(&mut self, direction: Vec3, up: Vec3) -> Result<()> {
        let (direction, up, right) = orthonormal_basis(direction, up)?;
        self.direction = direction;
        self.up = up;
        self.right = right;
        self.placement_dirty = true;
        Ok(())
    }

    pub fn look_at(&mut self, location: Vec3, target: Vec3, up: Vec3) -> Result<()> {
        self.set_orientation(target - location, up)?;
        self.set_location(location);
        Ok(())
    }

    /// Place the view like an object with `transform`: looking down its -Z
    /// axis with its +Y axis up. Scale is ignored.
    pub fn set_transform(&mut self, transform: &Transform) -> Result<()> {
        self.set_orientation(-transform.rotation.z_axis, transform.rotation.y_axis)?;
        self.set_location(transform.translation);
        Ok(())
    }

    /// Camera-to-world placement (columns right, up, -direction).
    pub fn transform(&self) -> Transform {
        Transform::new(
            Mat3::from_cols(self.right, self.up, -self.direction),
            self.location,
            Vec3::ONE,
        )
    }

    // ===== PROJECTION =====

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Replace the projection.
    ///
    /// # Errors
    ///
    /// `Error::InvalidFrustum` if the descriptor is malformed; the view is
    /// left unchanged.
    pub fn set_projection(&mut self, projection: Projection) -> Result<()> {
        projection.validate()?;
        self.projection = projection;
        self.projection_dirty = true;
        Ok(())
    }

    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<()> {
        self.set_projection(Projection::Perspective { fov_y, aspect, near, far })
    }

    pub fn set_perspective_off_center(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<()> {
        self.set_projection(Projection::PerspectiveOffCenter { left, right, bottom, top, near, far })
    }

    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Result<()> {
        self.set_projection(Projection::Orthographic { left, right, bottom, top, near, far })
    }

    // ===== DERIVED STATE =====

    pub fn projection_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.projection_matrix
    }

    pub fn view_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.view_matrix
    }

    pub fn view_projection_matrix(&mut self) -> Mat4 {
        self.refresh();
        self.projection_matrix * self.view_matrix
    }

    /// World-space frustum, recomputed if placement or projection changed.
    pub fn frustum(&mut self) -> &Frustum {
        self.refresh();
        &self.frustum
    }

    fn refresh(&mut self) {
        if self.projection_dirty {
            self.projection_matrix = self.projection.matrix();
            // Descriptors are validated on entry, so the planes are well formed.
            match self.projection.camera_planes() {
                Ok(planes) => self.camera_frustum = planes,
                Err(err) => engine_error!("galaxy3d::View", "camera planes: {}", err),
            }
            self.projection_dirty = false;
            self.world_planes_dirty = true;
        }
        if self.placement_dirty {
            self.view_matrix = Mat4::look_to_rh(self.location, self.direction, self.up);
            self.placement_dirty = false;
            self.world_planes_dirty = true;
        }
        if self.world_planes_dirty {
            let placement = self.transform();
            self.frustum = self.camera_frustum.moved(placement.rotation, placement.translation);
            self.world_planes_dirty = false;
        }
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
