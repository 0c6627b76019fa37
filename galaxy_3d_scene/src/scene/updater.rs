/// Per-element hooks run during the scene update.
///
/// An `ElementUpdater` is user code attached to one element; it runs once per
/// scene update before the element's world state is recomputed. A
/// `BoundsProvider` supplies the element's local bounds from external
/// geometry.

use glam::Vec3;
use crate::bounds::{BoundingVolume, AABB, Sphere};
use crate::math::Transform;
use crate::engine_warn;
use super::scene_element::{SceneElement, SceneElementKey};

/// Custom per-element update hook.
///
/// `update` may mutate the element (setters mark it updated). If
/// `depends_on` names another element, the scene processes that element
/// first in the same pass and hands it in as `dependency`.
pub trait ElementUpdater: Send {
    /// Element that must be processed before this one.
    fn depends_on(&self) -> Option<SceneElementKey> {
        None
    }

    fn update(
        &mut self,
        element: &mut SceneElement,
        dependency: Option<&SceneElement>,
        dt: f32,
    );
}

/// Source of local bounds for an element.
///
/// Returning `None` means the geometry is not ready; the element is then
/// treated as unbounded.
pub trait BoundsProvider: Send + Sync {
    fn compute_bounds(&self) -> Option<BoundingVolume>;
}

impl<F> BoundsProvider for F
where
    F: Fn() -> Option<BoundingVolume> + Send + Sync,
{
    fn compute_bounds(&self) -> Option<BoundingVolume> {
        self()
    }
}

// ===== ATTACHMENT =====

/// Keeps an element at a fixed offset from a parent element.
///
/// The parent is processed first, so chains of attachments resolve within
/// a single update. A missing parent leaves the element where it is.
pub struct AttachmentUpdater {
    parent: SceneElementKey,
    offset: Transform,
}

impl AttachmentUpdater {
    pub fn new(parent: SceneElementKey, offset: Transform) -> Self {
        Self { parent, offset }
    }

    pub fn parent(&self) -> SceneElementKey {
        self.parent
    }

    pub fn offset(&self) -> &Transform {
        &self.offset
    }

    pub fn set_offset(&mut self, offset: Transform) {
        self.offset = offset;
    }
}

impl ElementUpdater for AttachmentUpdater {
    fn depends_on(&self) -> Option<SceneElementKey> {
        Some(self.parent)
    }

    fn update(&mut self, element: &mut SceneElement, dependency: Option<&SceneElement>, _dt: f32) {
        let Some(parent) = dependency else {
            return;
        };
        let placed = parent.world_transform().compose(&self.offset);
        if placed != *element.transform() {
            element.set_transform(placed);
        }
    }
}

// ===== VERTEX BOUNDS =====

/// Shape fitted by [`VertexBounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsShape {
    Sphere,
    Aabb,
}

/// Bounds fitted around a vertex cloud.
///
/// The volume is computed once at construction. An empty or degenerate
/// cloud yields no bounds.
pub struct VertexBounds {
    bounds: Option<BoundingVolume>,
}

impl VertexBounds {
    pub fn new(points: &[Vec3], shape: BoundsShape) -> Self {
        if points.is_empty() {
            return Self { bounds: None };
        }

        let fitted = match shape {
            BoundsShape::Sphere => Sphere::from_points(points).map(BoundingVolume::Sphere),
            BoundsShape::Aabb => AABB::from_points(points).map(BoundingVolume::Aabb),
        };
        let bounds = match fitted {
            Ok(bounds) => Some(bounds),
            Err(e) => {
                engine_warn!("galaxy3d::VertexBounds", "No bounds for {} points: {}", points.len(), e);
                None
            }
        };
        Self { bounds }
    }
}

impl BoundsProvider for VertexBounds {
    fn compute_bounds(&self) -> Option<BoundingVolume> {
        self.bounds
    }
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;
