/// SceneElement — a spatial entity owned by a Scene.
///
/// Holds the local transform and bounds set by the application and the
/// derived world transform and bounds maintained by `Scene::update`. Every
/// mutation of the local transform or local bounds marks the element as
/// updated so that the next scene update re-places it.

use bitflags::bitflags;
use glam::{Mat3, Vec3};
use slotmap::new_key_type;
use crate::bounds::BoundingVolume;
use crate::camera::PlaneHint;
use crate::math::{Axis, Transform};
use crate::engine_warn;
use super::partition::PartitionKey;
use super::updater::{BoundsProvider, ElementUpdater};

new_key_type! {
    /// Stable key for a SceneElement stored in a Scene.
    pub struct SceneElementKey;
}

bitflags! {
    /// Runtime type tags used to filter queries.
    ///
    /// An element matches a filter when it carries every tag of the filter;
    /// the empty filter matches every element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ElementType: u32 {
        const RENDERABLE    = 1 << 0;
        const LIGHT         = 1 << 1;
        const SHADOW_CASTER = 1 << 2;
        const VIEW          = 1 << 3;
        const OCCLUDER      = 1 << 4;
        const SOUND         = 1 << 5;
    }
}

impl ElementType {
    /// Whether an element carrying `self` passes the query `filter`.
    #[inline]
    pub fn matches(self, filter: ElementType) -> bool {
        self.contains(filter)
    }
}

/// A spatial element of a Scene.
pub struct SceneElement {
    /// Local placement, set by the application
    transform: Transform,
    /// World placement derived during the scene update
    world_transform: Transform,
    /// Local bounds (None = unbounded, always visible)
    local_bounds: Option<BoundingVolume>,
    /// World bounds derived from the local bounds and world transform
    world_bounds: Option<BoundingVolume>,
    element_type: ElementType,
    /// Owning partition (non-owning back-reference)
    partition: Option<PartitionKey>,
    /// Local state changed since the last scene update
    updated: bool,
    potentially_visible: bool,
    /// Last frustum plane that rejected this element
    plane_hint: PlaneHint,
    /// Point the billboard axis turns towards
    billboard: Option<(Vec3, Axis)>,
    /// Fixed direction for one local axis
    constraint: Option<(Vec3, Axis)>,
    updater: Option<Box<dyn ElementUpdater>>,
    /// `set_updater` was called while the updater was running
    updater_replaced: bool,
    bounds_provider: Option<Box<dyn BoundsProvider>>,
    /// Scene update pass that last processed this element
    pub(crate) last_pass: u64,
}

impl Default for SceneElement {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneElement {
    /// Create an unbounded element at the origin.
    pub fn new() -> Self {
        Self {
            transform: Transform::IDENTITY,
            world_transform: Transform::IDENTITY,
            local_bounds: None,
            world_bounds: None,
            element_type: ElementType::empty(),
            partition: None,
            updated: true,
            potentially_visible: false,
            plane_hint: PlaneHint::new(),
            billboard: None,
            constraint: None,
            updater: None,
            updater_replaced: false,
            bounds_provider: None,
            last_pass: 0,
        }
    }

    // ===== BUILDERS =====

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.set_transform(transform);
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.set_translation(translation);
        self
    }

    pub fn with_local_bounds(mut self, bounds: BoundingVolume) -> Self {
        self.set_local_bounds(Some(bounds));
        self
    }

    pub fn with_type(mut self, element_type: ElementType) -> Self {
        self.element_type = element_type;
        self
    }

    pub fn with_updater(mut self, updater: impl ElementUpdater + 'static) -> Self {
        self.updater = Some(Box::new(updater));
        self
    }

    pub fn with_bounds_provider(mut self, provider: impl BoundsProvider + 'static) -> Self {
        self.bounds_provider = Some(Box::new(provider));
        self
    }

    // ===== LOCAL STATE =====

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable access to the local transform; always marks the element updated.
    pub fn transform_mut(&mut self) -> &mut Transform {
        self.updated = true;
        &mut self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.updated = true;
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform.translation = translation;
        self.updated = true;
    }

    pub fn set_rotation(&mut self, rotation: Mat3) {
        self.transform.rotation = rotation;
        self.updated = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.updated = true;
    }

    pub fn local_bounds(&self) -> Option<&BoundingVolume> {
        self.local_bounds.as_ref()
    }

    pub fn set_local_bounds(&mut self, bounds: Option<BoundingVolume>) {
        self.local_bounds = bounds;
        self.updated = true;
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Retype the element. Its owner refreshes its indices at the next update.
    pub fn set_element_type(&mut self, element_type: ElementType) {
        if element_type != self.element_type {
            self.element_type = element_type;
            self.updated = true;
        }
    }

    /// Turn local `axis` towards `point` after every updater run.
    pub fn set_billboard(&mut self, billboard: Option<(Vec3, Axis)>) {
        self.billboard = billboard;
        self.updated = true;
    }

    pub fn billboard(&self) -> Option<(Vec3, Axis)> {
        self.billboard
    }

    /// Keep local `axis` aligned with a fixed direction.
    pub fn set_constraint(&mut self, constraint: Option<(Vec3, Axis)>) {
        self.constraint = constraint;
        self.updated = true;
    }

    pub fn constraint(&self) -> Option<(Vec3, Axis)> {
        self.constraint
    }

    /// Replace the updater hook. A running hook may detach or replace itself.
    pub fn set_updater(&mut self, updater: Option<Box<dyn ElementUpdater>>) {
        self.updater = updater;
        self.updater_replaced = true;
    }

    pub fn has_updater(&self) -> bool {
        self.updater.is_some()
    }

    pub fn set_bounds_provider(&mut self, provider: Option<Box<dyn BoundsProvider>>) {
        self.bounds_provider = provider;
        self.updated = true;
    }

    // ===== DERIVED STATE =====

    pub fn world_transform(&self) -> &Transform {
        &self.world_transform
    }

    pub fn world_bounds(&self) -> Option<&BoundingVolume> {
        self.world_bounds.as_ref()
    }

    pub fn partition(&self) -> Option<PartitionKey> {
        self.partition
    }

    pub(crate) fn set_partition(&mut self, partition: Option<PartitionKey>) {
        self.partition = partition;
    }

    /// Whether local state changed since the last scene update.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn is_potentially_visible(&self) -> bool {
        self.potentially_visible
    }

    /// Set by culling; every scene update resets it to false.
    pub fn set_potentially_visible(&mut self, visible: bool) {
        self.potentially_visible = visible;
    }

    pub fn plane_hint(&self) -> &PlaneHint {
        &self.plane_hint
    }

    /// Key of the element the updater hook needs processed first.
    pub(crate) fn dependency(&self) -> Option<SceneElementKey> {
        self.updater.as_ref().and_then(|updater| updater.depends_on())
    }

    // ===== UPDATE =====

    /// Bring world state up to date. Driven by `Scene::update`.
    ///
    /// Returns true if the element must be re-placed: it was updated, has no
    /// partition yet, or `force` is set.
    pub(crate) fn update(
        &mut self,
        dependency: Option<&SceneElement>,
        dt: f32,
        force: bool,
    ) -> bool {
        self.potentially_visible = false;

        if let Some(mut updater) = self.updater.take() {
            self.updater_replaced = false;
            updater.update(self, dependency, dt);
            if !self.updater_replaced {
                self.updater = Some(updater);
            }
        }

        self.apply_orientation();

        if let Some(provider) = &self.bounds_provider {
            let bounds = provider.compute_bounds();
            if bounds != self.local_bounds {
                self.local_bounds = bounds;
                self.updated = true;
            }
        }

        if self.updated || force {
            self.world_transform = self.transform;
            self.world_bounds = match &self.local_bounds {
                Some(local) => match local.transformed(&self.world_transform) {
                    Ok(world) => Some(world),
                    Err(e) => {
                        engine_warn!("galaxy3d::SceneElement",
                            "World bounds dropped: {}", e);
                        None
                    }
                },
                None => None,
            };
        }

        let replace = self.updated || self.partition.is_none() || force;
        self.updated = false;
        replace
    }

    /// Apply the billboard point then the axis constraint.
    fn apply_orientation(&mut self) {
        let before = self.transform.rotation;

        if let Some((point, axis)) = self.billboard {
            let direction = point - self.transform.translation;
            if let Err(e) = self.transform.orient_axis(axis, direction) {
                engine_warn!("galaxy3d::SceneElement", "Billboard skipped: {}", e);
            }
        }
        if let Some((direction, axis)) = self.constraint {
            if let Err(e) = self.transform.orient_axis(axis, direction) {
                engine_warn!("galaxy3d::SceneElement", "Constraint skipped: {}", e);
            }
        }

        if self.transform.rotation != before {
            self.updated = true;
        }
    }
}

#[cfg(test)]
#[path = "scene_element_tests.rs"]
mod tests;
