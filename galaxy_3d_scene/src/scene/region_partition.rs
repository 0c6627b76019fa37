/// RegionPartition — accepts elements whose world bounds lie inside a box.

use slotmap::SlotMap;
use crate::bounds::{BoundingVolume, AABB};
use crate::camera::Frustum;
use super::element_bag::{frustum_matches, volume_matches, IndexedBag};
use super::partition::{Partition, Priority};
use super::scene_element::{ElementType, SceneElement, SceneElementKey};

pub struct RegionPartition {
    priority: Priority,
    region: AABB,
    /// Covers every region elements were accepted under since the last update
    culling_region: AABB,
    /// Also take elements without world bounds
    accept_unbounded: bool,
    elements: IndexedBag,
}

impl RegionPartition {
    /// Create over `region` with priority 0, rejecting unbounded elements.
    pub fn new(region: AABB) -> Self {
        Self {
            priority: Priority::new(0),
            region,
            culling_region: region,
            accept_unbounded: false,
            elements: IndexedBag::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Priority::new(priority);
        self
    }

    pub fn with_accept_unbounded(mut self, accept: bool) -> Self {
        self.accept_unbounded = accept;
        self
    }

    pub fn region(&self) -> &AABB {
        &self.region
    }

    /// Move the region. Owned elements are re-checked at the next update;
    /// until then queries still cover the previous region.
    pub fn set_region(&mut self, region: AABB) {
        if region != self.region {
            self.region = region;
            self.culling_region.merge(&region);
            self.priority.invalidate();
        }
    }

    pub fn accepts_unbounded(&self) -> bool {
        self.accept_unbounded
    }
}

impl Partition for RegionPartition {
    fn name(&self) -> &str {
        "RegionPartition"
    }

    fn priority(&self) -> i32 {
        self.priority.get()
    }

    fn set_priority(&mut self, priority: i32) {
        self.priority.set(priority);
    }

    fn accepts(&self, element: &SceneElement) -> bool {
        match element.world_bounds() {
            Some(bounds) => BoundingVolume::Aabb(self.region).contains(bounds),
            None => self.accept_unbounded,
        }
    }

    fn insert(&mut self, key: SceneElementKey, element: &SceneElement) {
        self.elements.insert(key, element);
    }

    fn remove(&mut self, key: SceneElementKey) -> bool {
        self.elements.remove(key)
    }

    fn contains(&self, key: SceneElementKey) -> bool {
        self.elements.bag().contains(key)
    }

    fn len(&self) -> usize {
        self.elements.bag().len()
    }

    fn keys(&self) -> Vec<SceneElementKey> {
        self.elements.bag().keys().to_vec()
    }

    fn query_frustum(
        &self,
        frustum: &Frustum,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    ) {
        // Whole region culled: only unbounded elements can still match
        if !frustum.intersects_aabb(&self.culling_region) {
            if self.accept_unbounded {
                self.elements.query(filter, elements, results, |element| element.world_bounds().is_none());
            }
            return;
        }
        self.elements.query(filter, elements, results, |element| frustum_matches(element, frustum));
    }

    fn query_volume(
        &self,
        volume: &BoundingVolume,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    ) {
        self.elements.query(filter, elements, results, |element| volume_matches(element, volume));
    }

    fn add_index(
        &mut self,
        element_type: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
    ) {
        self.elements.add_index(element_type, elements);
    }

    fn remove_index(&mut self, element_type: ElementType) -> bool {
        self.elements.remove_index(element_type)
    }

    fn has_index(&self, element_type: ElementType) -> bool {
        self.elements.has_index(element_type)
    }

    fn clear(&mut self) -> Vec<SceneElementKey> {
        self.elements.clear()
    }

    fn update(&mut self, _dt: f32) -> bool {
        self.culling_region = self.region;
        self.priority.take_changed()
    }
}

#[cfg(test)]
#[path = "region_partition_tests.rs"]
mod tests;
