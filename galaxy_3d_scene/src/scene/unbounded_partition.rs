/// UnboundedPartition — accepts every element.
///
/// Every Scene holds one at `DEFAULT_PARTITION_PRIORITY` as its catch-all,
/// so each element always finds an owner. Queries test every owned element.

use slotmap::SlotMap;
use crate::bounds::BoundingVolume;
use crate::camera::Frustum;
use super::element_bag::{frustum_matches, volume_matches, IndexedBag};
use super::partition::{Partition, Priority};
use super::scene_element::{ElementType, SceneElement, SceneElementKey};

pub struct UnboundedPartition {
    priority: Priority,
    elements: IndexedBag,
}

impl Default for UnboundedPartition {
    fn default() -> Self {
        Self::new()
    }
}

impl UnboundedPartition {
    /// Create with priority 0.
    pub fn new() -> Self {
        Self::with_priority(0)
    }

    pub fn with_priority(priority: i32) -> Self {
        Self {
            priority: Priority::new(priority),
            elements: IndexedBag::new(),
        }
    }
}

impl Partition for UnboundedPartition {
    fn name(&self) -> &str {
        "UnboundedPartition"
    }

    fn priority(&self) -> i32 {
        self.priority.get()
    }

    fn set_priority(&mut self, priority: i32) {
        self.priority.set(priority);
    }

    fn accepts(&self, _element: &SceneElement) -> bool {
        true
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
        self.priority.take_changed()
    }
}

#[cfg(test)]
#[path = "unbounded_partition_tests.rs"]
mod tests;
