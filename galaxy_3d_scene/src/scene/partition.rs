/// Partitions divide the elements of a Scene for spatial queries.
///
/// A Scene owns its partitions and places every element in exactly one of
/// them: partitions are tested from highest to lowest priority and the first
/// one whose `accepts` returns true receives the element. Partitions only
/// store keys; element data stays in the Scene and is passed in by
/// reference.
///
/// Ownership: partitions never touch an element's back-reference. The Scene
/// updates it in `try_add_to_partition` / `remove_from_partition`.

use slotmap::{new_key_type, SlotMap};
use crate::bounds::BoundingVolume;
use crate::camera::Frustum;
use super::scene_element::{ElementType, SceneElement, SceneElementKey};

new_key_type! {
    /// Stable key for a partition stored in a Scene.
    pub struct PartitionKey;
}

/// Priority of the catch-all partition every Scene creates.
pub const DEFAULT_PARTITION_PRIORITY: i32 = i32::MIN;

/// Spatial subdivision strategy owning a subset of the scene's elements.
pub trait Partition: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Placement priority; higher is tested first.
    fn priority(&self) -> i32;

    /// Change the priority. Takes effect at the next scene update, which
    /// re-places every element.
    fn set_priority(&mut self, priority: i32);

    /// Whether this partition would take `element`.
    fn accepts(&self, element: &SceneElement) -> bool;

    /// Insert `key`, or refresh it from `element` if already owned.
    fn insert(&mut self, key: SceneElementKey, element: &SceneElement);

    /// Remove `key`. Returns false (and does nothing) if not owned.
    fn remove(&mut self, key: SceneElementKey) -> bool;

    fn contains(&self, key: SceneElementKey) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of every owned element, in no particular order.
    fn keys(&self) -> Vec<SceneElementKey>;

    /// Append the owned elements of type `filter` that may be inside
    /// `frustum`. Unbounded elements always match.
    fn query_frustum(
        &self,
        frustum: &Frustum,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    );

    /// Append the owned elements of type `filter` whose world bounds
    /// intersect `volume`. Unbounded elements always match.
    fn query_volume(
        &self,
        volume: &BoundingVolume,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    );

    /// Register a lookup index for `element_type`. The empty type and
    /// already registered types are ignored. Indices never change query
    /// results.
    fn add_index(
        &mut self,
        element_type: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
    );

    /// Returns false if no such index was registered.
    fn remove_index(&mut self, element_type: ElementType) -> bool;

    fn has_index(&self, element_type: ElementType) -> bool;

    /// Remove every element and index, keeping the priority. Returns the
    /// removed keys.
    fn clear(&mut self) -> Vec<SceneElementKey>;

    /// Per-frame bookkeeping. Returns true if every placement in the scene
    /// is invalidated.
    fn update(&mut self, dt: f32) -> bool;
}

/// Priority with deferred change notification, shared by the partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Priority {
    value: i32,
    changed: bool,
}

impl Priority {
    pub(crate) fn new(value: i32) -> Self {
        Self { value, changed: false }
    }

    pub(crate) fn get(&self) -> i32 {
        self.value
    }

    pub(crate) fn set(&mut self, value: i32) {
        if value != self.value {
            self.value = value;
            self.changed = true;
        }
    }

    /// Force the next update to report a change.
    pub(crate) fn invalidate(&mut self) {
        self.changed = true;
    }

    /// Report and clear a pending change.
    pub(crate) fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}
