/// Key containers shared by the flat partitions.
///
/// `ElementBag` is an unordered key set with O(1) insert and swap-remove.
/// `TypeIndex` keeps one key set per registered `ElementType` so typed
/// queries can skip elements of other types.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use crate::bounds::BoundingVolume;
use crate::camera::{Frustum, FrustumTest, PlaneMask};
use super::scene_element::{ElementType, SceneElement, SceneElementKey};

// ===== SPATIAL PREDICATES =====

/// Frustum test for one element. Unbounded elements always pass.
pub(crate) fn frustum_matches(element: &SceneElement, frustum: &Frustum) -> bool {
    match element.world_bounds() {
        Some(bounds) => {
            let (result, _) = bounds.classify(frustum, PlaneMask::empty(), element.plane_hint());
            result != FrustumTest::Outside
        }
        None => true,
    }
}

/// Volume test for one element. Unbounded elements always pass.
pub(crate) fn volume_matches(element: &SceneElement, volume: &BoundingVolume) -> bool {
    element.world_bounds().is_none_or(|bounds| bounds.intersects(volume))
}

// ===== ELEMENT BAG =====

/// Unordered set of element keys.
#[derive(Debug, Default)]
pub struct ElementBag {
    keys: Vec<SceneElementKey>,
    /// Position of each key in `keys`
    positions: FxHashMap<SceneElementKey, usize>,
}

impl ElementBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key. Returns false if it was already present.
    pub fn insert(&mut self, key: SceneElementKey) -> bool {
        if self.positions.contains_key(&key) {
            return false;
        }
        self.positions.insert(key, self.keys.len());
        self.keys.push(key);
        true
    }

    /// Remove a key. Returns false if it was not present.
    pub fn remove(&mut self, key: SceneElementKey) -> bool {
        let Some(pos) = self.positions.remove(&key) else {
            return false;
        };
        self.keys.swap_remove(pos);
        if let Some(&moved) = self.keys.get(pos) {
            self.positions.insert(moved, pos);
        }
        true
    }

    pub fn contains(&self, key: SceneElementKey) -> bool {
        self.positions.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[SceneElementKey] {
        &self.keys
    }

    /// Empty the bag and return its keys.
    pub fn drain(&mut self) -> Vec<SceneElementKey> {
        self.positions.clear();
        std::mem::take(&mut self.keys)
    }
}

// ===== TYPE INDEX =====

/// Per-type key sets for the registered element types.
#[derive(Debug, Default)]
pub struct TypeIndex {
    sets: FxHashMap<ElementType, FxHashSet<SceneElementKey>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `element_type`, filling it from `keys`.
    ///
    /// The empty type matches everything and is never indexed; registering
    /// an existing type is a no-op. Returns true if an index was created.
    pub fn add(
        &mut self,
        element_type: ElementType,
        keys: &[SceneElementKey],
        elements: &SlotMap<SceneElementKey, SceneElement>,
    ) -> bool {
        if element_type.is_empty() || self.sets.contains_key(&element_type) {
            return false;
        }
        let set = keys
            .iter()
            .copied()
            .filter(|&key| {
                elements
                    .get(key)
                    .is_some_and(|element| element.element_type().matches(element_type))
            })
            .collect();
        self.sets.insert(element_type, set);
        true
    }

    pub fn remove(&mut self, element_type: ElementType) -> bool {
        self.sets.remove(&element_type).is_some()
    }

    pub fn contains(&self, element_type: ElementType) -> bool {
        self.sets.contains_key(&element_type)
    }

    pub fn types(&self) -> impl Iterator<Item = ElementType> + '_ {
        self.sets.keys().copied()
    }

    /// Key set for a query filter, if that exact type is indexed.
    pub fn get(&self, filter: ElementType) -> Option<&FxHashSet<SceneElementKey>> {
        self.sets.get(&filter)
    }

    /// Record `key` in every index its type matches, dropping stale entries.
    pub fn insert_key(&mut self, key: SceneElementKey, element_type: ElementType) {
        for (indexed, set) in self.sets.iter_mut() {
            if element_type.matches(*indexed) {
                set.insert(key);
            } else {
                set.remove(&key);
            }
        }
    }

    pub fn remove_key(&mut self, key: SceneElementKey) {
        for set in self.sets.values_mut() {
            set.remove(&key);
        }
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }
}

// ===== INDEXED BAG =====

/// `ElementBag` with a `TypeIndex`, the storage of the flat partitions.
#[derive(Debug, Default)]
pub struct IndexedBag {
    bag: ElementBag,
    index: TypeIndex,
}

impl IndexedBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh `key`.
    pub fn insert(&mut self, key: SceneElementKey, element: &SceneElement) {
        self.bag.insert(key);
        self.index.insert_key(key, element.element_type());
    }

    pub fn remove(&mut self, key: SceneElementKey) -> bool {
        if !self.bag.remove(key) {
            return false;
        }
        self.index.remove_key(key);
        true
    }

    pub fn bag(&self) -> &ElementBag {
        &self.bag
    }

    pub fn add_index(
        &mut self,
        element_type: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
    ) -> bool {
        self.index.add(element_type, self.bag.keys(), elements)
    }

    pub fn remove_index(&mut self, element_type: ElementType) -> bool {
        self.index.remove(element_type)
    }

    pub fn has_index(&self, element_type: ElementType) -> bool {
        self.index.contains(element_type)
    }

    /// Append every key of the given type passing `predicate`.
    ///
    /// Uses the type's index when registered; the result set is the same
    /// either way.
    pub fn query(
        &self,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
        predicate: impl Fn(&SceneElement) -> bool,
    ) {
        let mut visit = |key: SceneElementKey| {
            if let Some(element) = elements.get(key) {
                if element.element_type().matches(filter) && predicate(element) {
                    results.push(key);
                }
            }
        };

        match self.index.get(filter) {
            Some(set) => set.iter().copied().for_each(&mut visit),
            None => self.bag.keys().iter().copied().for_each(&mut visit),
        }
    }

    /// Drop all keys and indices, returning the keys.
    pub fn clear(&mut self) -> Vec<SceneElementKey> {
        self.index.clear();
        self.bag.drain()
    }
}

#[cfg(test)]
#[path = "element_bag_tests.rs"]
mod tests;
