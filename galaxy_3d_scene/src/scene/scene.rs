/// Scene — owns spatial elements and the partitions that divide them.
///
/// Elements and partitions live in SlotMaps with stable keys. Each update
/// brings every element's world state up to date and places it in the
/// highest-priority partition that accepts it. A catch-all
/// `UnboundedPartition` at `DEFAULT_PARTITION_PRIORITY` is always present, so
/// after an update every element has exactly one owner.
///
/// Queries (`query_frustum`, `query_volume`) are meaningful once at least one
/// update has run; on a never-updated scene their result is unspecified.

use std::cmp::Reverse;
use std::time::Instant;
use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use crate::bounds::BoundingVolume;
use crate::camera::Frustum;
use crate::error::Result;
use crate::{engine_debug, engine_err, engine_trace, engine_warn};
use super::element_bag::ElementBag;
use super::partition::{Partition, PartitionKey, DEFAULT_PARTITION_PRIORITY};
use super::render_queue::RenderSink;
use super::scene_element::{ElementType, SceneElement, SceneElementKey};
use super::unbounded_partition::UnboundedPartition;

/// Spatial scene coordinator.
pub struct Scene {
    elements: SlotMap<SceneElementKey, SceneElement>,
    /// Processing order of the elements
    order: ElementBag,
    partitions: SlotMap<PartitionKey, Box<dyn Partition>>,
    /// Partition keys, highest priority first
    partition_order: Vec<PartitionKey>,
    default_partition: PartitionKey,
    /// Index types fanned out to every partition
    indices: FxHashSet<ElementType>,
    /// A partition was added or removed since the last update
    topology_changed: bool,
    /// Update pass counter, 0 = never updated
    pass: u64,
    last_update: Option<Instant>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene holding only the catch-all partition.
    pub fn new() -> Self {
        let mut partitions: SlotMap<PartitionKey, Box<dyn Partition>> = SlotMap::with_key();
        let default_partition = partitions.insert(Box::new(
            UnboundedPartition::with_priority(DEFAULT_PARTITION_PRIORITY),
        ));

        Self {
            elements: SlotMap::with_key(),
            order: ElementBag::new(),
            partitions,
            partition_order: vec![default_partition],
            default_partition,
            indices: FxHashSet::default(),
            topology_changed: false,
            pass: 0,
            last_update: None,
        }
    }

    // ===== ELEMENTS =====

    /// Add an element. It is placed at the next update.
    pub fn add_element(&mut self, mut element: SceneElement) -> SceneElementKey {
        element.set_partition(None);
        element.last_pass = 0;
        let key = self.elements.insert(element);
        self.order.insert(key);
        key
    }

    /// Remove an element, detaching it from its partition first.
    pub fn remove_element(&mut self, key: SceneElementKey) -> Option<SceneElement> {
        let owner = self.elements.get(key)?.partition();
        if let Some(partition) = owner.and_then(|owner| self.partitions.get_mut(owner)) {
            partition.remove(key);
        }
        self.order.remove(key);

        let mut element = self.elements.remove(key)?;
        element.set_partition(None);
        Some(element)
    }

    pub fn element(&self, key: SceneElementKey) -> Option<&SceneElement> {
        self.elements.get(key)
    }

    /// Mutable access; local changes take effect at the next update.
    pub fn element_mut(&mut self, key: SceneElementKey) -> Option<&mut SceneElement> {
        self.elements.get_mut(key)
    }

    pub fn contains_element(&self, key: SceneElementKey) -> bool {
        self.elements.contains_key(key)
    }

    /// Iterate over all elements in processing order.
    pub fn elements(&self) -> impl Iterator<Item = (SceneElementKey, &SceneElement)> {
        self.order
            .keys()
            .iter()
            .filter_map(|&key| self.elements.get(key).map(|element| (key, element)))
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    // ===== PARTITIONS =====

    /// Add a partition. Every registered index is added to it and all
    /// elements are re-placed at the next update.
    pub fn add_partition(&mut self, partition: impl Partition + 'static) -> PartitionKey {
        self.add_boxed_partition(Box::new(partition))
    }

    pub fn add_boxed_partition(&mut self, mut partition: Box<dyn Partition>) -> PartitionKey {
        // Keys only mean something in the scene that placed them
        if !partition.is_empty() {
            engine_warn!("galaxy3d::Scene", "{} added with {} stray elements, dropping them",
                partition.name(), partition.len());
            partition.clear();
        }
        for &element_type in &self.indices {
            partition.add_index(element_type, &self.elements);
        }
        engine_debug!("galaxy3d::Scene", "Adding {} (priority {})",
            partition.name(), partition.priority());

        let key = self.partitions.insert(partition);
        self.partition_order.push(key);
        self.sort_partitions();
        self.topology_changed = true;
        key
    }

    /// Remove a partition and return it emptied.
    ///
    /// Its elements lose their owner and are placed again at the next update.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for the catch-all partition or an unknown key.
    pub fn remove_partition(&mut self, key: PartitionKey) -> Result<Box<dyn Partition>> {
        if key == self.default_partition {
            return Err(engine_err!("galaxy3d::Scene", "the default partition cannot be removed"));
        }
        let mut partition = self
            .partitions
            .remove(key)
            .ok_or_else(|| engine_err!("galaxy3d::Scene", "unknown partition {:?}", key))?;

        for element_key in partition.clear() {
            if let Some(element) = self.elements.get_mut(element_key) {
                element.set_partition(None);
            }
        }
        self.partition_order.retain(|&k| k != key);
        self.topology_changed = true;
        Ok(partition)
    }

    pub fn partition(&self, key: PartitionKey) -> Option<&dyn Partition> {
        let partition = self.partitions.get(key)?;
        Some(partition.as_ref())
    }

    /// Change a partition's priority. Every element is re-placed at the
    /// next update.
    ///
    /// Partitions are only reachable read-only otherwise: elements move in
    /// and out through `try_add_to_partition`, `remove_from_partition` and
    /// `clear_partition`, which keep each element's owner in sync.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an unknown key.
    pub fn set_partition_priority(&mut self, key: PartitionKey, priority: i32) -> Result<()> {
        let partition = self
            .partitions
            .get_mut(key)
            .ok_or_else(|| engine_err!("galaxy3d::Scene", "unknown partition {:?}", key))?;
        partition.set_priority(priority);
        Ok(())
    }

    /// Empty a partition, keeping it registered with its priority and the
    /// scene's indices. Returns the removed keys; those elements are placed
    /// again at the next update.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an unknown key.
    pub fn clear_partition(&mut self, key: PartitionKey) -> Result<Vec<SceneElementKey>> {
        let partition = self
            .partitions
            .get_mut(key)
            .ok_or_else(|| engine_err!("galaxy3d::Scene", "unknown partition {:?}", key))?;

        let removed = partition.clear();
        for &element_type in &self.indices {
            partition.add_index(element_type, &self.elements);
        }
        for &element_key in &removed {
            if let Some(element) = self.elements.get_mut(element_key) {
                element.set_partition(None);
            }
        }
        Ok(removed)
    }

    /// Partition keys, highest priority first, as of the last update or
    /// partition change.
    pub fn partition_keys(&self) -> &[PartitionKey] {
        &self.partition_order
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// The catch-all partition.
    pub fn default_partition(&self) -> PartitionKey {
        self.default_partition
    }

    /// Offer an element to one partition.
    ///
    /// On acceptance the element leaves its previous owner (if different) and
    /// records the new one; an element already owned by `partition` is
    /// refreshed in place. On rejection nothing changes.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` for an unknown partition or element key.
    pub fn try_add_to_partition(
        &mut self,
        partition: PartitionKey,
        element: SceneElementKey,
    ) -> Result<bool> {
        if !self.partitions.contains_key(partition) {
            return Err(engine_err!("galaxy3d::Scene", "unknown partition {:?}", partition));
        }
        if !self.elements.contains_key(element) {
            return Err(engine_err!("galaxy3d::Scene", "unknown element {:?}", element));
        }

        let accepted = self
            .partitions
            .get(partition)
            .zip(self.elements.get(element))
            .is_some_and(|(p, e)| p.accepts(e));
        if accepted {
            self.assign(element, partition);
        }
        Ok(accepted)
    }

    /// Take an element out of `partition`. Returns false if that partition
    /// does not own it.
    pub fn remove_from_partition(&mut self, partition: PartitionKey, element: SceneElementKey) -> bool {
        let owned = self
            .elements
            .get(element)
            .is_some_and(|e| e.partition() == Some(partition));
        if !owned {
            return false;
        }

        if let Some(p) = self.partitions.get_mut(partition) {
            p.remove(element);
        }
        if let Some(e) = self.elements.get_mut(element) {
            e.set_partition(None);
        }
        true
    }

    // ===== INDICES =====

    /// Register an index in every current and future partition.
    /// Returns false for the empty type or an already registered one.
    pub fn add_index(&mut self, element_type: ElementType) -> bool {
        if element_type.is_empty() || !self.indices.insert(element_type) {
            return false;
        }
        for partition in self.partitions.values_mut() {
            partition.add_index(element_type, &self.elements);
        }
        true
    }

    pub fn remove_index(&mut self, element_type: ElementType) -> bool {
        if !self.indices.remove(&element_type) {
            return false;
        }
        for partition in self.partitions.values_mut() {
            partition.remove_index(element_type);
        }
        true
    }

    pub fn indices(&self) -> impl Iterator<Item = ElementType> + '_ {
        self.indices.iter().copied()
    }

    /// Remove every element. Partitions, priorities and indices are kept.
    pub fn clear(&mut self) {
        for partition in self.partitions.values_mut() {
            partition.clear();
        }
        for &element_type in &self.indices {
            for partition in self.partitions.values_mut() {
                partition.add_index(element_type, &self.elements);
            }
        }
        self.elements.clear();
        self.order.drain();
    }

    // ===== UPDATE =====

    /// Number of update passes run so far.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Run one update pass with the time elapsed since the previous one
    /// (zero for the first).
    pub fn update_elapsed(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = self
            .last_update
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.update(dt)
    }

    /// Run one update pass.
    ///
    /// Partitions update first, highest priority first; if any reports an
    /// invalidation, or partitions were added or removed, every element is
    /// re-placed. Each element is then processed exactly once (after the
    /// element its updater depends on) and re-placed when needed.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `dt` is negative or not finite.
    pub fn update(&mut self, dt: f32) -> Result<()> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(engine_err!("galaxy3d::Scene",
                "time delta must be finite and >= 0, got {}", dt));
        }
        self.last_update = Some(Instant::now());

        self.sort_partitions();
        let mut force_all = self.topology_changed;
        for &key in &self.partition_order {
            if let Some(partition) = self.partitions.get_mut(key) {
                force_all |= partition.update(dt);
            }
        }

        self.pass += 1;
        let pass = self.pass;
        let mut placed = 0;
        let mut chain = Vec::new();
        for i in 0..self.order.len() {
            let key = self.order.keys()[i];
            placed += self.process(key, pass, dt, force_all, &mut chain);
        }

        self.topology_changed = false;
        engine_trace!("galaxy3d::Scene", "Update pass {}: {} elements, {} placed{}",
            pass, self.elements.len(), placed, if force_all { " (forced)" } else { "" });
        Ok(())
    }

    /// Stable sort, highest priority first.
    fn sort_partitions(&mut self) {
        let partitions = &self.partitions;
        self.partition_order
            .sort_by_key(|&key| Reverse(partitions.get(key).map_or(i32::MIN, |p| p.priority())));
    }

    /// Update one element, and first the chain of elements it depends on,
    /// skipping those already done this pass. `chain` is scratch space.
    /// Returns the number of elements placed.
    fn process(
        &mut self,
        key: SceneElementKey,
        pass: u64,
        dt: f32,
        force: bool,
        chain: &mut Vec<(SceneElementKey, Option<SceneElementKey>)>,
    ) -> usize {
        chain.clear();
        let mut next = Some(key);
        while let Some(current) = next {
            match self.elements.get_mut(current) {
                Some(element) if element.last_pass != pass => {
                    element.last_pass = pass;
                    let dependency = element.dependency();
                    chain.push((current, dependency));
                    next = dependency;
                }
                _ => break,
            }
        }

        // Deepest dependency first
        let mut placed = 0;
        while let Some((current, dependency)) = chain.pop() {
            if self.update_element(current, dependency, dt, force) {
                placed += 1;
            }
        }
        placed
    }

    /// Returns true if the element was placed.
    fn update_element(
        &mut self,
        key: SceneElementKey,
        dependency: Option<SceneElementKey>,
        dt: f32,
        force: bool,
    ) -> bool {
        let needs_placement = match dependency.and_then(|d| self.elements.get_disjoint_mut([key, d])) {
            Some([element, dependency]) => element.update(Some(&*dependency), dt, force),
            None => match self.elements.get_mut(key) {
                Some(element) => element.update(None, dt, force),
                None => return false,
            },
        };
        needs_placement && self.place(key)
    }

    /// Give an element to the first accepting partition.
    fn place(&mut self, key: SceneElementKey) -> bool {
        let Some(element) = self.elements.get(key) else {
            return false;
        };
        let target = self.partition_order.iter().copied().find(|&partition| {
            self.partitions.get(partition).is_some_and(|p| p.accepts(element))
        });

        match target {
            Some(target) => {
                self.assign(key, target);
                true
            }
            None => {
                engine_warn!("galaxy3d::Scene", "No partition accepted element {:?}", key);
                false
            }
        }
    }

    /// Move an element to `target`, leaving its previous owner exactly once.
    fn assign(&mut self, key: SceneElementKey, target: PartitionKey) {
        let Some(element) = self.elements.get(key) else {
            return;
        };
        if let Some(previous) = element.partition().filter(|&previous| previous != target) {
            if let Some(partition) = self.partitions.get_mut(previous) {
                partition.remove(key);
            }
        }
        if let Some(partition) = self.partitions.get_mut(target) {
            partition.insert(key, element);
        }
        if let Some(element) = self.elements.get_mut(key) {
            element.set_partition(Some(target));
        }
    }

    // ===== QUERIES =====

    /// Collect the elements of type `filter` that may be inside `frustum`.
    ///
    /// `results` is cleared first; its order is unspecified.
    pub fn query_frustum(
        &self,
        frustum: &Frustum,
        filter: ElementType,
        results: &mut Vec<SceneElementKey>,
    ) {
        results.clear();
        for &key in &self.partition_order {
            if let Some(partition) = self.partitions.get(key) {
                partition.query_frustum(frustum, filter, &self.elements, results);
            }
        }
    }

    /// Collect the elements of type `filter` whose world bounds intersect
    /// `volume`. `results` is cleared first.
    pub fn query_volume(
        &self,
        volume: &BoundingVolume,
        filter: ElementType,
        results: &mut Vec<SceneElementKey>,
    ) {
        results.clear();
        for &key in &self.partition_order {
            if let Some(partition) = self.partitions.get(key) {
                partition.query_volume(volume, filter, &self.elements, results);
            }
        }
    }

    /// Hand every element of type `filter` inside `frustum` to `sink`, in
    /// query order. Returns the number submitted.
    pub fn submit_visible(
        &self,
        frustum: &Frustum,
        filter: ElementType,
        sink: &mut dyn RenderSink,
    ) -> usize {
        let mut visible = Vec::new();
        self.query_frustum(frustum, filter, &mut visible);
        for &key in &visible {
            if let Some(element) = self.elements.get(key) {
                sink.submit(key, element);
            }
        }
        visible.len()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
