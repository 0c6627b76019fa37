/// OctreePartition — static octree over a fixed region.
///
/// Each element is stored in exactly one node: the deepest node whose box
/// fully contains the element's world bounds. An element straddling a child
/// boundary stays in the parent. The node array is allocated up front with
/// every node down to `max_depth`, laid out depth-first.
///
/// Frustum queries walk the tree: an Outside node prunes its subtree, an
/// Inside node yields its whole subtree without further tests, and an
/// Intersect node tests its own elements and recurses. Planes that fully
/// contain a node are passed down so children skip them.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use glam::Vec3;
use crate::bounds::{BoundingVolume, AABB};
use crate::camera::{Frustum, FrustumTest, PlaneHint, PlaneMask};
use crate::error::Result;
use crate::engine_err;
use super::partition::{Partition, Priority};
use super::scene_element::{ElementType, SceneElement, SceneElementKey};

/// Index of the root node in the flat node array.
const ROOT: usize = 0;

/// Deepest tree accepted by `OctreePartition::new` (299593 nodes).
pub const MAX_OCTREE_DEPTH: u32 = 6;

struct OctreeNode {
    bounds: AABB,
    /// Index of the first child (0 = leaf)
    first_child: usize,
    elements: Vec<SceneElementKey>,
}

/// Query state shared by the recursive frustum walk.
struct FrustumQuery<'a> {
    frustum: &'a Frustum,
    filter: ElementType,
    elements: &'a SlotMap<SceneElementKey, SceneElement>,
    /// Plane coherence across sibling nodes
    node_hint: PlaneHint,
}

pub struct OctreePartition {
    priority: Priority,
    nodes: Vec<OctreeNode>,
    max_depth: u32,
    /// subtree_sizes[d] = node count of a subtree of depth d
    subtree_sizes: Vec<usize>,
    /// Node holding each element
    locations: FxHashMap<SceneElementKey, usize>,
    /// Registered index types; lookups go through the tree instead
    indices: FxHashSet<ElementType>,
}

impl OctreePartition {
    /// Create over `region` with `max_depth` levels below the root and
    /// priority 0.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `max_depth` exceeds [`MAX_OCTREE_DEPTH`]
    /// or the region is inverted or not finite.
    pub fn new(region: AABB, max_depth: u32) -> Result<Self> {
        if max_depth > MAX_OCTREE_DEPTH {
            return Err(engine_err!("galaxy3d::OctreePartition",
                "max_depth {} exceeds {}", max_depth, MAX_OCTREE_DEPTH));
        }
        if !region.min.is_finite() || !region.max.is_finite() || !region.min.cmple(region.max).all() {
            return Err(engine_err!("galaxy3d::OctreePartition",
                "invalid region {:?} .. {:?}", region.min, region.max));
        }

        let total = Self::node_count(max_depth);
        let mut nodes = Vec::with_capacity(total);
        Self::build(&mut nodes, region, 0, max_depth);
        debug_assert_eq!(nodes.len(), total);

        Ok(Self {
            priority: Priority::new(0),
            nodes,
            max_depth,
            subtree_sizes: (0..=max_depth).map(Self::node_count).collect(),
            locations: FxHashMap::default(),
            indices: FxHashSet::default(),
        })
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Priority::new(priority);
        self
    }

    pub fn region(&self) -> &AABB {
        &self.nodes[ROOT].bounds
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// (8^(d+1) - 1) / 7
    fn node_count(depth: u32) -> usize {
        (0..=depth).map(|level| 8usize.pow(level)).sum()
    }

    fn build(nodes: &mut Vec<OctreeNode>, bounds: AABB, depth: u32, max_depth: u32) {
        let index = nodes.len();
        nodes.push(OctreeNode { bounds, first_child: 0, elements: Vec::new() });
        if depth >= max_depth {
            return;
        }

        let center = bounds.center();
        nodes[index].first_child = nodes.len();
        for octant in 0..8u8 {
            Self::build(nodes, Self::octant_bounds(&bounds, center, octant), depth + 1, max_depth);
        }
    }

    /// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low half).
    fn octant_bounds(parent: &AABB, center: Vec3, octant: u8) -> AABB {
        let high = glam::BVec3::new(octant & 1 != 0, octant & 2 != 0, octant & 4 != 0);
        AABB {
            min: Vec3::select(high, center, parent.min),
            max: Vec3::select(high, parent.max, center),
        }
    }

    fn point_octant(center: Vec3, point: Vec3) -> u8 {
        (point.x >= center.x) as u8
            | (((point.y >= center.y) as u8) << 1)
            | (((point.z >= center.z) as u8) << 2)
    }

    /// Children of `node` at `depth`, or None for a leaf.
    fn children(&self, node: usize, depth: u32) -> Option<impl Iterator<Item = usize> + use<>> {
        let first = self.nodes[node].first_child;
        if first == 0 || depth >= self.max_depth {
            return None;
        }
        let stride = self.subtree_sizes[(self.max_depth - depth - 1) as usize];
        Some((0..8).map(move |octant| first + octant * stride))
    }

    /// Deepest node fully containing `bounds`; the root for anything that
    /// does not fit.
    fn target_node(&self, bounds: Option<&AABB>) -> usize {
        let Some(bounds) = bounds else {
            return ROOT;
        };
        if !self.nodes[ROOT].bounds.contains(bounds) {
            return ROOT;
        }

        let mut node = ROOT;
        let mut depth = 0;
        while depth < self.max_depth && self.nodes[node].first_child != 0 {
            let center = self.nodes[node].bounds.center();
            let low = Self::point_octant(center, bounds.min);
            if low != Self::point_octant(center, bounds.max) {
                break;
            }
            let stride = self.subtree_sizes[(self.max_depth - depth - 1) as usize];
            node = self.nodes[node].first_child + low as usize * stride;
            depth += 1;
        }
        node
    }

    fn detach(&mut self, key: SceneElementKey, node: usize) {
        let list = &mut self.nodes[node].elements;
        if let Some(pos) = list.iter().position(|&k| k == key) {
            list.swap_remove(pos);
        }
    }

    // ===== QUERIES =====

    fn query_node(
        &self,
        node: usize,
        depth: u32,
        mask: PlaneMask,
        query: &FrustumQuery<'_>,
        results: &mut Vec<SceneElementKey>,
    ) {
        let (class, mask) = query.frustum.classify_aabb(&self.nodes[node].bounds, mask, &query.node_hint);
        match class {
            FrustumTest::Outside => {
                if node == ROOT {
                    self.collect_unbounded(query.filter, query.elements, results);
                }
            }
            FrustumTest::Inside => self.collect_subtree(node, depth, query.filter, query.elements, results),
            FrustumTest::Intersect => {
                for &key in &self.nodes[node].elements {
                    let Some(element) = query.elements.get(key) else { continue };
                    if !element.element_type().matches(query.filter) {
                        continue;
                    }
                    let visible = element.world_bounds().is_none_or(|bounds| {
                        bounds.classify(query.frustum, mask, element.plane_hint()).0 != FrustumTest::Outside
                    });
                    if visible {
                        results.push(key);
                    }
                }
                if let Some(children) = self.children(node, depth) {
                    for child in children {
                        self.query_node(child, depth + 1, mask, query, results);
                    }
                }
            }
        }
    }

    fn query_volume_node(
        &self,
        node: usize,
        depth: u32,
        volume: &BoundingVolume,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    ) {
        if !BoundingVolume::Aabb(self.nodes[node].bounds).intersects(volume) {
            if node == ROOT {
                self.collect_unbounded(filter, elements, results);
            }
            return;
        }

        for &key in &self.nodes[node].elements {
            let Some(element) = elements.get(key) else { continue };
            if element.element_type().matches(filter)
                && element.world_bounds().is_none_or(|bounds| bounds.intersects(volume))
            {
                results.push(key);
            }
        }
        if let Some(children) = self.children(node, depth) {
            for child in children {
                self.query_volume_node(child, depth + 1, volume, filter, elements, results);
            }
        }
    }

    /// Every element of the subtree, type filter only.
    fn collect_subtree(
        &self,
        node: usize,
        depth: u32,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    ) {
        results.extend(self.nodes[node].elements.iter().copied().filter(|&key| {
            elements.get(key).is_some_and(|element| element.element_type().matches(filter))
        }));
        if let Some(children) = self.children(node, depth) {
            for child in children {
                self.collect_subtree(child, depth + 1, filter, elements, results);
            }
        }
    }

    /// Unbounded elements sit at the root and match whatever the root test says.
    fn collect_unbounded(
        &self,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    ) {
        results.extend(self.nodes[ROOT].elements.iter().copied().filter(|&key| {
            elements.get(key).is_some_and(|element| {
                element.world_bounds().is_none() && element.element_type().matches(filter)
            })
        }));
    }
}

// ===== PARTITION TRAIT =====

impl Partition for OctreePartition {
    fn name(&self) -> &str {
        "OctreePartition"
    }

    fn priority(&self) -> i32 {
        self.priority.get()
    }

    fn set_priority(&mut self, priority: i32) {
        self.priority.set(priority);
    }

    fn accepts(&self, element: &SceneElement) -> bool {
        element
            .world_bounds()
            .is_some_and(|bounds| self.nodes[ROOT].bounds.contains(&bounds.bounding_box()))
    }

    fn insert(&mut self, key: SceneElementKey, element: &SceneElement) {
        let bounds = element.world_bounds().map(BoundingVolume::bounding_box);
        let target = self.target_node(bounds.as_ref());

        match self.locations.get(&key) {
            Some(&node) if node == target => return,
            Some(&node) => self.detach(key, node),
            None => {}
        }
        self.nodes[target].elements.push(key);
        self.locations.insert(key, target);
    }

    fn remove(&mut self, key: SceneElementKey) -> bool {
        match self.locations.remove(&key) {
            Some(node) => {
                self.detach(key, node);
                true
            }
            None => false,
        }
    }

    fn contains(&self, key: SceneElementKey) -> bool {
        self.locations.contains_key(&key)
    }

    fn len(&self) -> usize {
        self.locations.len()
    }

    fn keys(&self) -> Vec<SceneElementKey> {
        self.locations.keys().copied().collect()
    }

    fn query_frustum(
        &self,
        frustum: &Frustum,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    ) {
        let query = FrustumQuery { frustum, filter, elements, node_hint: PlaneHint::new() };
        self.query_node(ROOT, 0, PlaneMask::empty(), &query, results);
    }

    fn query_volume(
        &self,
        volume: &BoundingVolume,
        filter: ElementType,
        elements: &SlotMap<SceneElementKey, SceneElement>,
        results: &mut Vec<SceneElementKey>,
    ) {
        self.query_volume_node(ROOT, 0, volume, filter, elements, results);
    }

    fn add_index(
        &mut self,
        element_type: ElementType,
        _elements: &SlotMap<SceneElementKey, SceneElement>,
    ) {
        if !element_type.is_empty() {
            self.indices.insert(element_type);
        }
    }

    fn remove_index(&mut self, element_type: ElementType) -> bool {
        self.indices.remove(&element_type)
    }

    fn has_index(&self, element_type: ElementType) -> bool {
        self.indices.contains(&element_type)
    }

    fn clear(&mut self) -> Vec<SceneElementKey> {
        for node in &mut self.nodes {
            node.elements.clear();
        }
        self.indices.clear();
        self.locations.drain().map(|(key, _)| key).collect()
    }

    fn update(&mut self, _dt: f32) -> bool {
        self.priority.take_changed()
    }
}

#[cfg(test)]
#[path = "octree_partition_tests.rs"]
mod tests;
