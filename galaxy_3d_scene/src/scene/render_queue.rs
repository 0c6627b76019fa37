/// Render queue hookup.
///
/// The scene hands visible elements to a `RenderSink` in query order. The
/// sink may reorder them for batching; `RenderQueue` is the stock sink that
/// records world matrices with a view-space depth and sorts them with a
/// radix sort.

use glam::{Mat4, Vec3};
use rdst::{RadixKey, RadixSort};
use crate::camera::View;
use super::scene_element::{SceneElement, SceneElementKey};

/// Receiver of the visible elements of a frame.
pub trait RenderSink {
    fn submit(&mut self, key: SceneElementKey, element: &SceneElement);
}

/// One queued element.
#[derive(Debug, Clone, Copy)]
pub struct RenderItem {
    pub key: SceneElementKey,
    pub world: Mat4,
    /// Distance along the view direction
    pub depth: f32,
    sort_key: u32,
}

impl RadixKey for RenderItem {
    const LEVELS: usize = 4;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        (self.sort_key >> (level * 8)) as u8
    }
}

/// Map an f32 to a u32 with the same ordering.
#[inline]
fn ordered_bits(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & 0x8000_0000 != 0 { !bits } else { bits | 0x8000_0000 }
}

/// Depth-sortable list of visible elements.
#[derive(Debug, Clone)]
pub struct RenderQueue {
    eye: Vec3,
    forward: Vec3,
    items: Vec<RenderItem>,
}

impl RenderQueue {
    /// Queue measuring depth from `eye` along `forward` (normalized here).
    pub fn new(eye: Vec3, forward: Vec3) -> Self {
        Self {
            eye,
            forward: forward.normalize_or_zero(),
            items: Vec::new(),
        }
    }

    pub fn for_view(view: &View) -> Self {
        Self::new(view.location(), view.direction())
    }

    pub fn items(&self) -> &[RenderItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Empty the queue, keeping its allocation and eye.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Nearest first, for opaque geometry.
    pub fn sort_front_to_back(&mut self) {
        for item in &mut self.items {
            item.sort_key = ordered_bits(item.depth);
        }
        self.items.radix_sort_unstable();
    }

    /// Farthest first, for blended geometry.
    pub fn sort_back_to_front(&mut self) {
        for item in &mut self.items {
            item.sort_key = !ordered_bits(item.depth);
        }
        self.items.radix_sort_unstable();
    }

    pub fn world_matrices(&self) -> Vec<Mat4> {
        self.items.iter().map(|item| item.world).collect()
    }

    /// World matrices packed for a GPU upload, in queue order.
    pub fn world_matrix_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.world_matrices()).to_vec()
    }
}

impl RenderSink for RenderQueue {
    fn submit(&mut self, key: SceneElementKey, element: &SceneElement) {
        let center = element
            .world_bounds()
            .map_or(element.world_transform().translation, |bounds| bounds.center());
        self.items.push(RenderItem {
            key,
            world: element.world_transform().to_mat4(),
            depth: (center - self.eye).dot(self.forward),
            sort_key: 0,
        });
    }
}

#[cfg(test)]
#[path = "render_queue_tests.rs"]
mod tests;
