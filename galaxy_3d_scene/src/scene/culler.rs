/// Camera culling strategies.
///
/// A CameraCuller determines which scene elements are visible from a view
/// and packages them in a RenderView. Culling also refreshes each element's
/// potentially-visible flag, which the next scene update resets.

use crate::camera::{RenderView, View};
use super::scene::Scene;
use super::scene_element::{ElementType, SceneElementKey};

/// Strategy for determining visible elements from a view.
///
/// Called once per frame after `Scene::update`. `&mut self` allows stateful
/// implementations to keep scratch buffers across frames.
pub trait CameraCuller {
    fn cull(&mut self, scene: &mut Scene, view: &mut View, filter: ElementType) -> RenderView;
}

/// Returns every element of the requested type, no spatial test.
///
/// Baseline for comparing culling strategies.
#[derive(Debug, Default)]
pub struct BruteForceCuller;

impl BruteForceCuller {
    pub fn new() -> Self {
        Self
    }
}

impl CameraCuller for BruteForceCuller {
    fn cull(&mut self, scene: &mut Scene, view: &mut View, filter: ElementType) -> RenderView {
        let visible: Vec<SceneElementKey> = scene
            .elements()
            .filter(|(_, element)| element.element_type().matches(filter))
            .map(|(key, _)| key)
            .collect();
        mark_visible(scene, &visible);
        RenderView::new(*view.frustum(), view.view_matrix(), view.projection_matrix(), visible)
    }
}

/// Queries the scene's partitions with the view frustum.
#[derive(Debug, Default)]
pub struct FrustumCuller {
    scratch: Vec<SceneElementKey>,
}

impl FrustumCuller {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CameraCuller for FrustumCuller {
    fn cull(&mut self, scene: &mut Scene, view: &mut View, filter: ElementType) -> RenderView {
        let frustum = *view.frustum();
        scene.query_frustum(&frustum, filter, &mut self.scratch);
        mark_visible(scene, &self.scratch);
        RenderView::new(frustum, view.view_matrix(), view.projection_matrix(), self.scratch.clone())
    }
}

fn mark_visible(scene: &mut Scene, keys: &[SceneElementKey]) {
    for &key in keys {
        if let Some(element) = scene.element_mut(key) {
            element.set_potentially_visible(true);
        }
    }
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod tests;
