/// RenderView — result of frustum culling.
///
/// Created by `FrustumCuller::cull()`. Holds a snapshot of the world-space
/// frustum and view matrices at culling time plus the keys of every element
/// the scene reported as potentially visible.
///
/// Ephemeral: lives for one frame. The caller may hand the same RenderView to
/// several passes.

use glam::Mat4;
use crate::scene::SceneElementKey;
use super::frustum::Frustum;

/// Result of frustum culling. Ephemeral — lives for one frame.
#[derive(Debug, Clone)]
pub struct RenderView {
    frustum: Frustum,
    view_matrix: Mat4,
    projection_matrix: Mat4,
    visible_elements: Vec<SceneElementKey>,
}

impl RenderView {
    /// Create a new RenderView (crate-internal: only culling creates these).
    pub(crate) fn new(
        frustum: Frustum,
        view_matrix: Mat4,
        projection_matrix: Mat4,
        visible_elements: Vec<SceneElementKey>,
    ) -> Self {
        Self {
            frustum,
            view_matrix,
            projection_matrix,
            visible_elements,
        }
    }

    /// World-space frustum used for the query.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Keys of potentially visible elements, in query order.
    pub fn visible_elements(&self) -> &[SceneElementKey] {
        &self.visible_elements
    }

    pub fn visible_count(&self) -> usize {
        self.visible_elements.len()
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
