//! Camera module — frustum, view and culling results.
//!
//! A `View` is owned and driven by the caller (one per camera). The scene
//! only reads its world-space `Frustum` when answering visibility queries.

mod frustum;
mod view;
mod render_view;

pub use frustum::{
    Frustum, FrustumTest, PlaneHint, PlaneMask,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR, PLANE_COUNT,
};
pub use view::{Projection, View};
pub use render_view::RenderView;
