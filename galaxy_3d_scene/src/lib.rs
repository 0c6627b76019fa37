/*!
# Galaxy 3D Scene

Spatial scene management for the Galaxy 3D engine.

A `Scene` owns a dynamic set of elements and a set of partitions that divide
them. Each frame it brings every element's world transform and bounds up to
date, places each element in the highest-priority partition that accepts it,
and answers frustum and volume queries for the rendering front-end.

## Architecture

- **Transform**: affine placement with non-uniform scale
- **BoundingVolume**: sphere or axis-aligned box, with frustum classification
- **View / Frustum**: camera placement and projection with lazily cached planes
- **SceneElement**: local and world state of one spatial element
- **Partition**: spatial subdivision strategy (unbounded, region, octree)
- **Scene**: per-frame update protocol and aggregated queries
- **CameraCuller / RenderQueue**: visibility results handed to rendering
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod math;
pub mod bounds;
pub mod camera;
pub mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::{Engine, DEFAULT_MIN_SEVERITY};

    // Core types
    pub use crate::math::{Axis, Transform};
    pub use crate::bounds::{BoundingVolume, Sphere, AABB};
    pub use crate::camera::{Frustum, FrustumTest, PlaneHint, PlaneMask, Projection, RenderView, View};
    pub use crate::scene::{Scene, SceneElement, SceneElementKey, ElementType, Partition, PartitionKey};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
