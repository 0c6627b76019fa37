//! Scene management module
//!
//! Provides the scene coordinator, its elements and partitions, and the
//! culling / render-queue hookup.

mod scene_element;
mod updater;
mod element_bag;
mod partition;
mod unbounded_partition;
mod region_partition;
mod octree_partition;
mod scene;
mod culler;
mod render_queue;

pub use scene_element::{ElementType, SceneElement, SceneElementKey};
pub use updater::{AttachmentUpdater, BoundsProvider, BoundsShape, ElementUpdater, VertexBounds};
pub use element_bag::{ElementBag, IndexedBag, TypeIndex};
pub use partition::{Partition, PartitionKey, DEFAULT_PARTITION_PRIORITY};
pub use unbounded_partition::UnboundedPartition;
pub use region_partition::RegionPartition;
pub use octree_partition::{OctreePartition, MAX_OCTREE_DEPTH};
pub use scene::Scene;
pub use culler::{BruteForceCuller, CameraCuller, FrustumCuller};
pub use render_queue::{RenderItem, RenderQueue, RenderSink};
