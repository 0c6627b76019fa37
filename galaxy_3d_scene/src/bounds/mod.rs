//! Bounds module — spheres, axis-aligned boxes and the volume enum
//! the scene stores per element.

mod aabb;
mod sphere;
mod bounding_volume;

pub use aabb::AABB;
pub use sphere::Sphere;
pub use bounding_volume::BoundingVolume;

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
