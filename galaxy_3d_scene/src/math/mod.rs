//! Math module — affine transforms on top of glam.

mod transform;

pub use transform::{Axis, Transform};
