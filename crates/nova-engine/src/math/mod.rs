//! Math built on top of `glam`: hierarchical transforms.

mod transform;

pub use transform::{NodeId, TransformChange, TransformError, TransformEvent, TransformTree};
