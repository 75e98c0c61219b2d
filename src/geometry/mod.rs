//! Static visual-geometry data consumed by rendering hosts.
//!
//! Nothing here takes part in the simulation: these are constant lookup
//! tables and immutable data holders a host can hand to its renderer.

pub use self::barrel::{BarrelShape, VisualShapeBase};
pub use self::visual_mesh::VisualMesh;

mod barrel;
mod visual_mesh;
