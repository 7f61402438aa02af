pub mod math;
pub mod plane;
pub mod surface;
pub mod shape;
pub mod bounds;
pub mod transform;
pub mod control_mesh;
pub mod polygon;
pub mod csg;
pub mod brush;
pub mod change;
pub mod mesh_cache;
pub mod operations;
pub mod settings;
pub mod model;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use bounds::AABB;
pub use brush::{Brush, ContentLayers, CsgOperationType, NodeId};
pub use control_mesh::{build_control_mesh, build_control_mesh_with, ControlMesh};
pub use error::CsgError;
pub use math::{FVector, Tolerances};
pub use model::{CsgModel, UpdateReport};
pub use plane::Plane;
pub use settings::CsgSettings;
pub use shape::Shape;
pub use surface::{MaterialId, PhysicsMaterialId, Surface, TexGen, TexGenFlags};
pub use transform::BrushTransform;
