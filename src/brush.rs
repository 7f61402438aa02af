use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use cgmath::Matrix4;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::change::{ShapeSnapshot, TransformSnapshot};
use crate::control_mesh::{build_control_mesh_with, ControlMesh};
use crate::csg::create_cutter;
use crate::error::CsgError;
use crate::math::{FVector, Tolerances};
use crate::shape::Shape;
use crate::transform::BrushTransform;

/// Identity of a brush inside a model, independent of its generated meshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CsgOperationType {
    #[default]
    Additive,
    Subtractive,
    Intersecting,
}

impl FromStr for CsgOperationType {
    type Err = CsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADD" | "ADDITIVE" => Ok(CsgOperationType::Additive),
            "SUBTRACT" | "SUBTRACTIVE" => Ok(CsgOperationType::Subtractive),
            "INTERSECT" | "INTERSECTING" => Ok(CsgOperationType::Intersecting),
            _ => Err(CsgError::UnknownOperation(s.to_string())),
        }
    }
}

/// Which kinds of content a brush contributes to. Brushes only interact
/// when their layers overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentLayers(u32);

bitflags! {
    impl ContentLayers : u32 {
        const Solid     = 0x0001;
        const Liquid    = 0x0002;
        const Volume    = 0x0004;
        /// Detail geometry, composed separately from the structural solid.
        const Detail    = 0x0008;
    }
}

impl Default for ContentLayers {
    fn default() -> Self {
        ContentLayers::Solid
    }
}

#[derive(Clone, Debug)]
pub struct Brush {
    pub node_id: NodeId,
    pub shape: Shape,
    /// Last successfully built mesh. Kept when a later rebuild fails.
    pub control_mesh: Option<ControlMesh>,
    pub operation: CsgOperationType,
    pub content_layers: ContentLayers,
    pub transform: BrushTransform,
    /// False when the current shape could not be built into a mesh.
    pub is_valid: bool,
    pub(crate) shape_snapshot: ShapeSnapshot,
    pub(crate) transform_snapshot: TransformSnapshot,
}

impl Brush {
    pub fn new(node_id: NodeId, shape: Shape, operation: CsgOperationType, transform: BrushTransform) -> Brush {
        Brush {
            node_id,
            shape,
            control_mesh: None,
            operation,
            content_layers: ContentLayers::default(),
            transform,
            is_valid: false,
            shape_snapshot: ShapeSnapshot::default(),
            transform_snapshot: TransformSnapshot::default(),
        }
    }

    pub fn with_content_layers(mut self, content_layers: ContentLayers) -> Brush {
        self.content_layers = content_layers;
        self
    }

    pub fn shape_snapshot(&self) -> &ShapeSnapshot {
        &self.shape_snapshot
    }

    pub fn transform_snapshot(&self) -> &TransformSnapshot {
        &self.transform_snapshot
    }

    pub fn rebuild_control_mesh(&mut self) -> Result<(), CsgError> {
        self.rebuild_control_mesh_with(&Tolerances::default())
    }

    /// Rebuild the control mesh from the current shape. On failure the
    /// previous mesh is kept and the brush is flagged invalid.
    pub fn rebuild_control_mesh_with(&mut self, tolerances: &Tolerances) -> Result<(), CsgError> {
        match build_control_mesh_with(&self.shape, tolerances) {
            Ok(mesh) => {
                debug!("Brush {} rebuilt: {} vertices, {} polygons", self.node_id, mesh.vertices.len(), mesh.polygons.len());
                self.shape.cut_nodes = create_cutter(&mesh);
                self.control_mesh = Some(mesh);
                self.is_valid = true;
                Ok(())
            }
            Err(error) => {
                warn!("Brush {} is invalid, keeping its previous mesh: {}", self.node_id, error);
                self.is_valid = false;
                Err(error)
            }
        }
    }

    pub fn local_to_world(&self) -> Matrix4<f32> {
        self.transform.local_to_world()
    }

    /// Control mesh vertices in world space; empty without a mesh.
    pub fn world_vertices(&self) -> Vec<FVector> {
        match &self.control_mesh {
            Some(mesh) => mesh.transformed_vertices(&self.local_to_world()),
            None => Vec::new(),
        }
    }

    pub fn shares_layer_with(&self, other: &Brush) -> bool {
        self.content_layers.intersects(other.content_layers)
    }
}
