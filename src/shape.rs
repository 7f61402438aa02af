use cgmath::InnerSpace;
use serde::{Deserialize, Serialize};

use crate::csg::CutNode;
use crate::error::CsgError;
use crate::math::{FVector, Tolerances};
use crate::plane::Plane;
use crate::surface::{Surface, TexGen};

/// The half-space representation of a brush: the solid is the set of points
/// behind every surface's plane.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub surfaces: Vec<Surface>,
    /// Cutting tree derived from the surfaces; rebuilt together with the control mesh.
    #[serde(default)]
    pub cut_nodes: Vec<CutNode>,
}

impl Shape {
    pub fn new(surfaces: Vec<Surface>) -> Shape {
        Shape { surfaces, cut_nodes: Vec::new() }
    }

    pub fn from_planes(planes: &[Plane]) -> Shape {
        Shape::new(planes.iter().map(|plane| Surface::new(*plane)).collect())
    }

    /// Axis aligned box between `min` and `max`. Surfaces are ordered
    /// +X, -X, +Y, -Y, +Z, -Z.
    pub fn new_box(min: FVector, max: FVector) -> Shape {
        let planes = [
            Plane { normal: FVector::unit_x(), distance: max.x },
            Plane { normal: -FVector::unit_x(), distance: -min.x },
            Plane { normal: FVector::unit_y(), distance: max.y },
            Plane { normal: -FVector::unit_y(), distance: -min.y },
            Plane { normal: FVector::unit_z(), distance: max.z },
            Plane { normal: -FVector::unit_z(), distance: -min.z },
        ];
        Shape::from_planes(&planes)
    }

    /// Cube with edge length `size`, centered on the origin.
    pub fn new_cube(size: f32) -> Shape {
        let half = size * 0.5;
        Shape::new_box(FVector::new(-half, -half, -half), FVector::new(half, half, half))
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn planes(&self) -> impl Iterator<Item = &Plane> + '_ {
        self.surfaces.iter().map(|surface| &surface.plane)
    }

    /// Set the same texture generator on every surface.
    pub fn set_tex_gen(&mut self, tex_gen: &TexGen) {
        for surface in &mut self.surfaces {
            surface.tex_gen = tex_gen.clone();
        }
    }

    /// Whether the point is inside (or on) every half-space.
    pub fn contains(&self, point: FVector, epsilon: f32) -> bool {
        self.planes().all(|plane| plane.distance_to(point) <= epsilon)
    }

    /// Check the per-surface invariants: unit normals and a texture basis
    /// orthogonal to them.
    pub fn validate(&self, tolerances: &Tolerances) -> Result<(), CsgError> {
        for (index, surface) in self.surfaces.iter().enumerate() {
            let length = surface.plane.normal.magnitude();
            if (length - 1.0).abs() > tolerances.normal * 10.0 {
                return Err(CsgError::degenerate(format!("surface {} has a non-unit normal ({})", index, length)));
            }
            if surface.tangent.dot(surface.plane.normal).abs() > tolerances.normal * 10.0
                || surface.binormal.dot(surface.plane.normal).abs() > tolerances.normal * 10.0
            {
                return Err(CsgError::degenerate(format!("surface {} has a texture basis that is not orthogonal to its normal", index)));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CsgError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Shape, CsgError> {
        Ok(serde_json::from_str(json)?)
    }
}
