//! Batch editing operations on brush selections: bounds, flipping, general
//! shape transforms and grid snapping.

use cgmath::{Matrix4, SquareMatrix};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::bounds::AABB;
use crate::brush::{Brush, NodeId};
use crate::control_mesh::ControlMesh;
use crate::error::CsgError;
use crate::math::{snap_value, zero_vector, FVector, Tolerances};
use crate::shape::Shape;
use crate::surface::Surface;

/// Point a selection is transformed around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotMode {
    /// Center of the selection's combined bounds.
    #[default]
    Global,
    /// Each brush's own origin.
    Local,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    X,
    Y,
    Z,
}

impl FlipAxis {
    /// Mirror matrix across the plane through the origin orthogonal to the axis.
    pub fn matrix(&self) -> Matrix4<f32> {
        match self {
            FlipAxis::X => Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0),
            FlipAxis::Y => Matrix4::from_nonuniform_scale(1.0, -1.0, 1.0),
            FlipAxis::Z => Matrix4::from_nonuniform_scale(1.0, 1.0, -1.0),
        }
    }
}

/// World space bounds of a brush's control mesh. Empty sentinel without one.
pub fn compute_bounds(brush: &Brush) -> AABB {
    AABB::from_points(&brush.world_vertices())
}

pub fn compute_bounds_of(brushes: &[&Brush]) -> AABB {
    let mut bounds = AABB::new();
    for brush in brushes {
        bounds.add_box(&compute_bounds(brush));
    }
    bounds
}

pub fn compute_bounds_of_points(points: &[FVector]) -> AABB {
    AABB::from_points(points)
}

fn global_pivot(brushes: &[&mut Brush]) -> FVector {
    let refs: Vec<&Brush> = brushes.iter().map(|brush| &**brush).collect();
    let bounds = compute_bounds_of(&refs);
    if bounds.is_valid() {
        return bounds.center();
    }
    if brushes.is_empty() {
        return zero_vector();
    }
    let sum = brushes.iter().fold(zero_vector(), |sum, brush| sum + brush.transform.position);
    sum / brushes.len() as f32
}

/// Apply a world space matrix to the shapes of a selection, around the pivot,
/// and rebuild every control mesh. Brush transforms are left as they are.
///
/// If any brush fails to rebuild, every brush of the batch is restored and
/// `RebuildFailure` lists the brushes that failed.
pub fn transform_shapes(brushes: &mut [&mut Brush], matrix: &Matrix4<f32>, pivot: PivotMode, tolerances: &Tolerances) -> Result<(), CsgError> {
    let global = global_pivot(brushes);
    let backup: Vec<(Shape, Option<ControlMesh>, bool)> = brushes.iter()
        .map(|brush| (brush.shape.clone(), brush.control_mesh.clone(), brush.is_valid))
        .collect();

    let mut failed: Vec<NodeId> = Vec::new();
    for brush in brushes.iter_mut() {
        let pivot_point = match pivot {
            PivotMode::Global => global,
            PivotMode::Local => brush.transform.position,
        };
        if let Err(error) = transform_shape(brush, matrix, pivot_point, tolerances) {
            debug!("Brush {} failed to transform: {}", brush.node_id, error);
            failed.push(brush.node_id);
        }
    }

    if failed.is_empty() {
        return Ok(());
    }

    warn!("Rolling back transform of {} brushes, {} failed", brushes.len(), failed.len());
    for (brush, (shape, control_mesh, is_valid)) in brushes.iter_mut().zip(backup) {
        brush.shape = shape;
        brush.control_mesh = control_mesh;
        brush.is_valid = is_valid;
    }
    Err(CsgError::RebuildFailure { failed })
}

fn transform_shape(brush: &mut Brush, matrix: &Matrix4<f32>, pivot: FVector, tolerances: &Tolerances) -> Result<(), CsgError> {
    let world = Matrix4::from_translation(pivot) * *matrix * Matrix4::from_translation(-pivot);
    let local_to_world = brush.transform.local_to_world();
    let world_to_local = brush.transform.world_to_local()?;
    let local = world_to_local * world * local_to_world;
    if local.determinant().abs() < f32::EPSILON {
        return Err(CsgError::SingularTransform);
    }

    let surfaces = brush.shape.surfaces.iter()
        .map(|surface| surface.transform(&local))
        .collect::<Option<Vec<Surface>>>()
        .ok_or(CsgError::SingularTransform)?;
    brush.shape.surfaces = surfaces;
    brush.rebuild_control_mesh_with(tolerances)
}

/// Mirror a selection along an axis. All or nothing, see `transform_shapes`.
pub fn flip(brushes: &mut [&mut Brush], axis: FlipAxis, pivot: PivotMode, tolerances: &Tolerances) -> Result<(), CsgError> {
    transform_shapes(brushes, &axis.matrix(), pivot, tolerances)
}

/// Move a selection by one shared offset so that some vertex lands on the
/// grid. Per axis the offset is the smallest one over all world vertices.
/// Returns the applied offset, or `None` when the selection has no geometry.
pub fn snap_to_grid(brushes: &mut [&mut Brush], grid_spacing: f32) -> Option<FVector> {
    if grid_spacing <= 0.0 {
        return None;
    }

    let mut delta: Option<FVector> = None;
    for brush in brushes.iter() {
        for vertex in brush.world_vertices() {
            let offset = FVector::new(
                snap_value(vertex.x, grid_spacing) - vertex.x,
                snap_value(vertex.y, grid_spacing) - vertex.y,
                snap_value(vertex.z, grid_spacing) - vertex.z,
            );
            delta = Some(match delta {
                None => offset,
                Some(current) => FVector::new(
                    smallest(current.x, offset.x),
                    smallest(current.y, offset.y),
                    smallest(current.z, offset.z),
                ),
            });
        }
    }

    let delta = delta?;
    for brush in brushes.iter_mut() {
        brush.transform = brush.transform.translated(delta);
    }
    debug!("Snapped {} brushes by {:?}", brushes.len(), delta);
    Some(delta)
}

fn smallest(a: f32, b: f32) -> f32 {
    if b.abs() < a.abs() { b } else { a }
}
