//! Detection of shape and transform edits between update passes.
//!
//! Detection never mutates anything; only the `commit_*` functions update the
//! stored snapshots.

use cgmath::{Matrix4, SquareMatrix};
use log::{trace, warn};

use crate::brush::Brush;
use crate::math::Tolerances;
use crate::shape::Shape;
use crate::surface::Surface;
use crate::transform::BrushTransform;

/// Surfaces of a shape as of the last commit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeSnapshot {
    surfaces: Vec<Surface>,
}

impl ShapeSnapshot {
    pub fn capture(shape: &Shape) -> ShapeSnapshot {
        ShapeSnapshot { surfaces: shape.surfaces.clone() }
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// The snapshot no longer has the shape's layout. Always counts as a change.
    pub fn is_stale(&self, shape: &Shape) -> bool {
        self.surfaces.len() != shape.surfaces.len()
    }

    pub fn differs_from(&self, shape: &Shape, tolerances: &Tolerances) -> bool {
        if self.is_stale(shape) {
            return true;
        }
        self.surfaces.iter()
            .zip(shape.surfaces.iter())
            .any(|(old, new)| !old.is_same(new, tolerances))
    }
}

/// Transform as of the last commit, with the matrices derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSnapshot {
    /// `None` until the first commit.
    pub transform: Option<BrushTransform>,
    /// Brush space to world space.
    pub plane_to_object: Matrix4<f32>,
    /// World space to brush space.
    pub object_to_plane: Matrix4<f32>,
    /// How many times the matrices were recomputed.
    pub matrix_updates: u64,
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        TransformSnapshot {
            transform: None,
            plane_to_object: Matrix4::identity(),
            object_to_plane: Matrix4::identity(),
            matrix_updates: 0,
        }
    }
}

impl TransformSnapshot {
    pub fn differs_from(&self, transform: &BrushTransform, tolerances: &Tolerances) -> bool {
        match &self.transform {
            Some(previous) => !previous.is_same(transform, tolerances),
            None => true,
        }
    }
}

pub fn has_shape_changed(brush: &Brush) -> bool {
    has_shape_changed_with(brush, &Tolerances::default())
}

pub fn has_shape_changed_with(brush: &Brush, tolerances: &Tolerances) -> bool {
    brush.shape_snapshot.differs_from(&brush.shape, tolerances)
}

pub fn has_transform_changed(brush: &Brush) -> bool {
    has_transform_changed_with(brush, &Tolerances::default())
}

pub fn has_transform_changed_with(brush: &Brush, tolerances: &Tolerances) -> bool {
    brush.transform_snapshot.differs_from(&brush.transform, tolerances)
}

pub fn commit_shape(brush: &mut Brush) {
    brush.shape_snapshot = ShapeSnapshot::capture(&brush.shape);
}

pub fn commit_transform(brush: &mut Brush) -> bool {
    commit_transform_with(brush, &Tolerances::default())
}

/// Store the live transform. Matrices are only recomputed when the transform
/// moved beyond tolerance; returns whether that happened. Movements within
/// tolerance leave the snapshot untouched, so drift is measured from the last
/// committed transform.
pub fn commit_transform_with(brush: &mut Brush, tolerances: &Tolerances) -> bool {
    if !brush.transform_snapshot.differs_from(&brush.transform, tolerances) {
        return false;
    }

    let plane_to_object = brush.transform.local_to_world();
    let object_to_plane = match plane_to_object.invert() {
        Some(inverse) => inverse,
        None => {
            warn!("Brush {} has a singular transform", brush.node_id);
            Matrix4::identity()
        }
    };

    let snapshot = &mut brush.transform_snapshot;
    snapshot.transform = Some(brush.transform);
    snapshot.plane_to_object = plane_to_object;
    snapshot.object_to_plane = object_to_plane;
    snapshot.matrix_updates += 1;
    trace!("Brush {} transform committed", brush.node_id);
    true
}

/// Commit both snapshots.
pub fn commit(brush: &mut Brush) {
    commit_with(brush, &Tolerances::default());
}

pub fn commit_with(brush: &mut Brush, tolerances: &Tolerances) {
    commit_shape(brush);
    commit_transform_with(brush, tolerances);
}
