use log::{debug, info, warn};

use crate::bounds::AABB;
use crate::brush::{Brush, CsgOperationType, NodeId};
use crate::change::{commit_shape, commit_transform_with, has_shape_changed_with, has_transform_changed_with};
use crate::csg::{compose, Composition};
use crate::error::CsgError;
use crate::math::FVector;
use crate::mesh_cache::{GeneratedMeshes, MeshUpdateReport};
use crate::operations::{compute_bounds_of, flip, snap_to_grid, FlipAxis};
use crate::settings::CsgSettings;
use crate::shape::Shape;
use crate::transform::BrushTransform;

/// What one `CsgModel::update` pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Brushes whose control mesh was rebuilt.
    pub rebuilt: Vec<NodeId>,
    /// Brushes whose shape failed to build; they keep their previous mesh.
    pub failed: Vec<NodeId>,
    /// Brushes whose transform changed.
    pub moved: Vec<NodeId>,
    pub recomposed: bool,
    pub meshes: MeshUpdateReport,
}

impl UpdateReport {
    pub fn is_empty(&self) -> bool {
        self.rebuilt.is_empty() && self.failed.is_empty() && self.moved.is_empty() && !self.recomposed
    }
}

/// A set of brushes composed in order into one solid, with its generated meshes.
///
/// The host drives it through the lifecycle hooks and calls `update` once per
/// frame.
#[derive(Debug, Default)]
pub struct CsgModel {
    pub settings: CsgSettings,
    brushes: Vec<Brush>,
    composition: Composition,
    generated_meshes: GeneratedMeshes,
    next_node_id: u32,
    structure_dirty: bool,
}

impl CsgModel {
    pub fn new(settings: CsgSettings) -> CsgModel {
        CsgModel {
            settings,
            ..Default::default()
        }
    }

    pub fn brushes(&self) -> &[Brush] {
        &self.brushes
    }

    pub fn brush(&self, node_id: NodeId) -> Option<&Brush> {
        self.brushes.iter().find(|brush| brush.node_id == node_id)
    }

    /// Mutable access for editing a brush's shape or properties. Edits are
    /// picked up by the next `update`.
    pub fn brush_mut(&mut self, node_id: NodeId) -> Option<&mut Brush> {
        self.brushes.iter_mut().find(|brush| brush.node_id == node_id)
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn generated_meshes(&self) -> &GeneratedMeshes {
        &self.generated_meshes
    }

    pub fn generated_meshes_mut(&mut self) -> &mut GeneratedMeshes {
        &mut self.generated_meshes
    }

    /// Add a brush at the end of the composition order.
    pub fn on_brush_created(&mut self, shape: Shape, operation: CsgOperationType, transform: BrushTransform) -> NodeId {
        let node_id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        debug!("Brush {} created ({:?}, {} surfaces)", node_id, operation, shape.len());
        self.brushes.push(Brush::new(node_id, shape, operation, transform));
        self.structure_dirty = true;
        node_id
    }

    pub fn on_brush_destroyed(&mut self, node_id: NodeId) -> Result<Brush, CsgError> {
        let index = self.index_of(node_id)?;
        debug!("Brush {} destroyed", node_id);
        self.structure_dirty = true;
        Ok(self.brushes.remove(index))
    }

    pub fn on_transform_changed(&mut self, node_id: NodeId, transform: BrushTransform) -> Result<(), CsgError> {
        let index = self.index_of(node_id)?;
        self.brushes[index].transform = transform;
        Ok(())
    }

    fn index_of(&self, node_id: NodeId) -> Result<usize, CsgError> {
        self.brushes.iter()
            .position(|brush| brush.node_id == node_id)
            .ok_or(CsgError::UnknownBrush(node_id))
    }

    /// Detect every changed brush, rebuild and commit them, then recompose the
    /// model and refresh the mesh cache if anything changed.
    pub fn update(&mut self) -> UpdateReport {
        let tolerances = self.settings.tolerances;
        let mut report = UpdateReport::default();

        for brush in &mut self.brushes {
            let shape_changed = has_shape_changed_with(brush, &tolerances);
            let transform_changed = has_transform_changed_with(brush, &tolerances);

            if shape_changed {
                match brush.rebuild_control_mesh_with(&tolerances) {
                    Ok(()) => report.rebuilt.push(brush.node_id),
                    Err(_) => report.failed.push(brush.node_id),
                }
                // Committed on failure too; the brush stays invalid until edited again.
                commit_shape(brush);
            }
            if transform_changed {
                commit_transform_with(brush, &tolerances);
                report.moved.push(brush.node_id);
            }
        }

        let changed = !report.rebuilt.is_empty() || !report.failed.is_empty() || !report.moved.is_empty();
        if changed || self.structure_dirty {
            self.composition = compose(&self.brushes, &tolerances, self.settings.classification_offset);
            report.meshes = self.generated_meshes.update(&self.brushes, &self.composition);
            report.recomposed = true;
            self.structure_dirty = false;
        }

        if !report.failed.is_empty() {
            warn!("{} brushes are invalid: {:?}", report.failed.len(), report.failed);
        }
        if report.recomposed {
            info!("Model updated: {} rebuilt, {} moved, {} polygons, {} mesh instances",
                report.rebuilt.len(), report.moved.len(), self.composition.len(), self.generated_meshes.cache().len());
        }
        report
    }

    fn select_mut(&mut self, node_ids: &[NodeId]) -> Result<Vec<&mut Brush>, CsgError> {
        if let Some(missing) = node_ids.iter().find(|node_id| !self.brushes.iter().any(|brush| brush.node_id == **node_id)) {
            return Err(CsgError::UnknownBrush(*missing));
        }
        Ok(self.brushes.iter_mut().filter(|brush| node_ids.contains(&brush.node_id)).collect())
    }

    /// Mirror the given brushes around the configured pivot. All or nothing.
    pub fn flip_brushes(&mut self, node_ids: &[NodeId], axis: FlipAxis) -> Result<(), CsgError> {
        let pivot = self.settings.pivot_mode;
        let tolerances = self.settings.tolerances;
        let mut selection = self.select_mut(node_ids)?;
        flip(&mut selection, axis, pivot, &tolerances)
    }

    /// Move the given brushes together onto the configured grid.
    pub fn snap_brushes_to_grid(&mut self, node_ids: &[NodeId]) -> Result<Option<FVector>, CsgError> {
        let grid_spacing = self.settings.grid_spacing;
        let mut selection = self.select_mut(node_ids)?;
        Ok(snap_to_grid(&mut selection, grid_spacing))
    }

    /// Combined world bounds of the given brushes; all brushes when empty.
    pub fn bounds(&self, node_ids: &[NodeId]) -> AABB {
        let selection: Vec<&Brush> = self.brushes.iter()
            .filter(|brush| node_ids.is_empty() || node_ids.contains(&brush.node_id))
            .collect();
        compute_bounds_of(&selection)
    }
}
