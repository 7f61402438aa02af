//! Cutting trees and boolean composition of sibling brushes.
//!
//! Every brush is turned into a small BSP ("cutter") whose leaves are
//! `Inside` and `Outside`. Each face polygon of a brush is split by the
//! cutters of all overlapping brushes, and every resulting fragment is then
//! classified by sampling the ordered boolean solid just in front of and just
//! behind it.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::bounds::AABB;
use crate::brush::{Brush, CsgOperationType, NodeId};
use crate::control_mesh::ControlMesh;
use crate::math::{FVector, Tolerances};
use crate::plane::Plane;
use crate::polygon::{Polygon, SplitType, THRESH_SPLIT_POLY_WITH_PLANE};

/// Polygons smaller than this after splitting are discarded as slivers.
const MIN_FRAGMENT_AREA: f32 = 1.0e-7;

/// Where a cut node sends the region in front of or behind its plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutTarget {
    Node(usize),
    Inside,
    Outside,
}

/// One node of a cutting tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutNode {
    /// Index of the surface whose plane splits at this node.
    pub plane_index: usize,
    pub front: CutTarget,
    pub back: CutTarget,
}

/// Build the cutting tree of a convex brush: a chain over its bounding
/// planes. In front of any plane is outside, behind all of them is inside.
pub fn create_cutter(mesh: &ControlMesh) -> Vec<CutNode> {
    let count = mesh.polygons.len();
    mesh.polygons.iter().enumerate().map(|(i, polygon)| CutNode {
        plane_index: polygon.surface_index,
        front: CutTarget::Outside,
        back: if i + 1 < count { CutTarget::Node(i + 1) } else { CutTarget::Inside },
    }).collect()
}

/// Classify a point against a cutting tree. Points within `epsilon` in front
/// of a plane count as behind it.
pub fn categorize_point(nodes: &[CutNode], planes: &[Plane], point: FVector, epsilon: f32) -> CutTarget {
    let mut target = if nodes.is_empty() { CutTarget::Outside } else { CutTarget::Node(0) };
    // A well formed tree visits every node at most once.
    for _ in 0..=nodes.len() {
        match target {
            CutTarget::Node(index) => {
                let node = &nodes[index];
                target = if planes[node.plane_index].distance_to(point) > epsilon {
                    node.front
                } else {
                    node.back
                };
            }
            leaf => return leaf,
        }
    }
    warn!("Cutting tree has a cycle, treating point as outside");
    CutTarget::Outside
}

/// Split a polygon by a cutting tree, returning every piece with the leaf it
/// ended up in. Coplanar pieces follow the back side.
pub fn split_by_cutter(polygon: Polygon, nodes: &[CutNode], planes: &[Plane]) -> Vec<(Polygon, CutTarget)> {
    let mut pieces = Vec::new();
    let start = if nodes.is_empty() { CutTarget::Outside } else { CutTarget::Node(0) };
    split_recursive(polygon, start, nodes, planes, &mut pieces, 0);
    pieces
}

fn split_recursive(polygon: Polygon, target: CutTarget, nodes: &[CutNode], planes: &[Plane], pieces: &mut Vec<(Polygon, CutTarget)>, depth: usize) {
    let CutTarget::Node(index) = target else {
        pieces.push((polygon, target));
        return;
    };
    if depth > nodes.len() {
        warn!("Cutting tree has a cycle, treating polygon as outside");
        pieces.push((polygon, CutTarget::Outside));
        return;
    }
    let node = nodes[index];
    match polygon.split_with_plane(&planes[node.plane_index]) {
        SplitType::Front => split_recursive(polygon, node.front, nodes, planes, pieces, depth + 1),
        SplitType::Back | SplitType::Coplanar => split_recursive(polygon, node.back, nodes, planes, pieces, depth + 1),
        SplitType::Split(front, back) => {
            split_recursive(front, node.front, nodes, planes, pieces, depth + 1);
            split_recursive(back, node.back, nodes, planes, pieces, depth + 1);
        }
    }
}

/// A visible piece of a brush surface in the composed model.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedPolygon {
    pub brush: NodeId,
    /// Surface index into the brush's control mesh surfaces.
    pub surface_index: usize,
    /// World space vertices, counter-clockwise seen from the front of `plane`.
    pub vertices: Vec<FVector>,
    /// Outward facing plane of the composed solid.
    pub plane: Plane,
    /// The piece faces the opposite way from the surface it was cut from
    /// (carved by a subtractive brush).
    pub reversed: bool,
}

/// The composed boundary of all brushes of a model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composition {
    pub polygons: Vec<ComposedPolygon>,
}

impl Composition {
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn polygons_of(&self, brush: NodeId) -> impl Iterator<Item = &ComposedPolygon> + '_ {
        self.polygons.iter().filter(move |polygon| polygon.brush == brush)
    }

    pub fn total_area(&self) -> f32 {
        self.polygons.iter()
            .map(|polygon| Polygon::new(polygon.vertices.clone(), polygon.plane, 0, polygon.surface_index).area())
            .sum()
    }
}

/// A brush prepared for composition: world space planes, cutter and faces.
struct WorldBrush<'a> {
    brush: &'a Brush,
    planes: Vec<Plane>,
    cutter: Vec<CutNode>,
    bounds: AABB,
    polygons: Vec<Polygon>,
}

impl<'a> WorldBrush<'a> {
    fn new(brush: &'a Brush, brush_index: usize) -> Option<WorldBrush<'a>> {
        let mesh = brush.control_mesh.as_ref()?;
        let local_to_world = brush.transform.local_to_world();
        let mut planes = Vec::with_capacity(mesh.surfaces.len());
        for surface in &mesh.surfaces {
            match surface.plane.transform(&local_to_world) {
                Some(plane) => planes.push(plane),
                None => {
                    warn!("Brush {:?} has a singular transform, leaving it out of composition", brush.node_id);
                    return None;
                }
            }
        }

        let world_vertices = mesh.transformed_vertices(&local_to_world);
        let mirrored = brush.transform.is_mirrored();
        let polygons = mesh.polygons.iter().map(|polygon| {
            let mut vertices: Vec<FVector> = polygon.vertex_indices.iter().map(|index| world_vertices[*index]).collect();
            // Negative scale flips the winding relative to the transformed normal.
            if mirrored {
                vertices.reverse();
            }
            Polygon::new(vertices, planes[polygon.surface_index], brush_index, polygon.surface_index)
        }).collect();

        Some(WorldBrush {
            brush,
            planes,
            cutter: create_cutter(mesh),
            bounds: AABB::from_points(&world_vertices),
            polygons,
        })
    }

    fn contains(&self, point: FVector, epsilon: f32) -> bool {
        categorize_point(&self.cutter, &self.planes, point, epsilon) == CutTarget::Inside
    }

    fn interacts_with(&self, other: &WorldBrush) -> bool {
        self.brush.shares_layer_with(other.brush)
    }
}

/// Evaluate the ordered boolean solid of all brushes sharing a content layer with `owner`.
fn solid_at(world: &[WorldBrush], owner: &WorldBrush, point: FVector) -> bool {
    let mut inside = false;
    for other in world.iter().filter(|other| owner.interacts_with(other)) {
        let in_brush = other.contains(point, 0.0);
        match other.brush.operation {
            CsgOperationType::Additive => inside |= in_brush,
            CsgOperationType::Subtractive => inside &= !in_brush,
            CsgOperationType::Intersecting => inside &= in_brush,
        }
    }
    inside
}

/// Compose the brushes, in order, into the set of polygons bounding the
/// resulting solid. Brushes without a control mesh are skipped.
pub fn compose(brushes: &[Brush], tolerances: &Tolerances, classification_offset: f32) -> Composition {
    let world: Vec<WorldBrush> = brushes.iter()
        .enumerate()
        .filter_map(|(index, brush)| WorldBrush::new(brush, index))
        .collect();

    let on_plane = THRESH_SPLIT_POLY_WITH_PLANE.max(tolerances.distance);
    let mut composition = Composition::default();

    for (index, owner) in world.iter().enumerate() {
        for polygon in &owner.polygons {
            let mut fragments = vec![polygon.clone()];
            for (other_index, other) in world.iter().enumerate() {
                if other_index == index || !owner.interacts_with(other) || !owner.bounds.expand_by(on_plane).intersect(&other.bounds) {
                    continue;
                }
                fragments = fragments.into_iter()
                    .flat_map(|fragment| split_by_cutter(fragment, &other.cutter, &other.planes))
                    .map(|(fragment, _)| fragment)
                    .collect();
            }

            for mut fragment in fragments {
                if fragment.area() < MIN_FRAGMENT_AREA {
                    continue;
                }
                let center = fragment.centroid();
                let normal = fragment.plane.normal;
                let front = solid_at(&world, owner, center + normal * classification_offset);
                let back = solid_at(&world, owner, center - normal * classification_offset);
                let reversed = match (front, back) {
                    (false, true) => false,
                    (true, false) => true,
                    _ => continue,
                };

                // Coincident faces: the brush that comes later keeps the piece.
                let covered_by_later = world[index + 1..].iter().any(|later| {
                    owner.interacts_with(later)
                        && later.cutter.iter().any(|node| {
                            later.planes[node.plane_index].is_coplanar(&fragment.plane, on_plane, tolerances.normal)
                        })
                        && later.contains(center, on_plane)
                });
                if covered_by_later {
                    continue;
                }

                if reversed {
                    fragment.reverse();
                }
                composition.polygons.push(ComposedPolygon {
                    brush: owner.brush.node_id,
                    surface_index: fragment.surface_index,
                    vertices: fragment.vertices,
                    plane: fragment.plane,
                    reversed,
                });
            }
        }
    }

    debug!("Composed {} brushes into {} polygons", world.len(), composition.len());
    composition
}
