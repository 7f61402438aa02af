//! Reconstruction of a convex polyhedron from the half-spaces of a [`Shape`].

use std::collections::HashMap;

use arrayvec::ArrayVec;
use cgmath::{InnerSpace, Matrix4};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::bounds::AABB;
use crate::error::CsgError;
use crate::math::{points_are_near, transform_point, FVector, Tolerances};
use crate::plane::{plane_triple_intersection, Plane};
use crate::shape::Shape;
use crate::surface::{tangent_basis, Surface};

/// Minimum number of bounding surfaces (and vertices) of a closed convex polyhedron.
pub const MIN_POLYHEDRON_SURFACES: usize = 4;

/// Rounding error allowance, in `f32` ulps, for plane tests on computed vertices.
const ROUNDING_ULPS: f64 = 8.0;

/// The face of a control mesh lying on one surface of the shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPolygon {
    /// Index of the shape surface this face lies on.
    pub surface_index: usize,
    /// Vertices in counter-clockwise order when viewed from outside.
    pub vertex_indices: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlEdge {
    pub vertex_indices: [usize; 2],
    /// The two polygons sharing this edge.
    pub polygon_indices: ArrayVec<usize, 2>,
}

/// Vertex/edge/face graph derived from a shape. Never edited by hand; rebuilt
/// whenever the shape changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlMesh {
    /// The surfaces the mesh was built from; polygon `surface_index` values
    /// index into this list, so a retained mesh stays self-consistent when
    /// the live shape is edited.
    pub surfaces: Vec<Surface>,
    /// Vertices in the shape's local space.
    pub vertices: Vec<FVector>,
    /// For every vertex, the surfaces it lies on (at least three).
    pub vertex_surfaces: Vec<Vec<usize>>,
    pub polygons: Vec<ControlPolygon>,
    pub edges: Vec<ControlEdge>,
    /// Surfaces that do not bound the solid (fewer than three vertices, or a
    /// duplicate of an earlier surface's plane).
    pub dropped_surfaces: Vec<usize>,
    pub valid: bool,
}

impl ControlMesh {

    pub fn polygon_vertices<'a>(&'a self, polygon: &'a ControlPolygon) -> impl Iterator<Item = FVector> + 'a {
        polygon.vertex_indices.iter().map(move |index| self.vertices[*index])
    }

    pub fn polygon_surface(&self, polygon: &ControlPolygon) -> &Surface {
        &self.surfaces[polygon.surface_index]
    }

    pub fn polygon_for_surface(&self, surface_index: usize) -> Option<&ControlPolygon> {
        self.polygons.iter().find(|polygon| polygon.surface_index == surface_index)
    }

    pub fn transformed_vertices(&self, matrix: &Matrix4<f32>) -> Vec<FVector> {
        self.vertices.iter().map(|vertex| transform_point(matrix, *vertex)).collect()
    }

    pub fn bounds(&self) -> AABB {
        AABB::from_points(&self.vertices)
    }

    pub fn centroid(&self) -> FVector {
        if self.vertices.is_empty() {
            return FVector::new(0.0, 0.0, 0.0);
        }
        let sum = self.vertices.iter().fold(FVector::new(0.0, 0.0, 0.0), |sum, vertex| sum + vertex);
        sum / self.vertices.len() as f32
    }

    /// Check that every vertex is inside every half-space of `shape` and lies
    /// on at least three of its planes.
    pub fn satisfies(&self, shape: &Shape, epsilon: f32) -> bool {
        self.vertices.iter().all(|vertex| {
            let on_planes = shape.planes().filter(|plane| plane.distance_to(*vertex).abs() <= epsilon).count();
            on_planes >= 3 && shape.contains(*vertex, epsilon)
        })
    }
}

/// Build the control mesh of a shape with the default tolerances.
pub fn build_control_mesh(shape: &Shape) -> Result<ControlMesh, CsgError> {
    build_control_mesh_with(shape, &Tolerances::default())
}

/// Build the control mesh of a shape by intersecting every triple of its
/// planes and keeping the points inside all half-spaces.
///
/// A surface gets a face when it has at least three vertices and its plane is
/// not the same as that of an earlier face. Duplicates are listed in
/// `dropped_surfaces` even though they touch three or more vertices.
pub fn build_control_mesh_with(shape: &Shape, tolerances: &Tolerances) -> Result<ControlMesh, CsgError> {
    shape.validate(tolerances)?;
    let planes: Vec<Plane> = shape.planes().copied().collect();
    if planes.len() < MIN_POLYHEDRON_SURFACES {
        return Err(CsgError::degenerate(format!(
            "shape has {} surfaces, the intersection of fewer than {} half-spaces is unbounded",
            planes.len(), MIN_POLYHEDRON_SURFACES)));
    }

    let vertices = find_vertices(&planes, tolerances);
    if vertices.len() < MIN_POLYHEDRON_SURFACES {
        return Err(CsgError::degenerate(format!("half-space intersection has {} vertices", vertices.len())));
    }

    let vertex_surfaces: Vec<Vec<usize>> = vertices.iter().map(|vertex| {
        planes.iter()
            .enumerate()
            .filter(|(_, plane)| plane.distance_to_precise(*vertex).abs() <= vertex_epsilon(tolerances, *vertex))
            .map(|(index, _)| index)
            .collect()
    }).collect();

    let mut polygons: Vec<ControlPolygon> = Vec::with_capacity(planes.len());
    let mut dropped_surfaces = Vec::new();

    for (surface_index, surface) in shape.surfaces.iter().enumerate() {
        let duplicate = polygons.iter().any(|polygon| {
            planes[polygon.surface_index].is_same(&surface.plane, tolerances.distance, tolerances.normal)
        });
        let mut vertex_indices: Vec<usize> = vertex_surfaces.iter()
            .enumerate()
            .filter(|(_, surfaces)| surfaces.contains(&surface_index))
            .map(|(index, _)| index)
            .collect();

        if duplicate || vertex_indices.len() < 3 {
            debug!("Surface {} does not bound the shape ({} vertices, duplicate: {})", surface_index, vertex_indices.len(), duplicate);
            dropped_surfaces.push(surface_index);
            continue;
        }

        sort_by_winding(&vertices, &mut vertex_indices, surface.plane.normal, surface.tangent);
        polygons.push(ControlPolygon { surface_index, vertex_indices });
    }

    if polygons.len() < MIN_POLYHEDRON_SURFACES {
        return Err(CsgError::degenerate(format!("only {} surfaces bound the shape", polygons.len())));
    }

    let edges = build_edges(&polygons)?;

    // Euler characteristic of a convex polyhedron.
    let euler = vertices.len() as i64 - edges.len() as i64 + polygons.len() as i64;
    if euler != 2 {
        return Err(CsgError::degenerate(format!(
            "mesh is not a closed convex polyhedron (V={}, E={}, F={})",
            vertices.len(), edges.len(), polygons.len())));
    }

    Ok(ControlMesh {
        surfaces: shape.surfaces.clone(),
        vertices,
        vertex_surfaces,
        polygons,
        edges,
        dropped_surfaces,
        valid: true,
    })
}

/// Candidate vertices: intersections of plane triples that lie inside every
/// half-space, merged when closer than the distance tolerance.
fn find_vertices(planes: &[Plane], tolerances: &Tolerances) -> Vec<FVector> {
    let mut vertices: Vec<FVector> = Vec::new();
    let n = planes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let Some(point) = plane_triple_intersection(&planes[i], &planes[j], &planes[k]) else {
                    continue;
                };
                let epsilon = vertex_epsilon(tolerances, point);
                if planes.iter().any(|plane| plane.distance_to_precise(point) > epsilon) {
                    continue;
                }
                if !vertices.iter().any(|vertex| points_are_near(vertex, &point, epsilon as f32)) {
                    vertices.push(point);
                }
            }
        }
    }
    vertices
}

/// Distance tolerance at `point`: the configured tolerance plus the rounding
/// error of storing its coordinates in `f32`.
fn vertex_epsilon(tolerances: &Tolerances, point: FVector) -> f64 {
    let magnitude = point.x.abs().max(point.y.abs()).max(point.z.abs()) as f64;
    tolerances.distance as f64 + magnitude * f32::EPSILON as f64 * ROUNDING_ULPS
}

/// Sort face vertex indices counter-clockwise around `normal`, as seen from
/// the front of the plane.
pub fn sort_by_winding(vertices: &[FVector], indices: &mut [usize], normal: FVector, tangent_hint: FVector) {
    if indices.len() < 3 {
        return;
    }

    let centroid = indices.iter().fold(FVector::new(0.0, 0.0, 0.0), |sum, index| sum + vertices[*index]) / indices.len() as f32;
    let (u_axis, v_axis) = tangent_basis(normal.normalize(), Some(tangent_hint));

    let angle = |index: usize| {
        let offset = vertices[index] - centroid;
        offset.dot(v_axis).atan2(offset.dot(u_axis))
    };
    indices.sort_by(|a, b| angle(*a).partial_cmp(&angle(*b)).unwrap_or(std::cmp::Ordering::Equal));
}

/// Pair up polygon sides into edges. Every edge of a closed mesh is shared by
/// exactly two polygons.
fn build_edges(polygons: &[ControlPolygon]) -> Result<Vec<ControlEdge>, CsgError> {
    let mut edges: Vec<ControlEdge> = Vec::new();
    let mut lookup: HashMap<(usize, usize), usize> = HashMap::new();

    for (polygon_index, polygon) in polygons.iter().enumerate() {
        let count = polygon.vertex_indices.len();
        for i in 0..count {
            let a = polygon.vertex_indices[i];
            let b = polygon.vertex_indices[(i + 1) % count];
            let key = (a.min(b), a.max(b));
            let edge_index = *lookup.entry(key).or_insert_with(|| {
                edges.push(ControlEdge { vertex_indices: [key.0, key.1], polygon_indices: ArrayVec::new() });
                edges.len() - 1
            });
            if edges[edge_index].polygon_indices.try_push(polygon_index).is_err() {
                return Err(CsgError::degenerate(format!("edge {:?} is shared by more than two faces", key)));
            }
        }
    }

    if let Some(open) = edges.iter().find(|edge| edge.polygon_indices.len() != 2) {
        return Err(CsgError::degenerate(format!(
            "edge {:?} borders a single face, the half-space intersection is unbounded",
            open.vertex_indices)));
    }

    Ok(edges)
}
