use std::collections::HashSet;

use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;

use crate::brush::{CsgOperationType, NodeId};
use crate::error::CsgError;
use crate::math::FVector;
use crate::model::CsgModel;
use crate::plane::Plane;
use crate::shape::Shape;
use crate::surface::{Surface, TexGenFlags};
use crate::transform::BrushTransform;

impl From<CsgError> for PyErr {
    fn from(error: CsgError) -> Self {
        match error {
            CsgError::UnknownBrush(_) => PyKeyError::new_err(error.to_string()),
            _ => PyValueError::new_err(error.to_string()),
        }
    }
}

fn to_vector((x, y, z): (f32, f32, f32)) -> FVector {
    FVector::new(x, y, z)
}

fn from_vector(v: &FVector) -> (f32, f32, f32) {
    (v.x, v.y, v.z)
}

fn shape_from_planes(planes: &[(f32, f32, f32, f32)], flags: TexGenFlags) -> PyResult<Shape> {
    let surfaces = planes.iter().map(|(x, y, z, d)| {
        Plane::new(FVector::new(*x, *y, *z), *d)
            .map(|plane| Surface::new(plane).with_flags(flags))
            .ok_or_else(|| PyValueError::new_err("plane normal must not be zero"))
    }).collect::<PyResult<Vec<Surface>>>()?;
    Ok(Shape::new(surfaces))
}

#[pyclass]
struct Brush {
    planes: Vec<(f32, f32, f32, f32)>,
    tex_gen_flags: HashSet<String>,
    csg_operation: CsgOperationType,
    position: (f32, f32, f32),
}

#[pymethods]
impl Brush {
    #[new]
    #[pyo3(signature = (planes, tex_gen_flags, csg_operation, position=(0.0, 0.0, 0.0)))]
    fn new(planes: Vec<(f32, f32, f32, f32)>, tex_gen_flags: HashSet<String>, csg_operation: &str, position: (f32, f32, f32)) -> PyResult<Self> {
        let csg_operation = csg_operation.parse::<CsgOperationType>()?;
        Ok(Brush { planes, tex_gen_flags, csg_operation, position })
    }
}

#[pyclass]
#[derive(Clone, Debug)]
struct ControlMesh {
    #[pyo3(get)]
    pub vertices: Vec<(f32, f32, f32)>,
    #[pyo3(get)]
    pub polygons: Vec<Vec<usize>>,
    #[pyo3(get)]
    pub edges: Vec<(usize, usize)>,
    #[pyo3(get)]
    pub dropped_surfaces: Vec<usize>,
}

impl From<&crate::control_mesh::ControlMesh> for ControlMesh {
    fn from(mesh: &crate::control_mesh::ControlMesh) -> Self {
        ControlMesh {
            vertices: mesh.vertices.iter().map(from_vector).collect(),
            polygons: mesh.polygons.iter().map(|polygon| polygon.vertex_indices.clone()).collect(),
            edges: mesh.edges.iter().map(|edge| (edge.vertex_indices[0], edge.vertex_indices[1])).collect(),
            dropped_surfaces: mesh.dropped_surfaces.clone(),
        }
    }
}

#[pyclass]
#[derive(Clone, Debug)]
struct Polygon {
    #[pyo3(get)]
    pub brush_index: usize,
    #[pyo3(get)]
    pub surface_index: usize,
    #[pyo3(get)]
    pub vertices: Vec<(f32, f32, f32)>,
    #[pyo3(get)]
    pub normal: (f32, f32, f32),
}

#[pyfunction]
fn build_control_mesh(planes: Vec<(f32, f32, f32, f32)>) -> PyResult<ControlMesh> {
    let shape = shape_from_planes(&planes, TexGenFlags::empty())?;
    let mesh = crate::control_mesh::build_control_mesh(&shape)?;
    Ok(ControlMesh::from(&mesh))
}

/// Compose the brushes in order and return the visible polygons.
#[pyfunction]
fn csg_rebuild(brushes: Vec<PyRef<Brush>>) -> PyResult<Vec<Polygon>> {
    let mut model = CsgModel::default();
    let mut node_ids: Vec<NodeId> = Vec::with_capacity(brushes.len());
    for brush in &brushes {
        let flags = TexGenFlags::from_names(brush.tex_gen_flags.iter().map(String::as_str));
        let shape = shape_from_planes(&brush.planes, flags)?;
        let transform = BrushTransform::new_from_position(to_vector(brush.position));
        node_ids.push(model.on_brush_created(shape, brush.csg_operation, transform));
    }

    let report = model.update();
    if !report.failed.is_empty() {
        return Err(CsgError::degenerate(format!("brushes {:?} do not form closed convex solids", report.failed)).into());
    }

    let polygons = model.composition().polygons.iter().map(|polygon| Polygon {
        brush_index: node_ids.iter().position(|node_id| *node_id == polygon.brush).unwrap_or(usize::MAX),
        surface_index: polygon.surface_index,
        vertices: polygon.vertices.iter().map(from_vector).collect(),
        normal: from_vector(&polygon.plane.normal),
    }).collect();
    Ok(polygons)
}

#[pymodule]
fn realtime_csg(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Brush>()?;
    m.add_class::<ControlMesh>()?;
    m.add_class::<Polygon>()?;
    m.add_function(wrap_pyfunction!(build_control_mesh, m)?)?;
    m.add_function(wrap_pyfunction!(csg_rebuild, m)?)?;
    Ok(())
}
