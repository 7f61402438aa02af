use cgmath::{InnerSpace, Matrix4, Vector3};

pub type FVector = Vector3<f32>;

// Floating point constants.

/// Two points are the same if every coordinate is within this distance.
pub const DISTANCE_EPSILON: f32 = 0.0001;
/// Two unit normals are the same if every component is within this distance.
pub const NORMAL_EPSILON: f32 = 0.0001;
/// Three normals whose triple product is below this do not meet in a single point.
pub const DETERMINANT_EPSILON: f32 = 1.0e-6;
/// Size of a normal that is considered "zero", squared.
pub const THRESH_ZERO_NORM_SQUARED: f32 = 1.0e-8;

/// Tolerances used by geometric predicates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerances {
    /// Point-on-plane and point-equality distance.
    pub distance: f32,
    /// Per-component tolerance when comparing unit vectors.
    pub normal: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            distance: DISTANCE_EPSILON,
            normal: NORMAL_EPSILON,
        }
    }
}

pub fn zero_vector() -> FVector {
    FVector::new(0.0, 0.0, 0.0)
}

// Compare two points and see if they're the same, using a threshold.
// Uses fast distance approximation.
pub fn points_are_near(point1: &FVector, point2: &FVector, distance: f32) -> bool {
    if (point1.x - point2.x).abs() >= distance {
        return false;
    }
    if (point1.y - point2.y).abs() >= distance {
        return false;
    }
    if (point1.z - point2.z).abs() >= distance {
        return false;
    }
    true
}

pub fn points_are_same(p: &FVector, q: &FVector) -> bool {
    points_are_near(p, q, DISTANCE_EPSILON)
}

/// Find the intersection of an infinite line (defined by two points) and
/// a plane.  Assumes that the line and plane do indeed intersect; you must
/// make sure they're not parallel before calling.
pub fn line_plane_intersection(point1: &FVector, point2: &FVector, plane_base: &FVector, plane_normal: &FVector) -> FVector {
    point1
        + ((point2 - point1) *
            ((plane_base - point1).dot(*plane_normal)
                / (point2 - point1).dot(*plane_normal)))
}

/// Transform a position by a 4x4 affine matrix.
pub fn transform_point(matrix: &Matrix4<f32>, point: FVector) -> FVector {
    (matrix * point.extend(1.0)).truncate()
}

/// Transform a direction by a 4x4 affine matrix, ignoring translation.
pub fn transform_direction(matrix: &Matrix4<f32>, direction: FVector) -> FVector {
    (matrix * direction.extend(0.0)).truncate()
}

/// Returns any unit vector perpendicular to `normal`.
pub fn any_perpendicular(normal: FVector) -> FVector {
    // Pick the world axis least aligned with the normal.
    let abs = FVector::new(normal.x.abs(), normal.y.abs(), normal.z.abs());
    let axis = if abs.x <= abs.y && abs.x <= abs.z {
        FVector::unit_x()
    } else if abs.y <= abs.z {
        FVector::unit_y()
    } else {
        FVector::unit_z()
    };
    normal.cross(axis).normalize()
}

/// Round `value` to the nearest multiple of `spacing`.
pub fn snap_value(value: f32, spacing: f32) -> f32 {
    if spacing <= 0.0 {
        return value;
    }
    (value / spacing).round() * spacing
}
