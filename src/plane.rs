use cgmath::{InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::{transform_direction, transform_point, FVector, DETERMINANT_EPSILON, THRESH_ZERO_NORM_SQUARED};

/// An oriented plane. Points with `dot(normal, p) <= distance` are behind it,
/// which for a brush surface means inside the solid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: FVector,
    pub distance: f32,
}

impl Plane {
    /// Create a plane, normalizing the normal and scaling the distance to match.
    ///
    /// Returns `None` for a zero-length normal.
    pub fn new(normal: FVector, distance: f32) -> Option<Plane> {
        let length2 = normal.magnitude2();
        if length2 < THRESH_ZERO_NORM_SQUARED {
            return None;
        }
        let length = length2.sqrt();
        Some(Plane { normal: normal / length, distance: distance / length })
    }

    pub fn new_from_normal_and_point(normal: FVector, point: FVector) -> Option<Plane> {
        let length2 = normal.magnitude2();
        if length2 < THRESH_ZERO_NORM_SQUARED {
            return None;
        }
        let normal = normal / length2.sqrt();
        Some(Plane { normal, distance: normal.dot(point) })
    }

    /// Plane through three points, facing the side from which they appear counter-clockwise.
    pub fn new_from_points(a: FVector, b: FVector, c: FVector) -> Option<Plane> {
        Plane::new_from_normal_and_point((b - a).cross(c - a), a)
    }

    /// Signed distance from the plane, positive in front (outside).
    #[inline]
    pub fn distance_to(&self, point: FVector) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// Signed distance evaluated in double precision.
    pub fn distance_to_precise(&self, point: FVector) -> f64 {
        to_f64(self.normal).dot(to_f64(point)) - self.distance as f64
    }

    /// The point on the plane closest to the origin.
    #[inline]
    pub fn point_on_plane(&self) -> FVector {
        self.normal * self.distance
    }

    pub fn flipped(&self) -> Plane {
        Plane { normal: -self.normal, distance: -self.distance }
    }

    /// Project a point onto the plane.
    pub fn project(&self, point: FVector) -> FVector {
        point - self.normal * self.distance_to(point)
    }

    /// Transform the plane by an affine matrix. Normals go through the
    /// inverse-transpose so non-uniform scale and mirroring are handled.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Option<Plane> {
        let inverse_transpose = matrix.invert()?.transpose();
        let normal = transform_direction(&inverse_transpose, self.normal);
        let point = transform_point(matrix, self.point_on_plane());
        Plane::new_from_normal_and_point(normal, point)
    }

    /// Same plane and orientation, within tolerance.
    pub fn is_same(&self, other: &Plane, distance_epsilon: f32, normal_epsilon: f32) -> bool {
        (self.distance - other.distance).abs() < distance_epsilon
            && crate::math::points_are_near(&self.normal, &other.normal, normal_epsilon)
    }

    /// Coplanar regardless of orientation.
    pub fn is_coplanar(&self, other: &Plane, distance_epsilon: f32, normal_epsilon: f32) -> bool {
        self.is_same(other, distance_epsilon, normal_epsilon)
            || self.is_same(&other.flipped(), distance_epsilon, normal_epsilon)
    }
}

/// Solve the intersection of three planes. Returns `None` if they do not meet in a single point.
/// Solved in double precision.
pub fn plane_triple_intersection(p1: &Plane, p2: &Plane, p3: &Plane) -> Option<FVector> {
    let n1 = to_f64(p1.normal);
    let n2 = to_f64(p2.normal);
    let n3 = to_f64(p3.normal);

    let det = n1.dot(n2.cross(n3));
    if det.abs() < DETERMINANT_EPSILON as f64 {
        return None;
    }

    let point = (n2.cross(n3) * p1.distance as f64 + n3.cross(n1) * p2.distance as f64 + n1.cross(n2) * p3.distance as f64) / det;
    Some(FVector::new(point.x as f32, point.y as f32, point.z as f32))
}

fn to_f64(v: FVector) -> Vector3<f64> {
    Vector3::new(v.x as f64, v.y as f64, v.z as f64)
}
