use cgmath::InnerSpace;
use crate::error::CsgError;
use crate::math::{self, line_plane_intersection, FVector, THRESH_ZERO_NORM_SQUARED};
use crate::plane::Plane;

/// Thickness of a plane for front/back/coplanar classification while splitting.
pub const THRESH_SPLIT_POLY_WITH_PLANE: f32 = 0.0005;

/// Results from `Polygon::split_with_plane`, describing the result of splitting
/// a polygon with an arbitrary plane.
#[derive(Debug, PartialEq)]
pub enum SplitType
{
    /// Polygon wasn't split, but is coplanar with plane
    Coplanar,
    /// Polygon wasn't split, but is entirely in front of plane
    Front,
    /// Polygon wasn't split, but is entirely in back of plane
    Back,
    /// Polygon was split into a front and a back piece
    Split(Polygon, Polygon),
}

/// A convex planar polygon in world space, remembering which brush surface it
/// was cut from. Used as the working unit of brush composition.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    /// Vertices, counter-clockwise seen from the front of `plane`.
    pub vertices: Vec<FVector>,
    /// Plane the polygon lies on.
    pub plane: Plane,
    /// Index of the brush (in composition order) this polygon came from.
    pub brush_index: usize,
    /// Surface of that brush's control mesh.
    pub surface_index: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum SplitPlaneStatus {
    Front,
    Back,
    Either
}

impl Polygon {

    pub fn new(vertices: Vec<FVector>, plane: Plane, brush_index: usize, surface_index: usize) -> Polygon {
        Polygon { vertices, plane, brush_index, surface_index }
    }

    /// Reverse a polygon by flipping its plane and reversing the order of its vertices.
    pub fn reverse(&mut self) {
        self.plane = self.plane.flipped();
        self.vertices.reverse()
    }

    /// Fix up a polygon by deleting vertices that are identical. Clears the
    /// vertices if it collapses. Returns number of vertices, 0 or >=3.
    pub fn fix(&mut self) -> usize {
        use math::points_are_same;

        if self.vertices.is_empty() {
            return 0;
        }

        let mut prev = self.vertices.len() - 1;
        let mut j = 0usize;
        for i in 0..self.vertices.len() {
            if !points_are_same(&self.vertices[i], &self.vertices[prev]) {
                if j != i {
                    self.vertices[j] = self.vertices[i];
                }
                prev = j;
                j += 1;
            }
        }

        if j >= 3 {
            self.vertices.truncate(j);
        } else {
            self.vertices.clear();
        }

        self.vertices.len()
    }

    /// Compute the area.
    pub fn area(&self) -> f32 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        let mut side1 = self.vertices[1] - self.vertices[0];
        for i in 2..self.vertices.len() {
            let side2 = self.vertices[i] - self.vertices[0];
            area += side1.cross(side2).magnitude();
            side1 = side2;
        }
        area / 2.0
    }

    pub fn centroid(&self) -> FVector {
        let sum = self.vertices.iter().fold(FVector::new(0.0, 0.0, 0.0), |sum, vertex| sum + vertex);
        sum / self.vertices.len().max(1) as f32
    }

    /// Compute the normal implied by the winding of the vertices.
    pub fn calc_normal(&self) -> Result<FVector, CsgError> {
        let mut normal = FVector::new(0.0, 0.0, 0.0);
        for i in 2..self.vertices.len() {
            normal += (self.vertices[i - 1] - self.vertices[0]).cross(self.vertices[i] - self.vertices[0]);
        }
        if normal.magnitude2() < THRESH_ZERO_NORM_SQUARED {
            return Err(CsgError::degenerate("polygon has zero area"));
        }
        Ok(normal.normalize())
    }

    /// Fan triangulation from vertex 0, as indices into `vertices`.
    pub fn triangle_fan(&self) -> Vec<[u32; 3]> {
        (1..self.vertices.len().saturating_sub(1))
            .map(|i| [0, i as u32, i as u32 + 1])
            .collect()
    }

    /// Split with plane. Meant to be numerically stable.
    pub fn split_with_plane(&self, plane: &Plane) -> SplitType {
        let threshold = THRESH_SPLIT_POLY_WITH_PLANE;

        // Go through all of the polygon points and calculate the minimum and
        // maximum signed distance (in the direction of the normal) from each
        // point to the plane.
        let mut status_previous = SplitPlaneStatus::Either;
        let mut distance_max = f32::MIN;
        let mut distance_min = f32::MAX;

        for vertex in &self.vertices {
            let distance = plane.distance_to(*vertex);
            distance_max = distance.max(distance_max);
            distance_min = distance.min(distance_min);
            if distance > threshold {
                status_previous = SplitPlaneStatus::Front
            } else if distance < -threshold {
                status_previous = SplitPlaneStatus::Back
            }
        }

        if distance_max < threshold && distance_min > -threshold {
            return SplitType::Coplanar
        } else if distance_max < threshold {
            return SplitType::Back
        } else if distance_min > -threshold {
            return SplitType::Front
        }

        let mut front_poly = self.clone();
        front_poly.vertices.clear();

        let mut back_poly = self.clone();
        back_poly.vertices.clear();

        let plane_base = plane.point_on_plane();
        let mut j = self.vertices.len() - 1; // Previous vertex; have status_previous already.
        let mut distance_previous = plane.distance_to(self.vertices[j]);

        for i in 0..self.vertices.len() {
            let distance = plane.distance_to(self.vertices[i]);

            let status = if distance > threshold {
                SplitPlaneStatus::Front
            } else if distance < -threshold {
                SplitPlaneStatus::Back
            } else {
                status_previous
            };

            if status != status_previous {
                // Crossing.  Either Front-to-Back or Back-To-Front.
                // Intersection point is naturally on both front and back polys.
                if distance >= -threshold && distance < threshold {
                    // This point lies on plane.
                    front_poly.vertices.push(self.vertices[i]);
                    back_poly.vertices.push(self.vertices[i]);
                } else if distance_previous >= -threshold && distance_previous < threshold {
                    // Previous point lies on plane.
                    if status == SplitPlaneStatus::Front {
                        front_poly.vertices.push(self.vertices[j]);
                        front_poly.vertices.push(self.vertices[i]);
                    } else {
                        back_poly.vertices.push(self.vertices[j]);
                        back_poly.vertices.push(self.vertices[i]);
                    }
                } else {
                    // Intersection point is in between.
                    let intersection = line_plane_intersection(&self.vertices[j], &self.vertices[i], &plane_base, &plane.normal);

                    if status_previous == SplitPlaneStatus::Front {
                        front_poly.vertices.push(intersection);
                        back_poly.vertices.push(intersection);
                        back_poly.vertices.push(self.vertices[i]);
                    } else {
                        back_poly.vertices.push(intersection);
                        front_poly.vertices.push(intersection);
                        front_poly.vertices.push(self.vertices[i]);
                    }
                }
            } else if status == SplitPlaneStatus::Front {
                front_poly.vertices.push(self.vertices[i]);
            } else {
                back_poly.vertices.push(self.vertices[i]);
            }

            j = i;
            status_previous = status;
            distance_previous = distance;
        }

        // Handle possibility of sliver polys due to precision errors.
        if front_poly.fix() < 3 {
            SplitType::Back
        } else if back_poly.fix() < 3 {
            SplitType::Front
        } else {
            SplitType::Split(front_poly, back_poly)
        }
    }
}
