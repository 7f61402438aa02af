use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::math::FVector;

/// An axis aligned bounding box. The empty box has `min = +inf` and
/// `max = -inf` on every axis, so folding points into it needs no special case.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    pub min: FVector,
    pub max: FVector,
}

impl Default for AABB {
    fn default() -> Self {
        Self::new()
    }
}

impl AABB {

    /// The empty (invalid) box.
    pub fn new() -> AABB {
        AABB {
            min: FVector::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: FVector::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn new_from_min_max(min: FVector, max: FVector) -> AABB {
        AABB { min, max }
    }

    pub fn from_points(points: &[FVector]) -> AABB {
        let mut bounds = AABB::new();
        bounds.add_points(points);
        bounds
    }

    /// A box is valid once it holds at least one point.
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    // Returns the midpoint between the min and max points.
    pub fn center(&self) -> FVector {
        (self.min + self.max) * 0.5
    }

    /// Returns the extent around the center
    pub fn extent(&self) -> FVector {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> FVector {
        self.max - self.min
    }

    pub fn add_point(&mut self, point: &FVector) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn add_points(&mut self, points: &[FVector]) {
        for point in points {
            self.add_point(point);
        }
    }

    pub fn add_box(&mut self, other: &AABB) {
        if other.is_valid() {
            self.add_point(&other.min);
            self.add_point(&other.max);
        }
    }

    pub fn expand_by(&self, w: f32) -> AABB {
        if !self.is_valid() {
            return *self;
        }
        AABB::new_from_min_max(
            self.min - FVector::new(w, w, w),
            self.max + FVector::new(w, w, w)
        )
    }

    pub fn translated(&self, delta: FVector) -> AABB {
        if !self.is_valid() {
            return *self;
        }
        AABB::new_from_min_max(self.min + delta, self.max + delta)
    }

    pub fn intersect(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

}

impl Index<usize> for AABB {
    type Output = FVector;
    fn index(&self, index: usize) -> &FVector {
        match index {
            0 => &self.min,
            1 => &self.max,
            _ => panic!("Index out of bounds")
        }
    }
}

impl IndexMut<usize> for AABB {
    fn index_mut(&mut self, index: usize) -> &mut FVector {
        match index {
            0 => &mut self.min,
            1 => &mut self.max,
            _ => panic!("Index out of bounds")
        }
    }
}
