use approx::assert_relative_eq;
use cgmath::{Deg, Matrix4, Quaternion, Rotation3};
use realtime_csg::math::{points_are_near, FVector};
use realtime_csg::plane::{plane_triple_intersection, Plane};

#[test]
fn plane_new_normalizes_test() {
    let plane = Plane::new(FVector::new(0.0, 2.0, 0.0), 4.0).unwrap();
    assert_eq!(plane.normal, FVector::new(0.0, 1.0, 0.0));
    assert_relative_eq!(plane.distance, 2.0);
}

#[test]
fn plane_new_zero_normal_test() {
    assert!(Plane::new(FVector::new(0.0, 0.0, 0.0), 1.0).is_none());
}

#[test]
fn plane_new_from_points_test() {
    let plane = Plane::new_from_points(
        FVector::new(0.0, 0.0, 1.0),
        FVector::new(1.0, 0.0, 1.0),
        FVector::new(0.0, 1.0, 1.0),
    ).unwrap();
    assert_eq!(plane.normal, FVector::new(0.0, 0.0, 1.0));
    assert_relative_eq!(plane.distance, 1.0);
}

#[test]
fn plane_distance_to_test() {
    let plane = Plane { normal: FVector::new(1.0, 0.0, 0.0), distance: 2.0 };
    assert_relative_eq!(plane.distance_to(FVector::new(5.0, 1.0, 1.0)), 3.0);
    assert_relative_eq!(plane.distance_to(FVector::new(0.0, 1.0, 1.0)), -2.0);
    assert_eq!(plane.project(FVector::new(5.0, 1.0, 1.0)), FVector::new(2.0, 1.0, 1.0));
}

#[test]
fn plane_flipped_is_coplanar_test() {
    let plane = Plane { normal: FVector::new(0.0, 1.0, 0.0), distance: 3.0 };
    let flipped = plane.flipped();
    assert_eq!(flipped.normal, FVector::new(0.0, -1.0, 0.0));
    assert!(!plane.is_same(&flipped, 0.0001, 0.0001));
    assert!(plane.is_coplanar(&flipped, 0.0001, 0.0001));
}

#[test]
fn plane_transform_translation_test() {
    let plane = Plane { normal: FVector::new(0.0, 0.0, 1.0), distance: 1.0 };
    let moved = plane.transform(&Matrix4::from_translation(FVector::new(0.0, 0.0, 2.0))).unwrap();
    assert!(points_are_near(&moved.normal, &FVector::new(0.0, 0.0, 1.0), 0.0001));
    assert_relative_eq!(moved.distance, 3.0, epsilon = 0.0001);
}

#[test]
fn plane_transform_non_uniform_scale_test() {
    // Diagonal plane x + y = 1 stretched along x keeps containing the stretched points.
    let plane = Plane::new(FVector::new(1.0, 1.0, 0.0), 1.0).unwrap();
    let matrix = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
    let scaled = plane.transform(&matrix).unwrap();
    assert_relative_eq!(scaled.distance_to(FVector::new(2.0, 0.0, 0.0)), 0.0, epsilon = 0.0001);
    assert_relative_eq!(scaled.distance_to(FVector::new(0.0, 1.0, 0.0)), 0.0, epsilon = 0.0001);
}

#[test]
fn plane_transform_rotation_test() {
    let plane = Plane { normal: FVector::new(1.0, 0.0, 0.0), distance: 1.0 };
    let rotation = Matrix4::from(Quaternion::from_angle_z(Deg(90.0)));
    let rotated = plane.transform(&rotation).unwrap();
    assert!(points_are_near(&rotated.normal, &FVector::new(0.0, 1.0, 0.0), 0.0001));
    assert_relative_eq!(rotated.distance, 1.0, epsilon = 0.0001);
}

#[test]
fn plane_transform_singular_test() {
    let plane = Plane { normal: FVector::new(1.0, 0.0, 0.0), distance: 1.0 };
    assert!(plane.transform(&Matrix4::from_nonuniform_scale(0.0, 1.0, 1.0)).is_none());
}

#[test]
fn plane_triple_intersection_test() {
    let p1 = Plane { normal: FVector::new(1.0, 0.0, 0.0), distance: 1.0 };
    let p2 = Plane { normal: FVector::new(0.0, 1.0, 0.0), distance: 2.0 };
    let p3 = Plane { normal: FVector::new(0.0, 0.0, 1.0), distance: 3.0 };
    assert_eq!(plane_triple_intersection(&p1, &p2, &p3), Some(FVector::new(1.0, 2.0, 3.0)));
}

#[test]
fn plane_triple_intersection_parallel_test() {
    let p1 = Plane { normal: FVector::new(1.0, 0.0, 0.0), distance: 1.0 };
    let p2 = Plane { normal: FVector::new(-1.0, 0.0, 0.0), distance: 1.0 };
    let p3 = Plane { normal: FVector::new(0.0, 0.0, 1.0), distance: 3.0 };
    assert_eq!(plane_triple_intersection(&p1, &p2, &p3), None);
}
