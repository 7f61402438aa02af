use realtime_csg::bounds::AABB;
use realtime_csg::math::FVector;
use realtime_csg::operations::{compute_bounds, compute_bounds_of, compute_bounds_of_points};
use realtime_csg::{Brush, BrushTransform, CsgOperationType, NodeId, Shape};

fn make_brush(id: u32, min: FVector, max: FVector, position: FVector) -> Brush {
    let mut brush = Brush::new(NodeId(id), Shape::new_box(min, max), CsgOperationType::Additive, BrushTransform::new_from_position(position));
    brush.rebuild_control_mesh().unwrap();
    brush
}

#[test]
fn box_new_test() {
    let box_ = AABB::new();
    assert_eq!(box_.min, FVector::new(f32::INFINITY, f32::INFINITY, f32::INFINITY));
    assert_eq!(box_.max, FVector::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY));
    assert_eq!(box_.is_valid(), false);
}

#[test]
fn box_new_from_points_test() {
    let points = vec![
        FVector::new(1.0, 2.0, 3.0),
        FVector::new(4.0, 5.0, 6.0),
        FVector::new(7.0, 8.0, 9.0)
    ];
    let box_ = AABB::from_points(&points);
    assert_eq!(box_.min, FVector::new(1.0, 2.0, 3.0));
    assert_eq!(box_.max, FVector::new(7.0, 8.0, 9.0));
    assert_eq!(box_.is_valid(), true);
}

#[test]
fn box_new_from_min_max_test() {
    let min = FVector::new(1.0, 2.0, 3.0);
    let max = FVector::new(4.0, 5.0, 6.0);
    let box_ = AABB::new_from_min_max(min, max);
    assert_eq!(box_.min, min);
    assert_eq!(box_.max, max);
    assert_eq!(box_.is_valid(), true);
}

#[test]
fn box_center_test() {
    let box_ = AABB::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    assert_eq!(box_.center(), FVector::new(2.5, 3.5, 4.5));
}

#[test]
fn box_extent_test() {
    let box_ = AABB::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    assert_eq!(box_.extent(), FVector::new(1.5, 1.5, 1.5));
}

#[test]
fn box_expand_by_test() {
    let box_ = AABB::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    let expanded_box = box_.expand_by(1.0);
    assert_eq!(expanded_box.min, FVector::new(0.0, 1.0, 2.0));
    assert_eq!(expanded_box.max, FVector::new(5.0, 6.0, 7.0));
}

#[test]
fn box_expand_empty_stays_empty_test() {
    assert_eq!(AABB::new().expand_by(1.0).is_valid(), false);
}

#[test]
fn box_add_box_skips_empty_test() {
    let mut box_ = AABB::new_from_min_max(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0));
    box_.add_box(&AABB::new());
    assert_eq!(box_, AABB::new_from_min_max(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0)));
}

#[test]
fn box_index_test() {
    let box_ = AABB::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    assert_eq!(box_[0], FVector::new(1.0, 2.0, 3.0));
    assert_eq!(box_[1], FVector::new(4.0, 5.0, 6.0));
}

#[test]
fn box_intersect_disjoint_test() {
    let box1 = AABB::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    let box2 = AABB::new_from_min_max(FVector::new(5.0, 6.0, 7.0), FVector::new(8.0, 9.0, 10.0));
    assert_eq!(box1.intersect(&box2), false);
}

#[test]
fn box_intersect_contained_test() {
    let box1 = AABB::new_from_min_max(FVector::new(1.0, 2.0, 3.0), FVector::new(4.0, 5.0, 6.0));
    let box2 = AABB::new_from_min_max(FVector::new(2.0, 3.0, 4.0), FVector::new(3.0, 4.0, 5.0));
    assert_eq!(box1.intersect(&box2), true);
}

#[test]
fn box_intersect_overlap_test() {
    let box1 = AABB::new_from_min_max(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0));
    let box2 = AABB::new_from_min_max(FVector::new(0.5, 0.5, 0.5), FVector::new(1.5, 1.5, 1.5));
    assert_eq!(box1.intersect(&box2), true);
}

#[test]
fn compute_bounds_of_empty_list_is_sentinel_test() {
    let bounds = compute_bounds_of(&[]);
    assert_eq!(bounds.min, FVector::new(f32::INFINITY, f32::INFINITY, f32::INFINITY));
    assert_eq!(bounds.max, FVector::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY));
    assert_eq!(compute_bounds_of_points(&[]).is_valid(), false);
}

#[test]
fn compute_bounds_of_brush_without_mesh_is_sentinel_test() {
    let brush = Brush::new(NodeId(0), Shape::new_cube(1.0), CsgOperationType::Additive, BrushTransform::new());
    assert_eq!(compute_bounds(&brush).is_valid(), false);
}

#[test]
fn compute_bounds_uses_world_space_test() {
    let brush = make_brush(0, FVector::new(-1.0, -1.0, -1.0), FVector::new(1.0, 1.0, 1.0), FVector::new(10.0, 0.0, 0.0));
    let bounds = compute_bounds(&brush);
    assert_eq!(bounds.min, FVector::new(9.0, -1.0, -1.0));
    assert_eq!(bounds.max, FVector::new(11.0, 1.0, 1.0));
}

#[test]
fn compute_bounds_of_several_brushes_test() {
    let a = make_brush(0, FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0), FVector::new(0.0, 0.0, 0.0));
    let b = make_brush(1, FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 2.0, 1.0), FVector::new(3.0, 0.0, -1.0));
    let bounds = compute_bounds_of(&[&a, &b]);
    assert_eq!(bounds.min, FVector::new(0.0, 0.0, -1.0));
    assert_eq!(bounds.max, FVector::new(4.0, 2.0, 1.0));
}
