use approx::assert_relative_eq;
use cgmath::{Deg, Quaternion, Rotation3};
use realtime_csg::math::{points_are_near, FVector, Tolerances};
use realtime_csg::operations::{compute_bounds, flip, snap_to_grid, transform_shapes, FlipAxis, PivotMode};
use realtime_csg::plane::Plane;
use realtime_csg::{Brush, BrushTransform, CsgError, CsgOperationType, NodeId, Shape};

fn make_brush(id: u32, shape: Shape, transform: BrushTransform) -> Brush {
    let mut brush = Brush::new(NodeId(id), shape, CsgOperationType::Additive, transform);
    brush.rebuild_control_mesh().unwrap();
    brush
}

fn assert_same_planes(a: &Shape, b: &Shape) {
    assert_eq!(a.len(), b.len());
    for (pa, pb) in a.planes().zip(b.planes()) {
        assert!(pa.is_same(pb, 0.0001, 0.0001), "{:?} != {:?}", pa, pb);
    }
}

#[test]
fn flip_twice_is_identity_test() {
    let tolerances = Tolerances::default();
    for pivot in [PivotMode::Global, PivotMode::Local] {
        let shape = Shape::new_box(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 2.0, 3.0));
        let mut brush = make_brush(0, shape.clone(), BrushTransform::new_from_position(FVector::new(5.0, 0.0, 0.0)));

        flip(&mut [&mut brush], FlipAxis::X, pivot, &tolerances).unwrap();
        flip(&mut [&mut brush], FlipAxis::X, pivot, &tolerances).unwrap();

        assert_same_planes(&shape, &brush.shape);
        assert!(brush.is_valid);
    }
}

#[test]
fn flip_mirrors_texture_basis_test() {
    let tolerances = Tolerances::default();
    let mut brush = make_brush(0, Shape::new_cube(1.0), BrushTransform::new());
    let original = brush.shape.surfaces[2].clone();
    assert!(points_are_near(&original.binormal, &FVector::new(-1.0, 0.0, 0.0), 0.0001));

    flip(&mut [&mut brush], FlipAxis::X, PivotMode::Local, &tolerances).unwrap();

    // +Y face: normal and tangent are unaffected by an X mirror, the binormal flips.
    let mirrored = &brush.shape.surfaces[2];
    assert!(points_are_near(&mirrored.plane.normal, &FVector::unit_y(), 0.0001));
    assert!(points_are_near(&mirrored.tangent, &original.tangent, 0.0001));
    assert!(points_are_near(&mirrored.binormal, &FVector::new(1.0, 0.0, 0.0), 0.0001));
    assert!(points_are_near(&mirrored.tangent.cross(mirrored.binormal), &-FVector::unit_y(), 0.0001));

    flip(&mut [&mut brush], FlipAxis::X, PivotMode::Local, &tolerances).unwrap();

    for (before, after) in Shape::new_cube(1.0).surfaces.iter().zip(brush.shape.surfaces.iter()) {
        assert!(before.is_same(after, &tolerances), "{:?} != {:?}", before, after);
    }
}

#[test]
fn flip_local_mirrors_around_origin_test() {
    let shape = Shape::new_box(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0));
    let mut brush = make_brush(0, shape, BrushTransform::new_from_position(FVector::new(5.0, 0.0, 0.0)));

    flip(&mut [&mut brush], FlipAxis::X, PivotMode::Local, &Tolerances::default()).unwrap();

    let bounds = compute_bounds(&brush);
    assert!(points_are_near(&bounds.min, &FVector::new(4.0, 0.0, 0.0), 0.0001));
    assert!(points_are_near(&bounds.max, &FVector::new(5.0, 1.0, 1.0), 0.0001));
    // Surfaces keep their order, the +X surface now faces -X.
    assert!(points_are_near(&brush.shape.surfaces[0].plane.normal, &FVector::new(-1.0, 0.0, 0.0), 0.0001));
}

#[test]
fn flip_global_keeps_selection_bounds_test() {
    let rotation = Quaternion::from_angle_z(Deg(30.0));
    let mut a = make_brush(0, Shape::new_cube(1.0), BrushTransform::new_from_position_rotation_scale(
        FVector::new(1.0, 0.0, 0.0), rotation, FVector::new(1.0, 1.0, 1.0)));
    let mut b = make_brush(1, Shape::new_cube(1.0), BrushTransform::new_from_position(FVector::new(4.0, 0.0, 0.0)));
    let a_before = compute_bounds(&a);
    let b_before = compute_bounds(&b);

    flip(&mut [&mut a, &mut b], FlipAxis::X, PivotMode::Global, &Tolerances::default()).unwrap();

    // The selection is mirrored as a whole: the brushes swap sides.
    let a_after = compute_bounds(&a);
    let b_after = compute_bounds(&b);
    let center = (a_before.min.x + b_before.max.x) * 0.5;
    assert_relative_eq!(a_after.max.x, 2.0 * center - a_before.min.x, epsilon = 0.001);
    assert_relative_eq!(b_after.min.x, 2.0 * center - b_before.max.x, epsilon = 0.001);
    // Transforms are untouched; only shapes change.
    assert_eq!(FVector::new(4.0, 0.0, 0.0), b.transform.position);
}

#[test]
fn flip_failure_rolls_back_batch_test() {
    let original = Shape::new_box(FVector::new(0.0, 0.0, 0.0), FVector::new(1.0, 1.0, 1.0));
    let mut good = make_brush(0, original.clone(), BrushTransform::new());
    let broken_shape = Shape::from_planes(&[
        Plane { normal: FVector::unit_x(), distance: 1.0 },
        Plane { normal: FVector::unit_y(), distance: 1.0 },
        Plane { normal: FVector::unit_z(), distance: 1.0 },
    ]);
    let mut broken = Brush::new(NodeId(1), broken_shape.clone(), CsgOperationType::Additive, BrushTransform::new());
    let good_mesh = good.control_mesh.clone();

    let error = flip(&mut [&mut good, &mut broken], FlipAxis::X, PivotMode::Local, &Tolerances::default()).unwrap_err();

    match error {
        CsgError::RebuildFailure { failed } => assert_eq!(vec![NodeId(1)], failed),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(original.surfaces, good.shape.surfaces);
    assert_eq!(good_mesh, good.control_mesh);
    assert!(good.is_valid);
    assert_eq!(broken_shape, broken.shape);
}

#[test]
fn transform_shapes_scales_around_local_origin_test() {
    let mut brush = make_brush(0, Shape::new_cube(2.0), BrushTransform::new_from_position(FVector::new(0.0, 10.0, 0.0)));
    let scale = cgmath::Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);

    transform_shapes(&mut [&mut brush], &scale, PivotMode::Local, &Tolerances::default()).unwrap();

    let bounds = compute_bounds(&brush);
    assert!(points_are_near(&bounds.min, &FVector::new(-2.0, 9.0, -1.0), 0.0001));
    assert!(points_are_near(&bounds.max, &FVector::new(2.0, 11.0, 1.0), 0.0001));
}

#[test]
fn snap_to_grid_moves_brushes_together_test() {
    let mut a = make_brush(0, Shape::new_cube(1.0), BrushTransform::new_from_position(FVector::new(0.3, 0.25, 0.0)));
    let mut b = make_brush(1, Shape::new_cube(1.0), BrushTransform::new_from_position(FVector::new(2.6, 0.25, 0.0)));
    let offset_before = b.transform.position - a.transform.position;

    let delta = snap_to_grid(&mut [&mut a, &mut b], 1.0).unwrap();

    assert_relative_eq!(delta.x, -0.1, epsilon = 0.0001);
    assert_relative_eq!(delta.y, 0.25, epsilon = 0.0001);
    assert_relative_eq!(delta.z.abs(), 0.5, epsilon = 0.0001);
    let offset_after = b.transform.position - a.transform.position;
    assert!(points_are_near(&offset_before, &offset_after, 0.0001));

    // Some vertex now sits on the grid along x.
    let on_grid = b.world_vertices().iter().chain(a.world_vertices().iter())
        .any(|vertex| (vertex.x - vertex.x.round()).abs() < 0.0001);
    assert!(on_grid);
}

#[test]
fn snap_to_grid_without_geometry_test() {
    let mut brush = Brush::new(NodeId(0), Shape::new_cube(1.0), CsgOperationType::Additive, BrushTransform::new());
    assert_eq!(None, snap_to_grid(&mut [&mut brush], 1.0));
    assert_eq!(FVector::new(0.0, 0.0, 0.0), brush.transform.position);
}
