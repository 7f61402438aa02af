use approx::assert_relative_eq;
use cgmath::{InnerSpace, Matrix4};
use realtime_csg::math::{points_are_near, FVector, Tolerances};
use realtime_csg::plane::Plane;
use realtime_csg::settings::CsgSettings;
use realtime_csg::shape::Shape;
use realtime_csg::surface::{tangent_basis, MaterialId, PhysicsMaterialId, Surface, TexGen, TexGenFlags};
use realtime_csg::operations::PivotMode;

#[test]
fn tangent_basis_is_right_handed_test() {
    for normal in [FVector::unit_x(), -FVector::unit_y(), FVector::new(1.0, 2.0, 3.0).normalize()] {
        let (tangent, binormal) = tangent_basis(normal, None);
        assert_relative_eq!(tangent.dot(normal), 0.0, epsilon = 0.0001);
        assert_relative_eq!(binormal.dot(normal), 0.0, epsilon = 0.0001);
        assert!(points_are_near(&tangent.cross(binormal), &normal, 0.0001));
    }
}

#[test]
fn tangent_basis_uses_hint_test() {
    let (tangent, _) = tangent_basis(FVector::unit_z(), Some(FVector::new(1.0, 0.0, 0.5)));
    assert!(points_are_near(&tangent, &FVector::unit_x(), 0.0001));
}

#[test]
fn surface_transform_keeps_basis_orthogonal_test() {
    let surface = Surface::new(Plane::new(FVector::new(1.0, 1.0, 0.0), 1.0).unwrap());
    let transformed = surface.transform(&Matrix4::from_nonuniform_scale(3.0, 1.0, 2.0)).unwrap();
    assert_relative_eq!(transformed.tangent.dot(transformed.plane.normal), 0.0, epsilon = 0.0001);
    assert_relative_eq!(transformed.binormal.dot(transformed.plane.normal), 0.0, epsilon = 0.0001);
}

#[test]
fn surface_is_same_compares_materials_exactly_test() {
    let plane = Plane { normal: FVector::unit_y(), distance: 1.0 };
    let a = Surface::new(plane).with_tex_gen(TexGen::with_material(Some(MaterialId(1)), None));
    let b = Surface::new(plane).with_tex_gen(TexGen::with_material(Some(MaterialId(2)), None));
    let tolerances = Tolerances::default();
    assert!(a.is_same(&a.clone(), &tolerances));
    assert!(!a.is_same(&b, &tolerances));
    assert!(!a.is_same(&a.clone().with_flags(TexGenFlags::NoRender), &tolerances));
}

#[test]
fn tex_gen_flags_from_names_test() {
    let flags = TexGenFlags::from_names(["NO_RENDER", "NO_COLLISION", "NOT_A_FLAG"]);
    assert_eq!(TexGenFlags::NoRender | TexGenFlags::NoCollision, flags);
}

#[test]
fn shape_box_order_test() {
    let shape = Shape::new_box(FVector::new(-1.0, -2.0, -3.0), FVector::new(1.0, 2.0, 3.0));
    assert_eq!(6, shape.len());
    assert_eq!(FVector::unit_x(), shape.surfaces[0].plane.normal);
    assert_eq!(-FVector::unit_z(), shape.surfaces[5].plane.normal);
    assert_eq!(3.0, shape.surfaces[5].plane.distance);
    assert!(shape.contains(FVector::new(0.0, 0.0, 0.0), 0.0));
    assert!(!shape.contains(FVector::new(0.0, 2.5, 0.0), 0.0));
    assert!(shape.validate(&Tolerances::default()).is_ok());
}

#[test]
fn shape_validate_rejects_skewed_basis_test() {
    let mut shape = Shape::new_cube(1.0);
    shape.surfaces[2].tangent = shape.surfaces[2].plane.normal;
    assert!(shape.validate(&Tolerances::default()).unwrap_err().is_degenerate());
}

#[test]
fn shape_json_test() {
    let mut shape = Shape::new_cube(2.0);
    shape.set_tex_gen(&TexGen::with_material(Some(MaterialId(7)), Some(PhysicsMaterialId(3))));
    shape.surfaces[1].tex_gen_flags = TexGenFlags::NoCastShadows;

    let json = shape.to_json().unwrap();
    let loaded = Shape::from_json(&json).unwrap();

    assert_eq!(shape, loaded);
}

#[test]
fn shape_json_rejects_garbage_test() {
    let error = Shape::from_json("{\"surfaces\": 3}").unwrap_err();
    assert!(matches!(error, realtime_csg::CsgError::Serialization(_)));
}

#[test]
fn settings_defaults_fill_missing_fields_test() {
    let settings = CsgSettings::from_json("{\"grid_spacing\": 0.25, \"pivot_mode\": \"Local\"}").unwrap();
    assert_eq!(0.25, settings.grid_spacing);
    assert_eq!(PivotMode::Local, settings.pivot_mode);
    assert_eq!(Tolerances::default(), settings.tolerances);
    assert_eq!(CsgSettings::default().classification_offset, settings.classification_offset);
}

#[test]
fn settings_json_test() {
    let settings = CsgSettings::default();
    let loaded = CsgSettings::from_json(&settings.to_json().unwrap()).unwrap();
    assert_eq!(settings, loaded);
}
