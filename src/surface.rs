use bitflags::bitflags;
use cgmath::{InnerSpace, Matrix4, Vector2};
use serde::{Deserialize, Serialize};

use crate::math::{any_perpendicular, points_are_near, transform_direction, FVector, Tolerances};
use crate::plane::Plane;

/// Opaque identity of a render material. Two handles are the same material
/// only if they are the same handle; contents are never compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u64);

/// Opaque identity of a physics material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicsMaterialId(pub u64);

/// Flags describing how a surface is rendered and collided with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TexGenFlags(u32);

bitflags! {
    impl TexGenFlags : u32 {
        /// Surface is not rendered.
        const NoRender          = 0x00000001;
        /// Surface does not cast shadows.
        const NoCastShadows     = 0x00000002;
        /// Surface does not receive shadows.
        const NoReceiveShadows  = 0x00000004;
        /// Surface is not part of the collider.
        const NoCollision       = 0x00000008;
        /// Texture coordinates are computed in world space instead of brush space.
        const WorldSpaceTexture = 0x00000010;
    }
}

// Flag names in SCREAMING_SNAKE_CASE, as used by hosts and saved files.
static TEX_GEN_FLAGS: phf::Map<&'static str, u32> = phf::phf_map! {
    "NO_RENDER" => 0x00000001,
    "NO_CAST_SHADOWS" => 0x00000002,
    "NO_RECEIVE_SHADOWS" => 0x00000004,
    "NO_COLLISION" => 0x00000008,
    "WORLD_SPACE_TEXTURE" => 0x00000010,
};

impl TexGenFlags {
    /// Build flags from a list of names. Unknown names are ignored.
    pub fn from_names<'a, I>(names: I) -> TexGenFlags
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut flags = TexGenFlags::empty();
        for name in names {
            match TEX_GEN_FLAGS.get(name) {
                Some(bits) => flags |= TexGenFlags::from_bits_retain(*bits),
                None => log::warn!("Unknown texgen flag {:?}", name),
            }
        }
        flags
    }
}

/// Texture projection parameters and material references of one surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TexGen {
    pub translation: Vector2<f32>,
    pub scale: Vector2<f32>,
    /// Rotation around the surface normal, in degrees.
    pub rotation_angle: f32,
    pub render_material: Option<MaterialId>,
    pub physics_material: Option<PhysicsMaterialId>,
    pub smoothing_group: u32,
}

impl Default for TexGen {
    fn default() -> Self {
        TexGen {
            translation: Vector2::new(0.0, 0.0),
            scale: Vector2::new(1.0, 1.0),
            rotation_angle: 0.0,
            render_material: None,
            physics_material: None,
            smoothing_group: 0,
        }
    }
}

impl TexGen {
    pub fn with_material(render_material: Option<MaterialId>, physics_material: Option<PhysicsMaterialId>) -> TexGen {
        TexGen { render_material, physics_material, ..Default::default() }
    }

    /// Compare within tolerance for the vector fields, exactly for identities.
    pub fn is_same(&self, other: &TexGen, tolerances: &Tolerances) -> bool {
        self.render_material == other.render_material
            && self.physics_material == other.physics_material
            && self.smoothing_group == other.smoothing_group
            && (self.translation.x - other.translation.x).abs() < tolerances.distance
            && (self.translation.y - other.translation.y).abs() < tolerances.distance
            && (self.scale.x - other.scale.x).abs() < tolerances.distance
            && (self.scale.y - other.scale.y).abs() < tolerances.distance
            && (self.rotation_angle - other.rotation_angle).abs() < tolerances.distance
    }
}

/// One bounding plane of a shape, together with everything indexed alongside it:
/// the texture basis, the texture generator and its flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub plane: Plane,
    pub tangent: FVector,
    pub binormal: FVector,
    pub tex_gen: TexGen,
    pub tex_gen_flags: TexGenFlags,
}

impl Surface {
    /// Create a surface with a generated tangent basis and default texturing.
    pub fn new(plane: Plane) -> Surface {
        let (tangent, binormal) = tangent_basis(plane.normal, None);
        Surface {
            plane,
            tangent,
            binormal,
            tex_gen: TexGen::default(),
            tex_gen_flags: TexGenFlags::empty(),
        }
    }

    pub fn with_tex_gen(mut self, tex_gen: TexGen) -> Surface {
        self.tex_gen = tex_gen;
        self
    }

    pub fn with_flags(mut self, tex_gen_flags: TexGenFlags) -> Surface {
        self.tex_gen_flags = tex_gen_flags;
        self
    }

    /// Transform plane and texture basis by an affine matrix, keeping the
    /// basis orthogonal to the new normal. The binormal follows the matrix, so
    /// a mirroring matrix also mirrors the texture projection.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Option<Surface> {
        let plane = self.plane.transform(matrix)?;
        let tangent = transform_direction(matrix, self.tangent);
        let (tangent, right_handed) = tangent_basis(plane.normal, Some(tangent));
        let binormal = orthogonalize(transform_direction(matrix, self.binormal), plane.normal, tangent)
            .unwrap_or(right_handed);
        Some(Surface {
            plane,
            tangent,
            binormal,
            tex_gen: self.tex_gen.clone(),
            tex_gen_flags: self.tex_gen_flags,
        })
    }

    pub fn is_same(&self, other: &Surface, tolerances: &Tolerances) -> bool {
        self.tex_gen_flags == other.tex_gen_flags
            && self.plane.is_same(&other.plane, tolerances.distance, tolerances.normal)
            && points_are_near(&self.tangent, &other.tangent, tolerances.normal)
            && points_are_near(&self.binormal, &other.binormal, tolerances.normal)
            && self.tex_gen.is_same(&other.tex_gen, tolerances)
    }
}

/// Orthonormal (tangent, binormal) pair for `normal`, with
/// `tangent x binormal == normal`. A hint tangent is projected onto the
/// plane when it is usable.
pub fn tangent_basis(normal: FVector, hint: Option<FVector>) -> (FVector, FVector) {
    let tangent = hint
        .map(|hint| hint - normal * hint.dot(normal))
        .filter(|projected| projected.magnitude2() > 1.0e-6)
        .map(|projected| projected.normalize())
        .unwrap_or_else(|| any_perpendicular(normal));
    let binormal = normal.cross(tangent).normalize();
    (tangent, binormal)
}

/// Remove the `normal` and `tangent` components of `vector`. `None` when
/// nothing is left.
fn orthogonalize(vector: FVector, normal: FVector, tangent: FVector) -> Option<FVector> {
    let projected = vector - normal * vector.dot(normal);
    let projected = projected - tangent * projected.dot(tangent);
    if projected.magnitude2() > 1.0e-6 {
        Some(projected.normalize())
    } else {
        None
    }
}
