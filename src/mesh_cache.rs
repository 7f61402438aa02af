//! Generated mesh instances, bucketed by surface type and material.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use arrayvec::ArrayVec;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::brush::{Brush, NodeId};
use crate::csg::{ComposedPolygon, Composition};
use crate::surface::{MaterialId, PhysicsMaterialId, Surface, TexGenFlags};

/// How the geometry of a mesh instance is used downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderSurfaceType {
    Normal,
    Hidden,
    Invisible,
    Culled,
    Collider,
    Trigger,
    ShadowOnly,
    CastShadows,
    ReceiveShadows,
}

/// Render surface type implied by a surface's flags.
pub fn render_surface_type(flags: TexGenFlags) -> RenderSurfaceType {
    if !flags.contains(TexGenFlags::NoRender) {
        RenderSurfaceType::Normal
    } else if !flags.contains(TexGenFlags::NoCastShadows) {
        RenderSurfaceType::ShadowOnly
    } else {
        RenderSurfaceType::Hidden
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshInstanceKey {
    pub surface_type: RenderSurfaceType,
    pub render_material: Option<MaterialId>,
    pub physics_material: Option<PhysicsMaterialId>,
}

impl MeshInstanceKey {
    /// Build a key. Only `Normal` surfaces are keyed by render material, every
    /// other type collapses onto `None` for it.
    pub fn generate(surface_type: RenderSurfaceType, render_material: Option<MaterialId>, physics_material: Option<PhysicsMaterialId>) -> MeshInstanceKey {
        let render_material = match surface_type {
            RenderSurfaceType::Normal => render_material,
            _ => None,
        };
        MeshInstanceKey { surface_type, render_material, physics_material }
    }
}

/// Mesh instances a surface contributes to: at most one visual instance and
/// one collider instance.
pub fn surface_mesh_keys(surface: &Surface) -> ArrayVec<MeshInstanceKey, 2> {
    let mut keys = ArrayVec::new();
    let tex_gen = &surface.tex_gen;
    let surface_type = render_surface_type(surface.tex_gen_flags);
    if surface_type != RenderSurfaceType::Hidden {
        keys.push(MeshInstanceKey::generate(surface_type, tex_gen.render_material, None));
    }
    if !surface.tex_gen_flags.contains(TexGenFlags::NoCollision) {
        keys.push(MeshInstanceKey::generate(RenderSurfaceType::Collider, tex_gen.render_material, tex_gen.physics_material));
    }
    keys
}

/// Content hashes of the geometry bucketed into one instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHashes {
    pub vertex_hash: u64,
    pub triangle_hash: u64,
    pub surface_hash: u64,
    pub polygon_count: usize,
    pub vertex_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMeshInstance {
    pub key: MeshInstanceKey,
    pub hashes: MeshHashes,
    /// Set when the contents changed and the consumer has not regenerated yet.
    pub dirty: bool,
    /// Cache generation of the last content change.
    pub generation: u64,
}

impl GeneratedMeshInstance {
    pub fn new(key: MeshInstanceKey, generation: u64) -> GeneratedMeshInstance {
        GeneratedMeshInstance {
            key,
            hashes: MeshHashes::default(),
            dirty: true,
            generation,
        }
    }

    /// Store new hashes, marking the instance dirty only if they differ.
    pub fn update_hashes(&mut self, hashes: MeshHashes, generation: u64) -> bool {
        if self.hashes == hashes {
            return false;
        }
        self.hashes = hashes;
        self.dirty = true;
        self.generation = generation;
        true
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshInstanceCache {
    instances: HashMap<MeshInstanceKey, GeneratedMeshInstance>,
    generation: u64,
}

impl MeshInstanceCache {
    pub fn new() -> MeshInstanceCache {
        MeshInstanceCache::default()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn contains(&self, key: &MeshInstanceKey) -> bool {
        self.instances.contains_key(key)
    }

    pub fn get(&self, key: &MeshInstanceKey) -> Option<&GeneratedMeshInstance> {
        self.instances.get(key)
    }

    /// The instance for `key`, created dirty if it does not exist yet.
    pub fn get_or_create(&mut self, key: MeshInstanceKey) -> &mut GeneratedMeshInstance {
        let generation = self.generation;
        self.instances.entry(key).or_insert_with(|| {
            debug!("Creating mesh instance {:?}", key);
            GeneratedMeshInstance::new(key, generation)
        })
    }

    /// Remove every instance whose key is not live. Returns how many were removed.
    pub fn prune(&mut self, live_keys: &HashSet<MeshInstanceKey>) -> usize {
        let before = self.instances.len();
        self.instances.retain(|key, _| live_keys.contains(key));
        let removed = before - self.instances.len();
        if removed > 0 {
            debug!("Pruned {} mesh instances", removed);
        }
        removed
    }

    pub fn instances(&self) -> impl Iterator<Item = &GeneratedMeshInstance> + '_ {
        self.instances.values()
    }

    pub fn dirty_instances(&self) -> impl Iterator<Item = &GeneratedMeshInstance> + '_ {
        self.instances.values().filter(|instance| instance.dirty)
    }

    /// Called by the consumer once it has regenerated the dirty instances.
    pub fn clear_dirty(&mut self) {
        for instance in self.instances.values_mut() {
            instance.dirty = false;
        }
    }

    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// What one `GeneratedMeshes::update` pass did to the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeshUpdateReport {
    pub created: usize,
    pub changed: usize,
    pub pruned: usize,
}

/// Running hashes of the polygons bucketed into one key.
struct HashAccumulator {
    vertices: DefaultHasher,
    triangles: DefaultHasher,
    surfaces: DefaultHasher,
    polygon_count: usize,
    vertex_count: usize,
}

impl HashAccumulator {
    fn new() -> HashAccumulator {
        HashAccumulator {
            vertices: DefaultHasher::new(),
            triangles: DefaultHasher::new(),
            surfaces: DefaultHasher::new(),
            polygon_count: 0,
            vertex_count: 0,
        }
    }

    fn add(&mut self, polygon: &ComposedPolygon, surface: &Surface) {
        for vertex in &polygon.vertices {
            vertex.x.to_bits().hash(&mut self.vertices);
            vertex.y.to_bits().hash(&mut self.vertices);
            vertex.z.to_bits().hash(&mut self.vertices);
        }
        polygon.plane.normal.x.to_bits().hash(&mut self.vertices);
        polygon.plane.normal.y.to_bits().hash(&mut self.vertices);
        polygon.plane.normal.z.to_bits().hash(&mut self.vertices);

        let offset = self.vertex_count as u32;
        for i in 1..polygon.vertices.len().saturating_sub(1) as u32 {
            [offset, offset + i, offset + i + 1].hash(&mut self.triangles);
        }

        hash_surface(polygon.brush, polygon.surface_index, surface, &mut self.surfaces);

        self.polygon_count += 1;
        self.vertex_count += polygon.vertices.len();
    }

    fn finish(&self) -> MeshHashes {
        MeshHashes {
            vertex_hash: self.vertices.finish(),
            triangle_hash: self.triangles.finish(),
            surface_hash: self.surfaces.finish(),
            polygon_count: self.polygon_count,
            vertex_count: self.vertex_count,
        }
    }
}

fn hash_surface(brush: NodeId, surface_index: usize, surface: &Surface, hasher: &mut DefaultHasher) {
    let tex_gen = &surface.tex_gen;
    brush.hash(hasher);
    surface_index.hash(hasher);
    surface.tex_gen_flags.bits().hash(hasher);
    tex_gen.translation.x.to_bits().hash(hasher);
    tex_gen.translation.y.to_bits().hash(hasher);
    tex_gen.scale.x.to_bits().hash(hasher);
    tex_gen.scale.y.to_bits().hash(hasher);
    tex_gen.rotation_angle.to_bits().hash(hasher);
    tex_gen.render_material.hash(hasher);
    tex_gen.physics_material.hash(hasher);
    tex_gen.smoothing_group.hash(hasher);
    for axis in [surface.tangent, surface.binormal] {
        axis.x.to_bits().hash(hasher);
        axis.y.to_bits().hash(hasher);
        axis.z.to_bits().hash(hasher);
    }
}

/// The generated meshes of one model. Owns the instance cache.
#[derive(Clone, Debug, Default)]
pub struct GeneratedMeshes {
    cache: MeshInstanceCache,
}

impl GeneratedMeshes {
    pub fn new() -> GeneratedMeshes {
        GeneratedMeshes::default()
    }

    pub fn cache(&self) -> &MeshInstanceCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut MeshInstanceCache {
        &mut self.cache
    }

    /// Re-bucket the composed polygons by mesh key, refresh the hashes of
    /// every bucket and drop instances no surface maps to anymore.
    pub fn update(&mut self, brushes: &[Brush], composition: &Composition) -> MeshUpdateReport {
        let by_id: HashMap<NodeId, &Brush> = brushes.iter().map(|brush| (brush.node_id, brush)).collect();

        // Keys in first-seen order keep the pass deterministic.
        let mut order: Vec<MeshInstanceKey> = Vec::new();
        let mut buckets: HashMap<MeshInstanceKey, HashAccumulator> = HashMap::new();

        for polygon in &composition.polygons {
            let Some(surface) = by_id.get(&polygon.brush)
                .and_then(|brush| brush.control_mesh.as_ref())
                .and_then(|mesh| mesh.surfaces.get(polygon.surface_index))
            else {
                continue;
            };
            for key in surface_mesh_keys(surface) {
                buckets.entry(key).or_insert_with(|| {
                    order.push(key);
                    HashAccumulator::new()
                }).add(polygon, surface);
            }
        }

        let generation = self.cache.next_generation();
        let mut report = MeshUpdateReport::default();
        for key in &order {
            let hashes = buckets[key].finish();
            let created = !self.cache.contains(key);
            let instance = self.cache.get_or_create(*key);
            let changed = instance.update_hashes(hashes, generation);
            if created {
                report.created += 1;
            } else if changed {
                report.changed += 1;
            }
        }

        let live: HashSet<MeshInstanceKey> = order.into_iter().collect();
        report.pruned = self.cache.prune(&live);
        report
    }
}
