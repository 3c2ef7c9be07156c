//! Ephemeral geometry for point-sequence entities
//!
//! Every draw of a point sequence throws away the geometry of the previous
//! draw and builds a fresh tube plus one marker per point. There is no
//! diffing; entity counts are small and refresh-throttled.

use glam::Vec3;
use hashbrown::HashMap;

use crate::config::PathConfig;
use crate::entity::EntityId;
use crate::surface::{MaterialDesc, MaterialId, MeshId, SceneGeometry};

/// Meshes owned per entity, one generation at a time
#[derive(Debug, Default)]
pub struct GeometryArena {
    generations: HashMap<EntityId, Vec<MeshId>>,
}

impl GeometryArena {
    /// Dispose `owner`'s previous generation and start an empty one
    pub fn begin_generation(&mut self, scene: &mut dyn SceneGeometry, owner: EntityId) {
        if let Some(previous) = self.generations.get_mut(&owner) {
            for mesh in previous.drain(..) {
                scene.dispose_mesh(mesh);
            }
        }
    }

    pub fn track(&mut self, owner: EntityId, mesh: MeshId) {
        self.generations.entry(owner).or_default().push(mesh);
    }

    /// Live meshes of one owner
    pub fn meshes(&self, owner: EntityId) -> &[MeshId] {
        self.generations
            .get(&owner)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total live meshes across owners
    pub fn live_count(&self) -> usize {
        self.generations.values().map(Vec::len).sum()
    }

    /// Dispose everything
    pub fn dispose_all(&mut self, scene: &mut dyn SceneGeometry) {
        for (_, meshes) in self.generations.drain() {
            for mesh in meshes {
                scene.dispose_mesh(mesh);
            }
        }
    }
}

/// Shared materials used by every path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathMaterials {
    pub line: MaterialId,
    pub marker: MaterialId,
}

/// Builds tube + marker geometry for point sequences
#[derive(Debug)]
pub struct PathVisualizer {
    config: PathConfig,
    materials: PathMaterials,
    arena: GeometryArena,
}

impl PathVisualizer {
    /// Create the shared materials once
    pub fn new(scene: &mut dyn SceneGeometry, config: &PathConfig) -> Self {
        let line = scene.create_material(MaterialDesc {
            name: "watchpost-path-line".to_string(),
            emissive: config.line_color,
            alpha: config.alpha,
        });
        let marker = scene.create_material(MaterialDesc {
            name: "watchpost-path-marker".to_string(),
            emissive: config.marker_color,
            alpha: config.alpha,
        });
        Self {
            config: config.clone(),
            materials: PathMaterials { line, marker },
            arena: GeometryArena::default(),
        }
    }

    pub fn materials(&self) -> PathMaterials {
        self.materials
    }

    pub fn arena(&self) -> &GeometryArena {
        &self.arena
    }

    /// Replace `owner`'s geometry with a path through `points`
    ///
    /// A tube needs at least two points; markers are built for every point.
    pub fn rebuild(&mut self, scene: &mut dyn SceneGeometry, owner: EntityId, points: &[Vec3]) {
        self.arena.begin_generation(scene, owner);

        if points.len() >= 2 {
            let tube = scene.create_tube(points, self.config.tube_radius, self.materials.line);
            self.arena.track(owner, tube);
        }
        for point in points {
            let marker = scene.create_marker(
                *point,
                self.config.marker_diameter,
                self.config.marker_segments,
                self.materials.marker,
            );
            self.arena.track(owner, marker);
        }
    }

    /// Dispose all geometry and both shared materials
    pub fn shutdown(mut self, scene: &mut dyn SceneGeometry) {
        self.arena.dispose_all(scene);
        scene.dispose_material(self.materials.line);
        scene.dispose_material(self.materials.marker);
    }
}
