//! Projected path geometry
//!
//! Keeps tubes and markers as world-space polylines and circles, painted
//! on a background layer through the current [`Projector`].

use glam::Vec3;
use hashbrown::HashMap;
use watchpost_core::{MaterialDesc, MaterialId, MeshId, SceneGeometry};

use crate::projector::Projector;
use crate::to_color32;

/// Smallest width a tube or marker is drawn at, in pixels
const MIN_SCREEN_SIZE: f32 = 1.5;

#[derive(Debug, Clone)]
enum SceneMesh {
    Tube {
        path: Vec<Vec3>,
        radius: f32,
        material: MaterialId,
    },
    Marker {
        position: Vec3,
        diameter: f32,
        material: MaterialId,
    },
}

#[derive(Debug, Default)]
pub struct ProjectedScene {
    materials: HashMap<MaterialId, MaterialDesc>,
    meshes: HashMap<MeshId, SceneMesh>,
    next_material: u32,
    next_mesh: u32,
}

impl ProjectedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Paint every live mesh behind the overlay's panels
    pub fn paint(&self, ctx: &egui::Context, projector: &Projector) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("watchpost_scene"),
        ));

        for mesh in self.meshes.values() {
            match mesh {
                SceneMesh::Tube {
                    path,
                    radius,
                    material,
                } => {
                    let Some(color) = self.color(*material) else {
                        continue;
                    };
                    for segment in path.windows(2) {
                        let (Some(a), Some(b)) =
                            (projector.project(segment[0]), projector.project(segment[1]))
                        else {
                            continue;
                        };
                        let width = projector
                            .project_radius(segment[0], *radius)
                            .map_or(MIN_SCREEN_SIZE, |r| (2.0 * r).max(MIN_SCREEN_SIZE));
                        painter.line_segment(
                            [egui::pos2(a.x, a.y), egui::pos2(b.x, b.y)],
                            egui::Stroke::new(width, color),
                        );
                    }
                }
                SceneMesh::Marker {
                    position,
                    diameter,
                    material,
                } => {
                    let (Some(color), Some(center)) =
                        (self.color(*material), projector.project(*position))
                    else {
                        continue;
                    };
                    let radius = projector
                        .project_radius(*position, diameter * 0.5)
                        .map_or(MIN_SCREEN_SIZE, |r| r.max(MIN_SCREEN_SIZE));
                    painter.circle_filled(egui::pos2(center.x, center.y), radius, color);
                }
            }
        }
    }

    fn color(&self, material: MaterialId) -> Option<egui::Color32> {
        self.materials
            .get(&material)
            .map(|desc| to_color32(desc.emissive, desc.alpha))
    }

    fn next_mesh_id(&mut self) -> MeshId {
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        id
    }
}

impl SceneGeometry for ProjectedScene {
    fn create_material(&mut self, desc: MaterialDesc) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.insert(id, desc);
        id
    }

    fn create_tube(&mut self, path: &[Vec3], radius: f32, material: MaterialId) -> MeshId {
        let id = self.next_mesh_id();
        self.meshes.insert(
            id,
            SceneMesh::Tube {
                path: path.to_vec(),
                radius,
                material,
            },
        );
        id
    }

    fn create_marker(
        &mut self,
        position: Vec3,
        diameter: f32,
        _segments: u32,
        material: MaterialId,
    ) -> MeshId {
        let id = self.next_mesh_id();
        self.meshes.insert(
            id,
            SceneMesh::Marker {
                position,
                diameter,
                material,
            },
        );
        id
    }

    fn dispose_mesh(&mut self, mesh: MeshId) {
        if self.meshes.remove(&mesh).is_none() {
            tracing::debug!("dispose of unknown mesh {:?}", mesh);
        }
    }

    fn dispose_material(&mut self, material: MaterialId) {
        self.materials.remove(&material);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use watchpost_core::Color3;

    fn material(scene: &mut ProjectedScene) -> MaterialId {
        scene.create_material(MaterialDesc {
            name: "line".to_string(),
            emissive: Color3::new(0.0, 0.4, 0.0),
            alpha: 0.4,
        })
    }

    #[test]
    fn test_create_and_dispose() {
        let mut scene = ProjectedScene::new();
        let line = material(&mut scene);
        let tube = scene.create_tube(&[Vec3::ZERO, Vec3::X], 0.01, line);
        let marker = scene.create_marker(Vec3::ZERO, 0.08, 8, line);
        assert_eq!(scene.mesh_count(), 2);

        scene.dispose_mesh(tube);
        scene.dispose_mesh(marker);
        scene.dispose_mesh(marker);
        assert_eq!(scene.mesh_count(), 0);

        scene.dispose_material(line);
        assert_eq!(scene.material_count(), 0);
    }

    #[test]
    fn test_paint_headless() {
        let mut scene = ProjectedScene::new();
        let line = material(&mut scene);
        scene.create_tube(&[Vec3::ZERO, Vec3::X, Vec3::Y], 0.01, line);
        scene.create_marker(Vec3::new(0.0, 0.0, 50.0), 0.08, 8, line);

        let projector = Projector::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_3,
            Vec2::new(640.0, 480.0),
        );
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            scene.paint(ctx, &projector);
        });
        assert_eq!(scene.mesh_count(), 2);
    }
}
