//! Headless surface and scene
//!
//! Record-only implementations of [`PresentationSurface`] and
//! [`SceneGeometry`]. Useful for tests and for hosts that want to run the
//! overlay logic without any UI attached.

use glam::{Vec2, Vec3};
use hashbrown::HashMap;

use crate::config::DockSide;
use crate::surface::{
    ConnectorId, ConnectorSpec, MaterialDesc, MaterialId, MeshId, PanelId, PanelSpec, Placement,
    PresentationSurface, SceneGeometry,
};
use crate::value::Color3;

/// Recorded state of one panel
#[derive(Debug, Clone)]
pub struct HeadlessPanel {
    pub spec: PanelSpec,
    pub fields: Vec<String>,
    pub color: Color3,
    pub docked: bool,
    pub position: Option<Vec2>,
    /// Number of `set_field_text` calls received
    pub field_writes: usize,
    /// Every colour applied, in order
    pub color_history: Vec<Color3>,
}

/// Recorded state of one connector
#[derive(Debug, Clone)]
pub struct HeadlessConnector {
    pub spec: ConnectorSpec,
    pub endpoints: Option<(Vec2, Vec2)>,
}

type Projection = Box<dyn Fn(Vec3) -> Option<Vec2>>;

/// Surface that records everything it is told
pub struct HeadlessSurface {
    panels: Vec<Option<HeadlessPanel>>,
    connectors: Vec<Option<HeadlessConnector>>,
    console_lines: Vec<String>,
    console_line_height: f32,
    console_visible: bool,
    console_pins: usize,
    panels_visible: bool,
    dock_side: DockSide,
    projection: Projection,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    /// Surface with a flat projection: world `(x, y)` maps to pixels,
    /// points with negative `z` count as behind the camera
    pub fn new() -> Self {
        Self::with_projection(|world| (world.z >= 0.0).then(|| Vec2::new(world.x, world.y)))
    }

    pub fn with_projection(projection: impl Fn(Vec3) -> Option<Vec2> + 'static) -> Self {
        Self {
            panels: Vec::new(),
            connectors: Vec::new(),
            console_lines: Vec::new(),
            console_line_height: 0.0,
            console_visible: false,
            console_pins: 0,
            panels_visible: true,
            dock_side: DockSide::default(),
            projection: Box::new(projection),
        }
    }

    pub fn panel(&self, id: PanelId) -> Option<&HeadlessPanel> {
        self.panels.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn panel_by_name(&self, name: &str) -> Option<&HeadlessPanel> {
        self.panels.iter().flatten().find(|p| p.spec.name == name)
    }

    /// Text of a field, looked up by entity name
    pub fn field_text(&self, name: &str, index: usize) -> Option<&str> {
        self.panel_by_name(name)
            .and_then(|p| p.fields.get(index))
            .map(String::as_str)
    }

    pub fn panel_color(&self, name: &str) -> Option<Color3> {
        self.panel_by_name(name).map(|p| p.color)
    }

    /// Names of docked panels in stack order
    pub fn docked_names(&self) -> Vec<&str> {
        self.panels
            .iter()
            .flatten()
            .filter(|p| p.docked)
            .map(|p| p.spec.name.as_str())
            .collect()
    }

    pub fn live_panel_count(&self) -> usize {
        self.panels.iter().flatten().count()
    }

    pub fn connector(&self, id: ConnectorId) -> Option<&HeadlessConnector> {
        self.connectors.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn live_connector_count(&self) -> usize {
        self.connectors.iter().flatten().count()
    }

    pub fn console_lines(&self) -> &[String] {
        &self.console_lines
    }

    pub fn console_line_height(&self) -> f32 {
        self.console_line_height
    }

    pub fn console_visible(&self) -> bool {
        self.console_visible
    }

    /// Number of times the console was scrolled to the bottom
    pub fn console_pins(&self) -> usize {
        self.console_pins
    }

    pub fn panels_visible(&self) -> bool {
        self.panels_visible
    }

    pub fn dock_side(&self) -> DockSide {
        self.dock_side
    }

    /// Total `set_field_text` calls across every panel ever created
    pub fn total_field_writes(&self) -> usize {
        self.panels.iter().flatten().map(|p| p.field_writes).sum()
    }

    fn panel_mut(&mut self, id: PanelId) -> Option<&mut HeadlessPanel> {
        self.panels.get_mut(id.0 as usize).and_then(Option::as_mut)
    }
}

impl PresentationSurface for HeadlessSurface {
    fn create_panel(&mut self, spec: PanelSpec) -> PanelId {
        let id = PanelId(self.panels.len() as u32);
        self.panels.push(Some(HeadlessPanel {
            fields: vec![String::new(); spec.input_count],
            color: spec.color,
            docked: spec.placement == Placement::Docked,
            position: None,
            field_writes: 0,
            color_history: vec![spec.color],
            spec,
        }));
        id
    }

    fn set_field_text(&mut self, panel: PanelId, index: usize, text: &str) {
        if let Some(panel) = self.panel_mut(panel)
            && let Some(field) = panel.fields.get_mut(index)
        {
            *field = text.to_string();
            panel.field_writes += 1;
        }
    }

    fn set_panel_color(&mut self, panel: PanelId, color: Color3) {
        if let Some(panel) = self.panel_mut(panel) {
            panel.color = color;
            panel.color_history.push(color);
        }
    }

    fn set_panel_docked(&mut self, panel: PanelId, docked: bool) {
        if let Some(panel) = self.panel_mut(panel) {
            panel.docked = docked;
        }
    }

    fn set_panel_screen_position(&mut self, panel: PanelId, position: Option<Vec2>) {
        if let Some(panel) = self.panel_mut(panel) {
            panel.position = position;
        }
    }

    fn remove_panel(&mut self, panel: PanelId) {
        if let Some(slot) = self.panels.get_mut(panel.0 as usize) {
            *slot = None;
        }
    }

    fn create_connector(&mut self, spec: ConnectorSpec) -> ConnectorId {
        let id = ConnectorId(self.connectors.len() as u32);
        self.connectors.push(Some(HeadlessConnector {
            spec,
            endpoints: None,
        }));
        id
    }

    fn set_connector_endpoints(&mut self, connector: ConnectorId, endpoints: Option<(Vec2, Vec2)>) {
        if let Some(Some(c)) = self.connectors.get_mut(connector.0 as usize) {
            c.endpoints = endpoints;
        }
    }

    fn remove_connector(&mut self, connector: ConnectorId) {
        if let Some(slot) = self.connectors.get_mut(connector.0 as usize) {
            *slot = None;
        }
    }

    fn create_console_lines(&mut self, count: usize, line_height_px: f32) {
        self.console_lines = vec![String::new(); count];
        self.console_line_height = line_height_px;
    }

    fn set_console_line(&mut self, index: usize, text: &str) {
        if let Some(line) = self.console_lines.get_mut(index) {
            *line = text.to_string();
        }
    }

    fn set_console_visible(&mut self, visible: bool) {
        self.console_visible = visible;
    }

    fn pin_console_to_bottom(&mut self) {
        self.console_pins += 1;
    }

    fn clear_console_lines(&mut self) {
        self.console_lines.clear();
    }

    fn set_panels_visible(&mut self, visible: bool) {
        self.panels_visible = visible;
    }

    fn set_dock_side(&mut self, side: DockSide) {
        self.dock_side = side;
    }

    fn project_to_screen(&self, world: Vec3) -> Option<Vec2> {
        (self.projection)(world)
    }
}

/// Recorded mesh
#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessMesh {
    Tube {
        path: Vec<Vec3>,
        radius: f32,
        material: MaterialId,
    },
    Marker {
        position: Vec3,
        diameter: f32,
        segments: u32,
        material: MaterialId,
    },
}

/// Scene that records created and disposed geometry
#[derive(Debug, Default)]
pub struct HeadlessScene {
    materials: HashMap<MaterialId, MaterialDesc>,
    meshes: HashMap<MeshId, HeadlessMesh>,
    next_material: u32,
    next_mesh: u32,
    disposed_meshes: usize,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn materials(&self) -> &HashMap<MaterialId, MaterialDesc> {
        &self.materials
    }

    pub fn mesh(&self, id: MeshId) -> Option<&HeadlessMesh> {
        self.meshes.get(&id)
    }

    pub fn live_mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn tube_count(&self) -> usize {
        self.meshes
            .values()
            .filter(|m| matches!(m, HeadlessMesh::Tube { .. }))
            .count()
    }

    pub fn disposed_mesh_count(&self) -> usize {
        self.disposed_meshes
    }

    fn next_mesh_id(&mut self) -> MeshId {
        let id = MeshId(self.next_mesh);
        self.next_mesh += 1;
        id
    }
}

impl SceneGeometry for HeadlessScene {
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
            HeadlessMesh::Tube {
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
        segments: u32,
        material: MaterialId,
    ) -> MeshId {
        let id = self.next_mesh_id();
        self.meshes.insert(
            id,
            HeadlessMesh::Marker {
                position,
                diameter,
                segments,
                material,
            },
        );
        id
    }

    fn dispose_mesh(&mut self, mesh: MeshId) {
        if self.meshes.remove(&mesh).is_some() {
            self.disposed_meshes += 1;
        }
    }

    fn dispose_material(&mut self, material: MaterialId) {
        self.materials.remove(&material);
    }
}
