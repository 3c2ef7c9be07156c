//! Presentation surface and scene geometry interfaces
//!
//! The overlay never talks to a UI toolkit or a renderer directly. It drives
//! these two narrow interfaces declaratively; a host plugs in an adapter
//! (see the `watchpost-egui` crate) or the recording implementations in
//! [`crate::headless`].

use glam::{Vec2, Vec3};

use crate::config::DockSide;
use crate::value::Color3;

/// Handle to a panel created on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelId(pub u32);

/// Handle to a connector line created on a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorId(pub u32);

/// Handle to a mesh created in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// Handle to a material created in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Where a panel lives on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// In the screen-corner stack, in creation order
    Docked,
    /// Positioned explicitly via `set_panel_screen_position`
    Floating,
}

/// Everything needed to build an observer panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    /// Entity name, unique per overlay
    pub name: String,
    /// Text of the name label
    pub label: String,
    /// Number of read-only text fields below the label
    pub input_count: usize,
    pub width_px: f32,
    pub color: Color3,
    pub alpha: f32,
    pub placement: Placement,
}

/// Dashed line from a world anchor to its panel
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorSpec {
    pub panel: PanelId,
    pub line_width: f32,
    /// Dash and gap length in pixels
    pub dash: [f32; 2],
    pub alpha: f32,
    pub color: Color3,
}

/// Material shared by the ephemeral path geometry
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    pub emissive: Color3,
    pub alpha: f32,
}

/// Retained-mode UI primitives the overlay drives
pub trait PresentationSurface {
    /// Create a panel with a name label and `input_count` text fields
    fn create_panel(&mut self, spec: PanelSpec) -> PanelId;

    /// Write a text field of a panel
    fn set_field_text(&mut self, panel: PanelId, index: usize, text: &str);

    /// Recolour a panel background
    fn set_panel_color(&mut self, panel: PanelId, color: Color3);

    /// Move a panel into or out of the docked stack
    fn set_panel_docked(&mut self, panel: PanelId, docked: bool);

    /// Position a floating panel; `None` hides it until positioned again
    fn set_panel_screen_position(&mut self, panel: PanelId, position: Option<Vec2>);

    fn remove_panel(&mut self, panel: PanelId);

    fn create_connector(&mut self, spec: ConnectorSpec) -> ConnectorId;

    /// Place a connector; `None` hides it
    fn set_connector_endpoints(&mut self, connector: ConnectorId, endpoints: Option<(Vec2, Vec2)>);

    fn remove_connector(&mut self, connector: ConnectorId);

    /// Build the fixed pool of console line widgets
    fn create_console_lines(&mut self, count: usize, line_height_px: f32);

    fn set_console_line(&mut self, index: usize, text: &str);

    /// Show or hide the console scroll container
    fn set_console_visible(&mut self, visible: bool);

    /// Scroll the console to its newest line
    fn pin_console_to_bottom(&mut self);

    /// Drop the console line pool
    fn clear_console_lines(&mut self);

    /// Show or hide every observer panel and console line widget
    fn set_panels_visible(&mut self, visible: bool);

    fn set_dock_side(&mut self, side: DockSide);

    /// Project a world position to screen pixels; `None` when off-screen or behind the camera
    fn project_to_screen(&self, world: Vec3) -> Option<Vec2>;
}

/// 3D scene primitives used by the path visualizer
pub trait SceneGeometry {
    fn create_material(&mut self, desc: MaterialDesc) -> MaterialId;

    /// Tube mesh following `path`
    fn create_tube(&mut self, path: &[Vec3], radius: f32, material: MaterialId) -> MeshId;

    /// Small sphere marking a single point
    fn create_marker(
        &mut self,
        position: Vec3,
        diameter: f32,
        segments: u32,
        material: MaterialId,
    ) -> MeshId;

    fn dispose_mesh(&mut self, mesh: MeshId);

    fn dispose_material(&mut self, material: MaterialId);
}
