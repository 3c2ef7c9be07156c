//! egui presentation surface
//!
//! Keeps the overlay's retained UI state and paints it every egui frame.

use glam::{Vec2, Vec3};
use watchpost_core::{
    Color3, ConnectorId, ConnectorSpec, ControlAction, DockSide, OverlayConfig, PanelId, PanelSpec,
    Placement, PresentationSurface,
};

use crate::projector::Projector;
use crate::to_color32;

const EDGE_MARGIN: f32 = 8.0;
/// Space left above the docked stack for the control bar
const DOCK_TOP: f32 = 40.0;
const LABEL_SIZE: f32 = 12.0;

#[derive(Debug, Clone)]
struct EguiPanel {
    spec: PanelSpec,
    fields: Vec<String>,
    color: Color3,
    docked: bool,
    position: Option<Vec2>,
}

#[derive(Debug, Clone)]
struct EguiConnector {
    spec: ConnectorSpec,
    endpoints: Option<(Vec2, Vec2)>,
}

/// Retained overlay state painted with egui
pub struct EguiSurface {
    panels: Vec<Option<EguiPanel>>,
    connectors: Vec<Option<EguiConnector>>,
    console_lines: Vec<String>,
    console_line_height: f32,
    console_visible: bool,
    pin_requested: bool,
    panels_visible: bool,
    dock_side: DockSide,
    projector: Projector,
    main_width: f32,
    console_width: f32,
    console_height: f32,
    console_alpha: f32,
}

impl EguiSurface {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            panels: Vec::new(),
            connectors: Vec::new(),
            console_lines: Vec::new(),
            console_line_height: config.console_line_height_px,
            console_visible: false,
            pin_requested: false,
            panels_visible: true,
            dock_side: config.dock_side,
            projector: Projector::default(),
            main_width: config.main_panel_width,
            console_width: config.console_panel_width,
            console_height: config.console_panel_height_px,
            console_alpha: config.console_panel_alpha,
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Update the camera; call before `Overlay::frame` so anchors follow it
    pub fn set_projector(&mut self, projector: Projector) {
        self.projector = projector;
    }

    /// Current text of a panel field, looked up by entity name
    pub fn field_text(&self, name: &str, index: usize) -> Option<&str> {
        self.panels
            .iter()
            .flatten()
            .find(|p| p.spec.name == name)
            .and_then(|p| p.fields.get(index))
            .map(String::as_str)
    }

    pub fn panel_count(&self) -> usize {
        self.panels.iter().flatten().count()
    }

    pub fn console_lines(&self) -> &[String] {
        &self.console_lines
    }

    /// Paint everything and return the control bar button pressed, if any
    pub fn show(&mut self, ctx: &egui::Context, paused: bool) -> Option<ControlAction> {
        let screen = ctx
            .input(|i| i.raw.viewport().inner_rect)
            .unwrap_or_else(|| egui::Rect::from_min_size(egui::Pos2::ZERO, ctx.used_size()));

        let action = self.show_control_bar(ctx, paused);

        if self.panels_visible {
            self.show_connectors(ctx);
            self.show_docked(ctx, screen);
            self.show_floating(ctx);
            if self.console_visible {
                self.show_console(ctx, screen);
            }
        }

        action
    }

    fn dock_anchor(&self, top: f32) -> (egui::Align2, egui::Vec2) {
        match self.dock_side {
            DockSide::Left => (egui::Align2::LEFT_TOP, egui::vec2(EDGE_MARGIN, top)),
            DockSide::Right => (egui::Align2::RIGHT_TOP, egui::vec2(-EDGE_MARGIN, top)),
        }
    }

    fn show_control_bar(&self, ctx: &egui::Context, paused: bool) -> Option<ControlAction> {
        let mut clicked = None;
        let (align, offset) = self.dock_anchor(EDGE_MARGIN);

        egui::Area::new(egui::Id::new("watchpost_controls"))
            .anchor(align, offset)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for action in ControlAction::BAR {
                        let active = match action {
                            ControlAction::TogglePause => paused,
                            ControlAction::TogglePanels => !self.panels_visible,
                            _ => false,
                        };
                        if ui.selectable_label(active, action.label()).clicked() {
                            clicked = Some(action);
                        }
                    }
                });
            });

        clicked
    }

    fn show_docked(&self, ctx: &egui::Context, screen: egui::Rect) {
        let (align, offset) = self.dock_anchor(DOCK_TOP);
        let max_width = screen.width() * self.main_width;

        egui::Area::new(egui::Id::new("watchpost_dock"))
            .anchor(align, offset)
            .order(egui::Order::Middle)
            .show(ctx, |ui| {
                ui.set_max_width(max_width);
                ui.vertical(|ui| {
                    for panel in self.panels.iter().flatten().filter(|p| p.docked) {
                        panel_frame(ui, panel);
                    }
                });
            });
    }

    fn show_floating(&self, ctx: &egui::Context) {
        for panel in self.panels.iter().flatten().filter(|p| !p.docked) {
            let Some(position) = panel.position else {
                continue;
            };
            egui::Area::new(egui::Id::new(("watchpost_panel", panel.spec.name.as_str())))
                .fixed_pos(egui::pos2(position.x, position.y))
                .order(egui::Order::Middle)
                .show(ctx, |ui| panel_frame(ui, panel));
        }
    }

    fn show_connectors(&self, ctx: &egui::Context) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Background,
            egui::Id::new("watchpost_connectors"),
        ));
        for connector in self.connectors.iter().flatten() {
            let Some((from, to)) = connector.endpoints else {
                continue;
            };
            let spec = &connector.spec;
            let stroke = egui::Stroke::new(spec.line_width, to_color32(spec.color, spec.alpha));
            painter.extend(egui::Shape::dashed_line(
                &[egui::pos2(from.x, from.y), egui::pos2(to.x, to.y)],
                stroke,
                spec.dash[0],
                spec.dash[1],
            ));
        }
    }

    fn show_console(&mut self, ctx: &egui::Context, screen: egui::Rect) {
        let width = (screen.width() - 2.0 * EDGE_MARGIN) * self.console_width;
        let fill = to_color32(Color3::BLACK, self.console_alpha);
        let line_height = self.console_line_height;
        let pin = std::mem::take(&mut self.pin_requested);
        let lines = &self.console_lines;

        egui::Area::new(egui::Id::new("watchpost_console"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(EDGE_MARGIN, -EDGE_MARGIN))
            .order(egui::Order::Middle)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(fill)
                    .inner_margin(egui::Margin::same(4))
                    .show(ui, |ui| {
                        ui.set_width(width);
                        egui::ScrollArea::vertical()
                            .id_salt("watchpost_console_scroll")
                            .max_height(self.console_height)
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                for line in lines {
                                    ui.add_sized(
                                        [width, line_height],
                                        egui::Label::new(
                                            egui::RichText::new(line)
                                                .monospace()
                                                .size(line_height * 0.8)
                                                .color(egui::Color32::WHITE),
                                        ),
                                    );
                                }
                                if pin {
                                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                                }
                            });
                    });
            });
    }

    fn panel_mut(&mut self, id: PanelId) -> Option<&mut EguiPanel> {
        self.panels.get_mut(id.0 as usize).and_then(Option::as_mut)
    }
}

fn panel_frame(ui: &mut egui::Ui, panel: &EguiPanel) {
    egui::Frame::new()
        .fill(to_color32(panel.color, panel.spec.alpha))
        .inner_margin(egui::Margin::same(4))
        .show(ui, |ui| {
            ui.set_width(panel.spec.width_px);
            ui.label(
                egui::RichText::new(&panel.spec.label)
                    .size(LABEL_SIZE)
                    .color(egui::Color32::WHITE),
            );
            for field in &panel.fields {
                egui::Frame::new()
                    .fill(egui::Color32::from_gray(34))
                    .inner_margin(egui::Margin::same(2))
                    .show(ui, |ui| {
                        ui.set_width(panel.spec.width_px - 8.0);
                        ui.label(
                            egui::RichText::new(field)
                                .monospace()
                                .size(LABEL_SIZE)
                                .color(egui::Color32::WHITE),
                        );
                    });
            }
        });
}

impl PresentationSurface for EguiSurface {
    fn create_panel(&mut self, spec: PanelSpec) -> PanelId {
        let id = PanelId(self.panels.len() as u32);
        self.panels.push(Some(EguiPanel {
            fields: vec![String::new(); spec.input_count],
            color: spec.color,
            docked: spec.placement == Placement::Docked,
            position: None,
            spec,
        }));
        id
    }

    fn set_field_text(&mut self, panel: PanelId, index: usize, text: &str) {
        if let Some(field) = self
            .panel_mut(panel)
            .and_then(|p| p.fields.get_mut(index))
        {
            field.clear();
            field.push_str(text);
        }
    }

    fn set_panel_color(&mut self, panel: PanelId, color: Color3) {
        if let Some(panel) = self.panel_mut(panel) {
            panel.color = color;
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
        self.connectors.push(Some(EguiConnector {
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
            line.clear();
            line.push_str(text);
        }
    }

    fn set_console_visible(&mut self, visible: bool) {
        self.console_visible = visible;
    }

    fn pin_console_to_bottom(&mut self) {
        self.pin_requested = true;
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
        self.projector.project(world)
    }
}
