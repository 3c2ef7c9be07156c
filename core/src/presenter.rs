//! Observer panels
//!
//! One panel per persistent entity: a name label over `input_count` text
//! fields. Docked panels stack in a screen corner; anchored panels follow
//! a projected world position with a dashed connector back to the anchor.

use glam::Vec2;

use crate::config::OverlayConfig;
use crate::entity::{LoggedEntity, PanelBinding};
use crate::router::Route;
use crate::surface::{ConnectorSpec, PanelSpec, Placement, PresentationSurface};
use crate::value::{Color3, Value};

const CONNECTOR_WIDTH_PX: f32 = 2.0;
const CONNECTOR_DASH_PX: [f32; 2] = [3.0, 3.0];
/// Vertical offset of the connector's panel end
const CONNECTOR_PANEL_OFFSET_Y_PX: f32 = -20.0;

pub struct ObserverPanelPresenter {
    width_px: f32,
    alpha: f32,
    lines_alpha: f32,
    offset: Vec2,
}

impl ObserverPanelPresenter {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            width_px: config.observer_panel_width_px,
            alpha: config.main_panel_alpha,
            lines_alpha: config.lines_alpha,
            offset: Vec2::new(config.anchor_offset_x_px, config.anchor_offset_y_px),
        }
    }

    /// Build the panel, plus a connector for anchored entities
    pub fn create_panel(
        &self,
        surface: &mut dyn PresentationSurface,
        entity: &LoggedEntity,
        route: &Route,
    ) -> PanelBinding {
        let options = entity.options();
        let panel = surface.create_panel(PanelSpec {
            name: entity.name().to_string(),
            label: entity.name().to_string(),
            input_count: route.input_count,
            width_px: self.width_px,
            color: entity.base_color,
            alpha: self.alpha,
            placement: if options.docked {
                Placement::Docked
            } else {
                Placement::Floating
            },
        });

        let connector = options.anchor().map(|_| {
            surface.create_connector(ConnectorSpec {
                panel,
                line_width: CONNECTOR_WIDTH_PX,
                dash: CONNECTOR_DASH_PX,
                alpha: self.lines_alpha,
                color: Color3::WHITE,
            })
        });

        PanelBinding {
            panel,
            input_count: route.input_count,
            connector,
        }
    }

    /// Apply a changed docked flag after re-registration
    pub fn set_docked(
        &self,
        surface: &mut dyn PresentationSurface,
        binding: &PanelBinding,
        docked: bool,
    ) {
        surface.set_panel_docked(binding.panel, docked);
    }

    /// Move an anchored panel and its connector to the anchor's screen position
    ///
    /// Returns whether the anchor was visible. Unanchored panels are left alone.
    pub fn update_anchor(
        &self,
        surface: &mut dyn PresentationSurface,
        binding: &PanelBinding,
        value: Option<&Value>,
    ) -> bool {
        let Some(connector) = binding.connector else {
            return true;
        };

        let anchor = value
            .and_then(Value::world_position)
            .and_then(|world| surface.project_to_screen(world));

        match anchor {
            Some(anchor) => {
                let panel_at = anchor + self.offset;
                let line_end = panel_at + Vec2::new(0.0, CONNECTOR_PANEL_OFFSET_Y_PX);
                surface.set_panel_screen_position(binding.panel, Some(panel_at));
                surface.set_connector_endpoints(connector, Some((anchor, line_end)));
                true
            }
            None => {
                surface.set_panel_screen_position(binding.panel, None);
                surface.set_connector_endpoints(connector, None);
                false
            }
        }
    }

    /// Tear down a panel and its connector
    pub fn remove(&self, surface: &mut dyn PresentationSurface, binding: &PanelBinding) {
        if let Some(connector) = binding.connector {
            surface.remove_connector(connector);
        }
        surface.remove_panel(binding.panel);
    }
}
