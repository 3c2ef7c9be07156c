//! Watchpost demo host
//!
//! A point orbits the origin while a few scalar values drift. Everything is
//! registered with the overlay: docked observers, a world-anchored panel on
//! the orbiting point, a waypoint path, and periodic console lines.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Vec2, Vec3};
use watchpost_core::{
    AnchorKind, Color3, Inspect, Overlay, OverlayConfig, RefreshRate, Source, Value, config,
};
use watchpost_egui::{EguiSurface, ProjectedScene, Projector};

const ORBIT_RADIUS: f32 = 2.0;
const CONSOLE_INTERVAL_TICKS: u64 = 120;
const CAMERA_EYE: Vec3 = Vec3::new(0.0, 3.0, 7.0);

#[derive(Parser)]
#[command(name = "watchpost-demo")]
#[command(about = "Orbiting-point demo for the Watchpost overlay")]
struct Cli {
    /// Overlay config file (defaults to overlay.toml in the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Host-side values the overlay watches
struct Stats {
    health: f64,
    shielded: bool,
    tint: Color3,
    fps: f64,
}

impl Inspect for Stats {
    fn inspect(&self) -> Value {
        Value::Opaque(format!("Stats(health={})", self.health))
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "health" => Some(Value::Number(self.health)),
            "shielded" => Some(Value::Bool(self.shielded)),
            "tint" => Some(Value::Color3(self.tint)),
            "fps" => Some(Value::Number(self.fps)),
            _ => None,
        }
    }
}

struct DemoApp {
    overlay: Overlay<EguiSurface, ProjectedScene>,
    stats: Rc<RefCell<Stats>>,
    orbiter: Rc<RefCell<Vec3>>,
    waypoints: Rc<RefCell<Vec<Vec3>>>,
    time: f32,
    inspector_open: bool,
}

impl DemoApp {
    fn new(config: OverlayConfig) -> Result<Self, watchpost_core::OverlayError> {
        let surface = EguiSurface::new(&config);
        let mut overlay = Overlay::create(config, surface, ProjectedScene::new())?;

        let stats = Rc::new(RefCell::new(Stats {
            health: 100.0,
            shielded: false,
            tint: Color3::new(0.2, 0.4, 0.8),
            fps: 0.0,
        }));
        let orbiter = Rc::new(RefCell::new(Vec3::new(ORBIT_RADIUS, 0.0, 0.0)));
        let waypoints = Rc::new(RefCell::new(vec![
            Vec3::new(-2.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.5, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, -0.5, 0.0),
            Vec3::new(2.0, 0.0, -1.0),
        ]));

        let health = overlay.log_observer(
            "health",
            Source::shared(&stats),
            Some("health"),
            RefreshRate::EVERY_5,
        );
        overlay.set_debug_when(health, |v| {
            v.and_then(Value::as_number).is_some_and(|n| n < 10.0)
        });

        let shield = overlay.log_observer("shielded", Source::shared(&stats), Some("shielded"), 1);
        overlay.set_highlight_when(shield, |v| matches!(v, Some(Value::Bool(true))));

        overlay.log_observer("tint", Source::shared(&stats), Some("tint"), 1);
        overlay.log_observer("fps", Source::shared(&stats), Some("fps"), RefreshRate::EVERY_30);
        overlay.log_world_anchored(
            "orbiter",
            Source::shared(&orbiter),
            None,
            1,
            AnchorKind::Point,
        );
        overlay.log_path(
            "waypoints",
            Source::shared(&waypoints),
            None,
            RefreshRate::EVERY_30,
        );
        overlay.log(Source::fixed("demo started"));

        Ok(Self {
            overlay,
            stats,
            orbiter,
            waypoints,
            time: 0.0,
            inspector_open: false,
        })
    }

    /// Move the host state forward by `dt` seconds
    fn advance(&mut self, dt: f32) {
        self.time += dt;
        let t = self.time;

        *self.orbiter.borrow_mut() = Vec3::new(
            ORBIT_RADIUS * t.cos(),
            0.5 * (t * 2.0).sin(),
            ORBIT_RADIUS * t.sin(),
        );

        {
            let mut stats = self.stats.borrow_mut();
            stats.health = 55.0 + 50.0 * f64::from((t * 0.3).sin());
            stats.shielded = (t * 0.5).sin() > 0.6;
            stats.tint = Color3::new(
                0.5 + 0.5 * (t * 0.7).sin(),
                0.5 + 0.5 * (t * 0.9).cos(),
                0.6,
            );
            if dt > 0.0 {
                stats.fps = f64::from(1.0 / dt);
            }
        }

        if let Some(last) = self.waypoints.borrow_mut().last_mut() {
            last.y = (t * 0.8).sin();
        }

        let ticks = self.overlay.ticks();
        if ticks > 0 && ticks % CONSOLE_INTERVAL_TICKS == 0 {
            let orbiter = *self.orbiter.borrow();
            self.overlay.log_console(
                "orbiter",
                Source::fixed(format!("orbiter at {:.2}, {:.2}", orbiter.x, orbiter.z)),
                None,
            );
        }
    }

    fn show_inspector(&mut self, ctx: &egui::Context) {
        if self.overlay.take_inspector_request() {
            self.inspector_open = !self.inspector_open;
        }
        if !self.inspector_open {
            return;
        }

        let mut open = self.inspector_open;
        egui::Window::new("Inspector")
            .id(egui::Id::new("watchpost_demo_inspector"))
            .default_pos([10.0, 60.0])
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(format!(
                    "tick {}  ({} entities, {} console lines)",
                    self.overlay.ticks(),
                    self.overlay.len(),
                    self.overlay.console().len()
                ));
                ui.separator();
                egui::Grid::new("watchpost_demo_entities").show(ui, |ui| {
                    for (_, entity) in self.overlay.entities() {
                        ui.label(entity.name());
                        ui.label(entity.presentation_type().type_name());
                        ui.label(entity.refresh_rate().to_string());
                        ui.end_row();
                    }
                });
            });
        self.inspector_open = open;
    }
}

impl eframe::App for DemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.stable_dt);
        if !self.overlay.controls().is_paused() {
            self.advance(dt);
        }

        let screen = ctx
            .input(|i| i.raw.viewport().inner_rect)
            .unwrap_or_else(|| egui::Rect::from_min_size(egui::Pos2::ZERO, ctx.used_size()));
        let projector = Projector::look_at(
            CAMERA_EYE,
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_3,
            Vec2::new(screen.width(), screen.height()),
        );
        self.overlay.surface_mut().set_projector(projector);

        let report = self.overlay.frame();
        if report.failures > 0 {
            tracing::warn!("{} reads failed at tick {}", report.failures, report.tick);
        }

        self.overlay.scene().paint(ctx, &projector);
        let paused = self.overlay.controls().is_paused();
        if let Some(action) = self.overlay.surface_mut().show(ctx, paused) {
            self.overlay.apply(action);
        }
        self.show_inspector(ctx);

        ctx.request_repaint();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::load_from_path(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => config::load(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Watchpost Demo")
            .with_inner_size([960.0, 540.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Watchpost Demo",
        native_options,
        Box::new(|_cc| Ok(Box::new(DemoApp::new(config)?))),
    )
    .map_err(|e| anyhow::anyhow!("eframe error: {e}"))?;

    Ok(())
}
