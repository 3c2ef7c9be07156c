//! Overlay context
//!
//! [`Overlay`] owns every component and is the only thing a host talks to:
//! registration calls from host logic, one [`Overlay::frame`] call per
//! rendered frame, and the control API behind the surface's buttons.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::classify::classify_read;
use crate::clock::Clock;
use crate::config::{ConfigError, DockSide, OverlayConfig};
use crate::console_log::{ConsoleLogBuffer, ConsoleLogLine};
use crate::controls::{ControlAction, OverlayControls};
use crate::entity::{EntityHandle, EntityId, LoggedEntity};
use crate::hooks::{BreakAction, DebugBreak, DebugHookEvaluator, HookOutcome};
use crate::path_viz::PathVisualizer;
use crate::presenter::ObserverPanelPresenter;
use crate::registry::{EntityRegistry, Upsert};
use crate::router::{DrawTarget, PresentationRouter};
use crate::surface::{PresentationSurface, SceneGeometry};
use crate::types::{AnchorKind, EntityOptions, RefreshRate};
use crate::value::{Source, Value};

/// Name given to console lines logged through [`Overlay::log`]
pub const DEFAULT_CONSOLE_NAME: &str = "default";

/// Errors from creating an overlay
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("invalid overlay configuration: {0}")]
    Config(#[from] ConfigError),
}

/// What one call to [`Overlay::frame`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Tick the frame ran at (unchanged on paused frames)
    pub tick: u64,
    /// Entities whose draw function ran
    pub drawn: usize,
    pub debug_hits: usize,
    pub highlight_hits: usize,
    /// Entities skipped because their read, draw or hooks panicked
    pub failures: usize,
    /// The frame was skipped because the overlay is paused
    pub paused: bool,
}

/// The instrumentation overlay
///
/// Generic over the presentation surface and the scene it draws path
/// geometry into. Both are handed back by [`Overlay::shutdown`].
pub struct Overlay<S: PresentationSurface, G: SceneGeometry> {
    config: OverlayConfig,
    surface: S,
    scene: G,
    registry: EntityRegistry,
    console: ConsoleLogBuffer,
    router: PresentationRouter,
    presenter: ObserverPanelPresenter,
    paths: PathVisualizer,
    hooks: DebugHookEvaluator,
    controls: OverlayControls,
    clock: Clock,
    next_console_seq: u64,
    applied_dock_side: DockSide,
}

impl<S: PresentationSurface, G: SceneGeometry> Overlay<S, G> {
    /// Validate `config` and build the shared UI and scene resources
    pub fn create(config: OverlayConfig, mut surface: S, mut scene: G) -> Result<Self, OverlayError> {
        config.validate()?;

        let paths = PathVisualizer::new(&mut scene, &config.path);
        surface.create_console_lines(config.max_console_lines, config.console_line_height_px);
        surface.set_console_visible(false);
        surface.set_dock_side(config.dock_side);

        tracing::info!(
            "overlay created: {} console lines, docked on the {:?}",
            config.max_console_lines,
            config.dock_side
        );

        Ok(Self {
            registry: EntityRegistry::new(),
            console: ConsoleLogBuffer::new(config.max_console_lines),
            router: PresentationRouter::new(&config),
            presenter: ObserverPanelPresenter::new(&config),
            hooks: DebugHookEvaluator::new(&config.colors),
            controls: OverlayControls::new(config.dock_side),
            clock: Clock::new(),
            next_console_seq: 0,
            applied_dock_side: config.dock_side,
            paths,
            surface,
            scene,
            config,
        })
    }

    /// Remove every panel, connector, console line, mesh and material
    pub fn shutdown(mut self) -> (S, G) {
        let entities = self.registry.drain();
        for entity in &entities {
            if let Some(binding) = entity.panel() {
                self.presenter.remove(&mut self.surface, &binding);
            }
        }
        let console_lines = self.console.len();
        self.console.clear();
        self.surface.clear_console_lines();
        self.paths.shutdown(&mut self.scene);

        tracing::info!(
            "overlay shut down after {} ticks: {} entities, {} console lines",
            self.clock.ticks(),
            entities.len(),
            console_lines
        );
        (self.surface, self.scene)
    }

    // -- Registration --------------------------------------------------

    /// Log a console line under the default name
    pub fn log(&mut self, source: Source) -> EntityHandle {
        self.log_console(DEFAULT_CONSOLE_NAME, source, None)
    }

    /// Append a console line
    ///
    /// Every call adds a new line; console lines never rebind.
    pub fn log_console(&mut self, name: &str, source: Source, property: Option<&str>) -> EntityHandle {
        if self.registry.contains(name) {
            tracing::warn!(
                "console line '{}' shares its name with an observed entity",
                name
            );
        }

        let ty = classify_read(&source.read(property));
        let entity = LoggedEntity::new(
            name,
            ty,
            source,
            property,
            EntityOptions::console_line(),
            self.router.color(ty),
        );
        let seq = self.next_console_seq;
        self.next_console_seq += 1;
        self.console.push(ConsoleLogLine {
            seq,
            ticks: self.clock.ticks(),
            elapsed: self.clock.elapsed(),
            entity,
        });
        EntityHandle::ConsoleLine(seq)
    }

    /// Observe a value in a docked panel
    pub fn log_observer(
        &mut self,
        name: &str,
        source: Source,
        property: Option<&str>,
        rate: impl Into<RefreshRate>,
    ) -> EntityHandle {
        let id = self.register(name, source, property, EntityOptions::docked(), rate.into());
        EntityHandle::Observer(id)
    }

    /// Observe a point sequence, drawn as a path in the scene
    pub fn log_path(
        &mut self,
        name: &str,
        source: Source,
        property: Option<&str>,
        rate: impl Into<RefreshRate>,
    ) -> EntityHandle {
        let id = self.register(name, source, property, EntityOptions::floating(), rate.into());
        EntityHandle::Observer(id)
    }

    /// Observe a value in a panel that follows a scene object or point
    pub fn log_world_anchored(
        &mut self,
        name: &str,
        source: Source,
        property: Option<&str>,
        rate: impl Into<RefreshRate>,
        anchor: AnchorKind,
    ) -> EntityHandle {
        if self.registry.contains(name) {
            tracing::warn!("'{}' is already observed, rebinding its source", name);
        }
        let id = self.register(name, source, property, EntityOptions::anchored(anchor), rate.into());
        EntityHandle::Observer(id)
    }

    fn register(
        &mut self,
        name: &str,
        source: Source,
        property: Option<&str>,
        options: EntityOptions,
        rate: RefreshRate,
    ) -> EntityId {
        let was_docked = self
            .registry
            .find(name)
            .and_then(|id| self.registry.get(id))
            .map(|entity| entity.options().docked);

        let router = &self.router;
        let upsert = self
            .registry
            .upsert(name, source, property, options, rate, |ty, read| {
                router.panel_color(ty, read)
            });

        let id = upsert.id();
        let Some(entity) = self.registry.get_mut(id) else {
            return id;
        };
        match upsert {
            Upsert::Created(_) => {
                let route = self.router.route(entity.presentation_type());
                entity.panel = Some(self.presenter.create_panel(&mut self.surface, entity, route));
            }
            Upsert::Updated(_) => {
                let Some(binding) = entity.panel() else {
                    return id;
                };
                if options.anchor().is_some() && binding.connector.is_none() {
                    // No connector was built for this panel, it cannot follow an anchor
                    tracing::warn!(
                        "'{}' was first registered without an anchor, keeping its panel in place",
                        name
                    );
                    if let Some(docked) = was_docked {
                        entity.options.docked = docked;
                    }
                } else if was_docked != Some(options.docked) {
                    self.presenter
                        .set_docked(&mut self.surface, &binding, options.docked);
                }
            }
        }
        id
    }

    // -- Hooks and entity access ---------------------------------------

    /// Attach a debug predicate; `false` for console handles
    pub fn set_debug_when(
        &mut self,
        handle: EntityHandle,
        pred: impl Fn(Option<&Value>) -> bool + 'static,
    ) -> bool {
        match self.entity_for(handle) {
            Some(entity) => {
                entity.debug_when(pred);
                true
            }
            None => false,
        }
    }

    /// Attach a highlight predicate; `false` for console handles
    pub fn set_highlight_when(
        &mut self,
        handle: EntityHandle,
        pred: impl Fn(Option<&Value>) -> bool + 'static,
    ) -> bool {
        match self.entity_for(handle) {
            Some(entity) => {
                entity.highlight_when(pred);
                true
            }
            None => false,
        }
    }

    /// Replace the hook called when a debug predicate matches
    pub fn set_break_hook(&mut self, hook: impl FnMut(&DebugBreak<'_>) -> BreakAction + 'static) {
        self.hooks.set_break_hook(hook);
    }

    fn entity_for(&mut self, handle: EntityHandle) -> Option<&mut LoggedEntity> {
        handle.observer().and_then(|id| self.registry.get_mut(id))
    }

    pub fn entity(&self, id: EntityId) -> Option<&LoggedEntity> {
        self.registry.get(id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut LoggedEntity> {
        self.registry.get_mut(id)
    }

    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.registry.find(name)
    }

    /// Persistent entities in registration order
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &LoggedEntity)> {
        self.registry.iter()
    }

    /// Number of persistent entities
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn console(&self) -> &ConsoleLogBuffer {
        &self.console
    }

    // -- Controls --------------------------------------------------------

    pub fn show(&mut self) {
        self.controls.show();
    }

    pub fn hide(&mut self) {
        self.controls.hide();
    }

    pub fn pause(&mut self) {
        self.controls.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.controls.set_paused(false);
    }

    /// Run exactly one frame while paused
    pub fn step(&mut self) {
        self.controls.request_step();
    }

    /// Apply a control bar button press
    pub fn apply(&mut self, action: ControlAction) {
        tracing::debug!("control action: {:?}", action);
        self.controls.apply(action);
    }

    pub fn controls(&self) -> &OverlayControls {
        &self.controls
    }

    /// Take a pending inspector request from the "D" button
    pub fn take_inspector_request(&mut self) -> bool {
        self.controls.take_inspector_request()
    }

    // -- Clock and collaborators -----------------------------------------

    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    /// Time since the overlay was created
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scene(&self) -> &G {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut G {
        &mut self.scene
    }

    // -- Frame -----------------------------------------------------------

    /// Run one frame: visibility, anchoring, throttled draws, hooks, console
    ///
    /// Call once per rendered frame from the host's render loop. Paused
    /// frames do nothing and leave the tick where it is.
    pub fn frame(&mut self) -> FrameReport {
        let tick = self.clock.ticks();
        if !self.controls.should_draw() {
            return FrameReport {
                tick,
                paused: true,
                ..FrameReport::default()
            };
        }

        self.apply_visibility();

        let mut report = FrameReport {
            tick,
            ..FrameReport::default()
        };
        let mut pause_requested = false;
        let precision = self.config.float_precision;

        for (id, entity) in self.registry.iter_mut() {
            let surface = &mut self.surface;
            let scene = &mut self.scene;
            let paths = &mut self.paths;
            let router = &self.router;
            let presenter = &self.presenter;
            let hooks = &mut self.hooks;

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                let value = match entity.read() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::debug!("'{}': {}", entity.name(), e);
                        None
                    }
                };

                if let Some(binding) = entity.panel() {
                    presenter.update_anchor(surface, &binding, value.as_ref());
                }

                let drawn = entity.refresh_rate().is_due(tick);
                if drawn {
                    let mut target = DrawTarget {
                        surface: &mut *surface,
                        scene: &mut *scene,
                        paths: &mut *paths,
                        precision,
                    };
                    if let Some(color) = router.draw(&mut target, id, entity, value.as_ref()) {
                        entity.base_color = color;
                    }
                }

                let outcome = hooks.evaluate(surface, entity, value.as_ref(), tick);
                (drawn, outcome)
            }));

            match result {
                Ok((drawn, outcome)) => {
                    report.drawn += usize::from(drawn);
                    record_hooks(&mut report, &outcome);
                    pause_requested |= outcome.action == BreakAction::Pause;
                }
                Err(payload) => {
                    report.failures += 1;
                    tracing::error!(
                        "'{}' failed during frame {}: {}",
                        entity.name(),
                        tick,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        report.failures += self.render_console();

        if pause_requested {
            tracing::info!("paused by debug hook at tick {}", tick);
            self.controls.set_paused(true);
        }

        self.clock.advance();
        report
    }

    fn apply_visibility(&mut self) {
        self.surface.set_panels_visible(self.controls.panels_visible());

        let side = self.controls.dock_side();
        if side != self.applied_dock_side {
            self.surface.set_dock_side(side);
            self.applied_dock_side = side;
        }
    }

    /// Write the console pool; returns the number of lines that failed
    fn render_console(&mut self) -> usize {
        let visible = self.controls.console_lines_visible() && !self.console.is_empty();
        self.surface.set_console_visible(visible);
        if !visible {
            return 0;
        }

        let layout = self
            .console
            .layout(self.config.max_console_lines, self.config.console_stamp);
        for (index, text) in layout.texts.iter().enumerate() {
            self.surface.set_console_line(index, text);
        }
        self.surface.pin_console_to_bottom();
        layout.failures
    }
}

fn record_hooks(report: &mut FrameReport, outcome: &HookOutcome) {
    report.debug_hits += usize::from(outcome.debug_hit);
    report.highlight_hits += usize::from(outcome.highlight_hit);
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessScene, HeadlessSurface};

    fn overlay() -> Overlay<HeadlessSurface, HeadlessScene> {
        match Overlay::create(
            OverlayConfig::default(),
            HeadlessSurface::new(),
            HeadlessScene::new(),
        ) {
            Ok(overlay) => overlay,
            Err(e) => panic!("overlay creation failed: {e}"),
        }
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let config = OverlayConfig {
            max_console_lines: 0,
            ..OverlayConfig::default()
        };
        let result = Overlay::create(config, HeadlessSurface::new(), HeadlessScene::new());
        assert!(matches!(result, Err(OverlayError::Config(_))));
    }

    #[test]
    fn test_create_builds_shared_resources() {
        let overlay = overlay();
        assert_eq!(overlay.surface().console_lines().len(), 10);
        assert!(!overlay.surface().console_visible());
        assert_eq!(overlay.scene().materials().len(), 2);
    }

    #[test]
    fn test_console_handle_rejects_hooks() {
        let mut overlay = overlay();
        let handle = overlay.log(Source::fixed("hello"));
        assert!(matches!(handle, EntityHandle::ConsoleLine(0)));
        assert!(!overlay.set_debug_when(handle, |_| true));
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_paused_frame_does_not_advance() {
        let mut overlay = overlay();
        overlay.frame();
        overlay.pause();
        let report = overlay.frame();
        assert!(report.paused);
        assert_eq!(report.tick, 1);
        assert_eq!(overlay.ticks(), 1);

        overlay.step();
        let report = overlay.frame();
        assert!(!report.paused);
        assert_eq!(overlay.ticks(), 2);
        assert!(overlay.frame().paused);
    }

    #[test]
    fn test_dock_side_change_reaches_surface() {
        let mut overlay = overlay();
        overlay.apply(ControlAction::ToggleDockSide);
        assert_eq!(overlay.surface().dock_side(), DockSide::Right);
        overlay.frame();
        assert_eq!(overlay.surface().dock_side(), DockSide::Left);
    }

    #[test]
    fn test_redock_on_reregistration() {
        let mut overlay = overlay();
        let handle = overlay.log_path("route", Source::fixed(0.0), None, 1);
        let Some(id) = handle.observer() else {
            panic!("expected an observer handle");
        };
        assert_eq!(overlay.surface().docked_names(), Vec::<&str>::new());

        overlay.log_observer("route", Source::fixed(1.0), None, 1);
        assert_eq!(overlay.surface().docked_names(), vec!["route"]);
        assert_eq!(overlay.find("route"), Some(id));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut overlay = overlay();
        overlay.log_observer("a", Source::fixed(1.0), None, 1);
        overlay.log_world_anchored(
            "b",
            Source::fixed(glam::Vec3::ZERO),
            None,
            1,
            AnchorKind::Point,
        );
        overlay.log_path(
            "c",
            Source::fixed(vec![glam::Vec3::ZERO, glam::Vec3::X]),
            None,
            1,
        );
        overlay.log(Source::fixed("line"));
        overlay.frame();
        assert_eq!(overlay.scene().live_mesh_count(), 3);

        let (surface, scene) = overlay.shutdown();
        assert_eq!(surface.live_panel_count(), 0);
        assert_eq!(surface.live_connector_count(), 0);
        assert!(surface.console_lines().is_empty());
        assert_eq!(scene.live_mesh_count(), 0);
        assert!(scene.materials().is_empty());
    }
}
