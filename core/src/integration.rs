//! Integration tests for the overlay
//!
//! Drives full frames through the headless surface and scene: observers,
//! console lines, throttling, hooks, pause, and failure isolation.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use crate::config::{ConsoleStamp, OverlayConfig};
    use crate::controls::ControlAction;
    use crate::entity::EntityHandle;
    use crate::headless::{HeadlessScene, HeadlessSurface};
    use crate::hooks::{BreakAction, DebugBreak};
    use crate::overlay::Overlay;
    use crate::router::MISSING_VALUE_TEXT;
    use crate::types::{AnchorKind, PresentationType, RefreshRate};
    use crate::value::{Color3, Inspect, Source, Value};

    // ============================================================================
    // Host objects
    // ============================================================================

    struct Player {
        health: f64,
        alive: bool,
        position: Vec3,
    }

    impl Inspect for Player {
        fn inspect(&self) -> Value {
            Value::Opaque(format!("Player({})", self.health))
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "health" => Some(Value::Number(self.health)),
                "alive" => Some(Value::Bool(self.alive)),
                "position" => Some(Value::Vec3(self.position)),
                _ => None,
            }
        }
    }

    /// Panics whenever it is read
    struct Cursed;

    impl Inspect for Cursed {
        fn inspect(&self) -> Value {
            panic!("cursed object inspected");
        }

        fn field(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    fn player(health: f64) -> Rc<RefCell<Player>> {
        Rc::new(RefCell::new(Player {
            health,
            alive: true,
            position: Vec3::new(5.0, 5.0, 1.0),
        }))
    }

    fn overlay_with(config: OverlayConfig) -> Overlay<HeadlessSurface, HeadlessScene> {
        match Overlay::create(config, HeadlessSurface::new(), HeadlessScene::new()) {
            Ok(overlay) => overlay,
            Err(e) => panic!("overlay creation failed: {e}"),
        }
    }

    fn overlay() -> Overlay<HeadlessSurface, HeadlessScene> {
        overlay_with(OverlayConfig::default())
    }

    fn negative(value: Option<&Value>) -> bool {
        value
            .and_then(Value::as_number)
            .is_some_and(|n| n < 0.0)
    }

    // ============================================================================
    // Observers
    // ============================================================================

    #[test]
    fn test_observer_tracks_live_value() {
        let mut overlay = overlay();
        let p = player(100.0);
        overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);

        overlay.frame();
        assert_eq!(overlay.surface().field_text("hp", 0), Some("100"));

        p.borrow_mut().health = 57.0;
        overlay.frame();
        assert_eq!(overlay.surface().field_text("hp", 0), Some("57"));
    }

    #[test]
    fn test_reregistration_keeps_one_record() {
        let mut overlay = overlay();
        let first = player(10.0);
        let second = player(20.0);

        let a = overlay.log_observer("hp", Source::shared(&first), Some("health"), 1);
        let b = overlay.log_observer("hp", Source::shared(&second), Some("health"), 5);
        let c = overlay.log_observer("hp", Source::shared(&second), Some("alive"), 1);

        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.surface().live_panel_count(), 1);

        // Type stays Float even though the property now yields a bool
        let entity = a.observer().and_then(|id| overlay.entity(id));
        assert_eq!(
            entity.map(|e| e.presentation_type()),
            Some(PresentationType::Float)
        );
        assert_eq!(entity.map(|e| e.refresh_rate()), Some(RefreshRate::EVERY_FRAME));

        overlay.frame();
        assert_eq!(overlay.surface().field_text("hp", 0), Some("true"));
    }

    #[test]
    fn test_refresh_rate_throttles_draws() {
        let mut overlay = overlay();
        let p = player(1.0);
        overlay.log_observer("every", Source::shared(&p), Some("health"), 1);
        overlay.log_observer("fifth", Source::shared(&p), Some("health"), 5);
        overlay.log_observer("thirtieth", Source::shared(&p), Some("health"), 30);

        let frames = 61;
        let mut drawn = 0;
        for _ in 0..frames {
            drawn += overlay.frame().drawn;
        }

        let writes = |name: &str| {
            overlay
                .surface()
                .panel_by_name(name)
                .map(|p| p.field_writes)
                .unwrap_or_default()
        };
        // Ticks 0..=60
        assert_eq!(writes("every"), 61);
        assert_eq!(writes("fifth"), 13);
        assert_eq!(writes("thirtieth"), 3);
        assert_eq!(drawn, 61 + 13 + 3);
    }

    #[test]
    fn test_dropped_source_shows_missing() {
        let mut overlay = overlay();
        let p = player(42.0);
        overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);
        overlay.frame();
        assert_eq!(overlay.surface().field_text("hp", 0), Some("42"));

        drop(p);
        let report = overlay.frame();
        assert_eq!(report.failures, 0);
        assert_eq!(overlay.surface().field_text("hp", 0), Some(MISSING_VALUE_TEXT));
    }

    #[test]
    fn test_missing_property_shows_missing() {
        let mut overlay = overlay();
        let p = player(1.0);
        let handle = overlay.log_observer("mana", Source::shared(&p), Some("mana"), 1);
        let ty = handle
            .observer()
            .and_then(|id| overlay.entity(id))
            .map(|e| e.presentation_type());
        assert_eq!(ty, Some(PresentationType::Text));

        overlay.frame();
        assert_eq!(overlay.surface().field_text("mana", 0), Some(MISSING_VALUE_TEXT));
    }

    #[test]
    fn test_color_entity_recolors_panel() {
        let mut overlay = overlay();
        let tint = Rc::new(RefCell::new(Color3::new(0.2, 0.4, 0.6)));
        overlay.log_observer("tint", Source::shared(&tint), None, 1);

        overlay.frame();
        assert_eq!(
            overlay.surface().panel_color("tint"),
            Some(Color3::new(0.2, 0.4, 0.6))
        );
        assert_eq!(
            overlay.surface().field_text("tint", 0),
            Some("0.2000, 0.4000, 0.6000")
        );
    }

    // ============================================================================
    // Console
    // ============================================================================

    #[test]
    fn test_console_keeps_last_lines() {
        let mut overlay = overlay();
        for i in 1..=12 {
            overlay.log_console("msg", Source::fixed(format!("line {}", i)), None);
        }
        assert_eq!(overlay.console().len(), 10);

        overlay.frame();
        let lines = overlay.surface().console_lines();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "0 : line 3");
        assert_eq!(lines[9], "0 : line 12");
        assert!(overlay.surface().console_visible());
        assert_eq!(overlay.surface().console_pins(), 1);
    }

    #[test]
    fn test_console_partial_fill_is_bottom_aligned() {
        let mut overlay = overlay();
        overlay.frame();
        overlay.frame();
        assert!(!overlay.surface().console_visible());

        overlay.log(Source::fixed("hello"));
        overlay.frame();
        let lines = overlay.surface().console_lines();
        assert_eq!(lines[9], "2 : hello");
        assert!(lines[..9].iter().all(String::is_empty));
    }

    #[test]
    fn test_console_lines_are_live_and_not_indexed() {
        let mut overlay = overlay();
        let p = player(3.0);
        let handle = overlay.log_console("hp", Source::shared(&p), Some("health"));
        assert!(matches!(handle, EntityHandle::ConsoleLine(_)));
        assert_eq!(overlay.find("hp"), None);

        p.borrow_mut().health = 4.0;
        overlay.frame();
        assert_eq!(overlay.surface().console_lines()[9], "0 : 4");
    }

    #[test]
    fn test_console_elapsed_stamp() {
        let config = OverlayConfig {
            console_stamp: ConsoleStamp::Elapsed,
            ..OverlayConfig::default()
        };
        let mut overlay = overlay_with(config);
        overlay.log(Source::fixed("boot"));
        overlay.frame();
        let line = &overlay.surface().console_lines()[9];
        assert!(line.starts_with("00:00."), "{}", line);
        assert!(line.ends_with(" : boot"), "{}", line);
    }

    #[test]
    fn test_console_toggle_hides_lines() {
        let mut overlay = overlay();
        overlay.log(Source::fixed("x"));
        overlay.apply(ControlAction::ToggleConsoleLines);
        overlay.frame();
        assert!(!overlay.surface().console_visible());
    }

    // ============================================================================
    // Hooks
    // ============================================================================

    #[test]
    fn test_debug_color_only_on_matching_frame() {
        let mut overlay = overlay();
        let p = player(5.0);
        let handle = overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);
        assert!(overlay.set_debug_when(handle, negative));

        let base = overlay.surface().panel_color("hp");
        let report = overlay.frame();
        assert_eq!(report.debug_hits, 0);
        assert_eq!(overlay.surface().panel_color("hp"), base);

        p.borrow_mut().health = -1.0;
        let report = overlay.frame();
        assert_eq!(report.debug_hits, 1);
        assert_eq!(overlay.surface().panel_color("hp"), Some(Color3::RED));

        p.borrow_mut().health = 2.0;
        let report = overlay.frame();
        assert_eq!(report.debug_hits, 0);
        assert_eq!(overlay.surface().panel_color("hp"), base);
    }

    #[test]
    fn test_hooks_ignore_refresh_rate() {
        let mut overlay = overlay();
        let p = player(-3.0);
        let handle = overlay.log_observer("hp", Source::shared(&p), Some("health"), 120);
        overlay.set_highlight_when(handle, negative);

        let hits: usize = (0..4).map(|_| overlay.frame().highlight_hits).sum();
        assert_eq!(hits, 4);
        assert_eq!(overlay.surface().panel_color("hp"), Some(Color3::YELLOW));
    }

    #[test]
    fn test_break_hook_can_pause() {
        let mut overlay = overlay();
        let p = player(-1.0);
        let handle = overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);
        overlay.set_debug_when(handle, negative);

        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        overlay.set_break_hook(move |hit: &DebugBreak<'_>| {
            assert_eq!(hit.name, "hp");
            *counter.borrow_mut() += 1;
            BreakAction::Pause
        });

        assert!(!overlay.frame().paused);
        assert!(overlay.controls().is_paused());
        assert!(overlay.frame().paused);
        assert_eq!(*hits.borrow(), 1);

        overlay.resume();
        overlay.frame();
        assert_eq!(*hits.borrow(), 2);
    }

    // ============================================================================
    // Pause and visibility
    // ============================================================================

    #[test]
    fn test_hide_show_while_paused_draws_nothing() {
        let mut overlay = overlay();
        let p = player(100.0);
        overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);
        overlay.frame();
        let writes_before = overlay.surface().total_field_writes();

        overlay.pause();
        overlay.hide();
        p.borrow_mut().health = 12.5;
        assert!(overlay.frame().paused);
        overlay.show();
        assert!(overlay.frame().paused);

        assert_eq!(overlay.surface().total_field_writes(), writes_before);
        assert_eq!(overlay.surface().field_text("hp", 0), Some("100"));
        assert!(overlay.surface().panels_visible());

        overlay.resume();
        overlay.frame();
        assert_eq!(overlay.surface().field_text("hp", 0), Some("12.5"));
    }

    #[test]
    fn test_hide_applies_on_next_frame() {
        let mut overlay = overlay();
        overlay.hide();
        overlay.frame();
        assert!(!overlay.surface().panels_visible());
        overlay.apply(ControlAction::TogglePanels);
        overlay.frame();
        assert!(overlay.surface().panels_visible());
    }

    // ============================================================================
    // Anchors and paths
    // ============================================================================

    #[test]
    fn test_world_anchored_panel_follows_point() {
        let mut overlay = overlay();
        let p = player(1.0);
        overlay.log_world_anchored(
            "pos",
            Source::shared(&p),
            Some("position"),
            60,
            AnchorKind::Point,
        );

        overlay.frame();
        let position = overlay.surface().panel_by_name("pos").and_then(|p| p.position);
        assert_eq!(position, Some(glam::Vec2::new(105.0, 205.0)));

        // Anchoring runs every frame even when the draw is throttled
        p.borrow_mut().position = Vec3::new(10.0, 0.0, 1.0);
        overlay.frame();
        let position = overlay.surface().panel_by_name("pos").and_then(|p| p.position);
        assert_eq!(position, Some(glam::Vec2::new(110.0, 200.0)));
    }

    #[test]
    fn test_world_anchored_duplicate_rebinds() {
        let mut overlay = overlay();
        let a = player(1.0);
        let b = player(2.0);
        let first = overlay.log_world_anchored(
            "pos",
            Source::shared(&a),
            Some("position"),
            1,
            AnchorKind::Point,
        );
        let second = overlay.log_world_anchored(
            "pos",
            Source::shared(&b),
            Some("position"),
            1,
            AnchorKind::Point,
        );
        assert_eq!(first, second);
        assert_eq!(overlay.surface().live_connector_count(), 1);
    }

    #[test]
    fn test_path_rebuilt_each_draw() {
        let mut overlay = overlay();
        let waypoints = Rc::new(RefCell::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y]));
        overlay.log_path("route", Source::shared(&waypoints), None, 1);

        overlay.frame();
        assert_eq!(overlay.scene().live_mesh_count(), 4);
        assert_eq!(overlay.scene().tube_count(), 1);

        waypoints.borrow_mut().push(Vec3::Z);
        overlay.frame();
        assert_eq!(overlay.scene().live_mesh_count(), 5);
        assert_eq!(overlay.scene().disposed_mesh_count(), 4);
    }

    // ============================================================================
    // Failure isolation
    // ============================================================================

    #[test]
    fn test_panicking_entity_is_isolated() {
        let mut overlay = overlay();
        let cursed = Rc::new(RefCell::new(Cursed));
        let p = player(7.0);

        overlay.log_observer("before", Source::shared(&p), Some("health"), 1);
        // Classification also reads the value, so register the cursed
        // object through a property it does not have first.
        overlay.log_observer("cursed", Source::shared(&cursed), Some("nothing"), 1);
        overlay.log_observer("cursed", Source::shared(&cursed), None, 1);
        overlay.log_observer("after", Source::shared(&p), Some("health"), 1);

        let report = overlay.frame();
        assert_eq!(report.failures, 1);
        assert_eq!(report.drawn, 2);
        assert_eq!(overlay.surface().field_text("before", 0), Some("7"));
        assert_eq!(overlay.surface().field_text("after", 0), Some("7"));
        assert_eq!(overlay.ticks(), 1);
    }

    /// Reads fine until armed, then panics
    struct Tripwire {
        armed: bool,
    }

    impl Inspect for Tripwire {
        fn inspect(&self) -> Value {
            if self.armed {
                panic!("tripwire read while armed");
            }
            Value::from("quiet")
        }
    }

    #[test]
    fn test_panicking_console_line_is_isolated() {
        let mut overlay = overlay();
        let tripwire = Rc::new(RefCell::new(Tripwire { armed: false }));
        let p = player(3.0);

        overlay.log_console("tripwire", Source::shared(&tripwire), None);
        overlay.log(Source::fixed("still here"));
        overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);
        tripwire.borrow_mut().armed = true;

        let report = overlay.frame();
        assert_eq!(report.failures, 1);
        assert_eq!(report.drawn, 1);
        assert_eq!(overlay.ticks(), 1);

        let lines = overlay.surface().console_lines();
        assert_eq!(lines[8], format!("0 : {}", MISSING_VALUE_TEXT));
        assert_eq!(lines[9], "0 : still here");
        assert_eq!(overlay.surface().field_text("hp", 0), Some("3"));
    }

    #[test]
    fn test_console_panic_keeps_hook_pause() {
        let mut overlay = overlay();
        let tripwire = Rc::new(RefCell::new(Tripwire { armed: true }));
        let p = player(-1.0);

        let handle = overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);
        overlay.set_debug_when(handle, negative);
        overlay.set_break_hook(|_: &DebugBreak<'_>| BreakAction::Pause);
        overlay.log_console("tripwire", Source::shared(&tripwire), None);

        let report = overlay.frame();
        assert_eq!(report.failures, 1);
        assert_eq!(report.debug_hits, 1);
        assert!(overlay.controls().is_paused());
    }

    #[test]
    fn test_panicking_predicate_is_isolated() {
        let mut overlay = overlay();
        let p = player(1.0);
        let handle = overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);
        overlay.set_highlight_when(handle, |_| panic!("bad predicate"));
        overlay.log_observer("ok", Source::shared(&p), Some("alive"), 1);

        let report = overlay.frame();
        assert_eq!(report.failures, 1);
        assert_eq!(overlay.surface().field_text("ok", 0), Some("true"));
    }

    // ============================================================================
    // Panel placement and colour
    // ============================================================================

    #[test]
    fn test_observer_panel_color_for_opaque_values() {
        let mut config = OverlayConfig::default();
        config.colors.observer_panel = Color3::new(0.2, 0.3, 0.4);
        let mut overlay = overlay_with(config);
        let p = player(10.0);

        // Whole object: no presentation of its own
        overlay.log_observer("player", Source::shared(&p), None, 1);
        // Missing property: unreadable at registration
        overlay.log_observer("mana", Source::shared(&p), Some("mana"), 1);
        overlay.log_observer("hp", Source::shared(&p), Some("health"), 1);

        let surface = overlay.surface();
        assert_eq!(surface.panel_color("player"), Some(Color3::new(0.2, 0.3, 0.4)));
        assert_eq!(surface.panel_color("mana"), Some(Color3::new(0.2, 0.3, 0.4)));
        assert_eq!(surface.panel_color("hp"), Some(Color3::new(0.6, 0.6, 0.9)));
    }

    #[test]
    fn test_docked_observer_cannot_be_reanchored() {
        let mut overlay = overlay();
        let p = player(10.0);

        overlay.log_observer("pos", Source::shared(&p), Some("position"), 1);
        overlay.log_world_anchored(
            "pos",
            Source::shared(&p),
            Some("position"),
            1,
            AnchorKind::Point,
        );
        overlay.frame();

        assert_eq!(overlay.len(), 1);
        assert_eq!(overlay.surface().docked_names(), vec!["pos"]);
        let Some(id) = overlay.find("pos") else {
            panic!("pos not registered");
        };
        assert!(overlay.entity(id).is_some_and(|e| e.options().docked));
        assert_eq!(overlay.surface().field_text("pos", 0), Some("5.0000, 5.0000, 1.0000"));
    }
}
