//! Overlay controls
//!
//! Visibility, pause and single-frame step. Buttons on the surface map onto
//! [`ControlAction`]s; each one is a plain flag flip.

use crate::config::DockSide;

/// One button press on the overlay's control bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// "D": ask the host to open its own inspector
    ToggleInspector,
    /// "C": show or hide the console line pool
    ToggleConsoleLines,
    /// "O": show or hide every observer panel
    TogglePanels,
    /// "P": pause or resume drawing
    TogglePause,
    /// Run exactly one frame while paused
    StepFrame,
    /// Move the docked stack to the other side of the screen
    ToggleDockSide,
}

impl ControlAction {
    /// Short button caption
    pub fn label(&self) -> &'static str {
        match self {
            ControlAction::ToggleInspector => "D",
            ControlAction::ToggleConsoleLines => "C",
            ControlAction::TogglePanels => "O",
            ControlAction::TogglePause => "P",
            ControlAction::StepFrame => ">|",
            ControlAction::ToggleDockSide => "<>",
        }
    }

    /// Buttons in control bar order
    pub const BAR: [ControlAction; 6] = [
        ControlAction::ToggleInspector,
        ControlAction::ToggleConsoleLines,
        ControlAction::TogglePanels,
        ControlAction::TogglePause,
        ControlAction::StepFrame,
        ControlAction::ToggleDockSide,
    ];
}

/// Flags mutated by the control bar and the control API
#[derive(Debug, Clone)]
pub struct OverlayControls {
    /// Whether drawing is suspended
    paused: bool,
    /// Whether a single frame was requested (consumed after one frame)
    step_requested: bool,
    panels_visible: bool,
    console_lines_visible: bool,
    inspector_requested: bool,
    dock_side: DockSide,
}

impl Default for OverlayControls {
    fn default() -> Self {
        Self::new(DockSide::default())
    }
}

impl OverlayControls {
    pub fn new(dock_side: DockSide) -> Self {
        Self {
            paused: false,
            step_requested: false,
            panels_visible: true,
            console_lines_visible: true,
            inspector_requested: false,
            dock_side,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn panels_visible(&self) -> bool {
        self.panels_visible
    }

    pub fn console_lines_visible(&self) -> bool {
        self.console_lines_visible
    }

    pub fn inspector_requested(&self) -> bool {
        self.inspector_requested
    }

    pub fn dock_side(&self) -> DockSide {
        self.dock_side
    }

    /// Show both panels and console lines
    pub fn show(&mut self) {
        self.panels_visible = true;
        self.console_lines_visible = true;
    }

    /// Hide both panels and console lines
    pub fn hide(&mut self) {
        self.panels_visible = false;
        self.console_lines_visible = false;
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Set pause state directly
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if !paused {
            self.step_requested = false;
        }
    }

    /// Request a single frame (only works when paused)
    pub fn request_step(&mut self) {
        if self.paused {
            self.step_requested = true;
        }
    }

    /// Take the pending inspector request, if any
    pub fn take_inspector_request(&mut self) -> bool {
        std::mem::take(&mut self.inspector_requested)
    }

    /// Apply one control bar action
    pub fn apply(&mut self, action: ControlAction) {
        match action {
            ControlAction::ToggleInspector => self.inspector_requested = !self.inspector_requested,
            ControlAction::ToggleConsoleLines => {
                self.console_lines_visible = !self.console_lines_visible
            }
            ControlAction::TogglePanels => self.panels_visible = !self.panels_visible,
            ControlAction::TogglePause => self.toggle_pause(),
            ControlAction::StepFrame => self.request_step(),
            ControlAction::ToggleDockSide => self.dock_side = self.dock_side.flipped(),
        }
    }

    /// Check if this frame should draw
    ///
    /// Consumes the step request if one was pending.
    pub fn should_draw(&mut self) -> bool {
        if self.paused {
            if self.step_requested {
                self.step_requested = false;
                return true;
            }
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let controls = OverlayControls::default();
        assert!(!controls.is_paused());
        assert!(controls.panels_visible());
        assert!(controls.console_lines_visible());
        assert_eq!(controls.dock_side(), DockSide::Right);
    }

    #[test]
    fn test_pause_toggle() {
        let mut controls = OverlayControls::default();
        controls.apply(ControlAction::TogglePause);
        assert!(controls.is_paused());
        assert!(!controls.should_draw());

        controls.apply(ControlAction::TogglePause);
        assert!(!controls.is_paused());
        assert!(controls.should_draw());
    }

    #[test]
    fn test_step_when_paused() {
        let mut controls = OverlayControls::default();
        controls.set_paused(true);
        assert!(!controls.should_draw());

        controls.apply(ControlAction::StepFrame);
        assert!(controls.should_draw()); // Consumes the step
        assert!(!controls.should_draw());
    }

    #[test]
    fn test_step_when_not_paused() {
        let mut controls = OverlayControls::default();
        controls.request_step();
        assert!(controls.should_draw());

        // A step requested while running does not survive into a pause
        controls.set_paused(true);
        assert!(!controls.should_draw());
    }

    #[test]
    fn test_resume_drops_pending_step() {
        let mut controls = OverlayControls::default();
        controls.set_paused(true);
        controls.request_step();
        controls.set_paused(false);
        controls.set_paused(true);
        assert!(!controls.should_draw());
    }

    #[test]
    fn test_show_hide() {
        let mut controls = OverlayControls::default();
        controls.hide();
        assert!(!controls.panels_visible());
        assert!(!controls.console_lines_visible());

        controls.apply(ControlAction::ToggleConsoleLines);
        assert!(controls.console_lines_visible());
        assert!(!controls.panels_visible());

        controls.show();
        assert!(controls.panels_visible());
    }

    #[test]
    fn test_inspector_and_dock_side() {
        let mut controls = OverlayControls::new(DockSide::Left);
        controls.apply(ControlAction::ToggleInspector);
        assert!(controls.take_inspector_request());
        assert!(!controls.take_inspector_request());

        controls.apply(ControlAction::ToggleDockSide);
        assert_eq!(controls.dock_side(), DockSide::Right);
    }
}
