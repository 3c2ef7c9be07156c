//! Debug and highlight hooks
//!
//! Predicates run every frame, whatever an entity's refresh rate. A debug
//! hit recolours the panel and calls the break hook; a highlight hit
//! recolours after it, so on a double hit the highlight colour wins.

use crate::config::ColorConfig;
use crate::entity::{HookState, LoggedEntity};
use crate::surface::PresentationSurface;
use crate::value::{Color3, Value};

/// Passed to the break hook when a debug predicate matches
#[derive(Debug, Clone, Copy)]
pub struct DebugBreak<'a> {
    pub name: &'a str,
    pub tick: u64,
    /// Value the predicate saw; `None` when it could not be read
    pub value: Option<&'a Value>,
}

/// What the overlay does after a break hook returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BreakAction {
    #[default]
    Continue,
    /// Pause the overlay so the frame can be inspected
    Pause,
}

pub type BreakHook = Box<dyn FnMut(&DebugBreak<'_>) -> BreakAction>;

/// Logs the hit and keeps running
pub fn default_break_hook() -> BreakHook {
    Box::new(log_break)
}

fn log_break(hit: &DebugBreak<'_>) -> BreakAction {
    match hit.value {
        Some(value) => tracing::warn!(
            "debug hook hit: '{}' = {} at tick {}",
            hit.name,
            value,
            hit.tick
        ),
        None => tracing::warn!(
            "debug hook hit: '{}' (unreadable) at tick {}",
            hit.name,
            hit.tick
        ),
    }
    BreakAction::Continue
}

/// Result of evaluating one entity's hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HookOutcome {
    pub debug_hit: bool,
    pub highlight_hit: bool,
    pub action: BreakAction,
}

pub struct DebugHookEvaluator {
    debug_color: Color3,
    highlight_color: Color3,
    hook: BreakHook,
}

impl DebugHookEvaluator {
    pub fn new(colors: &ColorConfig) -> Self {
        Self {
            debug_color: colors.debug_hit,
            highlight_color: colors.highlight_hit,
            hook: default_break_hook(),
        }
    }

    /// Replace the break hook
    pub fn set_break_hook(&mut self, hook: impl FnMut(&DebugBreak<'_>) -> BreakAction + 'static) {
        self.hook = Box::new(hook);
    }

    /// Evaluate both predicates against `value` and recolour the panel
    ///
    /// A panel that was showing a hit colour goes back to the entity's base
    /// colour once neither predicate matches.
    pub fn evaluate(
        &mut self,
        surface: &mut dyn PresentationSurface,
        entity: &mut LoggedEntity,
        value: Option<&Value>,
        tick: u64,
    ) -> HookOutcome {
        let debug_hit = entity.debug_when.as_ref().is_some_and(|pred| pred(value));
        let highlight_hit = entity
            .highlight_when
            .as_ref()
            .is_some_and(|pred| pred(value));

        let panel = entity.panel.map(|binding| binding.panel);
        if let Some(panel) = panel {
            if debug_hit {
                surface.set_panel_color(panel, self.debug_color);
            }
            if highlight_hit {
                surface.set_panel_color(panel, self.highlight_color);
            }
            if !debug_hit && !highlight_hit && entity.hook_state != HookState::Clear {
                surface.set_panel_color(panel, entity.base_color);
            }
        }

        entity.hook_state = if highlight_hit {
            HookState::HighlightHit
        } else if debug_hit {
            HookState::DebugHit
        } else {
            HookState::Clear
        };

        let action = if debug_hit {
            (self.hook)(&DebugBreak {
                name: &entity.name,
                tick,
                value,
            })
        } else {
            BreakAction::Continue
        };

        HookOutcome {
            debug_hit,
            highlight_hit,
            action,
        }
    }
}
