//! Watchpost Core - in-process instrumentation overlay
//!
//! Register named values from anywhere in host logic, then call
//! [`Overlay::frame`] once per rendered frame to show their live state in
//! docked or world-anchored panels, a scrolling console, or as path geometry
//! in the scene.
//!
//! # Architecture
//!
//! - [`Overlay`] - Context object owning every component below
//! - [`EntityRegistry`] - Upsert-by-name store of persistent entities
//! - [`ConsoleLogBuffer`] - Bounded FIFO of transient console lines
//! - [`PresentationRouter`] - Per-type colour, field count and draw function
//! - [`ObserverPanelPresenter`] - Docked and anchored panels with connectors
//! - [`PathVisualizer`] - Ephemeral tube and marker geometry for point sequences
//! - [`DebugHookEvaluator`] - Debug/highlight predicates and the break hook
//! - [`PresentationSurface`] / [`SceneGeometry`] - What a UI adapter implements

pub mod classify;
pub mod clock;
pub mod config;
pub mod console_log;
pub mod controls;
pub mod entity;
pub mod headless;
pub mod hooks;
#[cfg(test)]
mod integration;
pub mod overlay;
pub mod path_viz;
pub mod presenter;
pub mod registry;
pub mod router;
pub mod surface;
pub mod types;
pub mod value;

pub use classify::classify;
pub use clock::{Clock, format_elapsed};
pub use config::{ColorConfig, ConfigError, ConsoleStamp, DockSide, OverlayConfig, PathConfig};
pub use console_log::{ConsoleLogBuffer, ConsoleLogLine};
pub use controls::{ControlAction, OverlayControls};
pub use entity::{EntityHandle, EntityId, HookState, LoggedEntity};
pub use hooks::{BreakAction, BreakHook, DebugBreak, DebugHookEvaluator};
pub use overlay::{FrameReport, Overlay, OverlayError};
pub use path_viz::{GeometryArena, PathVisualizer};
pub use presenter::ObserverPanelPresenter;
pub use registry::{EntityRegistry, Upsert};
pub use router::{MISSING_VALUE_TEXT, PresentationRouter};
pub use surface::{
    ConnectorId, ConnectorSpec, MaterialDesc, MaterialId, MeshId, PanelId, PanelSpec, Placement,
    PresentationSurface, SceneGeometry,
};
pub use types::{AnchorKind, EntityOptions, PresentationType, RefreshRate};
pub use value::{Color3, Color4, Inspect, ReadError, Source, Transform, Value};
