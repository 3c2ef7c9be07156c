//! Logged entity records

use std::fmt;

use crate::surface::{ConnectorId, PanelId};
use crate::types::{EntityOptions, PresentationType, RefreshRate};
use crate::value::{Color3, ReadError, Source, Value};

/// Index of a persistent entity in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Returned by every registration call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityHandle {
    /// Persistent entity with its own panel
    Observer(EntityId),
    /// Console line, identified by its sequence number
    ConsoleLine(u64),
}

impl EntityHandle {
    pub fn observer(&self) -> Option<EntityId> {
        match self {
            EntityHandle::Observer(id) => Some(*id),
            EntityHandle::ConsoleLine(_) => None,
        }
    }
}

/// Predicate over an entity's current value (`None` when unreadable)
pub type Predicate = Box<dyn Fn(Option<&Value>) -> bool>;

/// UI handles owned by the panel presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelBinding {
    pub panel: PanelId,
    pub input_count: usize,
    pub connector: Option<ConnectorId>,
}

/// Which hook colour, if any, is currently applied to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookState {
    #[default]
    Clear,
    DebugHit,
    HighlightHit,
}

/// A named, typed binding to a live value in host state
pub struct LoggedEntity {
    pub(crate) name: String,
    pub(crate) ty: PresentationType,
    pub(crate) source: Source,
    pub(crate) property: Option<String>,
    pub(crate) options: EntityOptions,
    pub(crate) refresh_rate: RefreshRate,
    pub(crate) debug_when: Option<Predicate>,
    pub(crate) highlight_when: Option<Predicate>,
    /// Colour restored when a hook stops firing
    pub(crate) base_color: Color3,
    pub(crate) panel: Option<PanelBinding>,
    pub(crate) hook_state: HookState,
}

impl LoggedEntity {
    pub(crate) fn new(
        name: &str,
        ty: PresentationType,
        source: Source,
        property: Option<&str>,
        options: EntityOptions,
        base_color: Color3,
    ) -> Self {
        Self {
            name: name.to_string(),
            ty,
            source,
            property: property.map(str::to_string),
            options,
            refresh_rate: RefreshRate::EVERY_FRAME,
            debug_when: None,
            highlight_when: None,
            base_color,
            panel: None,
            hook_state: HookState::Clear,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn presentation_type(&self) -> PresentationType {
        self.ty
    }

    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    pub fn options(&self) -> EntityOptions {
        self.options
    }

    pub fn refresh_rate(&self) -> RefreshRate {
        self.refresh_rate
    }

    pub fn panel(&self) -> Option<PanelBinding> {
        self.panel
    }

    pub fn hook_state(&self) -> HookState {
        self.hook_state
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Resolve the current value through source and property
    pub fn read(&self) -> Result<Value, ReadError> {
        self.source.read(self.property.as_deref())
    }

    pub fn set_refresh_rate(&mut self, rate: impl Into<RefreshRate>) -> &mut Self {
        self.refresh_rate = rate.into();
        self
    }

    /// Recolour the panel and fire the break hook whenever `pred` holds
    pub fn debug_when(&mut self, pred: impl Fn(Option<&Value>) -> bool + 'static) -> &mut Self {
        self.debug_when = Some(Box::new(pred));
        self
    }

    /// Recolour the panel whenever `pred` holds
    pub fn highlight_when(
        &mut self,
        pred: impl Fn(Option<&Value>) -> bool + 'static,
    ) -> &mut Self {
        self.highlight_when = Some(Box::new(pred));
        self
    }

    pub fn clear_hooks(&mut self) -> &mut Self {
        self.debug_when = None;
        self.highlight_when = None;
        self
    }

    /// Rebind to a new source, keeping type, colour and panel
    pub(crate) fn rebind(&mut self, source: Source, property: Option<&str>, docked: bool) {
        self.source = source;
        self.property = property.map(str::to_string);
        self.options.docked = docked;
    }
}

impl fmt::Debug for LoggedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedEntity")
            .field("name", &self.name)
            .field("type", &self.ty)
            .field("source", &self.source)
            .field("property", &self.property)
            .field("options", &self.options)
            .field("refresh_rate", &self.refresh_rate)
            .field("debug_when", &self.debug_when.is_some())
            .field("highlight_when", &self.highlight_when.is_some())
            .field("panel", &self.panel)
            .finish()
    }
}
