//! Overlay type definitions
//!
//! Core types shared by the registry, router and presenters.

use std::fmt;
use std::num::NonZeroU32;

/// How an entity's value is presented
///
/// Assigned once at registration and never re-inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentationType {
    Text,
    Float,
    Boolean,
    /// Position/rotation/scaling of a scene object
    MeshTransform,
    Vector2,
    Vector3,
    Color3,
    Color4,
    /// Sequence of 3D points, drawn as a tube with markers
    PointSequence,
}

impl PresentationType {
    pub const ALL: [PresentationType; 9] = [
        PresentationType::Text,
        PresentationType::Float,
        PresentationType::Boolean,
        PresentationType::MeshTransform,
        PresentationType::Vector2,
        PresentationType::Vector3,
        PresentationType::Color3,
        PresentationType::Color4,
        PresentationType::PointSequence,
    ];

    /// Number of text fields on the entity's panel
    pub fn input_count(&self) -> usize {
        match self {
            PresentationType::MeshTransform => 3,
            PresentationType::Text
            | PresentationType::Float
            | PresentationType::Boolean
            | PresentationType::Vector2
            | PresentationType::Vector3
            | PresentationType::Color3
            | PresentationType::Color4
            | PresentationType::PointSequence => 1,
        }
    }

    /// Human-readable type name
    pub fn type_name(&self) -> &'static str {
        match self {
            PresentationType::Text => "text",
            PresentationType::Float => "float",
            PresentationType::Boolean => "bool",
            PresentationType::MeshTransform => "transform",
            PresentationType::Vector2 => "Vec2",
            PresentationType::Vector3 => "Vec3",
            PresentationType::Color3 => "Color3",
            PresentationType::Color4 => "Color4",
            PresentationType::PointSequence => "[Vec3]",
        }
    }

    /// Whether drawing this type recolours its panel
    pub fn is_color(&self) -> bool {
        matches!(self, PresentationType::Color3 | PresentationType::Color4)
    }
}

/// What a world-anchored panel follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// A scene object exposing a transform
    Mesh,
    /// A bare 3D point
    Point,
}

/// Flags selecting the presenter and anchoring for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityOptions {
    /// Panel lives in the screen-corner stack
    pub docked: bool,
    /// Panel follows a scene object's projected position
    pub linked_with_mesh: bool,
    /// Panel follows a 3D point's projected position
    pub linked_with_vector: bool,
    /// Transient entry in the console log instead of a panel
    pub is_console_line: bool,
}

impl EntityOptions {
    pub fn docked() -> Self {
        Self {
            docked: true,
            ..Self::default()
        }
    }

    pub fn console_line() -> Self {
        Self {
            docked: true,
            is_console_line: true,
            ..Self::default()
        }
    }

    pub fn floating() -> Self {
        Self::default()
    }

    pub fn anchored(kind: AnchorKind) -> Self {
        Self {
            linked_with_mesh: kind == AnchorKind::Mesh,
            linked_with_vector: kind == AnchorKind::Point,
            ..Self::default()
        }
    }

    /// Anchor followed every frame, if any
    pub fn anchor(&self) -> Option<AnchorKind> {
        if self.linked_with_mesh {
            Some(AnchorKind::Mesh)
        } else if self.linked_with_vector {
            Some(AnchorKind::Point)
        } else {
            None
        }
    }
}

/// Tick interval at which an entity is redrawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshRate(NonZeroU32);

impl RefreshRate {
    pub const EVERY_FRAME: RefreshRate = RefreshRate(NonZeroU32::MIN);
    pub const EVERY_5: RefreshRate = RefreshRate::from_const(5);
    pub const EVERY_30: RefreshRate = RefreshRate::from_const(30);
    pub const EVERY_60: RefreshRate = RefreshRate::from_const(60);
    pub const EVERY_120: RefreshRate = RefreshRate::from_const(120);

    /// Preset intervals offered for observer panels
    pub const PRESETS: [RefreshRate; 5] = [
        RefreshRate::EVERY_FRAME,
        RefreshRate::EVERY_5,
        RefreshRate::EVERY_30,
        RefreshRate::EVERY_60,
        RefreshRate::EVERY_120,
    ];

    const fn from_const(ticks: u32) -> Self {
        match NonZeroU32::new(ticks) {
            Some(n) => RefreshRate(n),
            None => RefreshRate(NonZeroU32::MIN),
        }
    }

    /// Create a refresh rate; zero is clamped to every frame
    pub fn new(ticks: u32) -> Self {
        match NonZeroU32::new(ticks) {
            Some(n) => RefreshRate(n),
            None => {
                tracing::warn!("refresh rate of 0 ticks requested, using 1");
                RefreshRate::EVERY_FRAME
            }
        }
    }

    pub fn ticks(&self) -> u32 {
        self.0.get()
    }

    /// Whether an entity with this rate is drawn on `tick`
    pub fn is_due(&self, tick: u64) -> bool {
        tick % u64::from(self.0.get()) == 0
    }
}

impl Default for RefreshRate {
    fn default() -> Self {
        RefreshRate::EVERY_FRAME
    }
}

impl From<u32> for RefreshRate {
    fn from(ticks: u32) -> Self {
        RefreshRate::new(ticks)
    }
}

impl fmt::Display for RefreshRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} ticks", self.0)
    }
}
