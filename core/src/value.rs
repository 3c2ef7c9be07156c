//! Observed values and the sources they are read from
//!
//! Host code owns the objects being watched. The overlay only keeps a
//! non-owning [`Source`] and resolves a [`Value`] from it every frame.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Linear RGB colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const BLACK: Color3 = Color3::new(0.0, 0.0, 0.0);
    pub const WHITE: Color3 = Color3::new(1.0, 1.0, 1.0);
    pub const RED: Color3 = Color3::new(1.0, 0.0, 0.0);
    pub const YELLOW: Color3 = Color3::new(1.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Uniform grey
    pub const fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }

    /// Components scaled to 0-255, clamped
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            channel_to_u8(self.r),
            channel_to_u8(self.g),
            channel_to_u8(self.b),
        ]
    }
}

/// Linear RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Drop the alpha channel
    pub fn rgb(self) -> Color3 {
        Color3::new(self.r, self.g, self.b)
    }
}

fn channel_to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Position/rotation/scaling of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub scaling: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scaling: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Runtime shape of an observed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Color3(Color3),
    Color4(Color4),
    Transform(Transform),
    Sequence(Vec<Value>),
    /// A composite the overlay has no presentation for, kept as its display string
    Opaque(String),
}

impl Value {
    /// Resolve a built-in component (`x`, `r`, `position`, ...) of a composite value
    pub fn field(&self, name: &str) -> Option<Value> {
        match (self, name) {
            (Value::Vec2(v), "x") => Some(Value::Number(v.x as f64)),
            (Value::Vec2(v), "y") => Some(Value::Number(v.y as f64)),
            (Value::Vec3(v), "x") => Some(Value::Number(v.x as f64)),
            (Value::Vec3(v), "y") => Some(Value::Number(v.y as f64)),
            (Value::Vec3(v), "z") => Some(Value::Number(v.z as f64)),
            (Value::Color3(c), "r") => Some(Value::Number(c.r as f64)),
            (Value::Color3(c), "g") => Some(Value::Number(c.g as f64)),
            (Value::Color3(c), "b") => Some(Value::Number(c.b as f64)),
            (Value::Color4(c), "r") => Some(Value::Number(c.r as f64)),
            (Value::Color4(c), "g") => Some(Value::Number(c.g as f64)),
            (Value::Color4(c), "b") => Some(Value::Number(c.b as f64)),
            (Value::Color4(c), "a") => Some(Value::Number(c.a as f64)),
            (Value::Transform(t), "position") => Some(Value::Vec3(t.position)),
            (Value::Transform(t), "rotation") => Some(Value::Vec3(t.rotation)),
            (Value::Transform(t), "scaling") => Some(Value::Vec3(t.scaling)),
            (Value::Sequence(items), "length") => Some(Value::Number(items.len() as f64)),
            (Value::Sequence(items), index) => index
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i).cloned()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Anchor position for world-linked panels: a point, or a transform's position
    pub fn world_position(&self) -> Option<Vec3> {
        match self {
            Value::Vec3(v) => Some(*v),
            Value::Transform(t) => Some(t.position),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Vec2(v) => write!(f, "{}, {}", v.x, v.y),
            Value::Vec3(v) => write!(f, "{}, {}, {}", v.x, v.y, v.z),
            Value::Color3(c) => write!(f, "{}, {}, {}", c.r, c.g, c.b),
            Value::Color4(c) => write!(f, "{}, {}, {}, {}", c.r, c.g, c.b, c.a),
            Value::Transform(t) => write!(
                f,
                "{}, {}, {}",
                t.position.x, t.position.y, t.position.z
            ),
            Value::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Value::Opaque(s) => f.write_str(s),
        }
    }
}

macro_rules! value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Number(v as f64)
                }
            }
        )*
    };
}

value_from_number!(f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Vec2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Vec3(v)
    }
}

impl From<Color3> for Value {
    fn from(v: Color3) -> Self {
        Value::Color3(v)
    }
}

impl From<Color4> for Value {
    fn from(v: Color4) -> Self {
        Value::Color4(v)
    }
}

impl From<Transform> for Value {
    fn from(v: Transform) -> Self {
        Value::Transform(v)
    }
}

impl From<Vec<Vec3>> for Value {
    fn from(points: Vec<Vec3>) -> Self {
        Value::Sequence(points.into_iter().map(Value::Vec3).collect())
    }
}

/// Host-side object that can be watched by the overlay
pub trait Inspect {
    /// The whole object as a value (used when no property is selected)
    fn inspect(&self) -> Value;

    /// A named field of the object
    fn field(&self, name: &str) -> Option<Value> {
        self.inspect().field(name)
    }
}

macro_rules! inspect_via_value {
    ($($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn inspect(&self) -> Value {
                    Value::from(self.clone())
                }
            }
        )*
    };
}

inspect_via_value!(
    f32, f64, i8, i16, i32, i64, u8, u16, u32, u64, usize, bool, String, Vec2, Vec3, Color3,
    Color4, Transform
);

impl Inspect for Value {
    fn inspect(&self) -> Value {
        self.clone()
    }
}

impl Inspect for Vec<Vec3> {
    fn inspect(&self) -> Value {
        Value::from(self.clone())
    }
}

/// Failure to resolve an entity's current value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The host object was dropped
    #[error("source object has been dropped")]
    Dropped,
    /// The host object is mutably borrowed elsewhere
    #[error("source object is currently borrowed mutably")]
    Busy,
    /// The selected property does not exist on the object
    #[error("no property `{0}` on source")]
    MissingProperty(String),
}

/// Where an entity's value comes from
#[derive(Clone)]
pub enum Source {
    /// Non-owning reference to a host object
    Shared(Weak<RefCell<dyn Inspect>>),
    /// Owned snapshot (plain log messages)
    Fixed(Value),
}

impl Source {
    /// Watch a host-owned object without extending its lifetime
    pub fn shared<T: Inspect + 'static>(object: &Rc<RefCell<T>>) -> Self {
        let object: Rc<RefCell<dyn Inspect>> = object.clone();
        Source::Shared(Rc::downgrade(&object))
    }

    /// A value that never changes
    pub fn fixed(value: impl Into<Value>) -> Self {
        Source::Fixed(value.into())
    }

    /// Resolve the observed value: `source[property]` when a property is
    /// selected, the source itself otherwise
    pub fn read(&self, property: Option<&str>) -> Result<Value, ReadError> {
        match self {
            Source::Shared(weak) => {
                let object = weak.upgrade().ok_or(ReadError::Dropped)?;
                let object = object.try_borrow().map_err(|_| ReadError::Busy)?;
                match property {
                    Some(name) => object
                        .field(name)
                        .ok_or_else(|| ReadError::MissingProperty(name.to_string())),
                    None => Ok(object.inspect()),
                }
            }
            Source::Fixed(value) => match property {
                Some(name) => value
                    .field(name)
                    .ok_or_else(|| ReadError::MissingProperty(name.to_string())),
                None => Ok(value.clone()),
            },
        }
    }

    /// Whether the referenced object is still alive
    pub fn is_alive(&self) -> bool {
        match self {
            Source::Shared(weak) => weak.strong_count() > 0,
            Source::Fixed(_) => true,
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Shared(weak) => f
                .debug_struct("Shared")
                .field("alive", &(weak.strong_count() > 0))
                .finish(),
            Source::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Player {
        health: f64,
        name: String,
    }

    impl Inspect for Player {
        fn inspect(&self) -> Value {
            Value::Opaque(format!("Player({})", self.name))
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "health" => Some(Value::Number(self.health)),
                "name" => Some(Value::Text(self.name.clone())),
                _ => None,
            }
        }
    }

    #[test]
    fn test_shared_source_reads_property() {
        let player = Rc::new(RefCell::new(Player {
            health: 100.0,
            name: "p1".into(),
        }));
        let source = Source::shared(&player);

        assert_eq!(source.read(Some("health")), Ok(Value::Number(100.0)));
        player.borrow_mut().health = 57.0;
        assert_eq!(source.read(Some("health")), Ok(Value::Number(57.0)));
        assert_eq!(
            source.read(None),
            Ok(Value::Opaque("Player(p1)".to_string()))
        );
    }

    #[test]
    fn test_missing_property() {
        let player = Rc::new(RefCell::new(Player {
            health: 1.0,
            name: "p1".into(),
        }));
        let source = Source::shared(&player);
        assert_eq!(
            source.read(Some("mana")),
            Err(ReadError::MissingProperty("mana".to_string()))
        );
    }

    #[test]
    fn test_dropped_source() {
        let value = Rc::new(RefCell::new(3.0_f32));
        let source = Source::shared(&value);
        assert!(source.is_alive());
        drop(value);
        assert!(!source.is_alive());
        assert_eq!(source.read(None), Err(ReadError::Dropped));
    }

    #[test]
    fn test_busy_source() {
        let value = Rc::new(RefCell::new(3_i32));
        let source = Source::shared(&value);
        let _guard = value.borrow_mut();
        assert_eq!(source.read(None), Err(ReadError::Busy));
    }

    #[test]
    fn test_builtin_fields() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let source = Source::fixed(t);
        assert_eq!(
            source.read(Some("position")),
            Ok(Value::Vec3(Vec3::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            Value::Vec3(Vec3::new(1.0, 2.0, 3.0)).field("y"),
            Some(Value::Number(2.0))
        );
        assert_eq!(Value::Color3(Color3::RED).field("a"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(100.0).to_string(), "100");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::from("hi").to_string(), "hi");
    }

    #[test]
    fn test_color_to_rgb8() {
        assert_eq!(Color3::new(1.0, 0.5, 2.0).to_rgb8(), [255, 128, 255]);
    }
}
