//! Presentation type inference from a value's runtime shape

use crate::types::PresentationType;
use crate::value::{ReadError, Value};

/// Infer the presentation type of a freshly registered value
///
/// Applied once per entity. Unknown shapes and unreadable values fall back
/// to [`PresentationType::Text`].
pub fn classify(value: &Value) -> PresentationType {
    match value {
        Value::Sequence(items) if matches!(items.first(), Some(Value::Vec3(_))) => {
            PresentationType::PointSequence
        }
        Value::Vec3(_) => PresentationType::Vector3,
        Value::Color3(_) => PresentationType::Color3,
        Value::Transform(_) => PresentationType::MeshTransform,
        Value::Color4(_) => PresentationType::Color4,
        Value::Vec2(_) => PresentationType::Vector2,
        Value::Text(_) => PresentationType::Text,
        Value::Number(_) => PresentationType::Float,
        Value::Bool(_) => PresentationType::Boolean,
        Value::Sequence(_) | Value::Opaque(_) => PresentationType::Text,
    }
}

/// Classify the result of a source read
pub fn classify_read(read: &Result<Value, ReadError>) -> PresentationType {
    match read {
        Ok(value) => classify(value),
        Err(_) => PresentationType::Text,
    }
}
