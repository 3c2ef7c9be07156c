//! Per-type presentation routing
//!
//! A fixed table maps every [`PresentationType`] to its panel colour, its
//! text field count and the function that draws it.

use crate::config::OverlayConfig;
use crate::entity::{EntityId, LoggedEntity};
use crate::path_viz::PathVisualizer;
use crate::surface::{PanelId, PresentationSurface, SceneGeometry};
use crate::types::PresentationType;
use crate::value::{Color3, ReadError, Value};

/// Text written in place of a value that could not be read
pub const MISSING_VALUE_TEXT: &str = "<missing>";

/// Everything a draw function may touch
pub struct DrawTarget<'a> {
    pub surface: &'a mut dyn PresentationSurface,
    pub scene: &'a mut dyn SceneGeometry,
    pub paths: &'a mut PathVisualizer,
    pub precision: usize,
}

/// Draws one entity; returns the colour the panel was recoloured to, if any
pub type DrawFn = fn(&mut DrawTarget<'_>, EntityId, &LoggedEntity, Option<&Value>) -> Option<Color3>;

/// Table entry for one presentation type
#[derive(Clone, Copy)]
pub struct Route {
    pub color: Color3,
    pub input_count: usize,
    pub draw: DrawFn,
}

/// Static `PresentationType -> Route` table
pub struct PresentationRouter {
    routes: [Route; 9],
    /// Panel colour for values with no presentation of their own
    fallback_color: Color3,
}

impl PresentationRouter {
    pub fn new(config: &OverlayConfig) -> Self {
        let route = |ty: PresentationType| Route {
            color: config.colors.types.get(ty),
            input_count: ty.input_count(),
            draw: draw_fn(ty),
        };
        Self {
            routes: PresentationType::ALL.map(route),
            fallback_color: config.colors.observer_panel,
        }
    }

    pub fn route(&self, ty: PresentationType) -> &Route {
        &self.routes[route_index(ty)]
    }

    pub fn color(&self, ty: PresentationType) -> Color3 {
        self.route(ty).color
    }

    /// Base panel colour for a new entity
    ///
    /// Values that were unreadable at registration, or whose shape the
    /// overlay has no presentation for, get the observer panel colour
    /// instead of their type's.
    pub fn panel_color(&self, ty: PresentationType, read: &Result<Value, ReadError>) -> Color3 {
        match read {
            Ok(Value::Opaque(_)) | Err(_) => self.fallback_color,
            Ok(_) => self.color(ty),
        }
    }

    /// Dispatch an entity to its draw function
    pub fn draw(
        &self,
        target: &mut DrawTarget<'_>,
        id: EntityId,
        entity: &LoggedEntity,
        value: Option<&Value>,
    ) -> Option<Color3> {
        (self.route(entity.presentation_type()).draw)(target, id, entity, value)
    }
}

fn route_index(ty: PresentationType) -> usize {
    match ty {
        PresentationType::Text => 0,
        PresentationType::Float => 1,
        PresentationType::Boolean => 2,
        PresentationType::MeshTransform => 3,
        PresentationType::Vector2 => 4,
        PresentationType::Vector3 => 5,
        PresentationType::Color3 => 6,
        PresentationType::Color4 => 7,
        PresentationType::PointSequence => 8,
    }
}

fn draw_fn(ty: PresentationType) -> DrawFn {
    match ty {
        PresentationType::Text
        | PresentationType::Float
        | PresentationType::Boolean
        | PresentationType::MeshTransform
        | PresentationType::Vector2
        | PresentationType::Vector3 => draw_fields,
        PresentationType::Color3 | PresentationType::Color4 => draw_color,
        PresentationType::PointSequence => draw_point_sequence,
    }
}

fn write_fields(surface: &mut dyn PresentationSurface, panel: PanelId, fields: &[String]) {
    for (index, text) in fields.iter().enumerate() {
        surface.set_field_text(panel, index, text);
    }
}

fn draw_fields(
    target: &mut DrawTarget<'_>,
    _id: EntityId,
    entity: &LoggedEntity,
    value: Option<&Value>,
) -> Option<Color3> {
    let binding = entity.panel()?;
    let fields = format_fields(entity.presentation_type(), value, target.precision);
    write_fields(target.surface, binding.panel, &fields);
    None
}

fn draw_color(
    target: &mut DrawTarget<'_>,
    _id: EntityId,
    entity: &LoggedEntity,
    value: Option<&Value>,
) -> Option<Color3> {
    let binding = entity.panel()?;
    let fields = format_fields(entity.presentation_type(), value, target.precision);
    write_fields(target.surface, binding.panel, &fields);

    let color = match value? {
        Value::Color3(c) => *c,
        Value::Color4(c) => c.rgb(),
        _ => return None,
    };
    target.surface.set_panel_color(binding.panel, color);
    Some(color)
}

fn draw_point_sequence(
    target: &mut DrawTarget<'_>,
    id: EntityId,
    _entity: &LoggedEntity,
    value: Option<&Value>,
) -> Option<Color3> {
    let points: Vec<glam::Vec3> = match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(Value::as_vec3).collect(),
        _ => Vec::new(),
    };
    target.paths.rebuild(target.scene, id, &points);
    None
}

/// Text for each field of an entity's panel
///
/// A value whose shape no longer matches `ty` is written with its plain
/// text conversion; a missing value with [`MISSING_VALUE_TEXT`].
pub fn format_fields(ty: PresentationType, value: Option<&Value>, precision: usize) -> Vec<String> {
    let mut fields = vec![String::new(); ty.input_count()];
    let Some(value) = value else {
        fields[0] = MISSING_VALUE_TEXT.to_string();
        return fields;
    };

    match (ty, value) {
        (PresentationType::Float, Value::Number(n)) => fields[0] = format_float(*n, precision),
        (PresentationType::Boolean, Value::Bool(b)) => fields[0] = b.to_string(),
        (PresentationType::Vector2, Value::Vec2(v)) => {
            fields[0] = join_fixed(&[v.x, v.y], precision)
        }
        (PresentationType::Vector3, Value::Vec3(v)) => {
            fields[0] = join_fixed(&[v.x, v.y, v.z], precision)
        }
        (PresentationType::Color3, Value::Color3(c)) => {
            fields[0] = join_fixed(&[c.r, c.g, c.b], precision)
        }
        (PresentationType::Color4, Value::Color4(c)) => {
            fields[0] = join_fixed(&[c.r, c.g, c.b, c.a], precision)
        }
        (PresentationType::MeshTransform, Value::Transform(t)) => {
            fields[0] = join_fixed(&t.position.to_array(), precision);
            fields[1] = join_fixed(&t.rotation.to_array(), precision);
            fields[2] = join_fixed(&t.scaling.to_array(), precision);
        }
        _ => fields[0] = value.to_string(),
    }
    fields
}

/// Fixed precision with trailing zeros trimmed (`100.0000` -> `100`)
pub fn format_float(n: f64, precision: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.*}", precision, n);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn join_fixed(components: &[f32], precision: usize) -> String {
    components
        .iter()
        .map(|c| format!("{:.*}", precision, c))
        .collect::<Vec<_>>()
        .join(", ")
}
