//! Color values: a CSS color string, a gradient or a pattern fill.

use crate::coerce::{self, FieldValue};
use crate::error::{ChartError, ChartResult};
use crate::node::Node;
use crate::value::Value;

crate::define_node! {
    pub struct LinearGradient("color.linearGradient") {
        x1: f64 => "x1";
        y1: f64 => "y1";
        x2: f64 => "x2";
        y2: f64 => "y2";
    }
}

crate::define_node! {
    pub struct RadialGradient("color.radialGradient") {
        cx: f64 => "cx";
        cy: f64 => "cy";
        r: f64 => "r", check coerce::non_negative;
    }
}

crate::define_node! {
    /// Gradient fill. Stops are `[offset, color]` pairs.
    pub struct Gradient("color") {
        linear_gradient: LinearGradient => "linearGradient";
        radial_gradient: RadialGradient => "radialGradient";
        stops: Vec<Value> => "stops", check gradient_stops;
    }
}

crate::define_node! {
    pub struct PatternOptions("color.patternOptions") {
        path: Value => "path";
        image: String => "image";
        color: String => "color";
        width: f64 => "width", check coerce::non_negative;
        height: f64 => "height", check coerce::non_negative;
        x: f64 => "x";
        y: f64 => "y";
        opacity: f64 => "opacity", check coerce::unit_interval;
        background_color: String => "backgroundColor";
    }
}

crate::define_node! {
    /// Pattern fill from the pattern-fill module.
    pub struct Pattern("color") {
        pattern_options: PatternOptions => "patternOptions";
        pattern_index: i64 => "patternIndex";
        animation: Value => "animation";
    }
}

fn gradient_stops(stops: &[Value], field: &str) -> ChartResult<()> {
    for stop in stops {
        match stop.as_array().map(Vec::as_slice) {
            Some([Value::Number(offset), Value::String(_)]) => {
                coerce::unit_interval(offset, field)?;
            }
            _ => {
                return Err(ChartError::invalid(
                    field,
                    "gradient stops must be [offset, color] pairs",
                ))
            }
        }
    }
    Ok(())
}

/// A color as the library accepts it wherever a `color` option appears.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Any CSS color string: `#rrggbb`, `rgba(...)`, a named color.
    Hex(String),
    Gradient(Gradient),
    Pattern(Pattern),
}

impl Color {
    pub fn hex(value: impl Into<String>) -> ChartResult<Self> {
        let value = value.into();
        validate_color_string(&value, "color")?;
        Ok(Color::Hex(value))
    }

    pub fn as_hex(&self) -> Option<&str> {
        match self {
            Color::Hex(s) => Some(s),
            _ => None,
        }
    }
}

fn validate_color_string(value: &str, field: &str) -> ChartResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ChartError::invalid(field, "empty color"));
    }
    if let Some(digits) = value.strip_prefix('#') {
        let valid = matches!(digits.len(), 3 | 4 | 6 | 8)
            && digits.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(ChartError::invalid(
                field,
                format!("'{value}' is not a valid hex color"),
            ));
        }
    }
    Ok(())
}

impl FieldValue for Color {
    /// Resolution order is string, then gradient, then pattern.
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => {
                validate_color_string(&s, field)?;
                Ok(Some(Color::Hex(s)))
            }
            Value::Object(map) => {
                if map.contains_key("linearGradient") || map.contains_key("radialGradient") {
                    Gradient::from_map(map).map(|g| Some(Color::Gradient(g)))
                } else if map.contains_key("patternOptions") || map.contains_key("patternIndex") {
                    Pattern::from_map(map).map(|p| Some(Color::Pattern(p)))
                } else {
                    Err(ChartError::invalid(
                        field,
                        "expected a color string, gradient or pattern",
                    ))
                }
            }
            other => Err(ChartError::invalid(
                field,
                format!("expected a color, received {}", other.type_name()),
            )),
        }
    }

    fn to_value(&self, trimmed: bool) -> Value {
        match self {
            Color::Hex(s) => Value::String(s.clone()),
            Color::Gradient(g) => FieldValue::to_value(g, trimmed),
            Color::Pattern(p) => FieldValue::to_value(p, trimmed),
        }
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Color::Hex(s.to_owned())
    }
}
