//! Field coercion shared by every node type.

use std::path::Path;

use crate::error::{ChartError, ChartResult};
use crate::value::{format_number, Map, Value};

/// A type that can live in a node field.
///
/// `from_value` is the coercing setter: `Ok(None)` means the input was empty
/// and the field stays unset. `to_value` renders the field for a mapping,
/// trimming nested nodes when asked.
pub trait FieldValue: Sized {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>>;

    fn to_value(&self, trimmed: bool) -> Value;
}

impl FieldValue for String {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => validate_string(s, field, true),
            Value::Number(n) => Ok(Some(format_number(n))),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(ChartError::invalid(
                field,
                format!("expected a string, received {}", other.type_name()),
            )),
        }
    }

    fn to_value(&self, _trimmed: bool) -> Value {
        Value::String(self.clone())
    }
}

impl FieldValue for f64 {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(n)),
            Value::String(s) => parse_numeric_text(&s).map(Some).ok_or_else(|| {
                ChartError::invalid(field, format!("expected a number, received '{s}'"))
            }),
            other => Err(ChartError::invalid(
                field,
                format!("expected a number, received {}", other.type_name()),
            )),
        }
    }

    fn to_value(&self, _trimmed: bool) -> Value {
        Value::Number(*self)
    }
}

impl FieldValue for i64 {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        let Some(n) = f64::from_value(value, field)? else {
            return Ok(None);
        };
        if n.fract() != 0.0 || !n.is_finite() {
            return Err(ChartError::invalid(
                field,
                format!("expected an integer, received {}", format_number(n)),
            ));
        }
        Ok(Some(n as i64))
    }

    fn to_value(&self, _trimmed: bool) -> Value {
        Value::Number(*self as f64)
    }
}

impl FieldValue for bool {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            other => Err(ChartError::invalid(
                field,
                format!("expected a boolean, received {}", other.type_name()),
            )),
        }
    }

    fn to_value(&self, _trimmed: bool) -> Value {
        Value::Bool(*self)
    }
}

/// Untyped passthrough for options whose shape the library leaves open.
impl FieldValue for Value {
    fn from_value(value: Value, _field: &str) -> ChartResult<Option<Self>> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    fn to_value(&self, trimmed: bool) -> Value {
        if trimmed {
            self.trimmed()
        } else {
            self.clone()
        }
    }
}

/// A single item is accepted where a list is expected, matching how the
/// library treats e.g. `xAxis: {...}` and `xAxis: [{...}]` alike.
impl<T: FieldValue> FieldValue for Vec<T> {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        let items = match value {
            Value::Null => return Ok(None),
            Value::Array(items) => items,
            single => vec![single],
        };
        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match T::from_value(item, field)? {
                Some(v) => out.push(v),
                None => {
                    return Err(ChartError::invalid(
                        field,
                        format!("list item {idx} is empty"),
                    ))
                }
            }
        }
        Ok(Some(out))
    }

    fn to_value(&self, trimmed: bool) -> Value {
        Value::Array(self.iter().map(|item| item.to_value(trimmed)).collect())
    }
}

/// Validates a string, mapping empty input to `None` unless `allow_empty`.
pub fn validate_string(value: String, field: &str, allow_empty: bool) -> ChartResult<Option<String>> {
    if value.contains('\0') {
        return Err(ChartError::invalid(field, "string contains a NUL character"));
    }
    if value.is_empty() && !allow_empty {
        return Ok(None);
    }
    Ok(Some(value))
}

/// Parses numeric text, retrying once with thousands separators removed.
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return n.is_finite().then_some(n);
    }
    if trimmed.contains(',') {
        let stripped: String = trimmed.chars().filter(|c| *c != ',').collect();
        if let Ok(n) = stripped.parse::<f64>() {
            return n.is_finite().then_some(n);
        }
    }
    None
}

pub fn validate_bounded(value: f64, field: &str, min: Option<f64>, max: Option<f64>) -> ChartResult<()> {
    if let Some(min) = min {
        if value < min {
            return Err(ChartError::invalid(
                field,
                format!("{} is below the minimum {}", format_number(value), format_number(min)),
            ));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(ChartError::invalid(
                field,
                format!("{} is above the maximum {}", format_number(value), format_number(max)),
            ));
        }
    }
    Ok(())
}

pub fn unit_interval(value: &f64, field: &str) -> ChartResult<()> {
    validate_bounded(*value, field, Some(0.0), Some(1.0))
}

pub fn non_negative(value: &f64, field: &str) -> ChartResult<()> {
    validate_bounded(*value, field, Some(0.0), None)
}

pub fn scalar(value: &Value, field: &str) -> ChartResult<()> {
    if value.is_scalar() {
        Ok(())
    } else {
        Err(ChartError::invalid(
            field,
            format!("expected a scalar, received {}", value.type_name()),
        ))
    }
}

pub fn object(value: &Value, field: &str) -> ChartResult<()> {
    match value {
        Value::Object(_) => Ok(()),
        other => Err(ChartError::invalid(
            field,
            format!("expected an object, received {}", other.type_name()),
        )),
    }
}

/// Accepts a number or a percentage/pixel string such as `"50%"`.
pub fn number_or_string(value: &Value, field: &str) -> ChartResult<()> {
    match value {
        Value::Number(_) | Value::String(_) => Ok(()),
        other => Err(ChartError::invalid(
            field,
            format!("expected a number or string, received {}", other.type_name()),
        )),
    }
}

/// Schemes whose URLs carry no `//authority` part.
const OPAQUE_SCHEMES: &[&str] = &["data", "mailto", "javascript", "blob"];

/// Accepts a URL or a plausible filesystem path. Anything that starts with a
/// scheme is held to the URL rules.
pub fn validate_url_or_path(value: &str, field: &str) -> ChartResult<()> {
    let value = value.trim();
    if let Some((scheme, rest)) = split_scheme(value) {
        return check_url(scheme, rest).map_err(|reason| {
            ChartError::invalid(field, format!("'{value}' is not a valid URL: {reason}"))
        });
    }
    if is_plausible_path(value) {
        Ok(())
    } else {
        Err(ChartError::invalid(
            field,
            format!("'{value}' is neither a URL nor a file path"),
        ))
    }
}

pub fn url_or_path(value: &String, field: &str) -> ChartResult<()> {
    validate_url_or_path(value, field)
}

/// `scheme:rest`, where the scheme is longer than a drive letter.
fn split_scheme(value: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = value.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (valid && scheme.len() > 1).then_some((scheme, rest))
}

fn check_url(scheme: &str, rest: &str) -> Result<(), &'static str> {
    if rest.is_empty() {
        return Err("nothing follows the scheme");
    }
    if rest.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("contains whitespace");
    }
    if OPAQUE_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return Ok(());
    }
    let Some(after) = rest.strip_prefix("//") else {
        return Err("expected '//' after the scheme");
    };
    let authority = after.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() && !scheme.eq_ignore_ascii_case("file") {
        return Err("missing host");
    }
    Ok(())
}

/// A path needs a separator or a file extension.
fn is_plausible_path(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_control) {
        return false;
    }
    value.contains(['/', '\\']) || Path::new(value).extension().is_some()
}

pub fn unsupported(field: &str, value: &str, allowed: &[&str]) -> ChartError {
    ChartError::UnsupportedValue {
        field: field.to_owned(),
        value: value.to_owned(),
        allowed: allowed.join(", "),
    }
}

/// Takes the object out of `value` or reports what was found instead.
pub fn expect_object(value: Value, field: &str) -> ChartResult<Map> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ChartError::invalid(
            field,
            format!("expected an object, received {}", other.type_name()),
        )),
    }
}

/// Declares a closed set of string values. Parsing is case-insensitive;
/// anything outside the set is an `UnsupportedValue` error.
#[macro_export]
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALLOWED: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &'static str {
                match self { $(Self::$variant => $wire),+ }
            }

            pub fn parse(text: &str, field: &str) -> $crate::error::ChartResult<Self> {
                let folded = text.trim().to_ascii_lowercase();
                $(
                    if folded == $wire.to_ascii_lowercase() {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::coerce::unsupported(field, text, Self::ALLOWED))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::coerce::FieldValue for $name {
            fn from_value(
                value: $crate::value::Value,
                field: &str,
            ) -> $crate::error::ChartResult<Option<Self>> {
                match value {
                    $crate::value::Value::Null => Ok(None),
                    $crate::value::Value::String(s) => Self::parse(&s, field).map(Some),
                    other => Err($crate::error::ChartError::InvalidValue {
                        field: field.to_owned(),
                        message: format!("expected one of {:?}, received {}", Self::ALLOWED, other.type_name()),
                    }),
                }
            }

            fn to_value(&self, _trimmed: bool) -> $crate::value::Value {
                $crate::value::Value::String(self.as_str().to_owned())
            }
        }
    };
}

string_enum! {
    pub enum Align { Left => "left", Center => "center", Right => "right" }
}

string_enum! {
    pub enum VerticalAlign { Top => "top", Middle => "middle", Bottom => "bottom" }
}

string_enum! {
    pub enum DashStyle {
        Solid => "Solid",
        ShortDash => "ShortDash",
        ShortDot => "ShortDot",
        ShortDashDot => "ShortDashDot",
        ShortDashDotDot => "ShortDashDotDot",
        Dot => "Dot",
        Dash => "Dash",
        LongDash => "LongDash",
        DashDot => "DashDot",
        LongDashDot => "LongDashDot",
        LongDashDotDot => "LongDashDotDot",
    }
}
