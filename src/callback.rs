//! JavaScript callback functions carried as source text.

use std::fmt;

use crate::coerce::FieldValue;
use crate::error::{ChartError, ChartResult};
use crate::parser::{self, Expr};
use crate::value::Value;

/// A function expression (`function (...) {...}` or an arrow function).
/// Serialized verbatim into literal text, as a string into JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFunction(String);

impl CallbackFunction {
    /// Parses `source`, which must be a single function expression.
    pub fn new(source: impl AsRef<str>) -> ChartResult<Self> {
        let source = source.as_ref().trim();
        match parser::parse_expression(source)? {
            Expr::Function(text) => Ok(CallbackFunction(text)),
            other => Err(ChartError::Parse(format!(
                "expected a function expression, found {}",
                describe(&other)
            ))),
        }
    }

    pub fn source(&self) -> &str {
        &self.0
    }

    /// Body between the outer braces, `None` for expression-bodied arrows.
    pub fn body(&self) -> Option<&str> {
        parser::function_body(&self.0)
    }
}

fn describe(expr: &Expr) -> &'static str {
    match expr {
        Expr::Null => "null",
        Expr::Bool(_) => "a boolean",
        Expr::Number(_) => "a number",
        Expr::Str(_) => "a string",
        Expr::Array(_) => "an array",
        Expr::Object(_) => "an object",
        Expr::Function(_) => "a function",
        Expr::Reference(_) => "a reference",
        Expr::Call { .. } => "a call",
    }
}

impl fmt::Display for CallbackFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FieldValue for CallbackFunction {
    fn from_value(value: Value, field: &str) -> ChartResult<Option<Self>> {
        let source = match value {
            Value::Null => return Ok(None),
            Value::Code(source) | Value::String(source) => source,
            other => {
                return Err(ChartError::invalid(
                    field,
                    format!("expected a function, received {}", other.type_name()),
                ))
            }
        };
        CallbackFunction::new(&source)
            .map(Some)
            .map_err(|e| ChartError::invalid(field, e.to_string()))
    }

    fn to_value(&self, _trimmed: bool) -> Value {
        Value::Code(self.0.clone())
    }
}
