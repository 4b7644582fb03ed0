// Abstract Syntax Tree for the JavaScript literal subset

use crate::value::{Map, Value};

/// Expression forms the parser understands structurally. Anything that is
/// executable (functions, references, calls) keeps its source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    /// `function (...) {...}` or an arrow function
    Function(String),
    /// Identifier chain such as `Highcharts.getOptions().colors[0]`
    Reference(String),
    /// Chain ending in a call, e.g. `Highcharts.chart('c', {...})`
    Call {
        callee: String,
        args: Vec<Expr>,
        source: String,
    },
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration {
        kind: DeclKind,
        name: String,
        init: Option<Expr>,
    },
    Expression(Expr),
}

/// Complete parsed program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Expr {
    pub fn into_value(self) -> Value {
        match self {
            Expr::Null => Value::Null,
            Expr::Bool(b) => Value::Bool(b),
            Expr::Number(n) => Value::Number(n),
            Expr::Str(s) => Value::String(s),
            Expr::Array(items) => Value::Array(items.into_iter().map(Expr::into_value).collect()),
            Expr::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key, value.into_value());
                }
                Value::Object(map)
            }
            Expr::Function(source) | Expr::Reference(source) => Value::Code(source),
            Expr::Call { source, .. } => Value::Code(source),
        }
    }
}

impl Statement {
    /// The value a statement introduces: a declaration's initializer or the
    /// expression itself.
    pub fn expr(&self) -> Option<&Expr> {
        match self {
            Statement::Declaration { init, .. } => init.as_ref(),
            Statement::Expression(expr) => Some(expr),
        }
    }
}

impl Program {
    /// First object literal introduced at the top level.
    pub fn first_object(&self) -> Option<&Expr> {
        self.statements
            .iter()
            .filter_map(Statement::expr)
            .find(|expr| matches!(expr, Expr::Object(_)))
    }

    /// First call at the top level whose callee satisfies `pred`.
    pub fn find_call(&self, pred: impl Fn(&str) -> bool) -> Option<(&str, &[Expr])> {
        self.statements
            .iter()
            .filter_map(Statement::expr)
            .find_map(|expr| match expr {
                Expr::Call { callee, args, .. } if pred(callee) => {
                    Some((callee.as_str(), args.as_slice()))
                }
                _ => None,
            })
    }
}
