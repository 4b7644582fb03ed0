// JavaScript literal parser module

pub mod ast;
pub mod expr;
pub mod lexer;
pub mod program;

// Public API re-exports
pub use ast::{DeclKind, Expr, Program, Statement};

use crate::error::{ChartError, ChartResult};
use crate::value::Value;
use lexer::{balanced, identifier, keyword, trivia, ws};
use nom::{bytes::complete::tag, combinator::opt, sequence::tuple};
use tracing::debug;

/// Name of the synthetic variable a bare literal is assigned to on retry.
pub const WRAPPER_VARIABLE: &str = "__literal";

fn describe(source: &str, err: nom::Err<nom::error::Error<&str>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = source.len() - e.input.len();
            let consumed = &source[..offset];
            let line = consumed.matches('\n').count() + 1;
            let column = consumed.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
            let snippet: String = e.input.chars().take(24).collect();
            format!("unexpected input at line {line}, column {column}: '{snippet}'")
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}

/// Parse `text` as a sequence of statements.
pub fn parse_program(text: &str) -> ChartResult<Program> {
    program::program(text)
        .map(|(_, program)| program)
        .map_err(|e| ChartError::Parse(describe(text, e)))
}

/// Parse `text` as a single expression with nothing trailing.
pub fn parse_expression(text: &str) -> ChartResult<Expr> {
    match ws(expr::expression)(text) {
        Ok(("", expr)) => Ok(expr),
        Ok((rest, _)) => Err(ChartError::Parse(format!(
            "unexpected trailing input: '{}'",
            rest.chars().take(24).collect::<String>()
        ))),
        Err(e) => Err(ChartError::Parse(describe(text, e))),
    }
}

/// Parse literal text to a value.
///
/// The text is first parsed as a program and the first object it introduces
/// is returned. A bare object expression is not a valid program, so on failure
/// the text is wrapped as `var __literal = <text>;` and parsed again.
pub fn parse_literal_text(text: &str) -> ChartResult<Value> {
    let direct = match parse_program(text) {
        Ok(program) => {
            if let Some(object) = program.first_object() {
                return Ok(object.clone().into_value());
            }
            program.statements.iter().find_map(Statement::expr).cloned()
        }
        Err(_) => None,
    };

    debug!("literal text is not a program with an object; retrying as an assignment");
    let body = text.trim().trim_end_matches(';');
    let wrapped = format!("var {WRAPPER_VARIABLE} = {body};");
    match parse_program(&wrapped) {
        Ok(program) => match program.statements.into_iter().next() {
            Some(Statement::Declaration { init: Some(expr), .. }) => Ok(expr.into_value()),
            _ => Err(ChartError::Parse("literal text has no value".to_string())),
        },
        Err(e) => match direct {
            Some(expr) => Ok(expr.into_value()),
            None => Err(e),
        },
    }
}

/// Body of a function expression without its outer braces, or `None` for an
/// expression-bodied arrow function.
pub fn function_body(source: &str) -> Option<&str> {
    let source = source.trim();
    let after_params = if let Ok((rest, _)) = tuple((
        opt(tuple((keyword("async"), trivia))),
        keyword("function"),
        trivia,
        opt(identifier),
        trivia,
        balanced,
    ))(source)
    {
        rest
    } else {
        let idx = source.find("=>")?;
        &source[idx..]
    };
    let (after_params, _) = tuple((trivia, opt(tag("=>")), trivia))(after_params).ok()?;
    if !after_params.starts_with('{') {
        return None;
    }
    let (_, block) = balanced(after_params).ok()?;
    Some(block[1..block.len() - 1].trim())
}
