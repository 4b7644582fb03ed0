// Program parser: declarations and expression statements

use super::ast::{DeclKind, Program, Statement};
use super::expr::expression;
use super::lexer::{identifier, keyword, trivia, ws};
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{eof, map, not, opt, peek, value},
    multi::{many0, many0_count},
    sequence::{pair, preceded, tuple},
    IResult,
};

fn declaration_kind(input: &str) -> IResult<&str, DeclKind> {
    alt((
        value(DeclKind::Var, keyword("var")),
        value(DeclKind::Let, keyword("let")),
        value(DeclKind::Const, keyword("const")),
    ))(input)
}

/// Parse a declaration
/// Format: var name = expr
fn declaration(input: &str) -> IResult<&str, Statement> {
    let (input, kind) = declaration_kind(input)?;
    let (input, name) = preceded(trivia, identifier)(input)?;
    let (input, init) = opt(preceded(ws(char('=')), expression))(input)?;
    Ok((input, Statement::Declaration { kind, name, init }))
}

/// An expression statement cannot start with `{`; that would be a block.
fn expression_statement(input: &str) -> IResult<&str, Statement> {
    map(preceded(not(peek(char('{'))), expression), Statement::Expression)(input)
}

fn statement(input: &str) -> IResult<&str, Statement> {
    alt((declaration, expression_statement))(input)
}

fn statement_end(input: &str) -> IResult<&str, ()> {
    value((), pair(trivia, many0_count(pair(char(';'), trivia))))(input)
}

/// Parse a complete program
/// Format: statement; statement; ...
pub fn program(input: &str) -> IResult<&str, Program> {
    let (input, _) = statement_end(input)?;
    let (input, statements) = many0(tuple((statement, statement_end)))(input)?;
    let (input, _) = eof(input)?;
    Ok((
        input,
        Program {
            statements: statements.into_iter().map(|(s, _)| s).collect(),
        },
    ))
}
