// Expression parser for the JavaScript literal subset

use super::ast::Expr;
use super::lexer::{balanced, identifier, keyword, number_literal, string_literal, trivia, until_delimiter, ws};
use crate::value::format_number;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, one_of},
    combinator::{map, opt, peek, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

/// Parse any supported expression
pub fn expression(input: &str) -> IResult<&str, Expr> {
    alt((
        object_literal,
        array_literal,
        map(string_literal, Expr::Str),
        signed_number,
        function_expression,
        arrow_function,
        word_literal,
        reference_chain,
    ))(input)
}

/// Parse an object literal
/// Format: { key: value, 'quoted key': value, 3: value, }
pub fn object_literal(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('{')(input)?;
    let (input, entries) = separated_list0(ws(char(',')), ws(property))(input)?;
    let (input, _) = opt(ws(char(',')))(input)?;
    let (input, _) = ws(char('}'))(input)?;
    Ok((input, Expr::Object(entries)))
}

fn property(input: &str) -> IResult<&str, (String, Expr)> {
    let (input, key) = alt((
        identifier,
        string_literal,
        map(number_literal, format_number),
    ))(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, value) = expression(input)?;
    Ok((input, (key, value)))
}

/// Parse an array literal
/// Format: [value, value, ]
pub fn array_literal(input: &str) -> IResult<&str, Expr> {
    let (input, _) = char('[')(input)?;
    let (input, items) = separated_list0(ws(char(',')), ws(expression))(input)?;
    let (input, _) = opt(ws(char(',')))(input)?;
    let (input, _) = ws(char(']'))(input)?;
    Ok((input, Expr::Array(items)))
}

fn signed_number(input: &str) -> IResult<&str, Expr> {
    let (input, sign) = opt(one_of("+-"))(input)?;
    let (input, n) = preceded(
        trivia,
        alt((number_literal, value(f64::INFINITY, keyword("Infinity")))),
    )(input)?;
    let n = if sign == Some('-') { -n } else { n };
    Ok((input, Expr::Number(n)))
}

fn word_literal(input: &str) -> IResult<&str, Expr> {
    alt((
        value(Expr::Bool(true), keyword("true")),
        value(Expr::Bool(false), keyword("false")),
        value(Expr::Null, keyword("null")),
        value(Expr::Null, keyword("undefined")),
        value(Expr::Number(f64::NAN), keyword("NaN")),
    ))(input)
}

fn bracketed<'a>(open: char) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(peek(char(open)), balanced)
}

/// Parse a function expression, keeping its source
/// Format: function name(args) { body }
fn function_expression(input: &str) -> IResult<&str, Expr> {
    let (input, source) = recognize(tuple((
        opt(pair(keyword("async"), trivia)),
        keyword("function"),
        trivia,
        opt(identifier),
        trivia,
        bracketed('('),
        trivia,
        bracketed('{'),
    )))(input)?;
    Ok((input, Expr::Function(source.to_string())))
}

/// Parse an arrow function, keeping its source
/// Format: x => expr, (a, b) => { body }
fn arrow_function(input: &str) -> IResult<&str, Expr> {
    let (input, source) = recognize(tuple((
        alt((recognize(identifier), bracketed('('))),
        trivia,
        tag("=>"),
        trivia,
        alt((bracketed('{'), until_delimiter)),
    )))(input)?;
    Ok((input, Expr::Function(source.to_string())))
}

fn call_arguments(input: &str) -> IResult<&str, Vec<Expr>> {
    preceded(
        trivia,
        delimited(
            char('('),
            terminated(
                separated_list0(ws(char(',')), ws(expression)),
                opt(ws(char(','))),
            ),
            ws(char(')')),
        ),
    )(input)
}

fn index_access(input: &str) -> IResult<&str, Expr> {
    preceded(
        trivia,
        delimited(char('['), ws(expression), char(']')),
    )(input)
}

/// Parse an identifier chain with member access, indexing and calls
/// Format: new Date(2020, 0, 1), Highcharts.getOptions().colors[0]
fn reference_chain(input: &str) -> IResult<&str, Expr> {
    let start = input;
    let (mut rest, _) = opt(pair(keyword("new"), trivia))(input)?;
    let (r, _) = identifier(rest)?;
    rest = r;

    let mut call: Option<(usize, Vec<Expr>)> = None;
    loop {
        if let Ok((r, _)) = pair(ws(char('.')), identifier)(rest) {
            rest = r;
            call = None;
            continue;
        }
        if let Ok((r, args)) = call_arguments(rest) {
            call = Some((start.len() - rest.len(), args));
            rest = r;
            continue;
        }
        if let Ok((r, _)) = index_access(rest) {
            rest = r;
            call = None;
            continue;
        }
        break;
    }

    let source = start[..start.len() - rest.len()].trim_end().to_string();
    let expr = match call {
        Some((callee_len, args)) => Expr::Call {
            callee: start[..callee_len].trim().to_string(),
            args,
            source,
        },
        None => Expr::Reference(source),
    };
    Ok((rest, expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_with_mixed_keys() {
        let (rest, expr) = expression(r#"{ a: 1, 'b c': "x", 3: true, }"#).unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            expr,
            Expr::Object(vec![
                ("a".to_string(), Expr::Number(1.0)),
                ("b c".to_string(), Expr::Str("x".to_string())),
                ("3".to_string(), Expr::Bool(true)),
            ])
        );
    }

    #[test]
    fn test_parse_nested_arrays() {
        let (_, expr) = expression("[[1, -2.5], [ null, undefined ]]").unwrap();
        assert_eq!(
            expr,
            Expr::Array(vec![
                Expr::Array(vec![Expr::Number(1.0), Expr::Number(-2.5)]),
                Expr::Array(vec![Expr::Null, Expr::Null]),
            ])
        );
    }

    #[test]
    fn test_parse_function_keeps_source() {
        let (rest, expr) = expression("function (e) { return { a: '}' }; }, next").unwrap();
        assert_eq!(expr, Expr::Function("function (e) { return { a: '}' }; }".to_string()));
        assert_eq!(rest, ", next");
    }

    #[test]
    fn test_parse_arrow_functions() {
        let (_, expr) = expression("(a, b) => { return a + b; }").unwrap();
        assert_eq!(expr, Expr::Function("(a, b) => { return a + b; }".to_string()));
        let (rest, expr) = expression("x => x * 2 }").unwrap();
        assert_eq!(expr, Expr::Function("x => x * 2".to_string()));
        assert_eq!(rest, " }");
    }

    #[test]
    fn test_parse_call_chain() {
        let (_, expr) = expression("Highcharts.chart('container', { a: 1 })").unwrap();
        match expr {
            Expr::Call { callee, args, .. } => {
                assert_eq!(callee, "Highcharts.chart");
                assert_eq!(args.len(), 2);
                assert_eq!(args[0], Expr::Str("container".to_string()));
            }
            other => panic!("Expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_reference() {
        let (_, expr) = expression("Highcharts.getOptions().colors[0]").unwrap();
        assert_eq!(expr, Expr::Reference("Highcharts.getOptions().colors[0]".to_string()));
        let (_, expr) = expression("new Date(2020, 0, 1)").unwrap();
        assert!(matches!(expr, Expr::Call { ref callee, .. } if callee == "new Date"));
    }

    #[test]
    fn test_keywords_are_not_prefixes() {
        let (_, expr) = expression("trueish").unwrap();
        assert_eq!(expr, Expr::Reference("trueish".to_string()));
    }

    #[test]
    fn test_unclosed_object_fails() {
        assert!(expression("{ a: 1").is_err());
    }
}
