// Lexical helpers for the JavaScript literal subset

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, hex_digit1, multispace1, not_line_ending, one_of},
    combinator::{map_res, opt, recognize, value},
    error::{Error, ErrorKind},
    multi::many0_count,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

/// Skip whitespace and comments
pub fn trivia(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((multispace1, line_comment, block_comment))),
    )(input)
}

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("//"), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

/// Wrap a parser so surrounding whitespace and comments are ignored
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(trivia, inner, trivia)
}

/// Identifier: letter, `_` or `$`, then alphanumerics, `_` or `$`
pub fn identifier(input: &str) -> IResult<&str, String> {
    let (input, ident) = recognize(pair(
        alt((alpha1, tag("_"), tag("$"))),
        many0_count(alt((alphanumeric1, tag("_"), tag("$")))),
    ))(input)?;
    Ok((input, ident.to_string()))
}

/// Match `word` as a whole identifier (so `var` does not match `variable`)
pub fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        let (rest, ident) = recognize(identifier)(input)?;
        if ident == word {
            Ok((rest, ident))
        } else {
            Err(nom::Err::Error(Error::new(input, ErrorKind::Tag)))
        }
    }
}

/// Unsigned numeric literal: decimal with optional fraction/exponent, or hex
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    alt((hex_literal, decimal_literal))(input)
}

fn hex_literal(input: &str) -> IResult<&str, f64> {
    map_res(preceded(alt((tag("0x"), tag("0X"))), hex_digit1), |digits: &str| {
        u64::from_str_radix(digits, 16).map(|n| n as f64)
    })(input)
}

fn decimal_literal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(pair(
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        )),
        |text: &str| text.parse::<f64>(),
    )(input)
}

/// Single- or double-quoted string with JavaScript escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    let fail = || nom::Err::Error(Error::new(input, ErrorKind::Char));

    let mut chars = input.char_indices().peekable();
    let quote = match chars.next() {
        Some((_, c @ ('"' | '\''))) => c,
        _ => return Err(fail()),
    };

    let mut out = String::new();
    while let Some((idx, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((&input[idx + c.len_utf8()..], out)),
            '\n' => return Err(fail()),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(fail());
                };
                match escaped {
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    'b' => out.push('\u{8}'),
                    'f' => out.push('\u{c}'),
                    'v' => out.push('\u{b}'),
                    '0' => out.push('\0'),
                    // Line continuation
                    '\n' => {}
                    'x' => {
                        let code = read_hex(&mut chars, 2).ok_or_else(fail)?;
                        out.push(char::from_u32(code).ok_or_else(fail)?);
                    }
                    'u' => {
                        let high = read_hex(&mut chars, 4).ok_or_else(fail)?;
                        let code = if (0xD800..0xDC00).contains(&high) {
                            // Surrogate pair: expect a following \uDC00-\uDFFF
                            let mut lookahead = chars.clone();
                            match (lookahead.next(), lookahead.next()) {
                                (Some((_, '\\')), Some((_, 'u'))) => {
                                    let low = read_hex(&mut lookahead, 4).ok_or_else(fail)?;
                                    if !(0xDC00..0xE000).contains(&low) {
                                        return Err(fail());
                                    }
                                    chars = lookahead;
                                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                                }
                                _ => return Err(fail()),
                            }
                        } else {
                            high
                        };
                        out.push(char::from_u32(code).ok_or_else(fail)?);
                    }
                    other => out.push(other),
                }
            }
            c => out.push(c),
        }
    }
    Err(fail())
}

fn read_hex<I>(chars: &mut I, count: usize) -> Option<u32>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut code = 0u32;
    for _ in 0..count {
        let (_, c) = chars.next()?;
        code = code * 16 + c.to_digit(16)?;
    }
    Some(code)
}

/// Consume a bracketed region (`(...)`, `[...]` or `{...}`) including nested
/// brackets, skipping over strings and comments. Returns the whole region.
pub fn balanced(input: &str) -> IResult<&str, &str> {
    let fail = |kind| nom::Err::Error(Error::new(input, kind));

    let mut stack: Vec<char> = Vec::new();
    let mut chars = input.char_indices().peekable();
    match chars.peek() {
        Some((_, '(' | '[' | '{')) => {}
        _ => return Err(fail(ErrorKind::Char)),
    }

    while let Some((idx, c)) = chars.next() {
        match c {
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => {
                if stack.pop() != Some(c) {
                    return Err(fail(ErrorKind::Verify));
                }
                if stack.is_empty() {
                    let end = idx + c.len_utf8();
                    return Ok((&input[end..], &input[..end]));
                }
            }
            '"' | '\'' | '`' => {
                let quote = c;
                let mut closed = false;
                while let Some((_, s)) = chars.next() {
                    if s == '\\' {
                        chars.next();
                    } else if s == quote {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(fail(ErrorKind::Char));
                }
            }
            '/' => match chars.peek().map(|&(_, next)| next) {
                Some('/') => {
                    for (_, s) in chars.by_ref() {
                        if s == '\n' {
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    let mut closed = false;
                    for (_, s) in chars.by_ref() {
                        if prev == '*' && s == '/' {
                            closed = true;
                            break;
                        }
                        prev = s;
                    }
                    if !closed {
                        return Err(fail(ErrorKind::TakeUntil));
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
    Err(fail(ErrorKind::Eof))
}

/// Consume source up to the next top-level `,`, `;` or closing bracket.
pub fn until_delimiter(input: &str) -> IResult<&str, &str> {
    let mut rest = input;
    loop {
        let Some(c) = rest.chars().next() else {
            break;
        };
        match c {
            ',' | ';' | ')' | ']' | '}' => break,
            '(' | '[' | '{' => {
                let (r, _) = balanced(rest)?;
                rest = r;
            }
            '"' | '\'' => {
                let (r, _) = string_literal(rest)?;
                rest = r;
            }
            c => rest = &rest[c.len_utf8()..],
        }
    }
    let consumed = input[..input.len() - rest.len()].trim_end();
    if consumed.trim_start().is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil)));
    }
    Ok((&input[consumed.len()..], consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("$el_1 rest").unwrap(), (" rest", "$el_1".to_string()));
        assert!(identifier("1abc").is_err());
    }

    #[test]
    fn test_keyword_requires_whole_word() {
        assert!(keyword("var")("var x").is_ok());
        assert!(keyword("var")("variable").is_err());
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(number_literal("42,").unwrap(), (",", 42.0));
        assert_eq!(number_literal("1.5e3").unwrap().1, 1500.0);
        assert_eq!(number_literal(".25").unwrap().1, 0.25);
        assert_eq!(number_literal("0xff").unwrap().1, 255.0);
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(
            string_literal(r#""a\"b\né" tail"#).unwrap(),
            (" tail", "a\"b\né".to_string())
        );
        assert_eq!(string_literal(r"'it\'s'").unwrap().1, "it's");
        assert_eq!(string_literal(r#""😀""#).unwrap().1, "😀");
        assert_eq!(string_literal(r#""\ud83d\ude00""#).unwrap().1, "😀");
        assert!(string_literal("\"unterminated").is_err());
    }

    #[test]
    fn test_ws_skips_comments() {
        let mut parser = ws(identifier);
        let (rest, ident) = parser("  /* note */ // line\n  name  ").unwrap();
        assert_eq!(ident, "name");
        assert_eq!(rest, "");
    }

    #[test]
    fn test_balanced() {
        let (rest, region) = balanced("{ a: '}', b: [1, (2)] } tail").unwrap();
        assert_eq!(region, "{ a: '}', b: [1, (2)] }");
        assert_eq!(rest, " tail");
        assert!(balanced("{ a: [1 }").is_err());
    }

    #[test]
    fn test_until_delimiter() {
        let (rest, expr) = until_delimiter("x * f(1, 2) , next").unwrap();
        assert_eq!(expr, "x * f(1, 2)");
        assert_eq!(rest, " , next");
    }
}
