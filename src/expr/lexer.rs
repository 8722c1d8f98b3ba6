// ============================================================================
// spark-components - Expression Lexer
// Source text of a condition into positioned tokens
// ============================================================================

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1},
    combinator::{map, map_res, opt, recognize, value},
    multi::many0,
    sequence::pair,
    IResult,
};

use super::ExprError;

type LexResult<'a, O> = IResult<&'a str, O>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Or,
    And,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Not,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Or => "||",
            Op::And => "&&",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::StrictEq => "===",
            Op::StrictNe => "!==",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Rem => "%",
            Op::Not => "!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Op(Op),
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Str(s) => write!(f, "{s:?}"),
            Token::Ident(name) => f.write_str(name),
            Token::Op(op) => f.write_str(op.as_str()),
            Token::Dot => f.write_str("."),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
        }
    }
}

/// A token and the byte offset it starts at
pub type Spanned = (Token, usize);

// =============================================================================
// TOKEN PARSERS
// =============================================================================

fn number(input: &str) -> LexResult<'_, Token> {
    map(
        map_res(
            recognize(pair(digit1, opt(pair(char('.'), digit1)))),
            |digits: &str| digits.parse::<f64>(),
        ),
        Token::Number,
    )(input)
}

fn identifier(input: &str) -> LexResult<'_, Token> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"), tag("$"))),
            many0(alt((alphanumeric1, tag("_"), tag("$")))),
        )),
        |name: &str| Token::Ident(name.to_string()),
    )(input)
}

fn operator(input: &str) -> LexResult<'_, Token> {
    map(
        alt((
            value(Op::StrictEq, tag("===")),
            value(Op::StrictNe, tag("!==")),
            value(Op::Eq, tag("==")),
            value(Op::Ne, tag("!=")),
            value(Op::Le, tag("<=")),
            value(Op::Ge, tag(">=")),
            value(Op::And, tag("&&")),
            value(Op::Or, tag("||")),
            value(Op::Lt, char('<')),
            value(Op::Gt, char('>')),
            value(Op::Add, char('+')),
            value(Op::Sub, char('-')),
            value(Op::Mul, char('*')),
            value(Op::Div, char('/')),
            value(Op::Rem, char('%')),
            value(Op::Not, char('!')),
        )),
        Token::Op,
    )(input)
}

fn delimiter(input: &str) -> LexResult<'_, Token> {
    alt((
        value(Token::Dot, char('.')),
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::LBracket, char('[')),
        value(Token::RBracket, char(']')),
    ))(input)
}

/// A quoted string with `\` escapes. `input` starts at the opening quote.
fn string_literal(input: &str, position: usize) -> Result<(&str, Token), ExprError> {
    let mut chars = input.char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(ExprError::UnterminatedString { position });
    };

    let mut out = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((&input[i + c.len_utf8()..], Token::Str(out))),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, escaped)) => out.push(escaped),
                None => break,
            },
            c => out.push(c),
        }
    }
    Err(ExprError::UnterminatedString { position })
}

// =============================================================================
// TOKENIZE
// =============================================================================

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ExprError> {
    let mut tokens = Vec::new();
    let mut rest = source.trim_start();

    while !rest.is_empty() {
        let position = source.len() - rest.len();

        let (remaining, token) = if rest.starts_with(['"', '\'']) {
            string_literal(rest, position)?
        } else {
            alt((number, operator, delimiter, identifier))(rest).map_err(|_| {
                ExprError::UnexpectedChar {
                    ch: rest.chars().next().unwrap_or_default(),
                    position,
                }
            })?
        };

        tokens.push((token, position));
        rest = remaining.trim_start();
    }

    Ok(tokens)
}
