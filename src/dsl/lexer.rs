//! Lexer/tokenizer for the filter expression language.

use winnow::ascii::{digit1, space0};
use winnow::combinator::{alt, opt, preceded};
use winnow::prelude::*;
use winnow::token::{any, take_while};

/// Token types for the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Names and literals
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Nil,

    /// Operator, symbolic or keyword: `==`, `&&`, `..`, `and`, `contains`...
    Op(&'static str),

    // Punctuation
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    Comma,    // ,
    Question, // ?
    Colon,    // :

    // End of input
    Eof,
}

type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

fn backtrack<T>() -> PResult<T> {
    Err(winnow::error::ErrMode::Backtrack(
        winnow::error::ContextError::default(),
    ))
}

const KEYWORD_OPS: [&str; 8] = [
    "and",
    "or",
    "not",
    "in",
    "matches",
    "contains",
    "startsWith",
    "endsWith",
];

/// Lex an identifier or keyword.
fn lex_word(input: &mut &str) -> PResult<Token> {
    let first = take_while(1, |c: char| c.is_ascii_alphabetic() || c == '_' || c == '$')
        .parse_next(input)?;
    let rest = take_while(0.., |c: char| {
        c.is_ascii_alphanumeric() || c == '_' || c == '$'
    })
    .parse_next(input)?;

    let word = format!("{}{}", first, rest);
    if let Some(op) = KEYWORD_OPS.iter().find(|kw| **kw == word) {
        return Ok(Token::Op(*op));
    }
    Ok(match word.as_str() {
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        "nil" => Token::Nil,
        _ => Token::Ident(word),
    })
}

/// Lex a number (integer or float). A dot only starts a fraction when a
/// digit follows, so `1..5` lexes as `1`, `..`, `5`.
fn lex_number(input: &mut &str) -> PResult<Token> {
    let int_part = digit1.parse_next(input)?;
    let frac = opt(preceded('.', digit1)).parse_next(input)?;

    match frac {
        Some(frac) => {
            let n: f64 = format!("{}.{}", int_part, frac)
                .parse()
                .or_else(|_| backtrack())?;
            Ok(Token::Float(n))
        }
        None => {
            let n: i64 = int_part.parse().or_else(|_| backtrack())?;
            Ok(Token::Int(n))
        }
    }
}

/// Lex a single or double quoted string with backslash escapes.
fn lex_string(input: &mut &str) -> PResult<Token> {
    let quote = any
        .verify(|c: &char| *c == '"' || *c == '\'')
        .parse_next(input)?;

    let mut value = String::new();
    loop {
        match any.parse_next(input)? {
            c if c == quote => return Ok(Token::Str(value)),
            '\\' => {
                let escaped = any.parse_next(input)?;
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => other,
                });
            }
            c => value.push(c),
        }
    }
}

/// Lex an operator symbol.
fn lex_symbol(input: &mut &str) -> PResult<Token> {
    alt((
        // Multi-char operators first
        alt((
            "==".value(Token::Op("==")),
            "!=".value(Token::Op("!=")),
            "<=".value(Token::Op("<=")),
            ">=".value(Token::Op(">=")),
            "&&".value(Token::Op("&&")),
            "||".value(Token::Op("||")),
            "..".value(Token::Op("..")),
        )),
        alt((
            "<".value(Token::Op("<")),
            ">".value(Token::Op(">")),
            "!".value(Token::Op("!")),
            "+".value(Token::Op("+")),
            "-".value(Token::Op("-")),
            "*".value(Token::Op("*")),
            "/".value(Token::Op("/")),
            "%".value(Token::Op("%")),
        )),
    ))
    .parse_next(input)
}

/// Lex punctuation.
fn lex_punct(input: &mut &str) -> PResult<Token> {
    alt((
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        "[".value(Token::LBracket),
        "]".value(Token::RBracket),
        ",".value(Token::Comma),
        "?".value(Token::Question),
        ":".value(Token::Colon),
    ))
    .parse_next(input)
}

/// Lex a single token.
fn lex_token(input: &mut &str) -> PResult<Token> {
    space0.parse_next(input)?;

    if input.is_empty() {
        return Ok(Token::Eof);
    }

    alt((lex_symbol, lex_punct, lex_string, lex_number, lex_word)).parse_next(input)
}

/// Tokenize the entire input.
pub fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut remaining = input;
    let mut tokens = Vec::new();

    loop {
        match lex_token(&mut remaining) {
            Ok(Token::Eof) => break,
            Ok(tok) => tokens.push(tok),
            Err(e) => return Err(format!("Lexer error at '{}': {:?}", remaining, e)),
        }
    }

    tokens.push(Token::Eof);
    Ok(tokens)
}
