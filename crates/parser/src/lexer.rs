//! Tokenizer for the Unicorn script language, built on nom combinators.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::many0,
    sequence::pair,
};
use nom_locate::LocatedSpan;

use crate::error::ParseError;

/// Input type with position tracking.
pub type Span<'a> = LocatedSpan<&'a str>;

/// Creates a new span from a string slice.
pub fn span(input: &str) -> Span<'_> {
    Span::new(input)
}

/// Token types for the Unicorn script language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Twinkle,
    Fairy,
    Magic,
    Unicorn,
    Dragon,
    Pixie,
    PixieDust,
    If,
    Unless,
    Rainbow,
    Sparkle,
    New,
    Try,
    Catch,
    Finally,
    Repeat,
    Times,
    Return,
    This,
    Is,
    Null,

    // Literals
    Identifier(String),
    String(String),
    Number(f64),
    Bool(bool),

    // Operators
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    AndAnd,
    OrOr,
    Bang,

    // Delimiters
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Dot,
    Semicolon,
}

impl Token {
    /// Short human-readable rendering used in parser error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::String(_) => "string literal".to_string(),
            Token::Number(n) => format!("number {}", n),
            Token::Bool(true) => "'yes'".to_string(),
            Token::Bool(false) => "'no'".to_string(),
            other => format!("'{:?}'", other),
        }
    }
}

/// A token paired with its position in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub offset: usize,
    pub line: u32,
}

/// Parses whitespace and `//` comments.
fn ws(input: Span) -> IResult<Span, ()> {
    value((), many0(alt((value((), multispace1), value((), comment))))).parse(input)
}

/// Parses a comment (// until end of line).
fn comment(input: Span) -> IResult<Span, Span> {
    recognize(pair(tag("//"), take_while(|c| c != '\n'))).parse(input)
}

/// Parses a string literal: "..."
fn string_literal(input: Span) -> IResult<Span, String> {
    let (input, _) = char('"')(input)?;
    let (input, body) = map(
        opt(escaped_transform(
            none_of("\\\""),
            '\\',
            alt((
                value('\\', char('\\')),
                value('"', char('"')),
                value('\n', char('n')),
                value('\r', char('r')),
                value('\t', char('t')),
            )),
        )),
        |s| s.unwrap_or_default(),
    )
    .parse(input)?;
    let (input, _) = char('"')(input)?;
    Ok((input, body))
}

/// Parses a number literal (integer or decimal, no sign).
fn number_literal(input: Span) -> IResult<Span, f64> {
    map_res(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |s: Span| s.fragment().parse::<f64>(),
    )
    .parse(input)
}

/// Maps a bare word to a keyword token, or falls through to an identifier.
///
/// Keywords only ever match whole words here, so an identifier like
/// `island` can never be mistaken for the `is` equality alias.
fn keyword_or_identifier(word: &str) -> Token {
    match word {
        "twinkle" => Token::Twinkle,
        "fairy" => Token::Fairy,
        "magic" => Token::Magic,
        "unicorn" => Token::Unicorn,
        "dragon" => Token::Dragon,
        "pixie" => Token::Pixie,
        "pixieDust" => Token::PixieDust,
        "if" => Token::If,
        "unless" => Token::Unless,
        "rainbow" => Token::Rainbow,
        "sparkle" => Token::Sparkle,
        "new" => Token::New,
        "try" => Token::Try,
        "catch" => Token::Catch,
        "finally" => Token::Finally,
        "repeat" => Token::Repeat,
        "times" => Token::Times,
        "return" => Token::Return,
        "this" => Token::This,
        "is" => Token::Is,
        "null" => Token::Null,
        "yes" => Token::Bool(true),
        "no" => Token::Bool(false),
        _ => Token::Identifier(word.to_string()),
    }
}

/// Parses a word: [a-zA-Z_][a-zA-Z0-9_]*
fn word(input: Span) -> IResult<Span, Token> {
    map(
        recognize(pair(
            take_while1(|c: char| c.is_alphabetic() || c == '_'),
            take_while(|c: char| c.is_alphanumeric() || c == '_'),
        )),
        |s: Span| keyword_or_identifier(s.fragment()),
    )
    .parse(input)
}

/// Parses operators, longest first.
fn operator(input: Span) -> IResult<Span, Token> {
    alt((
        value(Token::EqEq, tag("==")),
        value(Token::NotEq, tag("!=")),
        value(Token::Le, tag("<=")),
        value(Token::Ge, tag(">=")),
        value(Token::AndAnd, tag("&&")),
        value(Token::OrOr, tag("||")),
        value(Token::Assign, char('=')),
        value(Token::Lt, char('<')),
        value(Token::Gt, char('>')),
        value(Token::Plus, char('+')),
        value(Token::Minus, char('-')),
        value(Token::Star, char('*')),
        value(Token::Slash, char('/')),
        value(Token::Percent, char('%')),
        value(Token::Bang, char('!')),
    ))
    .parse(input)
}

/// Parses bracket, brace, and punctuation delimiters.
fn delimiter(input: Span) -> IResult<Span, Token> {
    alt((
        value(Token::OpenParen, char('(')),
        value(Token::CloseParen, char(')')),
        value(Token::OpenBrace, char('{')),
        value(Token::CloseBrace, char('}')),
        value(Token::OpenBracket, char('[')),
        value(Token::CloseBracket, char(']')),
        value(Token::Comma, char(',')),
        value(Token::Dot, char('.')),
        value(Token::Semicolon, char(';')),
    ))
    .parse(input)
}

/// Parses a single token.
fn token(input: Span) -> IResult<Span, Token> {
    alt((
        map(number_literal, Token::Number),
        map(string_literal, Token::String),
        word,
        operator,
        delimiter,
    ))
    .parse(input)
}

/// Tokenizes a full source text into a position-tagged token stream.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut tokens = Vec::new();
    let mut input = span(source);

    loop {
        let (rest, ()) = ws(input)
            .map_err(|_| ParseError::new("Invalid input", source, input.location_offset()))?;
        input = rest;

        if input.fragment().is_empty() {
            break;
        }

        let offset = input.location_offset();
        let line = input.location_line();

        match token(input) {
            Ok((rest, tok)) => {
                tokens.push(SpannedToken {
                    token: tok,
                    offset,
                    line,
                });
                input = rest;
            }
            Err(_) => {
                let bad = input.fragment().chars().next().unwrap_or('?');
                return Err(ParseError::new(
                    format!("Unexpected character '{}'", bad),
                    source,
                    offset,
                ));
            }
        }
    }

    Ok(tokens)
}
