//! Token definitions for expression fragments.
//!
//! Fragments are the operand strings stored in a statement's token slots,
//! after glyph substitution has folded full-width and symbolic glyphs to
//! their ASCII forms. This module defines:
//! - Literals (numbers, strings, booleans)
//! - Identifiers (Unicode letters allowed) and the user-defined call marker
//! - Operators and delimiters
//!
//! ## Design Notes
//!
//! We use the `logos` crate for lexical analysis. Word operators (`and`,
//! `or`, `not`) and boolean literals are matched case-insensitively and win
//! over the identifier pattern on equal-length matches.

use logos::Logos;
use std::fmt;

/// A token with its location in the fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Byte range of the token in the fragment
    pub span: std::ops::Range<usize>,
    /// The original text of the token
    pub text: String,
}

impl Token {
    /// Create a new token with the given kind, span, and text.
    pub fn new(kind: TokenKind, span: std::ops::Range<usize>, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

/// All token types that can appear in an expression fragment.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // ==================== Literals ====================

    /// Unsigned decimal number: `42`, `3.14`
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    /// Double-quoted string, `\"` and `\\` escaped: `"say \"hi\""`
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    /// A string missing its closing quote
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedString,

    #[token("true", ignore(ascii_case))]
    True,

    #[token("false", ignore(ascii_case))]
    False,

    // ==================== Names ====================

    /// Variable, array or function name. Dotted paths (`Math.floor`) are a
    /// single identifier so already-rendered text lexes back cleanly.
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*(\.[\p{L}_][\p{L}\p{N}_]*)*")]
    Identifier,

    /// Marks the following call as a user-defined function
    #[token("UserDefined:")]
    UserDefinedMarker,

    // ==================== Arithmetic ====================

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    /// `**`, produced when rendering powers; never written by hand
    #[token("**")]
    StarStar,

    #[token("/")]
    Slash,

    /// Flooring division (the `÷` glyph folds to this)
    #[token("//")]
    SlashSlash,

    #[token("%")]
    Percent,

    // ==================== Comparison ====================

    #[token("=")]
    #[token("==")]
    #[token("===")]
    Equal,

    #[token("!=")]
    #[token("<>")]
    #[token("!==")]
    NotEqual,

    #[token("<")]
    Less,

    #[token("<=")]
    LessEqual,

    #[token(">")]
    Greater,

    #[token(">=")]
    GreaterEqual,

    // ==================== Logical ====================

    #[token("&&")]
    #[token("and", ignore(ascii_case))]
    And,

    #[token("||")]
    #[token("or", ignore(ascii_case))]
    Or,

    #[token("!")]
    #[token("not", ignore(ascii_case))]
    Not,

    // ==================== Delimiters ====================

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("[")]
    LeftBracket,

    #[token("]")]
    RightBracket,

    #[token(",")]
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number => write!(f, "number"),
            TokenKind::StringLiteral => write!(f, "string"),
            TokenKind::UnterminatedString => write!(f, "unterminated string"),
            TokenKind::True => write!(f, "true"),
            TokenKind::False => write!(f, "false"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::UserDefinedMarker => write!(f, "UserDefined:"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::StarStar => write!(f, "**"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::SlashSlash => write!(f, "//"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Equal => write!(f, "=="),
            TokenKind::NotEqual => write!(f, "!="),
            TokenKind::Less => write!(f, "<"),
            TokenKind::LessEqual => write!(f, "<="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::GreaterEqual => write!(f, ">="),
            TokenKind::And => write!(f, "&&"),
            TokenKind::Or => write!(f, "||"),
            TokenKind::Not => write!(f, "!"),
            TokenKind::LeftParen => write!(f, "("),
            TokenKind::RightParen => write!(f, ")"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
        }
    }
}
