//! Token definitions for the declaration lexer.

/// A span in the source code, representing a range of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns a span covering both `self` and `other`.
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source code
    pub span: Span,
    /// Whether a line terminator appeared between the previous token and this one
    pub newline_before: bool,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span, newline_before: bool) -> Self {
        Self {
            kind,
            span,
            newline_before,
        }
    }

    /// Returns true if this token is the identifier `name`.
    ///
    /// Contextual keywords (`from`, `type`, `as`, `declare`, ...) are lexed as
    /// identifiers and matched through this helper.
    pub fn is_identifier(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Identifier(s) if s == name)
    }
}

/// The kinds of tokens a declaration file is split into.
///
/// Only the reserved words that change statement structure get their own
/// variant; every other operator collapses into [`TokenKind::Operator`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// String literal with escapes processed
    String(String),
    /// Template literal, including any `${}` substitutions
    Template,
    /// Numeric or BigInt literal
    Number,
    /// Regular expression literal
    RegExp,

    // Identifiers and Keywords
    /// Identifier or contextual keyword
    Identifier(String),
    /// Private identifier (#name)
    PrivateIdentifier(String),
    Import,
    Export,
    Default,

    // Punctuation
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// .
    Dot,
    /// ...
    Ellipsis,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// :
    Colon,
    /// *
    Star,
    /// =
    Equal,
    /// @
    At,
    /// Any other operator, kept verbatim
    Operator(&'static str),

    // Special
    /// Character sequence the lexer could not make sense of
    Invalid,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns true if a `/` following this token starts a regular expression
    /// rather than a division.
    pub(crate) fn allows_regex_after(&self) -> bool {
        match self {
            TokenKind::Number
            | TokenKind::String(_)
            | TokenKind::Template
            | TokenKind::RegExp
            | TokenKind::PrivateIdentifier(_)
            | TokenKind::RightParen
            | TokenKind::RightBracket => false,
            TokenKind::Identifier(name) => matches!(
                name.as_str(),
                "return"
                    | "typeof"
                    | "case"
                    | "do"
                    | "else"
                    | "in"
                    | "instanceof"
                    | "new"
                    | "delete"
                    | "void"
                    | "throw"
                    | "yield"
                    | "await"
            ),
            _ => true,
        }
    }
}
