//! Lexical analysis (tokenization) for TypeScript declaration files.
//!
//! The lexer transforms source text into a stream of tokens that can be
//! consumed by the parser. It understands enough of the language to never
//! mistake the inside of a string, template literal, regular expression or
//! comment for code.
//!
//! ## Structure
//!
//! - `scanner.rs` - Main `Scanner` struct that produces tokens
//! - `token.rs` - `Token` and `TokenKind` definitions
//!
//! ## Usage
//!
//! ```rust
//! use spacey_dts_syntax::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("export * from './types';");
//!
//! loop {
//!     let token = scanner.next_token();
//!     if matches!(token.kind, TokenKind::Eof) {
//!         break;
//!     }
//!     println!("{:?}", token.kind);
//! }
//! ```

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};

/// Kind of a source comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// A comment collected while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub span: Span,
    /// Full comment text including its delimiters
    pub text: String,
}
