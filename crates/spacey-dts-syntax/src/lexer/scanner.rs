//! The scanner that produces tokens from declaration source text.

use super::{Comment, CommentKind, Span, Token, TokenKind};

/// A scanner that tokenizes TypeScript source code.
///
/// Comments are not returned as tokens; they are collected on the side so the
/// parser can read triple-slash directives out of them.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    comments: Vec<Comment>,
    /// Whether the previously returned token lets a `/` start a regex literal
    regex_allowed: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            comments: Vec::new(),
            regex_allowed: true,
        }
    }

    /// Comments seen so far, in source order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        let newline_before = self.skip_whitespace_and_comments();

        let start = self.current_pos;

        let Some((_pos, ch)) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), newline_before);
        };

        let kind = match ch {
            // Single-character tokens
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '*' => TokenKind::Star,
            '@' => TokenKind::At,

            // Multi-character tokens
            '.' => self.scan_dot(),
            '=' => self.scan_equal(),
            '/' if self.regex_allowed => self.scan_regexp(),
            '/' => TokenKind::Operator("/"),

            // String literals
            '"' | '\'' => self.scan_string(ch),

            // Template literals
            '`' => self.scan_template(),

            // Numbers
            '0'..='9' => self.scan_number(start),

            // Identifiers and keywords
            _ if is_id_start(ch) => self.scan_identifier(ch),

            // Private identifiers
            '#' => self.scan_private_identifier(),

            _ => match operator_str(ch) {
                Some(op) => TokenKind::Operator(op),
                None => TokenKind::Invalid,
            },
        };

        self.regex_allowed = kind.allows_regex_after();
        Token::new(kind, Span::new(start, self.current_pos), newline_before)
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    /// Skips trivia and reports whether a line terminator was crossed.
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let mut newline = false;
        loop {
            match self.peek() {
                Some('\n' | '\r' | '\u{2028}' | '\u{2029}') => {
                    newline = true;
                    self.advance();
                }
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        let start = self.current_pos;
                        while let Some(ch) = self.peek() {
                            if ch == '\n' || ch == '\r' {
                                break;
                            }
                            self.advance();
                        }
                        self.push_comment(CommentKind::Line, start);
                    }
                    Some('*') => {
                        let start = self.current_pos;
                        self.advance(); // consume '/'
                        self.advance(); // consume '*'
                        let mut prev = ' ';
                        while let Some(ch) = self.peek() {
                            self.advance();
                            if matches!(ch, '\n' | '\r') {
                                newline = true;
                            }
                            if prev == '*' && ch == '/' {
                                break;
                            }
                            prev = ch;
                        }
                        self.push_comment(CommentKind::Block, start);
                    }
                    _ => break,
                },
                _ => break,
            }
        }
        newline
    }

    fn push_comment(&mut self, kind: CommentKind, start: usize) {
        let span = Span::new(start, self.current_pos);
        self.comments.push(Comment {
            kind,
            span,
            text: self.source[start..self.current_pos].to_string(),
        });
    }

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek() == Some('.') && self.peek_next() == Some('.') {
            self.advance();
            self.advance();
            TokenKind::Ellipsis
        } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.scan_number(self.current_pos - 1)
        } else {
            TokenKind::Dot
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        match self.peek() {
            Some('=') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Operator("===")
                } else {
                    TokenKind::Operator("==")
                }
            }
            Some('>') => {
                self.advance();
                TokenKind::Operator("=>")
            }
            _ => TokenKind::Equal,
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                None | Some((_, '\n')) => return TokenKind::Invalid, // Unterminated string
                Some((_, ch)) if ch == quote => break,
                Some((_, '\\')) => {
                    if let Some((_, escaped)) = self.advance() {
                        match escaped {
                            'n' => value.push('\n'),
                            'r' => value.push('\r'),
                            't' => value.push('\t'),
                            '0' => value.push('\0'),
                            // Line continuation
                            '\n' => {}
                            _ => value.push(escaped),
                        }
                    }
                }
                Some((_, ch)) => value.push(ch),
            }
        }

        TokenKind::String(value)
    }

    fn scan_template(&mut self) -> TokenKind {
        if self.skip_template_body() {
            TokenKind::Template
        } else {
            TokenKind::Invalid
        }
    }

    /// Consumes a template literal up to and including its closing backtick.
    fn skip_template_body(&mut self) -> bool {
        loop {
            match self.advance() {
                None => return false,
                Some((_, '`')) => return true,
                Some((_, '\\')) => {
                    self.advance();
                }
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    if !self.skip_substitution() {
                        return false;
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Consumes a `${ ... }` substitution, balancing braces and skipping
    /// nested strings and templates.
    fn skip_substitution(&mut self) -> bool {
        let mut depth = 1usize;
        while let Some((_, ch)) = self.advance() {
            match ch {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                '"' | '\'' => {
                    if matches!(self.scan_string(ch), TokenKind::Invalid) {
                        return false;
                    }
                }
                '`' => {
                    if !self.skip_template_body() {
                        return false;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn scan_regexp(&mut self) -> TokenKind {
        let mut in_class = false;
        loop {
            match self.advance() {
                None | Some((_, '\n' | '\r')) => return TokenKind::Invalid,
                Some((_, '\\')) => {
                    self.advance();
                }
                Some((_, '[')) => in_class = true,
                Some((_, ']')) => in_class = false,
                Some((_, '/')) if !in_class => break,
                Some(_) => {}
            }
        }

        // Flags
        while self.peek().is_some_and(is_id_continue) {
            self.advance();
        }

        TokenKind::RegExp
    }

    fn scan_number(&mut self, start: usize) -> TokenKind {
        while let Some(ch) = self.peek() {
            let literal = &self.source[start..self.current_pos];
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                self.advance();
            } else if matches!(ch, '+' | '-')
                && literal.ends_with(['e', 'E'])
                && !literal.starts_with("0x")
                && !literal.starts_with("0X")
            {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::Number
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match name.as_str() {
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "default" => TokenKind::Default,
            _ => TokenKind::Identifier(name),
        }
    }

    fn scan_private_identifier(&mut self) -> TokenKind {
        let mut name = String::new();

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if name.is_empty() {
            TokenKind::Invalid
        } else {
            TokenKind::PrivateIdentifier(name)
        }
    }
}

/// Maps a single operator character to its static spelling.
fn operator_str(ch: char) -> Option<&'static str> {
    Some(match ch {
        '+' => "+",
        '-' => "-",
        '%' => "%",
        '<' => "<",
        '>' => ">",
        '!' => "!",
        '&' => "&",
        '|' => "|",
        '^' => "^",
        '~' => "~",
        '?' => "?",
        _ => return None,
    })
}

/// Checks if a character can start an identifier.
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
