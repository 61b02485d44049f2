//! The statement-level parser.

use std::sync::LazyLock;

use regex::Regex;

use crate::ast::*;
use crate::lexer::{Comment, CommentKind, Scanner, Span, Token, TokenKind};

/// Matches `/// <reference path="..." />`, with either quote style.
static REFERENCE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^///\s*<reference\s+path\s*=\s*(?:'([^']*)'|"([^"]*)").*?/>"#)
        .expect("reference directive pattern is valid")
});

/// A recursive descent parser over top-level statements.
///
/// Statements that are not imports or exports are skipped by balancing
/// brackets, so declarations nested inside blocks (for example the body of
/// `declare module "x" { ... }`) never surface as top-level statements.
pub struct Parser<'a> {
    scanner: Scanner<'a>,
    current: Token,
    previous: Token,
    peeked: Option<Token>,
    leading_comments: Vec<Comment>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        // Everything the scanner skipped before the first token is the file's
        // leading trivia, which is where reference directives live.
        let leading_comments = scanner.comments().to_vec();
        Self {
            scanner,
            current,
            previous: Token::new(TokenKind::Eof, Span::new(0, 0), false),
            peeked: None,
            leading_comments,
        }
    }

    /// Parses the whole source into a [`SourceFile`].
    pub fn parse_source_file(mut self, file_name: &str) -> SourceFile {
        let referenced_files = self
            .leading_comments
            .iter()
            .filter_map(reference_directive)
            .collect();

        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
        }

        SourceFile {
            file_name: file_name.to_string(),
            referenced_files,
            statements,
        }
    }

    /// Parses a single top-level statement. Empty statements yield `None`.
    fn parse_statement(&mut self) -> Option<Statement> {
        if self.check(&TokenKind::Import)
            && !matches!(self.peek().kind, TokenKind::LeftParen | TokenKind::Dot)
        {
            return Some(self.parse_import());
        }

        match self.current.kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Export => Some(self.parse_export()),
            _ => {
                let start = self.current.span;
                Some(Statement::Other(self.skip_statement(start)))
            }
        }
    }

    fn parse_import(&mut self) -> Statement {
        let start = self.current.span;
        self.advance(); // consume 'import'

        // Side-effect import: import "x";
        if let Some(module_specifier) = self.string_literal() {
            self.advance();
            self.finish_module_clause();
            return Statement::Import(ImportDeclaration {
                module_specifier,
                type_only: false,
                span: start.to(self.previous.span),
            });
        }

        let mut type_only = false;
        if self.current.is_identifier("type") {
            let next = &self.peek().kind;
            type_only = matches!(next, TokenKind::LeftBrace | TokenKind::Star)
                || matches!(next, TokenKind::Identifier(name) if name != "from");
            if type_only {
                self.advance();
            }
        }

        loop {
            if let Some(module_specifier) = self.from_clause() {
                return Statement::Import(ImportDeclaration {
                    module_specifier,
                    type_only,
                    span: start.to(self.previous.span),
                });
            }

            match self.current.kind {
                TokenKind::LeftBrace => self.skip_balanced(),
                TokenKind::Equal => return self.parse_import_equals(start),
                TokenKind::Semicolon => {
                    self.advance();
                    return Statement::Other(start.to(self.previous.span));
                }
                TokenKind::Eof => return Statement::Other(start.to(self.previous.span)),
                _ if self.at_statement_boundary() => {
                    return Statement::Other(start.to(self.previous.span));
                }
                _ => self.advance(),
            }
        }
    }

    /// Parses the remainder of `import x = ...` after the binding name.
    fn parse_import_equals(&mut self, start: Span) -> Statement {
        self.advance(); // consume '='

        let mut external_module = None;
        if self.current.is_identifier("require") && self.peek().kind == TokenKind::LeftParen {
            self.advance();
            self.advance();
            external_module = self.string_literal();
        }

        let span = self.skip_statement(start);
        Statement::ImportEquals(ImportEqualsDeclaration {
            external_module,
            span,
        })
    }

    fn parse_export(&mut self) -> Statement {
        let start = self.current.span;
        self.advance(); // consume 'export'

        let mut type_only = false;
        if self.current.is_identifier("type")
            && matches!(self.peek().kind, TokenKind::LeftBrace | TokenKind::Star)
        {
            type_only = true;
            self.advance();
        }

        match self.current.kind {
            TokenKind::Star => {
                self.advance();
                // export * as ns from "x"
                if self.current.is_identifier("as") {
                    self.advance();
                    self.advance();
                }
                match self.from_clause() {
                    Some(module_specifier) => Statement::Export(ExportDeclaration {
                        module_specifier: Some(module_specifier),
                        type_only,
                        span: start.to(self.previous.span),
                    }),
                    None => Statement::Other(self.skip_statement(start)),
                }
            }
            TokenKind::LeftBrace => {
                self.skip_balanced();
                let module_specifier = self.from_clause();
                if module_specifier.is_none() && self.check(&TokenKind::Semicolon) {
                    self.advance();
                }
                Statement::Export(ExportDeclaration {
                    module_specifier,
                    type_only,
                    span: start.to(self.previous.span),
                })
            }
            TokenKind::Equal => Statement::ExportAssignment(self.skip_statement(start)),
            // export default ..., export declare ..., export interface ..., etc.
            _ => Statement::Other(self.skip_statement(start)),
        }
    }

    /// Parses `from "x"` followed by optional attributes and semicolon.
    fn from_clause(&mut self) -> Option<StringLiteral> {
        if !self.current.is_identifier("from") {
            return None;
        }
        if !matches!(self.peek().kind, TokenKind::String(_)) {
            return None;
        }
        self.advance(); // consume 'from'
        let module_specifier = self.string_literal();
        self.advance();
        self.finish_module_clause();
        module_specifier
    }

    /// Skips import attributes (`with { ... }` / `assert { ... }`) and the
    /// terminating semicolon, if present.
    fn finish_module_clause(&mut self) {
        if (self.current.is_identifier("with") || self.current.is_identifier("assert"))
            && self.peek().kind == TokenKind::LeftBrace
        {
            self.advance();
            self.skip_balanced();
        }
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Skips to the end of the current statement and returns its span.
    ///
    /// A statement ends at a top-level `;`, at end of input, right before an
    /// `import`/`export` keyword that starts a new line, or right before one
    /// that follows a top-level closing brace (`declare module "m" {} import ...`).
    fn skip_statement(&mut self, start: Span) -> Span {
        let mut depth = 0usize;
        loop {
            let mut closed_block = false;
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::LeftBrace | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    depth += 1;
                }
                TokenKind::RightBrace => {
                    depth = depth.saturating_sub(1);
                    closed_block = depth == 0;
                }
                TokenKind::RightParen | TokenKind::RightBracket => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    break;
                }
                _ => {}
            }
            self.advance();
            if depth == 0
                && (self.at_statement_boundary() || (closed_block && self.at_module_keyword()))
            {
                break;
            }
        }
        start.to(self.previous.span)
    }

    /// Skips a bracketed group starting at the current opening bracket.
    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::LeftBrace | TokenKind::LeftParen | TokenKind::LeftBracket => {
                    depth += 1;
                }
                TokenKind::RightBrace | TokenKind::RightParen | TokenKind::RightBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Returns true if the current token starts a new import or export
    /// statement on its own line.
    fn at_statement_boundary(&self) -> bool {
        self.current.newline_before && self.at_module_keyword()
    }

    fn at_module_keyword(&self) -> bool {
        matches!(self.current.kind, TokenKind::Import | TokenKind::Export)
    }

    fn string_literal(&self) -> Option<StringLiteral> {
        match &self.current.kind {
            TokenKind::String(text) => Some(StringLiteral {
                text: text.clone(),
                span: self.current.span,
            }),
            _ => None,
        }
    }

    fn peek(&mut self) -> &Token {
        let scanner = &mut self.scanner;
        self.peeked.get_or_insert_with(|| scanner.next_token())
    }

    fn advance(&mut self) {
        let next = match self.peeked.take() {
            Some(token) => token,
            None => self.scanner.next_token(),
        };
        self.previous = std::mem::replace(&mut self.current, next);
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }
}

/// Extracts the path of a `/// <reference path="..." />` comment.
fn reference_directive(comment: &Comment) -> Option<FileReference> {
    if comment.kind != CommentKind::Line {
        return None;
    }
    let captures = REFERENCE_PATH.captures(&comment.text)?;
    let file_name = captures.get(1).or_else(|| captures.get(2))?.as_str();
    Some(FileReference {
        file_name: file_name.to_string(),
        span: comment.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SourceFile {
        Parser::new(source).parse_source_file("test.d.ts")
    }

    fn specifiers(file: &SourceFile) -> Vec<Option<&str>> {
        file.statements
            .iter()
            .filter_map(|s| match s {
                Statement::Import(decl) => Some(Some(decl.module_specifier.text.as_str())),
                Statement::Export(decl) => {
                    Some(decl.module_specifier.as_ref().map(|m| m.text.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_import_forms() {
        let file = parse(
            r#"
import "side-effect";
import def from "default";
import * as ns from './namespace';
import { a, b as c } from "named";
import def2, { d } from "mixed"
import type { T } from "types-only";
import type from "type-named-default";
"#,
        );
        assert_eq!(
            specifiers(&file),
            vec![
                Some("side-effect"),
                Some("default"),
                Some("./namespace"),
                Some("named"),
                Some("mixed"),
                Some("types-only"),
                Some("type-named-default"),
            ]
        );
        let Statement::Import(decl) = &file.statements[5] else {
            panic!("expected import");
        };
        assert!(decl.type_only);
        let Statement::Import(decl) = &file.statements[6] else {
            panic!("expected import");
        };
        assert!(!decl.type_only);
    }

    #[test]
    fn test_export_forms() {
        let file = parse(
            r#"
export * from "./all";
export * as ns from "./ns";
export { x, y as z } from "./named";
export type { T } from "./types";
export { local };
export declare function f(): void;
export = Foo;
export default class Bar {}
"#,
        );
        assert_eq!(
            specifiers(&file),
            vec![Some("./all"), Some("./ns"), Some("./named"), Some("./types"), None]
        );
        assert!(matches!(file.statements[6], Statement::ExportAssignment(_)));
        assert!(matches!(file.statements[7], Statement::Other(_)));
    }

    #[test]
    fn test_import_equals_is_not_an_import_declaration() {
        let file = parse(r#"import fs = require("fs"); import A = B.C;"#);
        assert_eq!(file.statements.len(), 2);
        let Statement::ImportEquals(decl) = &file.statements[0] else {
            panic!("expected import-equals");
        };
        assert_eq!(
            decl.external_module.as_ref().map(|m| m.text.as_str()),
            Some("fs")
        );
        assert!(matches!(
            &file.statements[1],
            Statement::ImportEquals(ImportEqualsDeclaration {
                external_module: None,
                ..
            })
        ));
    }

    #[test]
    fn test_nested_declarations_are_not_top_level() {
        let file = parse(
            r#"
declare module "wrapper" {
    import { inner } from "inner";
    export * from "nested";
}
export * from "./outer";
"#,
        );
        assert_eq!(specifiers(&file), vec![Some("./outer")]);
    }

    #[test]
    fn test_statements_without_semicolons() {
        let file = parse(
            "declare const x: { a: string }\nimport a from 'a'\n\
             interface I { m(): void }\nexport * from 'b'\n",
        );
        assert_eq!(specifiers(&file), vec![Some("a"), Some("b")]);
    }

    #[test]
    fn test_module_statement_after_closing_brace_on_same_line() {
        let file = parse("export interface A {} export * from './b';");
        assert_eq!(specifiers(&file), vec![Some("./b")]);

        let file = parse("declare module 'm' {} import { c } from './c';");
        assert_eq!(specifiers(&file), vec![Some("./c")]);
        assert_eq!(file.statements.len(), 2);
    }

    #[test]
    fn test_dynamic_import_and_import_types_are_skipped() {
        let file = parse(
            "const lazy = import('./lazy');\ntype T = import('./types').T;\nconst m = import.meta;",
        );
        assert!(specifiers(&file).is_empty());
    }

    #[test]
    fn test_reference_directives() {
        let file = parse(
            "/// <reference path=\"./globals.d.ts\" />\n\
             /// <reference path='other.d.ts'/>\n\
             /// <reference types=\"node\" />\n\
             export {};\n\
             /// <reference path=\"late.d.ts\" />\n",
        );
        let paths: Vec<_> = file
            .referenced_files
            .iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(paths, vec!["./globals.d.ts", "other.d.ts"]);
    }

    #[test]
    fn test_specifier_text_inside_strings_and_comments_is_ignored() {
        let file = parse(
            r#"
// import x from "commented";
/* export * from "block"; */
declare const s: "import y from 'string'";
declare const t: `export * from "${1}"`;
"#,
        );
        assert!(specifiers(&file).is_empty());
    }

    #[test]
    fn test_import_attributes() {
        let file =
            parse(r#"import data from "./data.json" with { type: "json" }; export * from "x";"#);
        assert_eq!(specifiers(&file), vec![Some("./data.json"), Some("x")]);
    }
}
