//! Syntax tree for declaration files.
//!
//! The tree is statement-level: import and export declarations are fully
//! described, every other top-level statement is kept only as a span.

use crate::lexer::Span;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    /// Title the file was parsed under (usually its virtual path)
    pub file_name: String,
    /// `/// <reference path="..." />` directives from the file's leading comments
    pub referenced_files: Vec<FileReference>,
    /// Top-level statements in document order
    pub statements: Vec<Statement>,
}

/// A triple-slash `path` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub file_name: String,
    pub span: Span,
}

/// A string literal together with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Literal value with escapes processed
    pub text: String,
    pub span: Span,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `import ... from "x"` or `import "x"`
    Import(ImportDeclaration),
    /// `import x = require("x")` or `import x = A.B`
    ImportEquals(ImportEqualsDeclaration),
    /// `export ... from "x"` or `export { a, b }`
    Export(ExportDeclaration),
    /// `export = x`
    ExportAssignment(Span),
    /// Any other statement
    Other(Span),
}

impl Statement {
    /// Source range covered by the statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::Import(decl) => decl.span,
            Statement::ImportEquals(decl) => decl.span,
            Statement::Export(decl) => decl.span,
            Statement::ExportAssignment(span) | Statement::Other(span) => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub module_specifier: StringLiteral,
    /// `import type ...`
    pub type_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEqualsDeclaration {
    /// Argument of `require(...)`, if the right-hand side is one
    pub external_module: Option<StringLiteral>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDeclaration {
    /// Present for `export ... from "x"`
    pub module_specifier: Option<StringLiteral>,
    /// `export type ...`
    pub type_only: bool,
    pub span: Span,
}
