// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-dts-syntax
//!
//! Finds the modules a TypeScript declaration file depends on.
//!
//! The file is tokenized and parsed into a statement-level syntax tree, so
//! only real `import`/`export ... from` declarations and leading
//! `/// <reference path="..." />` directives are reported. Text that merely
//! looks like an import (inside a comment, a string or a nested
//! `declare module` block) is not.
//!
//! ## Quick Start
//!
//! ```rust
//! use spacey_dts_syntax::{collect_module_references, ModuleReference};
//!
//! let refs = collect_module_references(
//!     "index.d.ts",
//!     "import { A } from './a';\nexport * from 'lib';",
//! );
//! assert_eq!(refs, vec!["./a", "lib"]);
//! assert!(ModuleReference::classify(&refs[0]).is_local());
//! ```

pub mod ast;
pub mod lexer;
mod parser;
pub mod references;

pub use ast::SourceFile;
pub use parser::Parser;
pub use references::{collect_module_references, is_local_specifier, ModuleReference};

/// Parses `text` into a [`SourceFile`] titled `title`.
pub fn parse(title: &str, text: &str) -> SourceFile {
    Parser::new(text).parse_source_file(title)
}
