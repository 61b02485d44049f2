//! Module reference collection and classification.

use crate::ast::{SourceFile, Statement};

/// Suffix of a TypeScript declaration file.
pub const DECLARATION_SUFFIX: &str = ".d.ts";

/// A module specifier classified by where it points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleReference {
    /// A file inside the referencing package (`./x`, `../y`, `z.d.ts`)
    Local(String),
    /// A bare package name, possibly scoped or with a subpath
    Package(String),
}

impl ModuleReference {
    /// Classifies a raw specifier. No resolution is attempted.
    pub fn classify(specifier: &str) -> Self {
        if is_local_specifier(specifier) {
            ModuleReference::Local(specifier.to_string())
        } else {
            ModuleReference::Package(specifier.to_string())
        }
    }

    /// The raw specifier text.
    pub fn specifier(&self) -> &str {
        match self {
            ModuleReference::Local(s) | ModuleReference::Package(s) => s,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, ModuleReference::Local(_))
    }
}

/// Returns true for specifiers that point inside the referencing package.
pub fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with('.') || specifier.ends_with(DECLARATION_SUFFIX)
}

impl SourceFile {
    /// Every module specifier the file references, in order: triple-slash
    /// reference paths first, then import and export-from specifiers in
    /// document order. Duplicates are kept.
    pub fn module_references(&self) -> Vec<String> {
        let directives = self.referenced_files.iter().map(|r| r.file_name.clone());

        let declarations = self.statements.iter().filter_map(|statement| match statement {
            Statement::Import(decl) => Some(decl.module_specifier.text.clone()),
            Statement::Export(decl) => decl.module_specifier.as_ref().map(|m| m.text.clone()),
            _ => None,
        });

        directives.chain(declarations).collect()
    }
}

/// Parses `text` and returns the module specifiers it references.
///
/// `title` is the name the file is parsed under; it only shows up in the
/// resulting syntax tree.
pub fn collect_module_references(title: &str, text: &str) -> Vec<String> {
    crate::parse(title, text).module_references()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert!(ModuleReference::classify("./utils").is_local());
        assert!(ModuleReference::classify("../types/index").is_local());
        assert!(ModuleReference::classify("globals.d.ts").is_local());
        assert_eq!(
            ModuleReference::classify("react"),
            ModuleReference::Package("react".into())
        );
        assert_eq!(
            ModuleReference::classify("@scope/pkg/sub"),
            ModuleReference::Package("@scope/pkg/sub".into())
        );
    }

    #[test]
    fn test_collect_orders_directives_first() {
        let source = r#"/// <reference path="./globals.d.ts" />
import { a } from "./a";
export * from "lodash";
import { a as again } from "./a";
"#;
        assert_eq!(
            collect_module_references("index.d.ts", source),
            vec!["./globals.d.ts", "./a", "lodash", "./a"]
        );
    }

    #[test]
    fn test_empty_file() {
        assert!(collect_module_references("empty.d.ts", "").is_empty());
    }
}
