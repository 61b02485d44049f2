//! Reference discovery over realistic declaration files.

use spacey_dts_syntax::ast::Statement;
use spacey_dts_syntax::{collect_module_references, parse, ModuleReference};

const REACT_LIKE: &str = r#"// Type definitions for a UI library
// Definitions by: Someone <https://example.com>

/// <reference path="global.d.ts" />

import * as CSS from 'csstype';
import * as PropTypes from 'prop-types';
import { Interaction as SchedulerInteraction } from 'scheduler/tracing';

type NativeAnimationEvent = AnimationEvent;

export = React;
export as namespace React;

declare namespace React {
    type ElementType<P = any> =
        | { [K in keyof JSX.IntrinsicElements]: P extends JSX.IntrinsicElements[K] ? K : never }[keyof JSX.IntrinsicElements]
        | ComponentType<P>;

    interface ReactElement<P = any> {
        type: string;
        props: P;
        key: string | null;
    }

    function createElement(type: "input", props?: InputHTMLAttributes | null): DetailedReactHTMLElement;
}
"#;

const BARREL: &str = r#"/**
 * import { fake } from "inside-doc-comment";
 */
export { default } from './core';
export * from './core/types';
export type { Options } from "./options";
export { merge as mergeDeep, type Merge } from './utils/merge'
import type { Dict } from '@scope/dict'
export declare const VERSION: string;
"#;

#[test]
fn test_react_like_definitions() {
    let refs = collect_module_references("index.d.ts", REACT_LIKE);
    assert_eq!(
        refs,
        vec!["global.d.ts", "csstype", "prop-types", "scheduler/tracing"]
    );

    let locals: Vec<_> = refs
        .iter()
        .map(|r| ModuleReference::classify(r))
        .filter(ModuleReference::is_local)
        .collect();
    assert_eq!(locals, vec![ModuleReference::Local("global.d.ts".into())]);
}

#[test]
fn test_barrel_file() {
    let refs = collect_module_references("index.d.ts", BARREL);
    assert_eq!(
        refs,
        vec![
            "./core",
            "./core/types",
            "./options",
            "./utils/merge",
            "@scope/dict",
        ]
    );
}

#[test]
fn test_tree_keeps_every_top_level_statement() {
    let file = parse("index.d.ts", BARREL);
    assert_eq!(file.file_name, "index.d.ts");
    assert_eq!(file.statements.len(), 6);
    assert!(matches!(file.statements.last(), Some(Statement::Other(_))));
    for window in file.statements.windows(2) {
        assert!(window[0].span().end <= window[1].span().start);
    }
}

#[test]
fn test_unterminated_input_yields_nothing() {
    let refs = collect_module_references("broken.d.ts", "import { a from \"./a\nexport * from `");
    assert_eq!(refs, Vec::<String>::new());
}

#[test]
fn test_statements_before_unterminated_input_are_kept() {
    let refs =
        collect_module_references("broken.d.ts", "import { a } from './a';\nexport * from `");
    assert_eq!(refs, ["./a"]);
}
