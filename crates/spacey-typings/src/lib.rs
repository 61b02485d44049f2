// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-typings
//!
//! Fetches the TypeScript declaration files of a dependency graph from the
//! jsDelivr CDN, without installing anything.
//!
//! Given a manifest of package names and version ranges, each package's
//! version is resolved and its typings located by trying, in order:
//!
//! - the `typings`/`types` entry of its `package.json`
//! - every `.d.ts` (or `.ts`) file it publishes
//! - its `@types/` companion on DefinitelyTyped
//!
//! Declaration files are parsed for `import`, `export ... from` and
//! `/// <reference path>` edges; local edges are followed inside the package
//! and bare ones resolved as further packages. The result is a flat map of
//! virtual paths such as `node_modules/left-pad/index.d.ts` to file contents.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spacey_typings::{Config, DependencyManifest, TypingsResolver};
//!
//! #[tokio::main]
//! async fn main() -> spacey_typings::Result<()> {
//!     let resolver = TypingsResolver::new(Config::load()?)?;
//!     let manifest = DependencyManifest::from_specs(["left-pad@1.3.0"]);
//!
//!     let files = resolver
//!         .fetch_and_add_dependencies(&manifest, |files| {
//!             println!("{} files", files.len());
//!         })
//!         .await;
//!     assert!(files.contains_key("node_modules/left-pad/index.d.ts"));
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metadata;
pub mod output;
pub mod package;
pub mod path;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod strategy;
pub mod walker;

// Re-exports
pub use cache::FetchCache;
pub use config::Config;
pub use error::{FetchError, Result, TypingsError};
pub use fetch::{Fetcher, HttpFetcher};
pub use metadata::{FileMetadata, FileMetadataIndex};
pub use package::{DependencyManifest, PackageManifest};
pub use registry::RegistryClient;
pub use resolver::TypingsResolver;
pub use session::{FetchedPaths, PackageOutcome, ResolutionReport, ResolutionSession};
pub use strategy::TypingsStrategy;
pub use walker::PackageContext;

/// Version of spacey-typings
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
