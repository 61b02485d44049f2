//! Queue-driven walk over a package's declaration files.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use spacey_dts_syntax::{ModuleReference, collect_module_references};
use tracing::{debug, trace};

use crate::error::Result;
use crate::metadata::FileMetadataIndex;
use crate::package::{DependencyManifest, LATEST};
use crate::path;
use crate::resolver::TypingsResolver;
use crate::session::ResolutionSession;

/// The package a walk is fetching files from.
#[derive(Debug, Clone)]
pub struct PackageContext {
    /// Package name, also the directory under `node_modules`
    pub name: String,
    /// Pinned version; `None` lets the CDN pick the latest
    pub version: Option<String>,
    /// Listing used to resolve extensionless references
    pub index: Arc<FileMetadataIndex>,
}

impl PackageContext {
    pub fn new(name: impl Into<String>, version: Option<String>, index: FileMetadataIndex) -> Self {
        Self {
            name: name.into(),
            version,
            index: Arc::new(index),
        }
    }

    /// Key of `file` in the fetched-files map.
    pub fn virtual_path(&self, file: &str) -> String {
        path::join(&["node_modules", self.name.as_str(), file])
    }
}

/// A file the walk recorded, with the specifiers it references.
type Visited = Option<(String, Vec<String>)>;

impl TypingsResolver {
    /// Fetch `entry`, record it, and follow every reference reachable from it.
    ///
    /// Bare specifiers are handed to [`TypingsResolver::resolve_in`] as
    /// `latest`; local ones are resolved against the listing and queued in
    /// the same package. Queued work runs concurrently and is drained before
    /// returning, so a long chain of relative references grows the queue
    /// rather than the stack. Only a failure to fetch `entry` itself is
    /// returned; failures further down are logged and dropped.
    pub(crate) fn walk<'a>(
        &'a self,
        session: &'a ResolutionSession,
        package: &'a PackageContext,
        entry: String,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let mut queue = FuturesUnordered::new();

            if let Some(specifiers) = self.visit(session, package, &entry).await? {
                self.schedule(session, package, &entry, specifiers, &mut queue);
            }

            while let Some(visited) = queue.next().await {
                if let Some((file, specifiers)) = visited {
                    self.schedule(session, package, &file, specifiers, &mut queue);
                }
            }

            Ok(())
        }
        .boxed()
    }

    /// Fetch and record one file; `None` if it was already recorded.
    async fn visit(
        &self,
        session: &ResolutionSession,
        package: &PackageContext,
        file: &str,
    ) -> Result<Option<Vec<String>>> {
        let virtual_path = package.virtual_path(file);
        if session.fetched.contains(&virtual_path) {
            trace!("{} already fetched", virtual_path);
            return Ok(None);
        }

        let contents = self
            .registry()
            .fetch_file(&package.name, package.version.as_deref(), file)
            .await?;

        // Another branch may have recorded it while we were waiting
        if !session.fetched.insert_if_absent(virtual_path, contents.as_ref()) {
            return Ok(None);
        }

        Ok(Some(collect_module_references(file, &contents)))
    }

    /// Queue the work discovered in `file`.
    fn schedule<'a>(
        &'a self,
        session: &'a ResolutionSession,
        package: &'a PackageContext,
        file: &str,
        specifiers: Vec<String>,
        queue: &mut FuturesUnordered<BoxFuture<'a, Visited>>,
    ) {
        let mut packages = DependencyManifest::new();
        let mut locals = Vec::new();
        for specifier in specifiers {
            match ModuleReference::classify(&specifier) {
                ModuleReference::Package(name) => packages.insert(name, LATEST),
                ModuleReference::Local(reference) => locals.push(reference),
            }
        }

        if !packages.is_empty() {
            queue.push(
                async move {
                    self.resolve_in(session, &packages).await;
                    None
                }
                .boxed(),
            );
        }

        let dir = path::dirname(file);
        for reference in locals {
            let candidate = path::join(&[dir.as_str(), reference.as_str()]);
            let next = package.index.resolve_declaration_file(&candidate);
            queue.push(
                async move {
                    let visited = self.visit(session, package, &next).await;
                    match visited {
                        Ok(Some(specifiers)) => Some((next, specifiers)),
                        Ok(None) => None,
                        Err(e) => {
                            debug!("Failed to follow {}: {}", reference, e);
                            None
                        }
                    }
                }
                .boxed(),
            );
        }
    }
}
