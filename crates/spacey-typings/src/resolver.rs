//! Top-level dependency resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument};

use crate::cache::FetchCache;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::package::DependencyManifest;
use crate::registry::RegistryClient;
use crate::session::{PackageOutcome, ResolutionReport, ResolutionSession};
use crate::strategy::run_chain;

/// Resolves dependency manifests into declaration files.
///
/// The resolver owns the fetch cache, so responses are shared by every run
/// made through it. Everything else lives in a [`ResolutionSession`].
pub struct TypingsResolver {
    config: Config,
    cache: Arc<FetchCache>,
    registry: RegistryClient,
}

impl TypingsResolver {
    /// Create a resolver that talks to the network.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create a resolver over a custom transport.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let cache = Arc::new(FetchCache::new(fetcher));
        let registry = RegistryClient::new(cache.clone(), &config);
        Self {
            config,
            cache,
            registry,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Resolve `manifest` in a fresh session.
    ///
    /// `on_dependencies` is called exactly once with every file fetched,
    /// nested packages included, and the same mapping is returned. Packages
    /// that cannot be resolved are left out; they never fail the run.
    pub async fn fetch_and_add_dependencies<F>(
        &self,
        manifest: &DependencyManifest,
        on_dependencies: F,
    ) -> BTreeMap<String, String>
    where
        F: FnOnce(&BTreeMap<String, String>),
    {
        let session = ResolutionSession::new();
        let report = self.resolve_in(&session, manifest).await;

        info!(
            "Resolved {} of {} packages, {} files",
            report.resolved().count(),
            manifest.len(),
            session.fetched.len()
        );

        let files = session.fetched.snapshot();
        on_dependencies(&files);
        files
    }

    /// Resolve `manifest` inside an existing session.
    ///
    /// Entries run concurrently. A package already dispatched in `session`
    /// is reported as skipped; it is marked before any request is made, which
    /// is what stops reference cycles.
    pub async fn resolve_in(
        &self,
        session: &ResolutionSession,
        manifest: &DependencyManifest,
    ) -> ResolutionReport {
        let tasks = manifest.iter().map(|(name, range)| async move {
            if !session.mark_visited(name) {
                return (name.to_string(), PackageOutcome::Skipped);
            }

            let outcome = match self.resolve_package(session, name, range).await {
                Ok((version, strategy)) => PackageOutcome::Resolved { version, strategy },
                Err(e) => {
                    debug!("No typings for {}: {}", name, e);
                    PackageOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            session.record_outcome(name, outcome.clone());
            (name.to_string(), outcome)
        });

        ResolutionReport {
            packages: join_all(tasks).await.into_iter().collect(),
        }
    }

    #[instrument(skip(self, session))]
    async fn resolve_package(
        &self,
        session: &ResolutionSession,
        name: &str,
        range: &str,
    ) -> Result<(String, &'static str)> {
        let version = self.registry.resolve_version(name, range).await?;
        let strategy = run_chain(self, session, name, &version).await?;
        debug!("Typings for {}@{} found via {}", name, version, strategy);
        Ok((version, strategy))
    }
}
