//! In-memory registry used by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use spacey_typings::{Config, FetchError, Fetcher, TypingsResolver};

pub const CDN: &str = "https://cdn.jsdelivr.net";
pub const DATA: &str = "https://data.jsdelivr.com/v1";

/// Serves canned bodies by URL and counts every request.
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct MockRegistry {
    responses: HashMap<String, String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    /// `name@range` resolves to `version`.
    pub fn version(self, name: &str, range: &str, version: &str) -> Self {
        self.respond(
            format!("{}/package/resolve/npm/{}@{}", DATA, name, range),
            json!({ "version": version }).to_string(),
        )
    }

    /// Flat listing of `name@version`.
    pub fn listing(self, name: &str, version: &str, files: &[&str]) -> Self {
        let files: Vec<_> = files
            .iter()
            .map(|file| json!({ "name": file, "hash": "abc", "size": 1 }))
            .collect();
        self.respond(
            format!("{}/package/npm/{}@{}/flat", DATA, name, version),
            json!({ "default": "/index.js", "files": files }).to_string(),
        )
    }

    /// CDN file of `name@version`; `path` starts with `/`.
    pub fn file(self, name: &str, version: &str, path: &str, body: &str) -> Self {
        self.respond(format!("{}/npm/{}@{}{}", CDN, name, version, path), body)
    }

    /// Package published with a `types` entry and the given declaration files.
    pub fn typed_package(self, name: &str, version: &str, files: &[(&str, &str)]) -> Self {
        let mut names: Vec<&str> = files.iter().map(|(path, _)| *path).collect();
        names.push("/index.js");
        names.push("/package.json");

        let mut registry = self
            .file(
                name,
                version,
                "/package.json",
                &json!({ "name": name, "version": version, "types": "index.d.ts" }).to_string(),
            )
            .listing(name, version, &names);
        for (path, body) in files {
            registry = registry.file(name, version, path, body);
        }
        registry
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for MockRegistry {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        // Let sibling branches interleave like real requests would
        tokio::task::yield_now().await;

        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
                status_text: "Not Found".to_string(),
            })
    }
}

/// Resolver over `registry` with default endpoints.
pub fn resolver(registry: MockRegistry) -> (Arc<MockRegistry>, TypingsResolver) {
    let registry = Arc::new(registry);
    let resolver = TypingsResolver::with_fetcher(Config::default(), registry.clone());
    (registry, resolver)
}
