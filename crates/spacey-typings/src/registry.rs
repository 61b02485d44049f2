//! jsDelivr registry client.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cache::FetchCache;
use crate::config::Config;
use crate::error::{Result, TypingsError};
use crate::metadata::{FileMetadataIndex, FlatListing};
use crate::package::PackageManifest;
use crate::path;

/// Body of the version resolution endpoint.
#[derive(Debug, Deserialize)]
struct ResolvedVersion {
    #[serde(default)]
    version: Option<String>,
}

/// A `package.json` as served, alongside its parsed form.
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    pub raw: Arc<str>,
    pub manifest: PackageManifest,
}

/// Registry client.
///
/// Every request goes through the shared [`FetchCache`], so asking twice for
/// the same listing or file costs one request.
#[derive(Clone)]
pub struct RegistryClient {
    cache: Arc<FetchCache>,
    cdn_url: String,
    data_url: String,
}

impl RegistryClient {
    /// Create a new registry client over `cache`.
    pub fn new(cache: Arc<FetchCache>, config: &Config) -> Self {
        Self {
            cache,
            cdn_url: config.cdn_url.trim_end_matches('/').to_string(),
            data_url: config.data_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the CDN URL.
    pub fn cdn_url(&self) -> &str {
        &self.cdn_url
    }

    /// Get the metadata API URL.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Resolve `range` to a concrete version.
    #[instrument(skip(self))]
    pub async fn resolve_version(&self, name: &str, range: &str) -> Result<String> {
        let url = format!("{}/package/resolve/npm/{}@{}", self.data_url, name, range);
        let resolved: ResolvedVersion = self.get_json(&url).await?;

        match resolved.version {
            Some(version) => {
                debug!("Resolved {}@{} to {}", name, range, version);
                Ok(version)
            }
            None => Err(TypingsError::VersionResolution {
                package: name.to_string(),
                range: range.to_string(),
            }),
        }
    }

    /// Flat listing of every file in `name@version`.
    ///
    /// With a `prefix`, only files whose name starts with it are kept.
    #[instrument(skip(self))]
    pub async fn file_listing(
        &self,
        name: &str,
        version: &str,
        prefix: Option<&str>,
    ) -> Result<FileMetadataIndex> {
        let url = format!("{}/package/npm/{}@{}/flat", self.data_url, name, version);
        let listing: FlatListing = self.get_json(&url).await?;
        Ok(FileMetadataIndex::from_files(listing.files, prefix))
    }

    /// Fetch `package.json`; without a version the CDN serves the latest.
    #[instrument(skip(self))]
    pub async fn package_manifest(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<FetchedManifest> {
        let url = self.file_url(name, version, "package.json");
        let raw = self.cache.fetch(&url).await?;
        let manifest = serde_json::from_str(&raw).map_err(|source| TypingsError::Parse {
            url: url.clone(),
            source,
        })?;
        Ok(FetchedManifest { raw, manifest })
    }

    /// Fetch one file of a package.
    pub async fn fetch_file(
        &self,
        name: &str,
        version: Option<&str>,
        file: &str,
    ) -> Result<Arc<str>> {
        let url = self.file_url(name, version, file);
        Ok(self.cache.fetch(&url).await?)
    }

    /// `{cdn}/npm/<name>[@<version>]<absolute path>`
    pub fn file_url(&self, name: &str, version: Option<&str>, file: &str) -> String {
        let file = path::absolute(file);
        match version {
            Some(version) => format!("{}/npm/{}@{}{}", self.cdn_url, name, version, file),
            None => format!("{}/npm/{}{}", self.cdn_url, name, file),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.cache.fetch(url).await?;
        serde_json::from_str(&body).map_err(|source| TypingsError::Parse {
            url: url.to_string(),
            source,
        })
    }
}
