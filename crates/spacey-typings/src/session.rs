//! Per-run resolution state.

use std::collections::BTreeMap;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use serde::Serialize;

/// Virtual path → contents of every file fetched in a run.
///
/// Entries are only ever added, and a path is written at most once.
#[derive(Debug, Default)]
pub struct FetchedPaths {
    files: DashMap<String, String>,
}

impl FetchedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Record `contents` at `path` unless something is already there.
    ///
    /// Returns whether the entry was inserted.
    pub fn insert_if_absent(&self, path: String, contents: impl Into<String>) -> bool {
        match self.files.entry(path) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(contents.into());
                true
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.get(path).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Ordered copy of the current contents.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.files
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

/// What happened to one package of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PackageOutcome {
    /// A strategy produced typings
    Resolved { version: String, strategy: &'static str },
    /// Version resolution or every strategy failed
    Failed { reason: String },
    /// Already handled earlier in the session
    Skipped,
}

/// Outcome of every package a `resolve_in` call was asked for.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ResolutionReport {
    pub packages: BTreeMap<String, PackageOutcome>,
}

impl ResolutionReport {
    pub fn resolved(&self) -> impl Iterator<Item = (&str, &PackageOutcome)> {
        self.packages
            .iter()
            .filter(|(_, outcome)| matches!(outcome, PackageOutcome::Resolved { .. }))
            .map(|(name, outcome)| (name.as_str(), outcome))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &PackageOutcome)> {
        self.packages
            .iter()
            .filter(|(_, outcome)| matches!(outcome, PackageOutcome::Failed { .. }))
            .map(|(name, outcome)| (name.as_str(), outcome))
    }
}

/// State shared by every recursive call of one resolution.
///
/// Created per top-level request; keep one alive and pass it to
/// [`TypingsResolver::resolve_in`](crate::TypingsResolver::resolve_in)
/// repeatedly to dedupe packages across requests.
#[derive(Debug, Default)]
pub struct ResolutionSession {
    pub fetched: FetchedPaths,
    visited: DashSet<String>,
    outcomes: DashMap<String, PackageOutcome>,
}

impl ResolutionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `package` as dispatched; false if it already was.
    pub fn mark_visited(&self, package: &str) -> bool {
        self.visited.insert(package.to_string())
    }

    pub fn is_visited(&self, package: &str) -> bool {
        self.visited.contains(package)
    }

    pub(crate) fn record_outcome(&self, package: &str, outcome: PackageOutcome) {
        self.outcomes.insert(package.to_string(), outcome);
    }

    /// Outcome of `package`, if its resolution has finished.
    pub fn outcome(&self, package: &str) -> Option<PackageOutcome> {
        self.outcomes.get(package).map(|entry| entry.value().clone())
    }

    /// Every package resolved in this session, nested ones included.
    pub fn report(&self) -> ResolutionReport {
        ResolutionReport {
            packages: self
                .outcomes
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        }
    }
}
