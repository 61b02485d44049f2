//! Package manifests and dependency sets.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Result, TypingsError};

/// Version range used for packages discovered while walking declarations.
pub const LATEST: &str = "latest";

/// Deserialize a dependency map, dropping entries whose range is not a string.
fn deserialize_dependencies<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_object()
        .map(|deps| {
            deps.iter()
                .filter_map(|(name, range)| range.as_str().map(|r| (name.clone(), r.to_string())))
                .collect()
        })
        .unwrap_or_default())
}

/// Package name → version range, the input of a resolution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyManifest(BTreeMap<String, String>);

impl DependencyManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency, replacing any previous range for `name`.
    pub fn insert(&mut self, name: impl Into<String>, range: impl Into<String>) {
        self.0.insert(name.into(), range.into());
    }

    /// Build a manifest from `name@range` specs (`name` alone means latest).
    pub fn from_specs<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        specs
            .into_iter()
            .map(|spec| {
                let (name, range) = parse_spec(spec.as_ref());
                (name.to_string(), range.to_string())
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, range)| (name.as_str(), range.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `other` into `self`; ranges already present are kept.
    pub fn extend(&mut self, other: DependencyManifest) {
        for (name, range) in other.0 {
            self.0.entry(name).or_insert(range);
        }
    }
}

impl FromIterator<(String, String)> for DependencyManifest {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Split `name@range`, taking care of the leading `@` of scoped names.
pub fn parse_spec(spec: &str) -> (&str, &str) {
    let spec = spec.trim();
    match spec.rfind('@') {
        Some(index) if index > 0 => {
            let (name, range) = (&spec[..index], &spec[index + 1..]);
            if range.is_empty() { (name, LATEST) } else { (name, range) }
        }
        _ => (spec, LATEST),
    }
}

/// Name of the DefinitelyTyped companion of `name`.
///
/// `@scope/pkg` becomes `@types/scope__pkg`.
pub fn definitely_typed_name(name: &str) -> String {
    let flat = name.strip_prefix('@').unwrap_or(name).replace('/', "__");
    format!("@types/{}", flat)
}

/// A `package.json`, either a project's or one fetched from the CDN.
///
/// Only the fields resolution looks at are typed; everything else is kept in
/// `other` so the manifest can be written back out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Legacy TypeScript types entry point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typings: Option<Value>,

    /// TypeScript types entry point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Value>,

    /// Production dependencies
    #[serde(default, deserialize_with = "deserialize_dependencies")]
    pub dependencies: BTreeMap<String, String>,

    /// Development dependencies
    #[serde(default, deserialize_with = "deserialize_dependencies")]
    pub dev_dependencies: BTreeMap<String, String>,

    /// Peer dependencies
    #[serde(default, deserialize_with = "deserialize_dependencies")]
    pub peer_dependencies: BTreeMap<String, String>,

    /// Remaining fields
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

impl PackageManifest {
    /// Read package.json from a file path.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| TypingsError::Parse {
            url: path.display().to_string(),
            source,
        })
    }

    /// The declared types entry: `typings` if set, else `types`.
    ///
    /// Empty strings, `false` and `null` count as unset.
    pub fn typings_entry(&self) -> Option<&Value> {
        [self.typings.as_ref(), self.types.as_ref()]
            .into_iter()
            .flatten()
            .find(|value| is_truthy(value))
    }

    /// Dependencies to resolve types for.
    ///
    /// `dependencies` always; dev and peer entries only when asked for, and
    /// never overriding a range already taken from an earlier map.
    pub fn dependency_manifest(&self, include_dev: bool, include_peer: bool) -> DependencyManifest {
        let mut manifest: DependencyManifest = self.dependencies.clone().into_iter().collect();
        if include_dev {
            manifest.extend(self.dev_dependencies.clone().into_iter().collect());
        }
        if include_peer {
            manifest.extend(self.peer_dependencies.clone().into_iter().collect());
        }
        manifest
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
