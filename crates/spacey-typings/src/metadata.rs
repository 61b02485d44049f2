//! Package file listings and declaration file lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::path;

/// One file in a package listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Absolute-in-package path, e.g. `/lib/index.d.ts`
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Body of the flat listing endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct FlatListing {
    #[serde(default)]
    pub files: Vec<FileMetadata>,
}

/// Files of one package@version, keyed by absolute-in-package path.
#[derive(Debug, Clone, Default)]
pub struct FileMetadataIndex {
    files: BTreeMap<String, FileMetadata>,
}

impl FileMetadataIndex {
    /// Build an index, keeping only names that start with `prefix` when given.
    pub fn from_files<I>(files: I, prefix: Option<&str>) -> Self
    where
        I: IntoIterator<Item = FileMetadata>,
    {
        let files = files
            .into_iter()
            .filter(|file| prefix.is_none_or(|prefix| file.name.starts_with(prefix)))
            .map(|file| (file.name.clone(), file))
            .collect();
        Self { files }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&FileMetadata> {
        self.files.get(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File names in path order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Names ending in `suffix`, in path order.
    pub fn names_with_suffix<'a>(&'a self, suffix: &'a str) -> impl Iterator<Item = &'a str> {
        self.names().filter(move |name| name.ends_with(suffix))
    }

    /// Pick the file a module specifier most likely refers to.
    ///
    /// Tries `<candidate>.d.ts`, `<candidate>.ts`, `<candidate>` and
    /// `<candidate>/index.d.ts` in that order. When nothing matches the
    /// candidate is returned as is and the fetch gets to decide.
    pub fn resolve_declaration_file(&self, candidate: &str) -> String {
        let lookup = path::absolute(&path::normalize(candidate));

        for suffix in [".d.ts", ".ts", "", "/index.d.ts"] {
            if self.contains(&format!("{}{}", lookup, suffix)) {
                return format!("{}{}", candidate, suffix);
            }
        }

        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> FileMetadataIndex {
        FileMetadataIndex::from_files(
            names.iter().map(|name| FileMetadata {
                name: name.to_string(),
                size: None,
                hash: None,
                time: None,
            }),
            None,
        )
    }

    #[test]
    fn test_declaration_beats_source() {
        let index = index(&["/lib/foo.d.ts", "/lib/foo.ts"]);
        assert_eq!(index.resolve_declaration_file("/lib/foo"), "/lib/foo.d.ts");
    }

    #[test]
    fn test_resolution_order() {
        let index = index(&["/a.ts", "/b.d.ts", "/b/index.d.ts", "/c/index.d.ts", "/d.js"]);
        assert_eq!(index.resolve_declaration_file("/a"), "/a.ts");
        assert_eq!(index.resolve_declaration_file("/b"), "/b.d.ts");
        assert_eq!(index.resolve_declaration_file("/c"), "/c/index.d.ts");
        assert_eq!(index.resolve_declaration_file("/d.js"), "/d.js");
    }

    #[test]
    fn test_relative_candidates_are_looked_up_absolutely() {
        let index = index(&["/lib/util.d.ts"]);
        assert_eq!(index.resolve_declaration_file("lib/util"), "lib/util.d.ts");
        assert_eq!(index.resolve_declaration_file("./lib/util"), "./lib/util.d.ts");
    }

    #[test]
    fn test_unresolved_candidate_is_returned() {
        let index = index(&[]);
        assert_eq!(index.resolve_declaration_file("/missing"), "/missing");
    }

    #[test]
    fn test_prefix_filter() {
        let files = ["/lib/a.d.ts", "/src/b.ts", "/lib/c/d.d.ts"].map(|name| FileMetadata {
            name: name.to_string(),
            size: Some(1),
            hash: None,
            time: None,
        });
        let index = FileMetadataIndex::from_files(files, Some("/lib"));
        assert_eq!(index.names().collect::<Vec<_>>(), ["/lib/a.d.ts", "/lib/c/d.d.ts"]);
        assert_eq!(index.names_with_suffix(".d.ts").count(), 2);
    }

    #[test]
    fn test_listing_deserializes_without_optional_fields() {
        let listing: FlatListing =
            serde_json::from_str(
                r#"{"default":"/index.js","files":[{"name":"/index.d.ts","size":12}]}"#,
            )
                .unwrap();
        assert_eq!(listing.files[0].size, Some(12));
        assert_eq!(listing.files[0].hash, None);
    }
}
