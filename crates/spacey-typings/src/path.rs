// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! POSIX `path` functions over virtual paths.
//!
//! Virtual paths are plain strings with `/` separators regardless of the host
//! platform, so none of this goes through `std::path`. Every virtual-path key
//! in the fetched-files map is built with these functions; equality checks
//! downstream depend on them normalizing the same way every time.

use serde_json::Value;
use thiserror::Error;

/// Error raised for non-string path segments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Arguments to path.join must be strings, got {0}")]
    InvalidArgument(String),
}

/// path.isAbsolute(path)
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// path.normalize(path)
///
/// Resolves `.` and `..` segments and collapses repeated separators. A
/// trailing slash survives; `..` above the root of an absolute path is
/// dropped, while a relative path keeps leading `..` segments.
pub fn normalize(path: &str) -> String {
    let is_absolute = is_absolute(path);
    let trailing_slash = path.ends_with('/');

    let mut components: Vec<&str> = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                if !components.is_empty() && components.last() != Some(&"..") {
                    components.pop();
                } else if !is_absolute {
                    components.push("..");
                }
            }
            c => components.push(c),
        }
    }

    let mut result = components.join("/");
    if result.is_empty() && !is_absolute {
        result.push('.');
    }
    if !result.is_empty() && trailing_slash {
        result.push('/');
    }

    if is_absolute {
        format!("/{}", result)
    } else {
        result
    }
}

/// path.join(...paths)
///
/// Empty segments are skipped; the concatenation is normalized.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::new();
    for segment in segments.iter().map(AsRef::as_ref) {
        if segment.is_empty() {
            continue;
        }
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(segment);
    }
    normalize(&path)
}

/// path.join over dynamically typed segments, such as fields read out of a
/// package manifest.
pub fn join_values(segments: &[&Value]) -> Result<String, PathError> {
    let strings = segments
        .iter()
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| PathError::InvalidArgument(value.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(join(&strings))
}

/// path.dirname(path)
pub fn dirname(path: &str) -> String {
    let (root, rest) = match path.strip_prefix('/') {
        Some(rest) => ("/", rest),
        None => ("", path),
    };
    let rest = rest.trim_end_matches('/');

    let dir = match rest.rfind('/') {
        Some(index) => &rest[..=index],
        None => "",
    };

    if root.is_empty() && dir.is_empty() {
        // No dirname whatsoever
        return ".".to_string();
    }

    // Strip the separator that ended the directory part
    let dir = dir.strip_suffix('/').unwrap_or(dir);
    format!("{}{}", root, dir)
}

/// path.basename(path, ext?)
pub fn basename(path: &str, ext: Option<&str>) -> String {
    if path.is_empty() {
        return String::new();
    }

    let path = normalize(path);
    let sections: Vec<&str> = path.split('/').collect();
    let last = sections[sections.len() - 1];

    // "foo/" names the directory "foo"
    if last.is_empty() && sections.len() > 1 {
        return sections[sections.len() - 2].to_string();
    }

    match ext {
        Some(ext) if !ext.is_empty() => last.strip_suffix(ext).unwrap_or(last).to_string(),
        _ => last.to_string(),
    }
}

/// Coerces a bare or `./`-prefixed path to a root-relative one.
pub fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else if let Some(rest) = path.strip_prefix("./") {
        format!("/{}", rest)
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/foo/bar//baz/asdf/quux/.."), "/foo/bar/baz/asdf");
        assert_eq!(normalize("foo/bar/../baz"), "foo/baz");
        assert_eq!(normalize("./foo/"), "foo/");
        assert_eq!(normalize("../../a"), "../../a");
        assert_eq!(normalize("/../a"), "/a");
        assert_eq!(normalize(""), ".");
        assert_eq!(normalize("./"), "./");
        assert_eq!(normalize("/"), "/");
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["a", "./b", "../c"]), "a/c");
        assert_eq!(join(&["foo", "bar", "baz"]), "foo/bar/baz");
        assert_eq!(join(&["/foo", "bar", "baz"]), "/foo/bar/baz");
        assert_eq!(
            join(&["node_modules", "@types/node", "/index.d.ts"]),
            "node_modules/@types/node/index.d.ts"
        );
        assert_eq!(join(&["", "a", ""]), "a");
        assert_eq!(join::<&str>(&[]), ".");
    }

    #[test]
    fn test_join_normalize_is_idempotent() {
        for (a, b) in [("a", "../b"), ("/x/y", "./z/"), ("..", ".."), ("", "")] {
            let joined = join(&[a, b]);
            assert_eq!(normalize(&joined), joined);
        }
    }

    #[test]
    fn test_join_values() {
        assert_eq!(join_values(&[&json!("/"), &json!("lib")]).unwrap(), "/lib");
        assert_eq!(
            join_values(&[&json!("/"), &json!(["lib"])]),
            Err(PathError::InvalidArgument("[\"lib\"]".into()))
        );
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/a/b/c.d.ts"), "/a/b");
        assert_eq!(dirname("/foo/bar"), "/foo");
        assert_eq!(dirname("/foo"), "/");
        assert_eq!(dirname("foo"), ".");
        assert_eq!(dirname("foo/"), ".");
        assert_eq!(dirname("lib/index.d.ts"), "lib");
        assert_eq!(dirname(""), ".");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("/a/b.d.ts", Some(".d.ts")), "b");
        assert_eq!(basename("/foo/bar/baz.txt", None), "baz.txt");
        assert_eq!(basename("/foo/bar/baz.txt", Some(".md")), "baz.txt");
        assert_eq!(basename("/foo/bar/", None), "bar");
        assert_eq!(basename("", None), "");
    }

    #[test]
    fn test_absolute() {
        assert_eq!(absolute("/index.d.ts"), "/index.d.ts");
        assert_eq!(absolute("./lib/index.d.ts"), "/lib/index.d.ts");
        assert_eq!(absolute("lib/index"), "/lib/index");
    }
}
