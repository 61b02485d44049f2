//! Writing fetched files to disk.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::path;

/// Write every virtual path in `files` below `root`, creating directories as
/// needed. Returns the number of files written.
///
/// Paths that would land outside `root` are rejected before anything is
/// written.
pub async fn write_to_dir(root: &Path, files: &BTreeMap<String, String>) -> Result<usize> {
    let targets = files
        .iter()
        .map(|(virtual_path, contents)| Ok((target_path(root, virtual_path)?, contents)))
        .collect::<Result<Vec<_>>>()?;

    for (target, contents) in &targets {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        debug!("Writing {}", target.display());
        tokio::fs::write(target, contents.as_bytes()).await?;
    }

    Ok(targets.len())
}

fn target_path(root: &Path, virtual_path: &str) -> Result<PathBuf> {
    let normalized = path::normalize(virtual_path);
    let relative = normalized.trim_start_matches('/');

    let escapes = relative.split('/').any(|segment| segment == "..");
    if relative.is_empty() || relative == "." || escapes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to write {} outside the output directory", virtual_path),
        )
        .into());
    }

    Ok(relative.split('/').fold(root.to_path_buf(), |path, segment| path.join(segment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path() {
        let root = Path::new("/out");
        assert_eq!(
            target_path(root, "node_modules/a/./lib/../index.d.ts").unwrap(),
            Path::new("/out/node_modules/a/index.d.ts")
        );
        assert_eq!(
            target_path(root, "/node_modules/a/index.d.ts").unwrap(),
            Path::new("/out/node_modules/a/index.d.ts")
        );
        assert!(target_path(root, "../etc/passwd").is_err());
        assert!(target_path(root, "node_modules/../../x").is_err());
        assert!(target_path(root, "").is_err());
    }

    #[tokio::test]
    async fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let files = BTreeMap::from([
            ("node_modules/a/package.json".to_string(), "{}".to_string()),
            ("node_modules/a/lib/index.d.ts".to_string(), "export {};".to_string()),
        ]);

        let written = tokio_test::assert_ok!(write_to_dir(dir.path(), &files).await);

        assert_eq!(written, 2);
        let contents =
            std::fs::read_to_string(dir.path().join("node_modules/a/lib/index.d.ts")).unwrap();
        assert_eq!(contents, "export {};");
    }

    #[tokio::test]
    async fn test_escaping_path_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = BTreeMap::from([
            ("a.d.ts".to_string(), "ok".to_string()),
            ("../b.d.ts".to_string(), "bad".to_string()),
        ]);

        tokio_test::assert_err!(write_to_dir(dir.path(), &files).await);
        assert!(!dir.path().join("a.d.ts").exists());
    }
}
