//! Ways of finding a package's typings.

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{Result, TypingsError};
use crate::metadata::FileMetadataIndex;
use crate::package::definitely_typed_name;
use crate::path::{self, PathError};
use crate::resolver::TypingsResolver;
use crate::session::ResolutionSession;
use crate::walker::PackageContext;

/// One way of locating a package's declaration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingsStrategy {
    /// Follow the `typings`/`types` entry of the package's own manifest
    Manifest,
    /// Take every `.d.ts` (or `.ts`) file the package publishes
    InlineMeta,
    /// Fall back to the `@types/` companion package
    DefinitelyTyped,
}

impl TypingsStrategy {
    /// Strategies in the order they are tried.
    pub const CHAIN: [TypingsStrategy; 3] = [
        TypingsStrategy::Manifest,
        TypingsStrategy::InlineMeta,
        TypingsStrategy::DefinitelyTyped,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TypingsStrategy::Manifest => "manifest",
            TypingsStrategy::InlineMeta => "inline-meta",
            TypingsStrategy::DefinitelyTyped => "definitely-typed",
        }
    }

    #[instrument(skip(self, resolver, session), fields(strategy = self.name()))]
    async fn run(
        self,
        resolver: &TypingsResolver,
        session: &ResolutionSession,
        name: &str,
        version: &str,
    ) -> Result<()> {
        match self {
            TypingsStrategy::Manifest => from_manifest(resolver, session, name, version).await,
            TypingsStrategy::InlineMeta => from_meta(resolver, session, name, version).await,
            TypingsStrategy::DefinitelyTyped => {
                from_definitely_typed(resolver, session, name).await
            }
        }
    }
}

/// Try each strategy in turn; the name of the first that succeeds is returned.
pub(crate) async fn run_chain(
    resolver: &TypingsResolver,
    session: &ResolutionSession,
    name: &str,
    version: &str,
) -> Result<&'static str> {
    let mut attempts = Vec::new();

    for strategy in TypingsStrategy::CHAIN {
        match strategy.run(resolver, session, name, version).await {
            Ok(()) => return Ok(strategy.name()),
            Err(e) => {
                debug!("{} strategy failed for {}: {}", strategy.name(), name, e);
                attempts.push((strategy.name(), e));
            }
        }
    }

    Err(TypingsError::StrategiesExhausted {
        package: name.to_string(),
        attempts,
    })
}

async fn from_manifest(
    resolver: &TypingsResolver,
    session: &ResolutionSession,
    name: &str,
    version: &str,
) -> Result<()> {
    let registry = resolver.registry();
    let fetched = registry.package_manifest(name, Some(version)).await?;

    let entry = fetched
        .manifest
        .typings_entry()
        .ok_or_else(|| TypingsError::NoTypingsField(name.to_string()))?;
    let types = entry_path(entry)?;

    let prefix = path::join(&["/", path::dirname(types).as_str()]);
    let index = registry.file_listing(name, version, Some(&prefix)).await?;
    let entry_file = index.resolve_declaration_file(types);

    let package = PackageContext::new(name, Some(version.to_string()), index);
    resolver.walk(session, &package, entry_file).await?;

    // Recorded last so a failed walk leaves nothing behind
    session
        .fetched
        .insert_if_absent(package.virtual_path("package.json"), fetched.raw.as_ref());
    Ok(())
}

fn entry_path(entry: &Value) -> std::result::Result<&str, PathError> {
    entry
        .as_str()
        .ok_or_else(|| PathError::InvalidArgument(entry.to_string()))
}

async fn from_meta(
    resolver: &TypingsResolver,
    session: &ResolutionSession,
    name: &str,
    version: &str,
) -> Result<()> {
    let registry = resolver.registry();
    let index = registry.file_listing(name, version, None).await?;

    let files = inline_typings(&index);
    if files.is_empty() {
        return Err(TypingsError::NoInlineTypings(name.to_string()));
    }

    let package =
        PackageContext::new(name, Some(version.to_string()), FileMetadataIndex::default());
    join_all(files.into_iter().map(|file| {
        let package = &package;
        async move {
            match registry.fetch_file(name, Some(version), &file).await {
                Ok(contents) => {
                    session
                        .fetched
                        .insert_if_absent(package.virtual_path(&file), contents.as_ref());
                }
                Err(e) => debug!("Skipping {}{}: {}", name, file, e),
            }
        }
    }))
    .await;

    Ok(())
}

/// Every `.d.ts` file in the listing, or every `.ts` file when there are none.
fn inline_typings(index: &FileMetadataIndex) -> Vec<String> {
    let declarations: Vec<String> = index.names_with_suffix(".d.ts").map(String::from).collect();
    if !declarations.is_empty() {
        return declarations;
    }
    index.names_with_suffix(".ts").map(String::from).collect()
}

async fn from_definitely_typed(
    resolver: &TypingsResolver,
    session: &ResolutionSession,
    name: &str,
) -> Result<()> {
    let registry = resolver.registry();
    let types_name = definitely_typed_name(name);

    let fetched = registry.package_manifest(&types_name, None).await?;
    let version = fetched.manifest.version.clone().ok_or_else(|| TypingsError::VersionResolution {
        package: types_name.clone(),
        range: "latest".to_string(),
    })?;

    let index = registry.file_listing(&types_name, &version, Some("/")).await?;
    let package = PackageContext::new(types_name, Some(version), index);

    resolver.walk(session, &package, "/index.d.ts".to_string()).await?;

    session
        .fetched
        .insert_if_absent(package.virtual_path("package.json"), fetched.raw.as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FileMetadata;
    use serde_json::json;

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
    fn test_inline_typings_prefer_declarations() {
        let files =
            inline_typings(&index(&["/index.js", "/index.d.ts", "/src/a.ts", "/lib/b.d.ts"]));
        assert_eq!(files, ["/index.d.ts", "/lib/b.d.ts"]);
    }

    #[test]
    fn test_inline_typings_fall_back_to_sources() {
        let files = inline_typings(&index(&["/index.js", "/src/a.ts"]));
        assert_eq!(files, ["/src/a.ts"]);
        assert!(inline_typings(&index(&["/index.js"])).is_empty());
    }

    #[test]
    fn test_entry_path_rejects_non_strings() {
        assert_eq!(entry_path(&json!("index.d.ts")), Ok("index.d.ts"));
        assert!(entry_path(&json!({ "import": "x.d.ts" })).is_err());
    }

    #[test]
    fn test_chain_order() {
        let names: Vec<_> = TypingsStrategy::CHAIN.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["manifest", "inline-meta", "definitely-typed"]);
    }
}
