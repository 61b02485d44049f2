// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! stypes - fetch TypeScript declaration files without installing packages
//!
//! Reads a project `package.json` and/or `name@range` arguments, resolves
//! every dependency's typings from jsDelivr and prints the resulting
//! `virtual path → contents` map as JSON, or writes it under `--out`.

mod cli;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use spacey_typings::{
    Config, DependencyManifest, PackageManifest, PackageOutcome, ResolutionReport,
    ResolutionSession, TypingsResolver, output,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;
    let manifest = load_manifest(cli, &config)?;

    if manifest.is_empty() {
        if !cli.quiet {
            eprintln!("{}", "No dependencies to resolve.".dimmed());
        }
        return Ok(());
    }

    if !cli.quiet {
        eprintln!(
            "{} {} packages",
            "Resolving".dimmed(),
            manifest.len().to_string().cyan()
        );
    }

    let resolver = TypingsResolver::new(config)?;
    let session = ResolutionSession::new();
    let report = resolver.resolve_in(&session, &manifest).await;
    let files = session.fetched.snapshot();
    log_run(&report, files.len());

    match &cli.out {
        Some(root) => {
            let written = output::write_to_dir(root, &files)
                .await
                .with_context(|| format!("failed to write to {}", root.display()))?;
            if !cli.quiet {
                eprintln!(
                    "  {} {} files to {}",
                    "Wrote".dimmed(),
                    written,
                    root.display().cyan()
                );
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&files)?),
    }

    if !cli.quiet {
        print_summary(&session, report.packages.keys());
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load()?;

    if let Some(cdn) = &cli.cdn {
        config.set("cdn-url", cdn);
    }
    if let Some(data) = &cli.data {
        config.set("data-url", data);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if cli.dev {
        config.include_dev = true;
    }
    if cli.peer {
        config.include_peer = true;
    }

    Ok(config)
}

fn load_manifest(cli: &Cli, config: &Config) -> anyhow::Result<DependencyManifest> {
    let mut manifest = DependencyManifest::from_specs(&cli.packages);

    let project = match (&cli.manifest, cli.packages.is_empty()) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from("package.json")),
        (None, false) => None,
    };

    if let Some(path) = project {
        manifest.extend(read_project(&path, config)?);
    }

    Ok(manifest)
}

fn read_project(path: &Path, config: &Config) -> anyhow::Result<DependencyManifest> {
    let package = PackageManifest::read(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    Ok(package.dependency_manifest(config.include_dev, config.include_peer))
}

fn log_run(report: &ResolutionReport, files: usize) {
    info!(
        requested = report.packages.len(),
        resolved = report.resolved().count(),
        failed = report.failed().count(),
        files,
        "Resolution finished"
    );
}

fn print_summary<'a>(session: &ResolutionSession, requested: impl Iterator<Item = &'a String>) {
    let report = session.report();
    let requested: Vec<&String> = requested.collect();

    eprintln!();
    for (name, outcome) in &report.packages {
        let nested = !requested.contains(&name);
        let label = if nested { name.dimmed().to_string() } else { name.to_string() };

        match outcome {
            PackageOutcome::Resolved { version, strategy } => eprintln!(
                "  {} {}@{} {}",
                "+".green(),
                label,
                version,
                format!("({})", strategy).dimmed()
            ),
            PackageOutcome::Failed { reason } => {
                eprintln!("  {} {} {}", "x".red(), label, reason.dimmed())
            }
            PackageOutcome::Skipped => {}
        }
    }

    eprintln!(
        "\n{} {} resolved, {} without typings, {} files",
        "Done:".green().bold(),
        report.resolved().count(),
        report.failed().count(),
        session.fetched.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_summary_is_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut report = ResolutionReport::default();
        report.packages.insert(
            "left-pad".to_string(),
            PackageOutcome::Resolved { version: "1.3.0".to_string(), strategy: "manifest" },
        );
        report.packages.insert(
            "missing".to_string(),
            PackageOutcome::Failed { reason: "no typings".to_string() },
        );

        tracing::subscriber::with_default(subscriber, || log_run(&report, 2));

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Resolution finished"));
        assert!(output.contains("requested=2"));
        assert!(output.contains("resolved=1"));
        assert!(output.contains("failed=1"));
        assert!(output.contains("files=2"));
    }
}
