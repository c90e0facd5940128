// Command-line and environment configuration. Every option has a default
// so that a bare `ragazzo-vocabulary` run exports the Italian deck to
// `docs/` next to the installed binary and pushes it.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::api::DEFAULT_ENDPOINT;

pub const DEFAULT_PAGES_URL: &str =
    "https://moritzmoeller.github.io/ragazzo-vocabulary/vocabulary.json";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ragazzo-vocabulary",
    version,
    about = "Export Anki flashcards to a JSON snapshot and publish it with git"
)]
pub struct Config {
    /// Anki deck to export
    #[arg(long, default_value = "Italiano", value_parser = non_empty)]
    pub deck: String,

    /// Output directory, relative to the repository root
    #[arg(long, default_value = "docs")]
    pub output_dir: PathBuf,

    /// Repository root (defaults to the directory holding this executable)
    #[arg(long, env = "RAGAZZO_REPO")]
    pub repo: Option<PathBuf>,

    /// AnkiConnect endpoint
    #[arg(long, env = "ANKI_CONNECT_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Git remote to pull from and push to
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Branch on the remote that hosts the published files
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Skip pulling the latest remote state before fetching
    #[arg(long)]
    pub no_pull: bool,

    /// Write the snapshot but do not commit or push it
    #[arg(long)]
    pub no_push: bool,

    /// Public URL printed after a successful push
    #[arg(long, default_value = DEFAULT_PAGES_URL)]
    pub pages_url: String,
}

fn non_empty(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("deck name must not be empty".into())
    } else {
        Ok(s.to_string())
    }
}

impl Config {
    /// The explicit `--repo`, otherwise the directory of the running
    /// executable. Never the caller's working directory.
    pub fn repo_root(&self) -> Result<PathBuf> {
        if let Some(repo) = &self.repo {
            return std::path::absolute(repo)
                .with_context(|| format!("Resolving repository path {}", repo.display()));
        }
        let exe = std::env::current_exe().context("Locating the running executable")?;
        exe.parent()
            .map(|p| p.to_path_buf())
            .context("Executable has no parent directory")
    }
}
