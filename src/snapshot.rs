// Snapshot writer: serializes the formatted deck into `vocabulary.json` and
// drops a static `index.html` next to it that redirects to the JSON file.

use crate::format::FormattedCard;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILE: &str = "vocabulary.json";
pub const INDEX_FILE: &str = "index.html";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta http-equiv="refresh" content="0; url=vocabulary.json">
    <title>Ragazzo Vocabulary</title>
</head>
<body>
    <p>Redirecting to vocabulary data...</p>
</body>
</html>
"#;

/// The published document. `count` always equals `vocabulary.len()`
/// because the only constructor derives it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub vocabulary: Vec<FormattedCard>,
    pub updated_at: String,
    pub count: usize,
}

impl Snapshot {
    pub fn new(vocabulary: Vec<FormattedCard>, updated_at: String) -> Self {
        let count = vocabulary.len();
        Snapshot {
            vocabulary,
            updated_at,
            count,
        }
    }

    /// Snapshot stamped with the current local time.
    pub fn now(vocabulary: Vec<FormattedCard>) -> Self {
        let updated_at = chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string();
        Snapshot::new(vocabulary, updated_at)
    }
}

/// Writes snapshots under a fixed root, normally the install directory.
pub struct SnapshotWriter {
    root: PathBuf,
}

impl SnapshotWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SnapshotWriter { root: root.into() }
    }

    /// Directory the files land in: `output_dir` joined onto the root.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        self.root.join(output_dir)
    }

    /// Write `vocabulary.json` and `index.html` into `output_dir` and return
    /// the snapshot path. Other files in the directory are left alone.
    pub fn write(&self, cards: &[FormattedCard], output_dir: &Path) -> Result<PathBuf> {
        let dir = self.output_path(output_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let snapshot = Snapshot::now(cards.to_vec());
        let json = serde_json::to_string_pretty(&snapshot).context("Serializing snapshot")?;
        let path = dir.join(SNAPSHOT_FILE);
        fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        let index = dir.join(INDEX_FILE);
        fs::write(&index, INDEX_HTML)
            .with_context(|| format!("Failed to write {}", index.display()))?;

        Ok(path)
    }
}
