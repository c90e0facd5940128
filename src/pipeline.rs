// Orchestrator: optional pull, then fetch, format, write and publish, in
// that order. Only an empty fetch stops the run early.

use crate::api::{AnkiConnect, Transport};
use crate::format::format_cards;
use crate::publish::{Publisher, VersionControl};
use crate::report;
use crate::snapshot::SnapshotWriter;
use anyhow::Result;
use std::path::PathBuf;

/// Knobs the pipeline needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct Settings {
    pub deck: String,
    pub output_dir: PathBuf,
    pub pull: bool,
    pub push: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing came back from Anki; no file was written.
    NoCards,
    Written {
        path: PathBuf,
        count: usize,
        /// `None` when publishing was disabled.
        published: Option<bool>,
    },
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::NoCards => 1,
            Outcome::Written { .. } => 0,
        }
    }
}

pub struct Pipeline<T: Transport, V: VersionControl> {
    source: AnkiConnect<T>,
    writer: SnapshotWriter,
    publisher: Publisher<V>,
    settings: Settings,
}

impl<T: Transport, V: VersionControl> Pipeline<T, V> {
    pub fn new(
        source: AnkiConnect<T>,
        writer: SnapshotWriter,
        publisher: Publisher<V>,
        settings: Settings,
    ) -> Self {
        Pipeline {
            source,
            writer,
            publisher,
            settings,
        }
    }

    #[cfg(test)]
    pub fn publisher(&self) -> &Publisher<V> {
        &self.publisher
    }

    pub fn run(&self) -> Result<Outcome> {
        if self.settings.pull {
            report::step("Pulling latest changes...");
            let spinner = report::spinner("git pull");
            let pulled = self.publisher.pull();
            drop(spinner);
            if !pulled {
                report::warn("Failed to pull latest changes. Continuing anyway...");
            }
        }

        report::step("Fetching cards from Anki...");
        let spinner = report::spinner("Contacting AnkiConnect...");
        let cards = self.source.fetch_cards(&self.settings.deck);
        drop(spinner);
        if cards.is_empty() {
            return Ok(Outcome::NoCards);
        }

        report::step("Formatting cards...");
        let formatted = format_cards(&cards);

        report::step("Saving to JSON...");
        let path = self.writer.write(&formatted, &self.settings.output_dir)?;
        report::step(&format!(
            "Saved {} cards to {}",
            formatted.len(),
            path.display()
        ));

        let published = if self.settings.push {
            report::step("Pushing changes...");
            let spinner = report::spinner("git push");
            let ok = self.publisher.publish();
            drop(spinner);
            Some(ok)
        } else {
            None
        };

        Ok(Outcome::Written {
            path,
            count: formatted.len(),
            published,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Request;
    use crate::error::FetchError;
    use crate::publish::testing::{Recorder, CWD_LOCK};
    use crate::snapshot::{Snapshot, SNAPSHOT_FILE};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct Canned(RefCell<Vec<Result<Value, FetchError>>>);

    impl Transport for Canned {
        fn invoke(&self, _request: &Request) -> Result<Value, FetchError> {
            self.0.borrow_mut().remove(0)
        }
    }

    fn two_cards() -> Canned {
        Canned(RefCell::new(vec![
            Ok(json!({"result": [1, 2], "error": null})),
            Ok(json!({"result": [
                {"cardId": 1, "fields": {"Front": {"value": "ciao"}, "Back": {"value": "hello"}}},
                {"cardId": 2, "fields": {"Front": {"value": "sì"}}}
            ], "error": null})),
        ]))
    }

    fn pipeline(
        source: Canned,
        vcs: Recorder,
        root: &std::path::Path,
        pull: bool,
        push: bool,
    ) -> Pipeline<Canned, Recorder> {
        Pipeline::new(
            AnkiConnect::new(source),
            SnapshotWriter::new(root),
            Publisher::new(vcs, root, "docs", "origin", "main"),
            Settings {
                deck: "Italiano".into(),
                output_dir: PathBuf::from("docs"),
                pull,
                push,
            },
        )
    }

    #[test]
    fn full_run_writes_then_publishes() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let repo = TempDir::new().expect("tempdir");
        let p = pipeline(two_cards(), Recorder::default(), repo.path(), true, true);

        let outcome = p.run().expect("run");

        let path = repo.path().join("docs").join(SNAPSHOT_FILE);
        assert_eq!(
            outcome,
            Outcome::Written {
                path: path.clone(),
                count: 1,
                published: Some(true)
            }
        );
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(p.publisher().vcs().ops(), vec!["pull", "stage", "commit", "push"]);
        let snapshot: Snapshot =
            serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("json");
        assert_eq!(snapshot.count, snapshot.vocabulary.len());
        assert_eq!(snapshot.vocabulary[0].front, "ciao");
    }

    #[test]
    fn unreachable_source_aborts_before_writing() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let repo = TempDir::new().expect("tempdir");
        let source = Canned(RefCell::new(vec![Err(FetchError::Unreachable(
            "http://localhost:8765".into(),
        ))]));
        let p = pipeline(source, Recorder::default(), repo.path(), false, true);

        let outcome = p.run().expect("run");

        assert_eq!(outcome, Outcome::NoCards);
        assert_ne!(outcome.exit_code(), 0);
        assert!(!repo.path().join("docs").exists());
        assert!(p.publisher().vcs().calls.borrow().is_empty());
    }

    #[test]
    fn empty_fetch_leaves_previous_snapshot_untouched() {
        let repo = TempDir::new().expect("tempdir");
        let docs = repo.path().join("docs");
        std::fs::create_dir_all(&docs).expect("mkdir");
        let previous = r#"{"vocabulary": [], "updated_at": "2024-01-01T00:00:00", "count": 0}"#;
        std::fs::write(docs.join(SNAPSHOT_FILE), previous).expect("seed snapshot");
        let source = Canned(RefCell::new(vec![Ok(json!({"result": [], "error": null}))]));
        let p = pipeline(source, Recorder::default(), repo.path(), false, true);

        assert_eq!(p.run().expect("run"), Outcome::NoCards);

        let after = std::fs::read(docs.join(SNAPSHOT_FILE)).expect("read");
        assert_eq!(after, previous.as_bytes());
        assert!(!docs.join(crate::snapshot::INDEX_FILE).exists());
    }

    #[test]
    fn failed_pull_does_not_abort() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let repo = TempDir::new().expect("tempdir");
        let p = pipeline(two_cards(), Recorder::failing("pull"), repo.path(), true, true);

        let outcome = p.run().expect("run");

        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(p.publisher().vcs().ops(), vec!["pull", "stage", "commit", "push"]);
    }

    #[test]
    fn failed_push_keeps_success_exit_code() {
        let _lock = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let repo = TempDir::new().expect("tempdir");
        let p = pipeline(two_cards(), Recorder::failing("push"), repo.path(), false, true);

        match p.run().expect("run") {
            outcome @ Outcome::Written { published: Some(false), .. } => {
                assert_eq!(outcome.exit_code(), 0)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn no_push_skips_git_entirely() {
        let repo = TempDir::new().expect("tempdir");
        let p = pipeline(two_cards(), Recorder::default(), repo.path(), false, false);

        let outcome = p.run().expect("run");

        assert!(matches!(outcome, Outcome::Written { published: None, .. }));
        assert!(p.publisher().vcs().calls.borrow().is_empty());
    }
}
