// Entrypoint for the exporter.
// - Keeps `main` small: build the collaborators from the configuration and
//   run the pipeline once.
// - Exit status is 0 whenever cards were written, even if the push failed.

use clap::Parser;
use ragazzo_vocabulary::api::AnkiConnect;
use ragazzo_vocabulary::config::Config;
use ragazzo_vocabulary::pipeline::{Outcome, Pipeline, Settings};
use ragazzo_vocabulary::publish::{GitCli, Publisher};
use ragazzo_vocabulary::report;
use ragazzo_vocabulary::snapshot::SnapshotWriter;

fn main() -> anyhow::Result<()> {
    let cfg = Config::parse();
    let root = cfg.repo_root()?;

    let pipeline = Pipeline::new(
        AnkiConnect::http(&cfg.endpoint)?,
        SnapshotWriter::new(&root),
        Publisher::new(GitCli, &root, &cfg.output_dir, &cfg.remote, &cfg.branch),
        Settings {
            deck: cfg.deck.clone(),
            output_dir: cfg.output_dir.clone(),
            pull: !cfg.no_pull,
            push: !cfg.no_push,
        },
    );

    let outcome = pipeline.run()?;
    match &outcome {
        Outcome::NoCards => {}
        Outcome::Written { count, published: Some(true), .. } => {
            report::success(&format!("Successfully pushed {} cards!", count));
            println!("Your vocabulary is available at:");
            println!("{}", cfg.pages_url);
        }
        Outcome::Written { published: Some(false), .. } => {
            report::error("Failed to push changes.");
        }
        Outcome::Written { published: None, .. } => {}
    }
    std::process::exit(outcome.exit_code());
}
