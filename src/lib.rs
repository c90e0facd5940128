// Library root
// -----------
// The binary (`main.rs`) parses the configuration and hands it to the
// pipeline; everything else lives here so it can be tested in isolation.
//
// Module responsibilities:
// - `api`: AnkiConnect client (`findCards` + `cardsInfo`).
// - `format`: reduce raw card records to `{front, back}` pairs.
// - `snapshot`: write `vocabulary.json` and the redirect `index.html`.
// - `publish`: git stage/commit/push/pull inside the repository root.
// - `pipeline`: sequence the stages and decide the outcome.
// - `config`: command-line and environment options.
pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod publish;
pub mod report;
pub mod snapshot;
