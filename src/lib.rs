// Library root
// -----------
// A blocking client that exercises a document parsing server's
// `/file_parse` endpoint with a handful of request configurations and
// prints what came back. The binary (`main.rs`) wires these together.
//
// Module responsibilities:
// - `config`: fixed run settings (server, backend, samples, scenarios).
// - `api`: HTTP interactions with the parse server and its JSON model.
// - `error`: per-scenario failure taxonomy.
// - `scenarios`: the individual request configurations.
// - `ui`: the driver plus terminal output helpers.
pub mod api;
pub mod config;
pub mod error;
pub mod scenarios;
pub mod ui;

pub use api::ParseClient;
pub use config::{ExerciserConfig, Scenario};
pub use error::ScenarioError;
