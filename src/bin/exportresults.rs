//! Exports the results of a feedback session as CSV.
//!
//! The input is a JSON document with the session, questions, responses,
//! roster, visibility table, expected responses and comments, as fetched
//! for one viewer.

use std::{io, path::PathBuf};

use clap::Parser;
use sheaf::{
    config::EngineConfig,
    results::{BundleInput, ResultsBundle},
};

#[derive(Parser)]
pub struct Export {
    /// JSON file holding the bundle input.
    input: PathBuf,
    /// TOML file with the engine settings. Without one, the key is read
    /// from `SECRET_KEY`.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// More output on stderr (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Export::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .compact()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::from_env(),
    }
    .expect("could not load engine config");

    let contents = std::fs::read_to_string(&args.input)
        .unwrap_or_else(|e| panic!("could not read {}: {e}", args.input.display()));
    let input: BundleInput =
        serde_json::from_str(&contents).expect("input is not a valid bundle");

    let bundle = ResultsBundle::build(input, &config)
        .expect("could not build results bundle");

    tracing::info!(
        course = bundle.session().course_id.as_str(),
        session = bundle.session().name.as_str(),
        "exporting results"
    );

    bundle
        .write_csv(io::stdout().lock())
        .expect("could not write csv");
}
