use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use taxguard::config::Config;
use taxguard::observability::init_tracing;
use taxguard::policy::RuleBookLoader;
use taxguard::{Intent, Jurisdiction, TaxVerifier};

/// Exit status when the audit blocks the intent.
const EXIT_BLOCKED: u8 = 2;

fn main() -> anyhow::Result<ExitCode> {
    let config = Config::parse();

    init_tracing(&config.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting taxguard audit");

    let jurisdiction: Jurisdiction = config.jurisdiction.parse()?;

    let loader = RuleBookLoader::new(config.rulebook_path.clone());
    let book = loader.load_rulebook().context("failed to load rule book")?;

    let raw = if config.reads_stdin() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("failed to read intent from stdin")?;
        buf
    } else {
        fs::read_to_string(&config.intent_path)
            .with_context(|| format!("failed to read intent from {}", config.intent_path))?
    };

    let value: serde_json::Value = serde_json::from_str(&raw).context("intent is not valid JSON")?;
    anyhow::ensure!(value.is_object(), "intent must be a JSON object");
    let intent = Intent::from_value(value);

    let verifier = TaxVerifier::with_rulebook(jurisdiction, &book);
    let report = verifier.audit(&intent);

    let output = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    info!(allowed = report.allowed(), blocks = report.blocks().len(), "Audit complete");

    Ok(if report.allowed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_BLOCKED)
    })
}
