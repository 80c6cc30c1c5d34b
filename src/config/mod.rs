use std::path::PathBuf;

use clap::Parser;

/// Command-line configuration for the audit harness.
#[derive(Debug, Clone, Parser)]
#[command(name = "taxguard")]
#[command(about = "Deterministic verification of tax and payroll claims")]
pub struct Config {
    /// Path to the intent JSON file (`-` reads stdin)
    #[arg(long, default_value = "-", env = "TAXGUARD_INTENT_PATH")]
    pub intent_path: String,

    /// Path to a rule book YAML file (built-in rules if not set)
    #[arg(long, env = "TAXGUARD_RULEBOOK_PATH")]
    pub rulebook_path: Option<PathBuf>,

    /// Jurisdiction to audit under (US, INDIA)
    #[arg(long, default_value = "US", env = "TAXGUARD_JURISDICTION")]
    pub jurisdiction: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    pub log_level: String,

    /// Pretty-print the report
    #[arg(long, default_value = "false", env = "TAXGUARD_PRETTY")]
    pub pretty: bool,
}

impl Config {
    /// Whether the intent is read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.intent_path == "-"
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            intent_path: "-".to_string(),
            rulebook_path: None,
            jurisdiction: "US".to_string(),
            log_level: "warn".to_string(),
            pretty: false,
        }
    }
}
