//! CLI interface and argument parsing
//!
//! Command-line interface for the engine using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Mosaic - Chinese-text PII detection and anonymization
#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MOSAIC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect PII entities in text
    Analyze(commands::AnalyzeArgs),

    /// Detect and rewrite PII entities in text
    Anonymize(commands::AnonymizeArgs),

    /// List the entity types the engine can detect
    Entities(commands::EntitiesArgs),

    /// List the available anonymization operators
    Operators,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_analyze() {
        let cli = Cli::parse_from(["mosaic", "analyze", "--text", "some text"]);
        assert!(matches!(cli.command, Commands::Analyze(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["mosaic", "--log-level", "debug", "operators"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_anonymize_with_entities() {
        let cli = Cli::parse_from([
            "mosaic",
            "anonymize",
            "--text",
            "身份证号码是411323198303155953",
            "--entities",
            "ID_CARD,BANK_CARD",
        ]);
        match cli.command {
            Commands::Anonymize(args) => {
                assert_eq!(
                    args.entities,
                    Some(vec!["ID_CARD".to_string(), "BANK_CARD".to_string()])
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_entities() {
        let cli = Cli::parse_from(["mosaic", "entities"]);
        assert!(matches!(cli.command, Commands::Entities(_)));
    }
}
