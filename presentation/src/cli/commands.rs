//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for querymind
#[derive(Parser, Debug)]
#[command(name = "querymind")]
#[command(author, version, about = "Ask questions about a SQLite database in plain language")]
#[command(long_about = r#"
QueryMind answers natural-language questions about a SQLite database.

The model explores the database with four tools (list_tables, sample_table,
describe_table, execute_sql) and replies in Markdown once it has enough
information.

Configuration files are loaded from (in priority order):
1. QUERYMIND_* environment variables
2. --config <path>          Explicit config file
3. ./querymind.toml         Project-level config
4. ~/.config/querymind/config.toml   Global config

Example:
  querymind shop.db
  querymind --provider ollama --model qwen2.5:14b shop.db
  querymind --resume 20240307-090500-001 shop.db
"#)]
pub struct Cli {
    /// SQLite database file to connect to
    #[arg(value_name = "DATABASE")]
    pub database: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Maximum model invocations per request
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Model name sent to the provider
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Model provider (groq, ollama or openai)
    #[arg(long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Continue a saved session
    #[arg(long, value_name = "SESSION_ID")]
    pub resume: Option<String>,

    /// List saved sessions and exit
    #[arg(long)]
    pub list_sessions: bool,

    /// Delete a saved session and exit
    #[arg(long, value_name = "SESSION_ID", conflicts_with = "resume")]
    pub delete_session: Option<String>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_database_and_flags() {
        let cli = Cli::parse_from([
            "querymind",
            "-vv",
            "--max-iterations",
            "5",
            "--provider",
            "ollama",
            "shop.db",
        ]);
        assert_eq!(cli.database, Some(PathBuf::from("shop.db")));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.max_iterations, Some(5));
        assert_eq!(cli.provider.as_deref(), Some("ollama"));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_database_is_optional_for_parsing() {
        let cli = Cli::parse_from(["querymind", "--list-sessions"]);
        assert!(cli.database.is_none());
        assert!(cli.list_sessions);
    }

    #[test]
    fn test_delete_session_flag() {
        let cli = Cli::parse_from(["querymind", "--delete-session", "20240307-090500-001"]);
        assert_eq!(cli.delete_session.as_deref(), Some("20240307-090500-001"));
        assert!(cli.database.is_none());

        let clash = Cli::try_parse_from(["querymind", "--delete-session", "a", "--resume", "a"]);
        assert!(clash.is_err());
    }
}
