//! CLI entrypoint for QueryMind
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use querymind_application::{RunQueryUseCase, SessionRecord, SessionStore};
use querymind_domain::{Conversation, SessionId, SystemPrompt};
use querymind_infrastructure::{
    ConfigLoader, DatabaseRegistry, FileConfig, JsonSchemaToolConverter, JsonSessionStore,
    JsonlConversationLogger, OpenAiCompatibleGateway, Severity, SqlToolExecutor,
};
use querymind_presentation::{ChatRepl, Cli, ReplConfig};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);
    check_config(&config)?;

    let session_store = if config.sessions.enabled {
        config.sessions.resolved_directory().map(JsonSessionStore::new)
    } else {
        None
    };

    if cli.list_sessions {
        return list_sessions(session_store.as_ref());
    }
    if let Some(raw) = &cli.delete_session {
        let id = SessionId::parse(raw.as_str())?;
        let store = session_store
            .as_ref()
            .context("Sessions are disabled; nothing to delete")?;
        store.delete(&id)?;
        println!("Deleted session {}", id);
        return Ok(());
    }

    let Some(db_path) = cli.database.clone() else {
        eprintln!("Usage: querymind <DATABASE>");
        std::process::exit(1);
    };
    if !db_path.is_file() {
        bail!("Database file not found: {}", db_path.display());
    }

    info!("Starting QueryMind");

    // === Session ===
    let system_prompt = SystemPrompt::render(&chrono::Local::now().format("%Y-%m-%d").to_string());
    let (record, conversation) = match &cli.resume {
        Some(raw) => {
            let id = SessionId::parse(raw.as_str())?;
            let store = session_store
                .as_ref()
                .context("Sessions are disabled; cannot resume")?;
            let record = store.load(&id)?;
            let conversation = Conversation::restore(system_prompt, &record.transcript);
            (record, conversation)
        }
        None => (
            SessionRecord::new(SessionRecord::generate_id()),
            Conversation::new(system_prompt),
        ),
    };
    info!("Session {}", record.id);

    // === Dependency Injection ===
    let registry = DatabaseRegistry::new();
    let database = registry.handle(record.id.clone());
    if let Err(e) = database.select(&db_path) {
        bail!("{}", e);
    }
    println!("Connected to database: {}", db_path.display());

    let executor = Arc::new(
        SqlToolExecutor::new(database).with_strict_identifiers(config.tools.strict_identifiers),
    );

    let execution = config.agent.to_execution_params();
    let gateway_config = config
        .model
        .gateway_config(execution.model_timeout, |var| std::env::var(var).ok())?;
    let gateway = Arc::new(OpenAiCompatibleGateway::new(gateway_config)?);

    let mut use_case =
        RunQueryUseCase::new(gateway, executor.clone(), Arc::new(JsonSchemaToolConverter));
    if let Some(path) = &config.logging.conversation_log
        && let Some(logger) = JsonlConversationLogger::open(path, record.id.clone())
    {
        info!("Conversation log: {}", logger.path().display());
        use_case = use_case.with_conversation_logger(Arc::new(logger));
    }

    let repl_config = ReplConfig {
        show_progress: config.repl.show_progress && !cli.quiet,
        history_file: config.repl.resolved_history_file(),
    };

    let mut repl = ChatRepl::new(use_case, executor, conversation, record)
        .with_execution_params(execution)
        .with_config(repl_config);
    if let Some(store) = session_store {
        repl = repl.with_session_store(Arc::new(store));
    }

    repl.run().await?;
    Ok(())
}

/// Initialize logging based on verbosity level. `RUST_LOG` wins when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(max) = cli.max_iterations {
        config.agent.max_iterations = max;
    }
    if let Some(model) = &cli.model {
        config.model.name = model.clone();
    }
    if let Some(provider) = &cli.provider {
        config.model.provider = provider.clone();
    }
}

/// Print warnings and fail on configuration errors.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => {
                warn!("{}: {}", issue.field, issue.message);
                eprintln!("{} {}: {}", "Warning:".yellow().bold(), issue.field, issue.message);
            }
            Severity::Error => {
                eprintln!("{} {}: {}", "Config error:".red().bold(), issue.field, issue.message);
            }
        }
    }
    if FileConfig::has_errors(&issues) {
        bail!("Invalid configuration");
    }
    Ok(())
}

fn list_sessions(store: Option<&JsonSessionStore>) -> Result<()> {
    let Some(store) = store else {
        println!("Sessions are disabled.");
        return Ok(());
    };
    let sessions = store.list()?;
    if sessions.is_empty() {
        println!("No saved sessions in {}", store.dir().display());
        return Ok(());
    }
    for session in sessions {
        println!(
            "{}  {}  {} messages  {}",
            session.id.to_string().bold(),
            session.title,
            session.messages,
            session.preview.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}
