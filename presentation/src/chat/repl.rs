//! REPL (Read-Eval-Print Loop) for interactive chat

use super::session::ChatSession;
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::{ProgressReporter, SimpleProgress};
use colored::Colorize;
use querymind_application::{
    DatabaseControl, ExecutionParams, QueryProgressNotifier, RunQueryInput, RunQueryUseCase,
    SessionRecord, SessionStore,
};
use querymind_domain::{Conversation, SessionId};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// What a line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction<'a> {
    Empty,
    Exit,
    Command { name: &'a str, args: &'a str },
    Query(&'a str),
}

/// Classify one input line. `exit` and `quit` match case-insensitively.
pub fn classify_input(line: &str) -> InputAction<'_> {
    let line = line.trim();
    if line.is_empty() {
        return InputAction::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return InputAction::Exit;
    }
    if line.starts_with('/') {
        let (name, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        return InputAction::Command {
            name,
            args: args.trim(),
        };
    }
    InputAction::Query(line)
}

/// Result of a local command
enum CommandResult {
    Continue,
    Exit,
}

/// Interactive chat REPL over one session
pub struct ChatRepl {
    use_case: RunQueryUseCase,
    database: Arc<dyn DatabaseControl>,
    session: ChatSession,
    execution: ExecutionParams,
    config: ReplConfig,
}

impl ChatRepl {
    pub fn new(
        use_case: RunQueryUseCase,
        database: Arc<dyn DatabaseControl>,
        conversation: Conversation,
        record: SessionRecord,
    ) -> Self {
        Self {
            use_case,
            database,
            session: ChatSession::new(conversation, record),
            execution: ExecutionParams::default(),
            config: ReplConfig::default(),
        }
    }

    /// Persist the transcript after every request
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session = self.session.with_store(store);
        self
    }

    pub fn with_execution_params(mut self, execution: ExecutionParams) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(path) = &self.config.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        print!(
            "{}",
            ConsoleFormatter::banner(
                self.use_case.model_name(),
                self.database.current().as_deref()
            )
        );
        let record = self.session.record();
        if !record.transcript.is_empty() {
            println!(
                "{} {} ({} messages)",
                "Resumed".cyan().bold(),
                record.title,
                record.transcript.len()
            );
        }

        loop {
            match rl.readline("\nquerymind> ") {
                Ok(line) => match classify_input(&line) {
                    InputAction::Empty => continue,
                    InputAction::Exit => {
                        println!("Goodbye!");
                        break;
                    }
                    InputAction::Command { name, args } => {
                        if let CommandResult::Exit = self.handle_command(name, args).await {
                            break;
                        }
                    }
                    InputAction::Query(query) => {
                        let _ = rl.add_history_entry(query);
                        self.process_question(query).await;
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("{}", ConsoleFormatter::error(&err.to_string()));
                    break;
                }
            }
        }

        if let Some(path) = &self.config.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    /// Handle slash commands
    async fn handle_command(&mut self, name: &str, args: &str) -> CommandResult {
        match name {
            "/quit" | "/exit" | "/q" => {
                println!("Goodbye!");
                CommandResult::Exit
            }
            "/help" | "/h" | "/?" => {
                Self::print_help();
                CommandResult::Continue
            }
            "/tables" => {
                match self.database.list_tables().await {
                    Ok(tables) => print!("{}", ConsoleFormatter::table_list(&tables)),
                    Err(e) => eprintln!("{}", ConsoleFormatter::error(&e.message)),
                }
                CommandResult::Continue
            }
            "/open" => {
                if args.is_empty() {
                    eprintln!("{}", ConsoleFormatter::error("Usage: /open <path>"));
                    return CommandResult::Continue;
                }
                match self.database.open(args) {
                    Ok(path) => {
                        println!("Connected to database: {}", path);
                        self.save_session();
                    }
                    Err(reason) => eprintln!("{}", ConsoleFormatter::error(&reason)),
                }
                CommandResult::Continue
            }
            "/clear" => {
                self.session.clear();
                self.save_session();
                println!("Chat cleared.");
                CommandResult::Continue
            }
            "/new" => {
                let id = self.session.start_new().clone();
                self.save_session();
                println!("{} {}", "New session:".cyan().bold(), id);
                CommandResult::Continue
            }
            "/delete" => {
                let Ok(id) = SessionId::parse(args) else {
                    eprintln!("{}", ConsoleFormatter::error("Usage: /delete <session-id>"));
                    return CommandResult::Continue;
                };
                let was_current = self.session.record().id == id;
                match self.session.delete(&id) {
                    Ok(()) => {
                        println!("Deleted session {}", id);
                        if was_current {
                            self.save_session();
                            println!(
                                "{} {}",
                                "New session:".cyan().bold(),
                                self.session.record().id
                            );
                        }
                    }
                    Err(e) => eprintln!("{}", ConsoleFormatter::error(&e.to_string())),
                }
                CommandResult::Continue
            }
            "/session" => {
                let record = self.session.record();
                println!("{} {}", "Session:".cyan().bold(), record.id);
                println!("{} {}", "Title:".cyan().bold(), record.title);
                println!(
                    "{} {}",
                    "Database:".cyan().bold(),
                    self.database.current().unwrap_or_else(|| "(none)".to_string())
                );
                println!(
                    "{} {}",
                    "Messages:".cyan().bold(),
                    self.session.conversation().transcript().len()
                );
                CommandResult::Continue
            }
            _ => {
                println!("Unknown command: {}", name);
                println!("Type /help for available commands");
                CommandResult::Continue
            }
        }
    }

    fn print_help() {
        println!();
        println!("{}", "Commands:".bold());
        println!("  /help, /h, /?    - Show this help");
        println!("  /tables          - List the tables of the connected database");
        println!("  /open <path>     - Switch to another SQLite database");
        println!("  /session         - Show the current session");
        println!("  /clear           - Forget the messages of this session");
        println!("  /new             - Start a new session");
        println!("  /delete <id>     - Delete a saved session");
        println!("  exit, quit       - Leave (Ctrl-D works too)");
        println!();
        println!("{}", "Usage:".bold());
        println!("  Ask a question about your data and press Enter.");
        println!("  Press Ctrl-C while a request runs to cancel it.");
        println!();
    }

    async fn process_question(&mut self, query: &str) {
        let token = CancellationToken::new();
        self.use_case.set_cancellation(token.clone());
        let watcher = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            }
        });

        let input = RunQueryInput::new(query, self.execution.clone());
        let progress: Box<dyn QueryProgressNotifier> = if self.config.show_progress {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(SimpleProgress)
        };
        let result = self
            .use_case
            .execute(self.session.conversation_mut(), input, progress.as_ref())
            .await;
        drop(progress);
        watcher.abort();

        match result {
            Ok(output) => println!("{}", ConsoleFormatter::answer(&output.answer)),
            Err(e) if e.is_usage_limit() => {
                warn!("Provider usage limit: {}", e);
                println!("{}", ConsoleFormatter::usage_limit());
            }
            Err(e) if e.is_cancelled() => println!("{}", "Cancelled.".yellow()),
            Err(e) => eprintln!("{}", ConsoleFormatter::error(&e.to_string())),
        }

        self.save_session();
    }

    fn save_session(&mut self) {
        if let Err(e) = self.session.save(self.database.current()) {
            warn!("Could not save session {}: {}", self.session.record().id, e);
            eprintln!("{}", format!("Warning: session not saved: {}", e).yellow());
        }
    }
}
