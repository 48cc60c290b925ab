//! Run Query use case.
//!
//! Answers one user request against the connected database. The model is
//! invoked with the full history and the four database tools; every tool call
//! it requests is dispatched and answered in order, and the loop repeats until
//! the model replies without tool calls or the round ceiling is reached.
//!
//! The [`Conversation`] is owned by the caller and mutated in place, so
//! history (including a turn that hit the ceiling) carries into the next
//! request.

use crate::config::ExecutionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::QueryProgressNotifier;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::ports::tool_schema::ToolSchemaPort;
use crate::use_cases::dispatch_tool::ToolDispatcher;
use querymind_domain::core::string::truncate;
use querymind_domain::{Conversation, Message};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a user turn.
#[derive(Error, Debug)]
pub enum RunQueryError {
    #[error("Query cannot be empty")]
    EmptyQuery,

    #[error(
        "Maximum number of iterations ({limit}) reached. Please try again with a different query."
    )]
    IterationLimitExceeded { limit: usize },

    #[error("Model error: {0}")]
    Provider(#[from] GatewayError),

    #[error("Model did not respond within {}s", .0.as_secs())]
    ModelTimeout(Duration),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunQueryError {
    /// True when the provider refused because of a rate limit or quota.
    pub fn is_usage_limit(&self) -> bool {
        matches!(self, RunQueryError::Provider(e) if e.is_usage_limit())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunQueryError::Cancelled)
    }
}

/// Input for the [`RunQueryUseCase`].
#[derive(Debug, Clone)]
pub struct RunQueryInput {
    /// The user's natural-language request.
    pub query: String,
    pub execution: ExecutionParams,
}

impl RunQueryInput {
    pub fn new(query: impl Into<String>, execution: ExecutionParams) -> Self {
        Self {
            query: query.into(),
            execution,
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct RunQueryOutput {
    /// Text of the final assistant message (may be empty)
    pub answer: String,
    /// Model invocations used
    pub rounds: usize,
    /// Tool calls dispatched across all rounds
    pub tool_calls: usize,
}

/// Use case for answering one request with the tool loop.
pub struct RunQueryUseCase {
    gateway: Arc<dyn LlmGateway>,
    tool_executor: Arc<dyn ToolExecutorPort>,
    tool_schema: Arc<dyn ToolSchemaPort>,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl Clone for RunQueryUseCase {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            tool_executor: self.tool_executor.clone(),
            tool_schema: self.tool_schema.clone(),
            conversation_logger: self.conversation_logger.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl RunQueryUseCase {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        tool_executor: Arc<dyn ToolExecutorPort>,
        tool_schema: Arc<dyn ToolSchemaPort>,
    ) -> Self {
        Self {
            gateway,
            tool_executor,
            tool_schema,
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Create with a cancellation token checked before and during each model call.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Replace the cancellation token (a fresh one per turn).
    pub fn set_cancellation(&mut self, token: CancellationToken) {
        self.cancellation_token = Some(token);
    }

    pub fn model_name(&self) -> &str {
        self.gateway.model_name()
    }

    fn check_cancelled(&self) -> Result<(), RunQueryError> {
        match &self.cancellation_token {
            Some(token) if token.is_cancelled() => Err(RunQueryError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Run one user turn.
    ///
    /// Invokes the model at most `execution.max_iterations` times. Tool calls
    /// within a round are dispatched sequentially in the order requested, and
    /// each result is appended before the next model call. Cancellation is
    /// only observed around model calls, so a tool batch is always answered
    /// in full.
    pub async fn execute(
        &self,
        conversation: &mut Conversation,
        input: RunQueryInput,
        progress: &dyn QueryProgressNotifier,
    ) -> Result<RunQueryOutput, RunQueryError> {
        let query = input.query.trim();
        if query.is_empty() {
            return Err(RunQueryError::EmptyQuery);
        }
        self.check_cancelled()?;

        info!("Starting query: {}", truncate(query, 100));
        conversation.push(Message::user(query));
        self.conversation_logger.log(ConversationEvent::new(
            "user_message",
            serde_json::json!({ "text": query }),
        ));

        let tools = self
            .tool_schema
            .all_tools_schema(self.tool_executor.tool_spec());
        let dispatcher = ToolDispatcher::new(
            self.tool_executor.clone(),
            input.execution.tool_timeout,
        )
        .with_conversation_logger(self.conversation_logger.clone());

        let max_rounds = input.execution.max_iterations;
        let mut tool_calls_total = 0;

        for round in 1..=max_rounds {
            self.check_cancelled()?;

            debug!(
                "Round {}/{}: invoking {} with {} messages",
                round,
                max_rounds,
                self.gateway.model_name(),
                conversation.len()
            );
            progress.on_model_start(round, max_rounds);
            let response = self
                .invoke_model(conversation.messages(), &tools, input.execution.model_timeout)
                .await;
            progress.on_model_end();
            let response = response?;

            if !matches!(response, Message::Assistant { .. }) {
                return Err(RunQueryError::Provider(GatewayError::InvalidResponse(
                    format!("expected an assistant message, got {}", response.role().as_str()),
                )));
            }

            let calls = response.tool_calls().to_vec();
            self.conversation_logger.log(ConversationEvent::new(
                "assistant_message",
                serde_json::json!({
                    "round": round,
                    "text": response.text(),
                    "tool_calls": calls.iter().map(|c| &c.tool_name).collect::<Vec<_>>(),
                }),
            ));
            conversation.push(response);

            if calls.is_empty() {
                let answer = conversation
                    .last()
                    .map(|m| m.text().to_string())
                    .unwrap_or_default();
                info!(
                    "Query completed in {} rounds ({} tool calls)",
                    round, tool_calls_total
                );
                self.conversation_logger.log(ConversationEvent::new(
                    "final_answer",
                    serde_json::json!({
                        "rounds": round,
                        "tool_calls": tool_calls_total,
                        "bytes": answer.len(),
                        "text": answer,
                    }),
                ));
                return Ok(RunQueryOutput {
                    answer,
                    rounds: round,
                    tool_calls: tool_calls_total,
                });
            }

            for call in &calls {
                progress.on_tool_start(call);
                let result = dispatcher.dispatch(call).await;
                progress.on_tool_result(call, result.text(), result.is_error());
                conversation.push(result);
            }
            tool_calls_total += calls.len();
        }

        warn!("Query exceeded max_iterations ({})", max_rounds);
        self.conversation_logger.log(ConversationEvent::new(
            "iteration_limit",
            serde_json::json!({ "limit": max_rounds, "tool_calls": tool_calls_total }),
        ));
        Err(RunQueryError::IterationLimitExceeded { limit: max_rounds })
    }

    async fn invoke_model(
        &self,
        messages: &[Message],
        tools: &[serde_json::Value],
        timeout: Duration,
    ) -> Result<Message, RunQueryError> {
        let call = tokio::time::timeout(timeout, self.gateway.invoke(messages, tools));
        let outcome = match &self.cancellation_token {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(RunQueryError::Cancelled),
                outcome = call => outcome,
            },
            None => call.await,
        };

        match outcome {
            Ok(result) => result.map_err(RunQueryError::Provider),
            Err(_) => Err(RunQueryError::ModelTimeout(timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoQueryProgress;
    use async_trait::async_trait;
    use querymind_domain::tool::catalog::database_tool_spec;
    use querymind_domain::tool::entities::{ToolCall, ToolDefinition, ToolSpec};
    use querymind_domain::{Role, ToolResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ==================== Test Mocks ====================

    struct MockGateway {
        responses: Mutex<VecDeque<Result<Message, GatewayError>>>,
        invocations: AtomicUsize,
        history_lengths: Mutex<Vec<usize>>,
        delay: Option<Duration>,
    }

    impl MockGateway {
        fn new(responses: Vec<Result<Message, GatewayError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                invocations: AtomicUsize::new(0),
                history_lengths: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn scripted(responses: Vec<Message>) -> Self {
            Self::new(responses.into_iter().map(Ok).collect())
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn invocations(&self) -> usize {
            self.invocations.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmGateway for MockGateway {
        fn model_name(&self) -> &str {
            "mock-model"
        }

        async fn invoke(
            &self,
            messages: &[Message],
            _tools: &[serde_json::Value],
        ) -> Result<Message, GatewayError> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            self.history_lengths.lock().unwrap().push(messages.len());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GatewayError::Other("No more responses".to_string())))
        }
    }

    struct MockToolExecutor {
        spec: ToolSpec,
        executed: Mutex<Vec<String>>,
    }

    impl MockToolExecutor {
        fn new() -> Self {
            Self {
                spec: database_tool_spec(),
                executed: Mutex::new(Vec::new()),
            }
        }

        fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolExecutorPort for MockToolExecutor {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, call: &ToolCall) -> ToolResult {
            self.executed.lock().unwrap().push(call.id.clone());
            ToolResult::success(&call.tool_name, format!("output of {}", call.id))
        }
    }

    struct MockSchema;

    impl ToolSchemaPort for MockSchema {
        fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value {
            serde_json::json!({ "name": tool.name })
        }
    }

    // ==================== Helpers ====================

    fn list_tables(id: &str) -> ToolCall {
        ToolCall::new(id, "list_tables").with_arg("reasoning", "look around")
    }

    fn tool_turn(calls: Vec<ToolCall>) -> Message {
        Message::assistant_with_tools("", calls)
    }

    fn setup(gateway: MockGateway) -> (RunQueryUseCase, Arc<MockGateway>, Arc<MockToolExecutor>) {
        let gateway = Arc::new(gateway);
        let executor = Arc::new(MockToolExecutor::new());
        let use_case = RunQueryUseCase::new(gateway.clone(), executor.clone(), Arc::new(MockSchema));
        (use_case, gateway, executor)
    }

    fn input(query: &str) -> RunQueryInput {
        RunQueryInput::new(query, ExecutionParams::default())
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_direct_answer_without_tools() {
        let (use_case, gateway, executor) =
            setup(MockGateway::scripted(vec![Message::assistant("Hello!")]));
        let mut conversation = Conversation::new("system");

        let output = use_case
            .execute(&mut conversation, input("hi"), &NoQueryProgress)
            .await
            .unwrap();

        assert_eq!(output.answer, "Hello!");
        assert_eq!(output.rounds, 1);
        assert_eq!(output.tool_calls, 0);
        assert_eq!(gateway.invocations(), 1);
        assert!(executor.executed().is_empty());
        let roles: Vec<Role> = conversation.messages().iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let (use_case, gateway, executor) = setup(MockGateway::scripted(vec![
            tool_turn(vec![list_tables("call_1")]),
            Message::assistant("There is one table."),
        ]));
        let mut conversation = Conversation::new("system");

        let output = use_case
            .execute(&mut conversation, input("what tables exist?"), &NoQueryProgress)
            .await
            .unwrap();

        assert_eq!(output.answer, "There is one table.");
        assert_eq!(output.rounds, 2);
        assert_eq!(output.tool_calls, 1);
        assert_eq!(executor.executed(), vec!["call_1"]);
        // system, user, assistant(tool call), tool result
        assert_eq!(*gateway.history_lengths.lock().unwrap(), vec![2, 4]);
        conversation.check_pairing().unwrap();

        match &conversation.messages()[3] {
            Message::ToolResult {
                call_id, content, ..
            } => {
                assert_eq!(call_id, "call_1");
                assert_eq!(content, "output of call_1");
            }
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_calls_answered_in_order() {
        let (use_case, _gateway, executor) = setup(MockGateway::scripted(vec![
            tool_turn(vec![
                list_tables("a"),
                ToolCall::new("b", "describe_table")
                    .with_arg("reasoning", "schema")
                    .with_arg("table_name", "users"),
                list_tables("c"),
            ]),
            Message::assistant("done"),
        ]));
        let mut conversation = Conversation::new("system");

        use_case
            .execute(&mut conversation, input("describe users"), &NoQueryProgress)
            .await
            .unwrap();

        assert_eq!(executor.executed(), vec!["a", "b", "c"]);
        let result_ids: Vec<&str> = conversation
            .messages()
            .iter()
            .filter_map(|m| match m {
                Message::ToolResult { call_id, .. } => Some(call_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(result_ids, vec!["a", "b", "c"]);
        conversation.check_pairing().unwrap();
    }

    #[tokio::test]
    async fn test_iteration_ceiling_is_exact() {
        // 11 tool-calling turns scripted; only 10 may be consumed
        let responses = (0..11)
            .map(|i| tool_turn(vec![list_tables(&format!("call_{}", i))]))
            .collect();
        let (use_case, gateway, executor) = setup(MockGateway::scripted(responses));
        let mut conversation = Conversation::new("system");

        let err = use_case
            .execute(&mut conversation, input("loop forever"), &NoQueryProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, RunQueryError::IterationLimitExceeded { limit: 10 }));
        assert_eq!(gateway.invocations(), 10);
        assert_eq!(executor.executed().len(), 10);
        assert_eq!(gateway.responses.lock().unwrap().len(), 1);
        assert!(err.to_string().contains("Maximum number of iterations (10)"));
        // History stays consistent and usable for the next request
        conversation.check_pairing().unwrap();
        assert_eq!(conversation.len(), 2 + 10 * 2);
    }

    #[tokio::test]
    async fn test_custom_ceiling() {
        let responses = (0..5)
            .map(|i| tool_turn(vec![list_tables(&format!("c{}", i))]))
            .collect();
        let (use_case, gateway, _) = setup(MockGateway::scripted(responses));
        let mut conversation = Conversation::new("system");
        let execution = ExecutionParams::default().with_max_iterations(3);

        let err = use_case
            .execute(
                &mut conversation,
                RunQueryInput::new("q", execution),
                &NoQueryProgress,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RunQueryError::IterationLimitExceeded { limit: 3 }));
        assert_eq!(gateway.invocations(), 3);
    }

    #[tokio::test]
    async fn test_zero_ceiling_never_invokes_model() {
        let (use_case, gateway, _) =
            setup(MockGateway::scripted(vec![Message::assistant("unused")]));
        let mut conversation = Conversation::new("system");
        let execution = ExecutionParams::default().with_max_iterations(0);

        let err = use_case
            .execute(
                &mut conversation,
                RunQueryInput::new("q", execution),
                &NoQueryProgress,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RunQueryError::IterationLimitExceeded { limit: 0 }));
        assert_eq!(gateway.invocations(), 0);
    }

    #[tokio::test]
    async fn test_tool_errors_do_not_abort_the_loop() {
        let (use_case, _, executor) = setup(MockGateway::scripted(vec![
            tool_turn(vec![
                ToolCall::new("bad", "drop_everything").with_arg("reasoning", "why not"),
                ToolCall::new("bad_args", "sample_table").with_arg("reasoning", "peek"),
            ]),
            Message::assistant("I could not do that."),
        ]));
        let mut conversation = Conversation::new("system");

        let output = use_case
            .execute(&mut conversation, input("drop it"), &NoQueryProgress)
            .await
            .unwrap();

        assert_eq!(output.answer, "I could not do that.");
        assert!(executor.executed().is_empty());
        let errors: Vec<&Message> = conversation
            .messages()
            .iter()
            .filter(|m| m.is_error())
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|m| m.text().starts_with("Error: ")));
        conversation.check_pairing().unwrap();
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let (use_case, _, _) = setup(MockGateway::new(vec![Err(GatewayError::RequestFailed(
            "HTTP 429: Rate limit reached for model".to_string(),
        ))]));
        let mut conversation = Conversation::new("system");

        let err = use_case
            .execute(&mut conversation, input("q"), &NoQueryProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, RunQueryError::Provider(_)));
        assert!(err.is_usage_limit());
        // The user message stays in history
        assert_eq!(conversation.len(), 2);
    }

    #[tokio::test]
    async fn test_model_timeout() {
        let gateway = MockGateway::scripted(vec![Message::assistant("late")])
            .with_delay(Duration::from_secs(10));
        let (use_case, _, _) = setup(gateway);
        let mut conversation = Conversation::new("system");
        let execution = ExecutionParams::default().with_model_timeout(Duration::from_millis(50));

        let err = use_case
            .execute(
                &mut conversation,
                RunQueryInput::new("q", execution),
                &NoQueryProgress,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RunQueryError::ModelTimeout(_)));
        assert!(!err.is_usage_limit());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let (use_case, gateway, _) = setup(MockGateway::scripted(vec![]));
        let mut conversation = Conversation::new("system");

        let err = use_case
            .execute(&mut conversation, input("   "), &NoQueryProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, RunQueryError::EmptyQuery));
        assert_eq!(gateway.invocations(), 0);
        assert_eq!(conversation.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let (use_case, gateway, _) =
            setup(MockGateway::scripted(vec![Message::assistant("unused")]));
        let use_case = use_case.with_cancellation(token);
        let mut conversation = Conversation::new("system");

        let err = use_case
            .execute(&mut conversation, input("q"), &NoQueryProgress)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(gateway.invocations(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_model_call() {
        let token = CancellationToken::new();
        let gateway = MockGateway::scripted(vec![Message::assistant("late")])
            .with_delay(Duration::from_secs(10));
        let (use_case, _, _) = setup(gateway);
        let use_case = use_case.with_cancellation(token.clone());
        let mut conversation = Conversation::new("system");

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });
        let err = use_case
            .execute(&mut conversation, input("q"), &NoQueryProgress)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_history_carries_across_turns() {
        let (use_case, gateway, _) = setup(MockGateway::scripted(vec![
            Message::assistant("first"),
            Message::assistant("second"),
        ]));
        let mut conversation = Conversation::new("system");

        use_case
            .execute(&mut conversation, input("one"), &NoQueryProgress)
            .await
            .unwrap();
        use_case
            .execute(&mut conversation, input("two"), &NoQueryProgress)
            .await
            .unwrap();

        assert_eq!(*gateway.history_lengths.lock().unwrap(), vec![2, 4]);
        assert_eq!(conversation.transcript().len(), 4);
    }
}
