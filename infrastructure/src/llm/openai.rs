//! OpenAI-compatible chat completions client.

use super::provider::{DEFAULT_MODEL, DEFAULT_SEED, DEFAULT_TEMPERATURE, ProviderPreset};
use async_trait::async_trait;
use querymind_application::ports::llm_gateway::{GatewayError, LlmGateway};
use querymind_domain::core::string::truncate;
use querymind_domain::{Message, ToolCall};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Connection and sampling settings for one model endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiGatewayConfig {
    /// Endpoint root, without the trailing `/chat/completions`
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub seed: Option<u64>,
    /// HTTP request timeout
    pub timeout: Duration,
}

impl OpenAiGatewayConfig {
    pub fn for_preset(preset: ProviderPreset) -> Self {
        Self {
            base_url: preset.base_url().to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            seed: Some(DEFAULT_SEED),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Gateway speaking the OpenAI chat completions protocol.
pub struct OpenAiCompatibleGateway {
    config: OpenAiGatewayConfig,
    http: reqwest::Client,
}

impl OpenAiCompatibleGateway {
    pub fn new(config: OpenAiGatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiGatewayConfig {
        &self.config
    }
}

#[async_trait]
impl LlmGateway for OpenAiCompatibleGateway {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, messages: &[Message], tools: &[Value]) -> Result<Message, GatewayError> {
        let body = build_request_body(&self.config, messages, tools);
        debug!(
            "POST {} (model {}, {} messages, {} tools)",
            self.config.endpoint(),
            self.config.model,
            messages.len(),
            tools.len()
        );

        let mut request = self.http.post(self.config.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &text));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        parse_response(&json)
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

fn map_status_error(status: reqwest::StatusCode, body: &str) -> GatewayError {
    let detail = error_message(body).unwrap_or_else(|| truncate(body, 300));
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        GatewayError::RateLimited(detail)
    } else {
        GatewayError::RequestFailed(format!("HTTP {}: {}", status, detail))
    }
}

/// `error.message` from an OpenAI-style error body.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"].as_str().map(str::to_string)
}

pub(crate) fn build_request_body(
    config: &OpenAiGatewayConfig,
    messages: &[Message],
    tools: &[Value],
) -> Value {
    let mut body = json!({
        "model": config.model,
        "temperature": config.temperature,
        "messages": messages.iter().map(message_to_json).collect::<Vec<_>>(),
    });
    if let Some(seed) = config.seed {
        body["seed"] = json!(seed);
    }
    if !tools.is_empty() {
        body["tools"] = json!(tools);
        body["tool_choice"] = json!("auto");
    }
    body
}

fn message_to_json(message: &Message) -> Value {
    match message {
        Message::System { content } => json!({ "role": "system", "content": content }),
        Message::User { content } => json!({ "role": "user", "content": content }),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            if tool_calls.is_empty() {
                return json!({ "role": "assistant", "content": content });
            }
            let calls: Vec<Value> = tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.tool_name,
                            "arguments": call.arguments_json().to_string(),
                        },
                    })
                })
                .collect();
            let content = if content.is_empty() {
                Value::Null
            } else {
                json!(content)
            };
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        Message::ToolResult {
            call_id, content, ..
        } => json!({ "role": "tool", "tool_call_id": call_id, "content": content }),
    }
}

pub(crate) fn parse_response(json: &Value) -> Result<Message, GatewayError> {
    if let Some(message) = json["error"]["message"].as_str() {
        return Err(GatewayError::RequestFailed(message.to_string()));
    }
    let message = json["choices"]
        .get(0)
        .map(|choice| &choice["message"])
        .filter(|m| m.is_object())
        .ok_or_else(|| GatewayError::InvalidResponse("response has no choices".to_string()))?;

    let content = message["content"].as_str().unwrap_or_default().to_string();
    let tool_calls: Vec<ToolCall> = message["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .enumerate()
                .map(|(index, call)| parse_tool_call(index, call))
                .collect()
        })
        .unwrap_or_default();

    Ok(Message::assistant_with_tools(content, tool_calls))
}

fn parse_tool_call(index: usize, call: &Value) -> ToolCall {
    let id = call["id"]
        .as_str()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("call_{}", index));
    let name = call["function"]["name"].as_str().unwrap_or_default();
    let mut tool_call = ToolCall::new(id, name);

    // Arguments normally arrive as a JSON-encoded string; some servers send an object
    let arguments = match &call["function"]["arguments"] {
        Value::String(raw) if raw.trim().is_empty() => Value::Object(Default::default()),
        Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!("Unparsable arguments for tool '{}': {}", name, e);
            Value::Null
        }),
        other => other.clone(),
    };
    match arguments {
        Value::Object(map) => tool_call.arguments = map.into_iter().collect(),
        Value::Null => {}
        other => warn!("Ignoring non-object arguments for tool '{}': {}", name, other),
    }
    tool_call
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OpenAiGatewayConfig {
        OpenAiGatewayConfig::for_preset(ProviderPreset::Groq)
    }

    #[test]
    fn test_config_defaults() {
        let c = config();
        assert_eq!(c.model, "llama-3.3-70b-versatile");
        assert_eq!(c.temperature, 0.4);
        assert_eq!(c.seed, Some(42));
        assert_eq!(c.endpoint(), "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(
            c.with_base_url("http://localhost:8080/v1/").endpoint(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_request_body_maps_every_role() {
        let call = ToolCall::new("call_1", "list_tables").with_arg("reasoning", "look");
        let messages = vec![
            Message::system("You are QueryMind."),
            Message::user("what tables?"),
            Message::assistant_with_tools("", vec![call.clone()]),
            Message::tool_result(&call, "['users']", false),
            Message::assistant("One table: users."),
        ];
        let tools = vec![json!({ "type": "function", "function": { "name": "list_tables" } })];

        let body = build_request_body(&config(), &messages, &tools);

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["seed"], 42);
        assert_eq!(body["tools"].as_array().unwrap().len(), 1);
        let msgs = body["messages"].as_array().unwrap();
        assert_eq!(msgs.len(), 5);
        assert_eq!(msgs[0]["role"], "system");
        assert_eq!(msgs[1]["content"], "what tables?");
        assert!(msgs[2]["content"].is_null());
        assert_eq!(msgs[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(msgs[2]["tool_calls"][0]["type"], "function");
        let args: Value =
            serde_json::from_str(msgs[2]["tool_calls"][0]["function"]["arguments"].as_str().unwrap())
                .unwrap();
        assert_eq!(args["reasoning"], "look");
        assert_eq!(msgs[3]["role"], "tool");
        assert_eq!(msgs[3]["tool_call_id"], "call_1");
        assert_eq!(msgs[3]["content"], "['users']");
        assert!(msgs[4].get("tool_calls").is_none());
    }

    #[test]
    fn test_request_without_tools_or_seed() {
        let body = build_request_body(&config().with_seed(None), &[Message::user("hi")], &[]);
        assert!(body.get("tools").is_none());
        assert!(body.get("seed").is_none());
    }

    #[test]
    fn test_parse_text_response() {
        let json = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello!" } }]
        });
        let message = parse_response(&json).unwrap();
        assert_eq!(message.text(), "Hello!");
        assert!(!message.has_tool_calls());
    }

    #[test]
    fn test_parse_tool_calls() {
        let json = json!({
            "choices": [{ "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    { "id": "call_a", "type": "function", "function": {
                        "name": "sample_table",
                        "arguments": "{\"reasoning\":\"peek\",\"table_name\":\"users\",\"row_sample_size\":3}"
                    }},
                    { "type": "function", "function": {
                        "name": "list_tables", "arguments": { "reasoning": "look" }
                    }},
                    { "id": "call_c", "type": "function", "function": {
                        "name": "execute_sql", "arguments": "{not json"
                    }}
                ]
            }}]
        });

        let message = parse_response(&json).unwrap();
        assert_eq!(message.text(), "");
        let calls = message.tool_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].get_i64("row_sample_size"), Some(3));
        assert_eq!(calls[1].id, "call_1");
        assert_eq!(calls[1].reasoning(), Some("look"));
        assert_eq!(calls[2].tool_name, "execute_sql");
        assert!(calls[2].arguments.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_response(&json!({ "choices": [] })),
            Err(GatewayError::InvalidResponse(_))
        ));
        let err = parse_response(&json!({ "error": { "message": "Quota exceeded" } })).unwrap_err();
        assert!(err.is_usage_limit());
    }

    #[test]
    fn test_status_mapping() {
        let body = r#"{"error":{"message":"Rate limit reached for model"}}"#;
        let err = map_status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, GatewayError::RateLimited(ref m) if m == "Rate limit reached for model"));
        assert!(err.is_usage_limit());

        let err = map_status_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.to_string(), "Request failed: HTTP 500 Internal Server Error: boom");
        assert!(!err.is_usage_limit());
    }
}
