//! Chat completion types in the OpenAI wire format.
//!
//! These types serialize straight to and from the `/chat/completions`
//! request and response bodies, so the raw response can be handed back to
//! callers untouched.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
    /// Result of a tool call.
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent the message.
    pub role: Role,
    /// Text content. Assistant messages that only carry tool calls may have none.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the assistant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// For tool messages, the id of the call being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool messages, the tool name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Provider-specific fields, kept as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
            extra: Map::new(),
        }
    }

    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// An assistant message with text only.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// An assistant message that requests tool calls.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            name: None,
            extra: Map::new(),
        }
    }

    /// A tool result message answering `tool_call_id`.
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            extra: Map::new(),
        }
    }

    /// Tool calls on this message; empty when there are none.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }

    /// Text content, or `""`.
    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────────────────────────────────────

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id, echoed back in the tool message.
    pub id: String,
    /// Always "function".
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    /// The function being called.
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Build a call with JSON-encoded arguments.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            id: id.into(),
            kind: function_kind(),
            function: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }

    /// Name of the called tool.
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Function name and arguments of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name.
    pub name: String,
    /// Argument payload.
    #[serde(default)]
    pub arguments: ToolArguments,
}

/// Tool-call arguments as the provider sent them.
///
/// OpenAI-style providers send a JSON-encoded string; some compatible servers
/// send the object directly. Both decode to the same named-argument map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    /// JSON text, e.g. `"{\"drug\": \"Paracetamol\"}"`.
    Encoded(String),
    /// An already-structured argument object.
    Structured(Map<String, Value>),
}

impl Default for ToolArguments {
    fn default() -> Self {
        Self::Structured(Map::new())
    }
}

impl ToolArguments {
    /// Decode into a named-argument map.
    ///
    /// Empty text and JSON `null` decode to an empty map; anything other than
    /// an object is an error.
    pub fn parse(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match self {
            Self::Structured(map) => Ok(map.clone()),
            Self::Encoded(text) if text.trim().is_empty() => Ok(Map::new()),
            Self::Encoded(text) => match serde_json::from_str::<Value>(text)? {
                Value::Object(map) => Ok(map),
                Value::Null => Ok(Map::new()),
                other => Err(serde::de::Error::custom(format!(
                    "tool arguments must be a JSON object, got {}",
                    other
                ))),
            },
        }
    }
}

// The wire format wants a string, so structured arguments are re-encoded.
impl Serialize for ToolArguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Encoded(text) => serializer.serialize_str(text),
            Self::Structured(map) => {
                let text = serde_json::to_string(map).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&text)
            }
        }
    }
}

impl From<Map<String, Value>> for ToolArguments {
    fn from(map: Map<String, Value>) -> Self {
        Self::Structured(map)
    }
}

impl From<&str> for ToolArguments {
    fn from(text: &str) -> Self {
        Self::Encoded(text.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool definitions
// ─────────────────────────────────────────────────────────────────────────────

/// A tool offered to the model: `{type: "function", function: {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    /// Function schema.
    pub function: FunctionDefinition,
}

/// Name, description and parameter schema of an offered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// JSON Schema of the parameters.
    #[serde(default)]
    pub parameters: Value,
}

impl ToolDefinition {
    /// Build a function tool definition.
    pub fn function(
        name: impl Into<String>,
        description: Option<String>,
        parameters: Value,
    ) -> Self {
        Self {
            kind: function_kind(),
            function: FunctionDefinition {
                name: name.into(),
                description,
                parameters,
            },
        }
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request / response
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a `/chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model id.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<Message>,
    /// Tools on offer; omitted when none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    /// Completion token cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    /// A request with provider-default sampling and no tools.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: None,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Offer tools; an empty list leaves the field out.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    /// Set the completion token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

}

/// Body of a `/chat/completions` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response id.
    #[serde(default)]
    pub id: String,
    /// Object type, usually "chat.completion".
    #[serde(default)]
    pub object: String,
    /// Creation time (unix seconds).
    #[serde(default)]
    pub created: u64,
    /// Model that produced the response.
    #[serde(default)]
    pub model: String,
    /// Candidate completions.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// Fields not modelled above, such as `system_fingerprint` or `x_groq`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletionResponse {
    /// A single-choice response carrying `message`.
    pub fn from_message(model: impl Into<String>, message: Message) -> Self {
        let finish_reason = if message.tool_calls().is_empty() {
            "stop"
        } else {
            "tool_calls"
        };
        Self {
            id: String::new(),
            object: "chat.completion".to_string(),
            created: 0,
            model: model.into(),
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some(finish_reason.to_string()),
                extra: Map::new(),
            }],
            usage: None,
            extra: Map::new(),
        }
    }

    /// The message of the first choice.
    pub fn first_message(&self) -> Option<&Message> {
        self.choices.first().map(|c| &c.message)
    }
}

/// One candidate completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Position in `choices`.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    pub message: Message,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Extra per-choice fields such as `logprobs`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Completion tokens.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Sum of both.
    #[serde(default)]
    pub total_tokens: u32,
    /// Provider timings and the like.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encoded_arguments_parse() {
        let args = ToolArguments::from(r#"{"drug": "Paracetamol"}"#);
        let map = args.parse().unwrap();
        assert_eq!(map["drug"], json!("Paracetamol"));
    }

    #[test]
    fn test_structured_arguments_parse_as_is() {
        let mut map = Map::new();
        map.insert("drug".into(), json!("Paracetamol"));
        let args = ToolArguments::from(map.clone());
        assert_eq!(args.parse().unwrap(), map);
    }

    #[test]
    fn test_empty_and_null_arguments() {
        assert!(ToolArguments::from("").parse().unwrap().is_empty());
        assert!(ToolArguments::from("null").parse().unwrap().is_empty());
        assert!(ToolArguments::from("[1, 2]").parse().is_err());
        assert!(ToolArguments::from("{not json").parse().is_err());
    }

    #[test]
    fn test_tool_call_deserializes_both_argument_shapes() {
        let encoded: ToolCall = serde_json::from_value(json!({
            "id": "call_1",
            "type": "function",
            "function": {"name": "lookup_price", "arguments": "{\"drug\":\"Paracetamol\"}"}
        }))
        .unwrap();
        assert!(matches!(encoded.function.arguments, ToolArguments::Encoded(_)));

        let structured: ToolCall = serde_json::from_value(json!({
            "id": "call_2",
            "function": {"name": "lookup_price", "arguments": {"drug": "Paracetamol"}}
        }))
        .unwrap();
        assert!(matches!(
            structured.function.arguments,
            ToolArguments::Structured(_)
        ));
        assert_eq!(structured.kind, "function");
        assert_eq!(
            encoded.function.arguments.parse().unwrap(),
            structured.function.arguments.parse().unwrap()
        );
    }

    #[test]
    fn test_structured_arguments_serialize_as_string() {
        let mut map = Map::new();
        map.insert("drug".into(), json!("Paracetamol"));
        let call = ToolCall::new("call_1", "lookup_price", map.into());
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(
            value["function"]["arguments"],
            json!("{\"drug\":\"Paracetamol\"}")
        );
    }

    #[test]
    fn test_tool_message_shape() {
        let msg = Message::tool("call_1", "lookup_price", "\"25 INR\"");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "tool",
                "content": "\"25 INR\"",
                "tool_call_id": "call_1",
                "name": "lookup_price"
            })
        );
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let req = ChatCompletionRequest::new("llama3-8b-8192", vec![Message::user("hi")])
            .with_tools(vec![]);
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("tools").is_none());
        assert!(value.get("max_tokens").is_none());
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_request_with_tools_and_sampling() {
        let tool = ToolDefinition::function(
            "lookup_price",
            Some("Price lookup".into()),
            json!({"type": "object"}),
        );
        let req = ChatCompletionRequest::new("m", vec![])
            .with_tools(vec![tool])
            .with_max_tokens(4096)
            .with_temperature(0.0);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["tools"][0]["type"], json!("function"));
        assert_eq!(value["tools"][0]["function"]["name"], json!("lookup_price"));
        assert_eq!(value["max_tokens"], json!(4096));
        assert_eq!(value["temperature"], json!(0.0));
    }

    #[test]
    fn test_response_deserialization() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "llama3-8b-8192",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "lookup_price", "arguments": "{\"drug\":\"Paracetamol\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let message = response.first_message().unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content_text(), "");
        assert_eq!(message.tool_calls().len(), 1);
        assert_eq!(message.tool_calls()[0].name(), "lookup_price");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_response_keeps_unknown_fields() {
        let body = json!({
            "id": "chatcmpl-2",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "llama3-8b-8192",
            "system_fingerprint": "fp_179b0f92c9",
            "x_groq": {"id": "req_01"},
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "25 INR", "reasoning": "looked it up"},
                "logprobs": null,
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 5,
                "total_tokens": 15,
                "queue_time": 0.02
            }
        });

        let response: ChatCompletionResponse = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(response.extra["system_fingerprint"], json!("fp_179b0f92c9"));
        assert_eq!(response.choices[0].extra["logprobs"], Value::Null);
        assert_eq!(
            response.first_message().unwrap().extra["reasoning"],
            json!("looked it up")
        );
        assert_eq!(serde_json::to_value(&response).unwrap(), body);
    }

    #[test]
    fn test_from_message_finish_reason() {
        let text = ChatCompletionResponse::from_message("m", Message::assistant("done"));
        assert_eq!(text.choices[0].finish_reason.as_deref(), Some("stop"));

        let calls = ChatCompletionResponse::from_message(
            "m",
            Message::assistant_tool_calls(None, vec![ToolCall::new("c", "t", "{}".into())]),
        );
        assert_eq!(calls.choices[0].finish_reason.as_deref(), Some("tool_calls"));
    }
}
