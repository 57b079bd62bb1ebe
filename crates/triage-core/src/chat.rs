//! Conversation types and the language-model trait seam.
//!
//! The wire shape follows the chat-completions function-calling convention:
//! an assistant message either carries free text or a list of tool calls,
//! and tool results are appended as `role = "tool"` messages keyed by the
//! originating call id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChatError;

/// A single message in a ticket-resolution transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", "assistant" or "tool".
    pub role: String,
    /// Message content. May be absent on assistant messages that only
    /// carry tool calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls issued by the assistant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// For `role = "tool"` messages: the call this result answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For `role = "tool"` messages: the tool name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a plain assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create an assistant message carrying tool calls.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a tool-result message answering a specific call.
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }
}

/// A tool call issued by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id for this call, echoed back in the tool-result message.
    pub id: String,
    /// Call type (always "function").
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function invocation.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Construct a function call (test and mock helper).
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.to_string(),
            },
        }
    }
}

/// The function part of a tool call. Arguments arrive JSON-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// A tool made available to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool type (always "function").
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function specification.
    pub function: FunctionSpec,
}

impl ToolDefinition {
    /// Define a function tool with a JSON-schema parameter object.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Function name, description and parameter schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One assistant turn: free text, tool calls, or both.
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    /// Free-text content, if the model produced any.
    pub content: Option<String>,
    /// Tool calls to dispatch, in order. Empty means a final answer.
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantTurn {
    /// Whether this turn requests any tool dispatch.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Convert this turn into the transcript message to append.
    pub fn to_message(&self) -> ChatMessage {
        if self.tool_calls.is_empty() {
            ChatMessage::assistant(self.content.clone().unwrap_or_default())
        } else {
            ChatMessage::assistant_tool_calls(self.content.clone(), self.tool_calls.clone())
        }
    }
}

/// Trait for tool-calling language model clients.
///
/// Implementations send the transcript plus the tool schema and return the
/// assistant's next turn. The resolution engine owns the dispatch loop;
/// implementations own transport, authentication and timeouts.
#[async_trait]
pub trait ToolChat: Send + Sync {
    /// Request the next assistant turn for the given transcript.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<AssistantTurn, ChatError>;

    /// Human-readable client name for logging.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_message_roundtrip() {
        let msg = ChatMessage::tool("call-1", "search_invoices", "[]");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call-1");
        assert_eq!(json["name"], "search_invoices");
        // Absent fields must not be serialized
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_assistant_turn_to_message() {
        let turn = AssistantTurn {
            content: None,
            tool_calls: vec![ToolCall::function("c1", "resolve_ticket", json!({"x": 1}))],
        };
        let msg = turn.to_message();
        assert_eq!(msg.role, "assistant");
        assert_eq!(msg.tool_calls.as_ref().unwrap().len(), 1);

        let plain = AssistantTurn {
            content: Some("done".to_string()),
            tool_calls: vec![],
        };
        assert_eq!(plain.to_message().content.as_deref(), Some("done"));
    }
}
