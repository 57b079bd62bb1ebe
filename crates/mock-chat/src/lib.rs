//! Mock ToolChat implementations for testing the resolution loop.
//!
//! This crate provides deterministic stand-ins for the chat API:
//! - [`FixedChat`] - Always answers with the same text, no tool calls
//! - [`ScriptedChat`] - Plays back a queue of assistant turns
//!
//! For production use the `chat-api` crate instead.

use std::collections::VecDeque;

use tokio::sync::Mutex;

use triage_core::{async_trait, AssistantTurn, ChatError, ChatMessage, ToolChat, ToolDefinition};

/// A chat model that always returns the same free-text answer.
#[derive(Debug, Clone)]
pub struct FixedChat {
    reply: String,
}

impl FixedChat {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ToolChat for FixedChat {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<AssistantTurn, ChatError> {
        Ok(AssistantTurn {
            content: Some(self.reply.clone()),
            tool_calls: vec![],
        })
    }

    fn name(&self) -> &str {
        "FixedChat"
    }
}

/// A chat model that plays back a prepared script of assistant turns.
///
/// Each `complete` call pops the next turn. An exhausted script yields a
/// plain "no further actions" answer so loops terminate without tool calls.
pub struct ScriptedChat {
    turns: Mutex<VecDeque<AssistantTurn>>,
    /// Number of `complete` calls made so far.
    calls: Mutex<usize>,
}

impl ScriptedChat {
    pub fn new(turns: Vec<AssistantTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            calls: Mutex::new(0),
        }
    }

    /// A script that immediately answers with free text.
    pub fn reply(text: impl Into<String>) -> Self {
        Self::new(vec![AssistantTurn {
            content: Some(text.into()),
            tool_calls: vec![],
        }])
    }

    /// How many turns the engine requested.
    pub async fn calls_made(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl ToolChat for ScriptedChat {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<AssistantTurn, ChatError> {
        *self.calls.lock().await += 1;

        let next = self.turns.lock().await.pop_front();
        Ok(next.unwrap_or(AssistantTurn {
            content: Some("No further actions.".to_string()),
            tool_calls: vec![],
        }))
    }

    fn name(&self) -> &str {
        "ScriptedChat"
    }
}

/// An erroring chat model, for exercising failure containment.
pub struct FailingChat;

#[async_trait]
impl ToolChat for FailingChat {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolDefinition],
    ) -> Result<AssistantTurn, ChatError> {
        Err(ChatError::Network("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "FailingChat"
    }
}
