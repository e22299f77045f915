//! A minimal conversational agent.
//!
//! The chat backend decides when to call a tool; the agent only relays those
//! calls to the [`ToolRegistry`] and feeds the results back, keeping an
//! append-only history of every turn.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::{ToolRegistry, ToolSpec};

/// Completion rounds allowed per user message before giving up.
pub const MAX_TOOL_ROUNDS: usize = 5;

pub const ITERATION_LIMIT_REPLY: &str = "Agent stopped due to iteration limit.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Answer(String),
    ToolCalls(Vec<ToolCall>),
}

#[async_trait]
pub trait ChatBackend {
    /// Produces the next assistant reply for `history`, optionally asking for tool calls.
    async fn complete(&self, history: &[Message], tools: &[ToolSpec]) -> Result<Reply>;
}

pub struct Agent<B> {
    backend: B,
    tools: ToolRegistry,
    history: Vec<Message>,
}

impl<B: ChatBackend> Agent<B> {
    pub fn new(backend: B, tools: ToolRegistry, system_prompt: impl Into<String>) -> Self {
        Self {
            backend,
            tools,
            history: vec![Message::System(system_prompt.into())],
        }
    }

    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Answers a user message, running any tool calls the backend requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the chat backend fails. The user message stays in the history.
    pub async fn respond(&mut self, input: &str) -> Result<String> {
        self.history.push(Message::User(input.to_string()));
        let specs = self.tools.specs();

        for round in 1..=MAX_TOOL_ROUNDS {
            debug!("Completion round {round}");

            match self.backend.complete(&self.history, &specs).await? {
                Reply::Answer(answer) => {
                    self.history.push(Message::Assistant {
                        content: Some(answer.clone()),
                        tool_calls: vec![],
                    });

                    return Ok(answer);
                }
                Reply::ToolCalls(calls) => {
                    self.history.push(Message::Assistant {
                        content: None,
                        tool_calls: calls.clone(),
                    });

                    for call in calls {
                        let content = self.tools.invoke(&call.name, &call.arguments).await;
                        self.history.push(Message::Tool {
                            call_id: call.id,
                            content,
                        });
                    }
                }
            }
        }

        self.history.push(Message::Assistant {
            content: Some(ITERATION_LIMIT_REPLY.to_string()),
            tool_calls: vec![],
        });

        Ok(ITERATION_LIMIT_REPLY.to_string())
    }
}
