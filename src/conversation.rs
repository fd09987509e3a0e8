//! Conversation history: the ordered, append-only message log that forms the
//! planner's context window.
//!
//! Invariants enforced by construction:
//! - exactly one system message, always first, never mutated after creation
//! - the log only grows; there is no removal or windowing API

use serde::Serialize;

/// Who contributed a message to the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn contribution to the planner's context.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Append-only ordered log of role-tagged messages.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create a conversation seeded with the fixed system instruction.
    pub fn new(system_prompt: String) -> Self {
        Self {
            messages: vec![Message {
                role: Role::System,
                content: system_prompt,
            }],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
