//! Planner client - the agent's interface to the LLM completion endpoint.
//!
//! This is the single network-calling, potentially-slow, potentially-unreliable
//! operation in the system. The full conversation is sent on every call and the
//! textual reply is parsed into a [`StructuredReply`]; anything that does not
//! parse, or does not declare a recognized `phase`, is a protocol violation.

mod client;
mod reply;

pub use client::OpenRouterClient;
pub use reply::{parse_reply, StructuredReply};

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::Conversation;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The reply was not valid structured data, or its `phase` was
    /// missing/unrecognized. Recoverable: the loop may request a fresh reply.
    #[error("planner reply was not valid structured data: {0}")]
    Malformed(String),

    /// The completion call itself failed (network, TLS, decode). Fatal for
    /// the current prompt cycle.
    #[error("completion request failed: {0}")]
    Endpoint(#[from] reqwest::Error),

    /// The completion endpoint answered with a non-success status (auth,
    /// rate limit). Fatal for the current prompt cycle.
    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
}

impl PlannerError {
    /// Whether the loop may retry the planner call for this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PlannerError::Malformed(_))
    }
}

/// The planner: an untrusted instruction source consulted once per turn.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Send the entire history to the completion endpoint and parse the
    /// structured reply for the next turn.
    async fn next_reply(&self, conversation: &Conversation)
        -> Result<StructuredReply, PlannerError>;
}
