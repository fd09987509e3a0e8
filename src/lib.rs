//! # taskpilot
//!
//! An interactive agent that turns natural-language prompts into local
//! actions: shell commands, file reads/writes/edits, directory changes.
//!
//! This library provides:
//! - A conversation-driven control loop over a phase protocol
//!   (analyze / convert / action / output / exit)
//! - A task executor for the ten declarative task kinds
//! - Integration with OpenRouter for planner access
//!
//! ## Architecture
//!
//! The agent is strictly turn-sequential:
//! 1. Read one prompt from the user
//! 2. Send the full conversation to the planner, requesting a JSON-only reply
//! 3. Branch on the declared phase; action phases execute exactly one task
//!    and fold its outcome back into the conversation
//! 4. Repeat until the planner declares output or exit
//!
//! ## Example
//!
//! ```rust,ignore
//! use taskpilot::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let mut agent = Agent::new(config);
//! agent.run_cycle("create file notes.txt with content 'hi'").await?;
//! ```

pub mod agent;
pub mod config;
pub mod conversation;
pub mod planner;
pub mod tasks;

pub use config::Config;
