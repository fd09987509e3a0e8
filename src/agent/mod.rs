//! Agent module - the conversation-driven control loop.
//!
//! The loop drives a phase protocol with the planner:
//! 1. Append the user's prompt to the history
//! 2. Call the planner with the full history, branch on the declared phase
//! 3. For action phases, execute exactly one task and fold its outcome back
//!    into the same assistant record
//! 4. Repeat until the planner declares output (end of cycle) or exit
//!    (end of session)

mod agent_loop;
mod prompt;

pub use agent_loop::{Agent, CycleEnd};
pub use prompt::build_system_prompt;
