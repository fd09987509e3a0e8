//! Core agent loop implementation.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::conversation::Conversation;
use crate::planner::{OpenRouterClient, Planner, StructuredReply};
use crate::tasks::{Executor, Task};

use super::prompt::build_system_prompt;

/// How a prompt cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEnd {
    /// The planner declared the work complete; control returns to the prompt.
    Output,
    /// The planner asked to end the whole session.
    Exit,
}

/// The interactive agent: one conversation, one executor, one planner.
pub struct Agent {
    config: Config,
    planner: Arc<dyn Planner>,
    executor: Executor,
    conversation: Conversation,
}

impl Agent {
    /// Create a new agent with the given configuration.
    pub fn new(config: Config) -> Self {
        let planner = Arc::new(OpenRouterClient::new(
            config.api_key.clone(),
            config.model.clone(),
        ));
        Self::with_planner(config, planner)
    }

    /// Create an agent with a custom planner (useful for testing).
    pub fn with_planner(config: Config, planner: Arc<dyn Planner>) -> Self {
        let conversation =
            Conversation::new(build_system_prompt(&config.workspace_path.to_string_lossy()));
        let executor = Executor::new(
            config.workspace_path.clone(),
            Duration::from_secs(config.shell_timeout_secs),
        );
        Self {
            config,
            planner,
            executor,
            conversation,
        }
    }

    /// The conversation history accumulated so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The task executor, including the working-directory cursor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Run one prompt cycle: planner turns until `output` or `exit`.
    ///
    /// Every intermediate phase appends exactly one assistant message to the
    /// history; action phases execute exactly one task and fold its outcome
    /// (or shell failure) into that same record before the next planner call.
    ///
    /// # Errors
    ///
    /// Fails when the completion endpoint fails, when malformed replies
    /// exhaust the retry bound, or when the turn cap is reached. Task
    /// failures never abort the cycle.
    pub async fn run_cycle(&mut self, prompt: &str) -> anyhow::Result<CycleEnd> {
        self.conversation.push_user(prompt);

        for turn in 0..self.config.max_turns {
            let reply = self.next_reply().await?;
            tracing::debug!("turn {}: phase {}", turn + 1, reply.phase());

            let mut record = serde_json::to_string(&reply)?;

            match &reply {
                StructuredReply::Analyze { summary } => {
                    if let Some(summary) = summary {
                        println!("{}", summary);
                    }
                }
                StructuredReply::Convert { phases } => {
                    for (index, step) in phases.iter().enumerate() {
                        println!("  {}. {}", index + 1, step);
                    }
                }
                StructuredReply::Action {
                    task_type,
                    task_input,
                    task_content,
                } => {
                    match Task::from_action(
                        task_type.as_deref(),
                        task_input.as_ref(),
                        task_content.as_deref(),
                    ) {
                        Ok(task) => self.run_task(&task, &mut record).await,
                        Err(advisory) => {
                            tracing::warn!("{}", advisory);
                            record.push_str("\ninvalid action: ");
                            record.push_str(&advisory.to_string());
                        }
                    }
                }
                StructuredReply::Output {
                    content,
                    packages_installed,
                } => {
                    if let Some(content) = content {
                        println!("{}", content);
                    }
                    if !packages_installed.is_empty() {
                        println!("packages installed: {}", packages_installed.join(", "));
                    }
                    return Ok(CycleEnd::Output);
                }
                StructuredReply::Exit => return Ok(CycleEnd::Exit),
            }

            self.conversation.push_assistant(record);
        }

        Err(anyhow::anyhow!(
            "max turns ({}) reached without completion",
            self.config.max_turns
        ))
    }

    /// Execute one task, folding its outcome into the action record.
    async fn run_task(&mut self, task: &Task, record: &mut String) {
        match self.executor.execute(task).await {
            Ok(outcome) => {
                if let Some(rendered) = outcome.render() {
                    if matches!(task, Task::Shell { .. }) && !rendered.is_empty() {
                        println!("{}", rendered);
                    }
                    record.push_str("\nresult:\n");
                    record.push_str(&rendered);
                }
            }
            Err(failure) => {
                println!("command failed: {}", failure);
                tracing::warn!("shell task failed: {}", failure);
                record.push_str("\nshell failure:\n");
                record.push_str(&failure.to_string());
            }
        }
    }

    /// Call the planner, retrying malformed replies up to the configured
    /// bound. Endpoint failures are surfaced immediately.
    async fn next_reply(&self) -> anyhow::Result<StructuredReply> {
        let mut attempts = 0usize;
        loop {
            match self.planner.next_reply(&self.conversation).await {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_retryable() => {
                    attempts += 1;
                    tracing::warn!(
                        "malformed planner reply (attempt {}/{}): {}",
                        attempts,
                        self.config.reply_retries,
                        e
                    );
                    if attempts > self.config.reply_retries {
                        return Err(anyhow::anyhow!(
                            "planner kept returning malformed replies after {} retries: {}",
                            self.config.reply_retries,
                            e
                        ));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
