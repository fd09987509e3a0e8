//! Task model and execution.
//!
//! A task is one declarative, executable instruction derived from an
//! action-phase reply. The ten kinds form a closed enum, each variant carrying
//! only the fields it needs, so dispatch is an exhaustive match and an unknown
//! kind can only appear at the conversion boundary, never inside the executor.

pub mod diagnostics;
mod executor;

pub use executor::{Executor, ShellFailure, TaskOutcome};

use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// One executable instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Run a shell command in the current directory.
    Shell { command: String },
    /// Create-or-overwrite a file, creating parent directories as needed.
    Write { path: PathBuf, content: String },
    /// Read a file fully as text; absence is not an error.
    Read { path: PathBuf },
    /// Overwrite an existing file; a no-op with a warning when absent.
    Edit { path: PathBuf, content: String },
    /// Move the working-directory cursor, creating the target if absent.
    Cd { path: PathBuf },
    /// Remove files or directories, silently skipping absent paths.
    Clean { paths: Vec<PathBuf> },
    /// Test whether a file contains a substring; false when absent.
    Contains { path: PathBuf, needle: String },
    /// Emit a human-readable step marker.
    Log { message: String },
    /// Collect error-looking lines from captured stderr.
    Errors { stderr: String },
    /// Propose fixes for known failure signatures in captured stderr.
    Suggestions { stderr: String },
}

/// Advisory failure while converting action-reply fields into a [`Task`].
///
/// These never abort the loop; the turn degrades to a logged warning and the
/// advisory text becomes part of the action record.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action reply is missing the `taskType` field")]
    MissingKind,

    #[error("unknown task type `{0}`")]
    UnknownKind(String),

    #[error("task `{kind}` is missing a usable `taskInput` field")]
    MissingInput { kind: &'static str },

    #[error("task `{kind}` is missing its `taskContent` field")]
    MissingContent { kind: &'static str },
}

impl Task {
    /// Convert the raw fields of an action reply into a task.
    pub fn from_action(
        task_type: Option<&str>,
        input: Option<&Value>,
        content: Option<&str>,
    ) -> Result<Self, ActionError> {
        let kind = task_type.ok_or(ActionError::MissingKind)?;
        match kind {
            "shell" => Ok(Task::Shell {
                command: text_input(input, "shell")?,
            }),
            "write" => Ok(Task::Write {
                path: path_input(input, "write")?,
                content: required_content(content, "write")?,
            }),
            "read" => Ok(Task::Read {
                path: path_input(input, "read")?,
            }),
            "edit" => Ok(Task::Edit {
                path: path_input(input, "edit")?,
                content: required_content(content, "edit")?,
            }),
            "cd" => Ok(Task::Cd {
                path: path_input(input, "cd")?,
            }),
            "clean" => Ok(Task::Clean {
                paths: path_list_input(input, "clean")?,
            }),
            "contains" => Ok(Task::Contains {
                path: path_input(input, "contains")?,
                needle: required_content(content, "contains")?,
            }),
            "log" => Ok(Task::Log {
                message: text_input(input, "log")?,
            }),
            // Stderr text normally arrives in the input slot; some planners
            // put it in the content slot instead, which is accepted too.
            "errors" => Ok(Task::Errors {
                stderr: stderr_input(input, content, "errors")?,
            }),
            "suggestions" => Ok(Task::Suggestions {
                stderr: stderr_input(input, content, "suggestions")?,
            }),
            other => Err(ActionError::UnknownKind(other.to_string())),
        }
    }

    /// The task's kind name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Task::Shell { .. } => "shell",
            Task::Write { .. } => "write",
            Task::Read { .. } => "read",
            Task::Edit { .. } => "edit",
            Task::Cd { .. } => "cd",
            Task::Clean { .. } => "clean",
            Task::Contains { .. } => "contains",
            Task::Log { .. } => "log",
            Task::Errors { .. } => "errors",
            Task::Suggestions { .. } => "suggestions",
        }
    }
}

fn text_input(input: Option<&Value>, kind: &'static str) -> Result<String, ActionError> {
    input
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or(ActionError::MissingInput { kind })
}

fn path_input(input: Option<&Value>, kind: &'static str) -> Result<PathBuf, ActionError> {
    text_input(input, kind).map(PathBuf::from)
}

fn path_list_input(input: Option<&Value>, kind: &'static str) -> Result<Vec<PathBuf>, ActionError> {
    match input {
        Some(Value::String(path)) => Ok(vec![PathBuf::from(path)]),
        Some(Value::Array(items)) => {
            let paths: Vec<PathBuf> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(PathBuf::from)
                .collect();
            if paths.is_empty() {
                Err(ActionError::MissingInput { kind })
            } else {
                Ok(paths)
            }
        }
        _ => Err(ActionError::MissingInput { kind }),
    }
}

fn required_content(content: Option<&str>, kind: &'static str) -> Result<String, ActionError> {
    content
        .map(str::to_string)
        .ok_or(ActionError::MissingContent { kind })
}

fn stderr_input(
    input: Option<&Value>,
    content: Option<&str>,
    kind: &'static str,
) -> Result<String, ActionError> {
    text_input(input, kind).or_else(|_| {
        content
            .map(str::to_string)
            .ok_or(ActionError::MissingInput { kind })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shell_task_from_fields() {
        let input = json!("ls -la");
        let task = Task::from_action(Some("shell"), Some(&input), None).expect("shell parses");
        assert_eq!(
            task,
            Task::Shell {
                command: "ls -la".to_string()
            }
        );
    }

    #[test]
    fn write_task_needs_content() {
        let input = json!("notes.txt");
        let err = Task::from_action(Some("write"), Some(&input), None).expect_err("must fail");
        assert!(matches!(err, ActionError::MissingContent { kind: "write" }));
    }

    #[test]
    fn clean_accepts_single_path_and_array() {
        let single = json!("build");
        let task = Task::from_action(Some("clean"), Some(&single), None).expect("single parses");
        assert_eq!(
            task,
            Task::Clean {
                paths: vec![PathBuf::from("build")]
            }
        );

        let many = json!(["build", "dist/cache"]);
        let task = Task::from_action(Some("clean"), Some(&many), None).expect("array parses");
        assert_eq!(
            task,
            Task::Clean {
                paths: vec![PathBuf::from("build"), PathBuf::from("dist/cache")]
            }
        );
    }

    #[test]
    fn missing_kind_is_advisory() {
        let err = Task::from_action(None, None, None).expect_err("must fail");
        assert!(matches!(err, ActionError::MissingKind));
    }

    #[test]
    fn unknown_kind_is_advisory() {
        let input = json!("whatever");
        let err = Task::from_action(Some("teleport"), Some(&input), None).expect_err("must fail");
        match err {
            ActionError::UnknownKind(kind) => assert_eq!(kind, "teleport"),
            other => panic!("expected UnknownKind, got {:?}", other),
        }
    }

    #[test]
    fn errors_task_falls_back_to_content_slot() {
        let task = Task::from_action(Some("errors"), None, Some("line1\nerror: boom"))
            .expect("content fallback");
        assert_eq!(
            task,
            Task::Errors {
                stderr: "line1\nerror: boom".to_string()
            }
        );
    }
}
