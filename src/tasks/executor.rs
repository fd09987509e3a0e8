//! Task execution against the real OS.
//!
//! The executor owns the working-directory cursor: one mutable current
//! directory shared by all filesystem and shell tasks, mutated only by `cd`
//! and only between tasks. Only shell failures propagate; every filesystem
//! condition degrades to a logged warning and a benign outcome, because a
//! single missing file must not terminate a multi-step plan.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use super::diagnostics;
use super::Task;

/// Character budget for text folded into the action record.
const MAX_RECORD_LEN: usize = 10_000;

/// Nonzero exit, spawn failure, or timeout from a shell task.
#[derive(Debug, Error)]
#[error("command `{command}` failed with exit code {code}: {stderr}")]
pub struct ShellFailure {
    pub command: String,
    pub code: i32,
    pub stderr: String,
}

/// Result of executing one task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Captured stdout of a successful shell task.
    Stdout(String),
    /// File text from `read`; `None` when the file is absent.
    FileText(Option<String>),
    /// Membership test from `contains`.
    Presence(bool),
    /// Matched lines from `errors`, or suggestions from `suggestions`.
    Lines(Vec<String>),
    /// Side-effect-only tasks: write, edit, cd, clean, log.
    Done,
}

impl TaskOutcome {
    /// Render the outcome as text for the planner's next context, or `None`
    /// for side-effect-only tasks.
    pub fn render(&self) -> Option<String> {
        match self {
            TaskOutcome::Stdout(out) => Some(truncate_for_record(out)),
            TaskOutcome::FileText(Some(text)) => Some(truncate_for_record(text)),
            TaskOutcome::FileText(None) => Some("null".to_string()),
            TaskOutcome::Presence(found) => Some(found.to_string()),
            TaskOutcome::Lines(lines) if lines.is_empty() => Some("(none)".to_string()),
            TaskOutcome::Lines(lines) => Some(truncate_for_record(&lines.join("\n"))),
            TaskOutcome::Done => None,
        }
    }
}

/// Executes declarative tasks and tracks the working-directory cursor.
pub struct Executor {
    cwd: PathBuf,
    shell_timeout: Duration,
}

impl Executor {
    /// Create an executor rooted at the given workspace directory.
    pub fn new(workspace: PathBuf, shell_timeout: Duration) -> Self {
        Self {
            cwd: workspace,
            shell_timeout,
        }
    }

    /// The current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Execute one task.
    ///
    /// # Errors
    ///
    /// Only `shell` tasks fail: nonzero exit, spawn failure, or timeout.
    pub async fn execute(&mut self, task: &Task) -> Result<TaskOutcome, ShellFailure> {
        tracing::debug!("executing {} task", task.kind());
        match task {
            Task::Shell { command } => self.run_shell(command).await,

            Task::Write { path, content } => {
                let target = self.resolve(path);
                if let Some(parent) = target.parent() {
                    if let Err(e) = tokio::fs::create_dir_all(parent).await {
                        tracing::warn!("could not create parents of {}: {}", target.display(), e);
                    }
                }
                if let Err(e) = tokio::fs::write(&target, content).await {
                    tracing::warn!("write to {} failed: {}", target.display(), e);
                }
                Ok(TaskOutcome::Done)
            }

            Task::Read { path } => {
                let target = self.resolve(path);
                match tokio::fs::read_to_string(&target).await {
                    Ok(text) => Ok(TaskOutcome::FileText(Some(text))),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(TaskOutcome::FileText(None)),
                    Err(e) => {
                        tracing::warn!("read of {} failed: {}", target.display(), e);
                        Ok(TaskOutcome::FileText(None))
                    }
                }
            }

            Task::Edit { path, content } => {
                let target = self.resolve(path);
                if tokio::fs::try_exists(&target).await.unwrap_or(false) {
                    if let Err(e) = tokio::fs::write(&target, content).await {
                        tracing::warn!("edit of {} failed: {}", target.display(), e);
                    }
                } else {
                    tracing::warn!("edit skipped: {} does not exist", target.display());
                }
                Ok(TaskOutcome::Done)
            }

            Task::Cd { path } => {
                let target = self.resolve(path);
                match tokio::fs::metadata(&target).await {
                    Ok(meta) if meta.is_dir() => self.cwd = target,
                    // Absent targets are created; the planner cannot inspect
                    // the filesystem ahead of time, so cd must not stall.
                    _ => {
                        if let Err(e) = tokio::fs::create_dir_all(&target).await {
                            tracing::warn!("cd could not create {}: {}", target.display(), e);
                        } else {
                            self.cwd = target;
                        }
                    }
                }
                Ok(TaskOutcome::Done)
            }

            Task::Clean { paths } => {
                for path in paths {
                    let target = self.resolve(path);
                    match tokio::fs::metadata(&target).await {
                        Ok(meta) if meta.is_dir() => {
                            if let Err(e) = tokio::fs::remove_dir_all(&target).await {
                                tracing::warn!("clean of {} failed: {}", target.display(), e);
                            }
                        }
                        Ok(_) => {
                            if let Err(e) = tokio::fs::remove_file(&target).await {
                                tracing::warn!("clean of {} failed: {}", target.display(), e);
                            }
                        }
                        // Absent paths are skipped silently.
                        Err(_) => {}
                    }
                }
                Ok(TaskOutcome::Done)
            }

            Task::Contains { path, needle } => {
                let target = self.resolve(path);
                match tokio::fs::read_to_string(&target).await {
                    Ok(text) => Ok(TaskOutcome::Presence(text.contains(needle))),
                    Err(_) => Ok(TaskOutcome::Presence(false)),
                }
            }

            Task::Log { message } => {
                tracing::info!("{}", message);
                println!("• {}", message);
                Ok(TaskOutcome::Done)
            }

            Task::Errors { stderr } => Ok(TaskOutcome::Lines(diagnostics::collect_error_lines(
                stderr,
            ))),

            Task::Suggestions { stderr } => {
                Ok(TaskOutcome::Lines(diagnostics::suggest_fixes(stderr)))
            }
        }
    }

    /// Resolve a path against the current directory.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    async fn run_shell(&self, command: &str) -> Result<TaskOutcome, ShellFailure> {
        tracing::info!("Executing command: {}", command);

        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let result = tokio::time::timeout(
            self.shell_timeout,
            Command::new(shell)
                .arg(shell_arg)
                .arg(command)
                .current_dir(&self.cwd)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output(),
        )
        .await;

        let output = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ShellFailure {
                    command: command.to_string(),
                    code: -1,
                    stderr: format!("failed to execute command: {}", e),
                })
            }
            Err(_) => {
                return Err(ShellFailure {
                    command: command.to_string(),
                    code: -1,
                    stderr: format!(
                        "command timed out after {} seconds",
                        self.shell_timeout.as_secs()
                    ),
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(ShellFailure {
                command: command.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: truncate_for_record(&stderr),
            });
        }

        Ok(TaskOutcome::Stdout(stdout))
    }
}

/// Truncate a string for the action record, respecting char boundaries.
fn truncate_for_record(s: &str) -> String {
    if s.len() <= MAX_RECORD_LEN {
        return s.to_string();
    }
    let mut end = MAX_RECORD_LEN;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n... [output truncated]", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn executor_in(dir: &TempDir) -> Executor {
        Executor::new(dir.path().to_path_buf(), Duration::from_secs(30))
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        exec.execute(&Task::Write {
            path: PathBuf::from("notes.txt"),
            content: "hi".to_string(),
        })
        .await
        .expect("write succeeds");

        let outcome = exec
            .execute(&Task::Read {
                path: PathBuf::from("notes.txt"),
            })
            .await
            .expect("read succeeds");
        assert_eq!(outcome, TaskOutcome::FileText(Some("hi".to_string())));
    }

    #[tokio::test]
    async fn write_creates_missing_parents() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        exec.execute(&Task::Write {
            path: PathBuf::from("deep/nested/file.txt"),
            content: "payload".to_string(),
        })
        .await
        .expect("write succeeds");

        let on_disk = std::fs::read_to_string(dir.path().join("deep/nested/file.txt"))
            .expect("file exists");
        assert_eq!(on_disk, "payload");
    }

    #[tokio::test]
    async fn read_missing_file_is_null_not_error() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        let outcome = exec
            .execute(&Task::Read {
                path: PathBuf::from("ghost.txt"),
            })
            .await
            .expect("read never fails");
        assert_eq!(outcome, TaskOutcome::FileText(None));
        assert_eq!(outcome.render().as_deref(), Some("null"));
    }

    #[tokio::test]
    async fn edit_overwrites_existing_file() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);
        std::fs::write(dir.path().join("config.json"), "old").expect("seed file");

        exec.execute(&Task::Edit {
            path: PathBuf::from("config.json"),
            content: "new".to_string(),
        })
        .await
        .expect("edit succeeds");

        let on_disk = std::fs::read_to_string(dir.path().join("config.json")).expect("file exists");
        assert_eq!(on_disk, "new");
    }

    #[tokio::test]
    async fn edit_missing_file_is_a_noop() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        exec.execute(&Task::Edit {
            path: PathBuf::from("absent.txt"),
            content: "never written".to_string(),
        })
        .await
        .expect("edit never fails");

        assert!(!dir.path().join("absent.txt").exists());
    }

    #[tokio::test]
    async fn cd_creates_missing_directory_and_moves_cursor() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        exec.execute(&Task::Cd {
            path: PathBuf::from("sub/project"),
        })
        .await
        .expect("cd never fails");

        assert_eq!(exec.cwd(), dir.path().join("sub/project"));
        assert!(exec.cwd().is_dir());

        // Idempotent: a second cd into the now-existing directory also works.
        exec.execute(&Task::Cd {
            path: dir.path().join("sub/project"),
        })
        .await
        .expect("cd never fails");
        assert!(exec.cwd().is_dir());
    }

    #[tokio::test]
    async fn relative_paths_resolve_against_cursor() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        exec.execute(&Task::Cd {
            path: PathBuf::from("app"),
        })
        .await
        .expect("cd succeeds");
        exec.execute(&Task::Write {
            path: PathBuf::from("main.js"),
            content: "console.log(1)".to_string(),
        })
        .await
        .expect("write succeeds");

        assert!(dir.path().join("app/main.js").exists());
    }

    #[tokio::test]
    async fn clean_removes_files_and_directories_and_skips_missing() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);
        std::fs::write(dir.path().join("junk.txt"), "x").expect("seed file");
        std::fs::create_dir_all(dir.path().join("build/out")).expect("seed dir");

        exec.execute(&Task::Clean {
            paths: vec![
                PathBuf::from("junk.txt"),
                PathBuf::from("build"),
                PathBuf::from("never-existed"),
            ],
        })
        .await
        .expect("clean never fails");

        assert!(!dir.path().join("junk.txt").exists());
        assert!(!dir.path().join("build").exists());
    }

    #[tokio::test]
    async fn contains_reports_membership_and_absence() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);
        std::fs::write(dir.path().join("app.js"), "const x = require('fs');")
            .expect("seed file");

        let found = exec
            .execute(&Task::Contains {
                path: PathBuf::from("app.js"),
                needle: "require".to_string(),
            })
            .await
            .expect("contains never fails");
        assert_eq!(found, TaskOutcome::Presence(true));

        let missing = exec
            .execute(&Task::Contains {
                path: PathBuf::from("ghost.js"),
                needle: "anything".to_string(),
            })
            .await
            .expect("contains never fails");
        assert_eq!(missing, TaskOutcome::Presence(false));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_captures_stdout_on_success() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        let outcome = exec
            .execute(&Task::Shell {
                command: "echo hello".to_string(),
            })
            .await
            .expect("echo succeeds");
        match outcome {
            TaskOutcome::Stdout(out) => assert_eq!(out.trim(), "hello"),
            other => panic!("expected stdout, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_runs_in_current_directory() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        exec.execute(&Task::Cd {
            path: PathBuf::from("workdir"),
        })
        .await
        .expect("cd succeeds");
        exec.execute(&Task::Shell {
            command: "echo marker > here.txt".to_string(),
        })
        .await
        .expect("shell succeeds");

        assert!(dir.path().join("workdir/here.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_nonzero_exit_is_a_failure_with_stderr() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        let failure = exec
            .execute(&Task::Shell {
                command: "echo boom >&2; exit 3".to_string(),
            })
            .await
            .expect_err("nonzero exit fails");
        assert_eq!(failure.code, 3);
        assert_eq!(failure.stderr.trim(), "boom");
        assert_eq!(failure.command, "echo boom >&2; exit 3");
    }

    #[tokio::test]
    async fn errors_task_filters_lines() {
        let dir = TempDir::new().expect("tempdir");
        let mut exec = executor_in(&dir);

        let outcome = exec
            .execute(&Task::Errors {
                stderr: "ok\nError: nope\nfine".to_string(),
            })
            .await
            .expect("errors never fails");
        assert_eq!(outcome, TaskOutcome::Lines(vec!["Error: nope".to_string()]));
    }

    #[test]
    fn record_truncation_is_boundary_safe() {
        let long = "é".repeat(MAX_RECORD_LEN);
        let truncated = truncate_for_record(&long);
        assert!(truncated.ends_with("[output truncated]"));
        assert!(truncated.len() < long.len());
    }
}
