//! The planner's single-turn output, parsed from text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PlannerError;

/// One structured reply, keyed on the declared `phase`.
///
/// Parsing fails closed: a missing or unrecognized `phase` is a
/// [`PlannerError::Malformed`], never a silent default. Phase-specific fields
/// are individually optional; an action reply with missing task fields is an
/// advisory condition handled downstream, not a parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum StructuredReply {
    /// Intent restatement before any work happens.
    Analyze {
        #[serde(default)]
        summary: Option<String>,
    },
    /// Ordered breakdown of the intent into step descriptions.
    Convert {
        #[serde(default)]
        phases: Vec<String>,
    },
    /// Request to execute exactly one task.
    Action {
        #[serde(rename = "taskType", default)]
        task_type: Option<String>,
        #[serde(rename = "taskInput", default)]
        task_input: Option<Value>,
        #[serde(rename = "taskContent", default)]
        task_content: Option<String>,
    },
    /// The work is complete; ends the current prompt cycle.
    Output {
        #[serde(default)]
        content: Option<String>,
        #[serde(rename = "packagesInstalled", default)]
        packages_installed: Vec<String>,
    },
    /// End the whole session.
    Exit,
}

impl StructuredReply {
    /// The declared phase, for logging.
    pub fn phase(&self) -> &'static str {
        match self {
            StructuredReply::Analyze { .. } => "analyze",
            StructuredReply::Convert { .. } => "convert",
            StructuredReply::Action { .. } => "action",
            StructuredReply::Output { .. } => "output",
            StructuredReply::Exit => "exit",
        }
    }
}

/// Parse a raw completion text into a [`StructuredReply`].
///
/// Models occasionally wrap the JSON object in a markdown code fence even when
/// asked for JSON only; the fence is stripped before parsing. Everything else
/// must be a single valid JSON object with a recognized `phase`.
pub fn parse_reply(raw: &str) -> Result<StructuredReply, PlannerError> {
    let body = strip_code_fence(raw);
    serde_json::from_str(body).map_err(|e| {
        let preview: String = raw.chars().take(200).collect();
        PlannerError::Malformed(format!("{} (reply started with: {:?})", e, preview))
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    inner.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze() {
        let reply = parse_reply(r#"{"phase":"analyze","summary":"create a file"}"#)
            .expect("analyze parses");
        assert_eq!(
            reply,
            StructuredReply::Analyze {
                summary: Some("create a file".to_string())
            }
        );
    }

    #[test]
    fn parses_convert_with_steps() {
        let reply = parse_reply(r#"{"phase":"convert","phases":["write notes.txt"]}"#)
            .expect("convert parses");
        assert_eq!(
            reply,
            StructuredReply::Convert {
                phases: vec!["write notes.txt".to_string()]
            }
        );
    }

    #[test]
    fn parses_action_with_all_fields() {
        let reply = parse_reply(
            r#"{"phase":"action","taskType":"write","taskInput":"notes.txt","taskContent":"hi"}"#,
        )
        .expect("action parses");
        match reply {
            StructuredReply::Action {
                task_type,
                task_input,
                task_content,
            } => {
                assert_eq!(task_type.as_deref(), Some("write"));
                assert_eq!(task_input, Some(Value::String("notes.txt".to_string())));
                assert_eq!(task_content.as_deref(), Some("hi"));
            }
            other => panic!("expected action, got {:?}", other),
        }
    }

    #[test]
    fn action_fields_are_optional_at_parse_time() {
        let reply = parse_reply(r#"{"phase":"action"}"#).expect("bare action parses");
        assert_eq!(
            reply,
            StructuredReply::Action {
                task_type: None,
                task_input: None,
                task_content: None,
            }
        );
    }

    #[test]
    fn parses_output_with_packages() {
        let reply = parse_reply(
            r#"{"phase":"output","content":"done","packagesInstalled":["express"]}"#,
        )
        .expect("output parses");
        assert_eq!(
            reply,
            StructuredReply::Output {
                content: Some("done".to_string()),
                packages_installed: vec!["express".to_string()],
            }
        );
    }

    #[test]
    fn parses_exit() {
        let reply = parse_reply(r#"{"phase":"exit"}"#).expect("exit parses");
        assert_eq!(reply, StructuredReply::Exit);
    }

    #[test]
    fn missing_phase_is_malformed() {
        let err = parse_reply(r#"{"summary":"no phase here"}"#).expect_err("must fail");
        assert!(matches!(err, PlannerError::Malformed(_)));
    }

    #[test]
    fn unrecognized_phase_is_malformed() {
        let err = parse_reply(r#"{"phase":"daydream"}"#).expect_err("must fail");
        assert!(matches!(err, PlannerError::Malformed(_)));
    }

    #[test]
    fn plain_text_is_malformed() {
        let err = parse_reply("Sure, I'll create that file for you!").expect_err("must fail");
        assert!(matches!(err, PlannerError::Malformed(_)));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n{\"phase\":\"exit\"}\n```";
        assert_eq!(parse_reply(raw).expect("fenced parses"), StructuredReply::Exit);
    }

    #[test]
    fn reply_round_trips_through_serialization() {
        let reply = StructuredReply::Action {
            task_type: Some("shell".to_string()),
            task_input: Some(Value::String("ls".to_string())),
            task_content: None,
        };
        let text = serde_json::to_string(&reply).expect("serialize");
        assert_eq!(parse_reply(&text).expect("reparse"), reply);
    }
}
