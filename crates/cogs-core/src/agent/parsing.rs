//! Parsing of chat-completion content into an agent reply
//!
//! Models are asked for a bare JSON object but sometimes wrap it in a
//! markdown code fence or answer in prose. A fenced object is unwrapped and
//! accepted as structured, where a strict JSON parse of the whole reply would
//! fail and show the fenced text raw. Fields set to `null` are treated as
//! missing. Anything else that is not a JSON object matching the answer
//! document is returned verbatim as a raw reply.

use serde_json::Value;
use tracing::warn;

use super::types::{AgentReply, Answer};

/// Parse model output into a structured answer, falling back to raw text
pub fn parse_answer(content: &str) -> AgentReply {
    let payload = strip_code_fence(content.trim());

    match serde_json::from_str::<Value>(payload) {
        Ok(value @ Value::Object(_)) => match serde_json::from_value::<Answer>(value) {
            Ok(answer) => AgentReply::Structured(answer),
            Err(e) => {
                warn!(error = %e, "Reply JSON does not match the answer document; returning raw");
                AgentReply::raw(content)
            }
        },
        Ok(_) => {
            warn!("Reply JSON is not an object; returning raw");
            AgentReply::raw(content)
        }
        Err(e) => {
            warn!(error = %e, preview = %preview(content), "Reply is not JSON; returning raw");
            AgentReply::raw(content)
        }
    }
}

/// Remove a surrounding ```json ... ``` fence if present
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the language tag on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > 80 {
        format!("{}...", text.chars().take(80).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prose_is_raw() {
        let reply = parse_answer("plain prose");
        assert_eq!(reply, AgentReply::raw("plain prose"));
    }

    #[test]
    fn test_full_answer() {
        let reply = parse_answer(
            r#"{"key_insights": ["a", "b"], "narrative": "n", "next_questions": ["q"],
                "chart_suggestions": [{"type": "line", "x": "date", "y": ["daily_cogs"]}]}"#,
        );
        let answer = reply.answer().unwrap();
        assert_eq!(answer.key_insights, vec!["a", "b"]);
        assert_eq!(answer.chart_suggestions[0].y, vec!["daily_cogs"]);
    }

    #[test]
    fn test_partial_answer_defaults() {
        let reply = parse_answer(r#"{"narrative": "only this"}"#);
        let answer = reply.answer().unwrap();
        assert_eq!(answer.narrative, "only this");
        assert!(answer.next_questions.is_empty());
    }

    #[test]
    fn test_null_fields_default() {
        let reply = parse_answer(
            r#"{"key_insights": ["• A"], "narrative": null, "next_questions": ["q"],
                "chart_suggestions": null}"#,
        );
        let answer = reply.answer().unwrap();
        assert_eq!(answer.key_insights, vec!["• A"]);
        assert_eq!(answer.narrative, "");
        assert_eq!(answer.next_questions, vec!["q"]);
        assert!(answer.chart_suggestions.is_empty());

        let reply = parse_answer(r#"{"chart_suggestions": [{"type": null, "x": "date", "y": null}]}"#);
        let chart = &reply.answer().unwrap().chart_suggestions[0];
        assert_eq!(chart.kind, "");
        assert!(chart.y.is_empty());
    }

    #[test]
    fn test_code_fence() {
        let reply = parse_answer("```json\n{\"key_insights\": [\"x\"]}\n```");
        assert_eq!(reply.answer().unwrap().key_insights, vec!["x"]);

        let reply = parse_answer("```\n{\"narrative\": \"y\"}\n```");
        assert_eq!(reply.answer().unwrap().narrative, "y");
    }

    #[test]
    fn test_non_object_json_is_raw() {
        assert!(parse_answer("[1, 2, 3]").is_raw());
        assert!(parse_answer("42").is_raw());
    }

    #[test]
    fn test_wrong_field_types_are_raw() {
        let content = r#"{"key_insights": "not a list"}"#;
        assert_eq!(parse_answer(content).raw_content(), Some(content));
    }

    #[test]
    fn test_raw_keeps_original_text() {
        let content = "  Sure! Here you go:\n{\"narrative\": \"x\"}  ";
        assert_eq!(parse_answer(content).raw_content(), Some(content));
    }
}
