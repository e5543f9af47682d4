//! Tag-based message protocol between models and the orchestrator
//!
//! Collaborative agents drive routing and termination through three tags
//! embedded in free-form model output:
//! - `<message to="agent_id">content</message>` - direct message
//! - `<broadcast>content</broadcast>` - message to all subscribers
//! - `<DONE/>` - the agent is finished
//!
//! Unknown tags pass through untouched.

use std::sync::LazyLock;

use regex::Regex;

/// A parsed directive to be sent on the message channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Target agent id, or `*` for broadcast
    pub to: String,
    /// Message content
    pub content: String,
}

static MESSAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<message\s+to="([^"]+)">(.*?)</message>"#).unwrap());
static BROADCAST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<broadcast>(.*?)</broadcast>").unwrap());
static DONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<DONE\s*/>").unwrap());

/// Extracts outgoing messages from a model response.
///
/// Direct messages are returned first in document order, followed by all
/// broadcasts in document order. Whitespace around the target id and the
/// content is trimmed; interior whitespace is preserved.
pub fn parse_outgoing_messages(response: &str) -> Vec<OutgoingMessage> {
    let mut messages = Vec::new();

    for caps in MESSAGE_PATTERN.captures_iter(response) {
        messages.push(OutgoingMessage {
            to: caps[1].trim().to_string(),
            content: caps[2].trim().to_string(),
        });
    }

    for caps in BROADCAST_PATTERN.captures_iter(response) {
        messages.push(OutgoingMessage {
            to: "*".to_string(),
            content: caps[1].trim().to_string(),
        });
    }

    messages
}

/// Checks whether the response contains a `<DONE/>` signal.
///
/// Case-sensitive: `<done/>` does not match.
pub fn contains_done_signal(response: &str) -> bool {
    DONE_PATTERN.is_match(response)
}

/// Rewrites message tags into a readable form for final output.
///
/// Direct messages become `[To id]: content`, broadcasts become
/// `[Broadcast]: content`, DONE signals are removed. Document order is
/// preserved and outer whitespace is trimmed.
pub fn strip_message_tags(response: &str) -> String {
    let result = MESSAGE_PATTERN.replace_all(response, |caps: &regex::Captures| {
        format!("[To {}]: {}", caps[1].trim(), caps[2].trim())
    });
    let result = BROADCAST_PATTERN.replace_all(&result, |caps: &regex::Captures| {
        format!("[Broadcast]: {}", caps[1].trim())
    });
    let result = DONE_PATTERN.replace_all(&result, "");
    result.trim().to_string()
}

/// Builds the final output of a collaborative conversation.
///
/// Each response is passed through [`strip_message_tags`]; non-empty results
/// are joined with a blank line. An empty conversation yields the empty
/// string.
pub fn extract_final_output(conversation: &[String]) -> String {
    let parts: Vec<String> = conversation
        .iter()
        .map(|resp| strip_message_tags(resp))
        .filter(|s| !s.is_empty())
        .collect();

    parts.join("\n\n").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_message() {
        let response = r#"Here's my analysis.
<message to="developer">
I think we should use an event loop for this component.
</message>
Let me know your thoughts."#;

        let messages = parse_outgoing_messages(response);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, "developer");
        assert_eq!(
            messages[0].content,
            "I think we should use an event loop for this component."
        );
    }

    #[test]
    fn test_parse_multiple_messages() {
        let response = r#"<message to="agent1">First message</message>
Some text in between
<message to="agent2">Second message</message>"#;

        let messages = parse_outgoing_messages(response);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].to, "agent1");
        assert_eq!(messages[1].to, "agent2");
    }

    #[test]
    fn test_parse_broadcast() {
        let response = "<broadcast>\nThis is for everyone!\n</broadcast>";

        let messages = parse_outgoing_messages(response);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].to, "*");
        assert_eq!(messages[0].content, "This is for everyone!");
    }

    #[test]
    fn test_parse_mixed_directs_before_broadcasts() {
        let response = r#"<message to="x">one</message><broadcast>two</broadcast><message to="y">three</message>"#;

        let messages = parse_outgoing_messages(response);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], OutgoingMessage { to: "x".into(), content: "one".into() });
        assert_eq!(messages[1], OutgoingMessage { to: "y".into(), content: "three".into() });
        assert_eq!(messages[2], OutgoingMessage { to: "*".into(), content: "two".into() });
    }

    #[test]
    fn test_parse_no_messages() {
        let messages = parse_outgoing_messages("This is just regular text without any tags.");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_parse_multiline_content() {
        let response = r#"<message to="developer">
Here's a code example:

fn hello() {
    println!("Hello");
}

Please review this.
</message>"#;

        let messages = parse_outgoing_messages(response);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].content.contains("fn hello()"));
    }

    #[test]
    fn test_contains_done_signal() {
        let cases = [
            ("<DONE/>", true),
            ("<DONE />", true),
            ("Some text <DONE/> more text", true),
            ("No done signal here", false),
            ("<done/>", false),
            ("DONE", false),
        ];

        for (input, expected) in cases {
            assert_eq!(contains_done_signal(input), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn test_strip_message_tags() {
        let response = "Here's my final answer.
<message to=\"agent1\">Some message</message>
<broadcast>A broadcast</broadcast>
The conclusion.
<DONE/>";

        let expected = "Here's my final answer.
[To agent1]: Some message
[Broadcast]: A broadcast
The conclusion.";

        assert_eq!(strip_message_tags(response), expected);
    }

    #[test]
    fn test_strip_is_idempotent() {
        let response = "Text <message to=\"a\">hi</message> <DONE/>";
        let once = strip_message_tags(response);
        assert_eq!(strip_message_tags(&once), once);
    }

    #[test]
    fn test_extract_final_output() {
        let conversation = vec![
            "First response <message to=\"other\">msg1</message>".to_string(),
            "Second response <message to=\"other\">msg2</message>".to_string(),
            "Final response with important content <DONE/>".to_string(),
        ];

        let expected = "First response [To other]: msg1

Second response [To other]: msg2

Final response with important content";

        assert_eq!(extract_final_output(&conversation), expected);
    }

    #[test]
    fn test_extract_final_output_empty() {
        assert_eq!(extract_final_output(&[]), "");
    }

    #[test]
    fn test_extract_final_output_skips_tag_only_responses() {
        let conversation = vec!["<DONE/>".to_string(), "Real content".to_string()];
        assert_eq!(extract_final_output(&conversation), "Real content");
    }
}
