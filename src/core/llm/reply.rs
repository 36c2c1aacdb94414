//! Selection of a single direct reply from raw generation output.
//!
//! Generation models sometimes answer with several labelled alternatives
//! (`Option 1 (empathetic): "..."`) or with commentary about which answer
//! fits best. Only one reply may be spoken, so the output is reduced with a
//! deterministic policy:
//!
//! 1. Scan trimmed, non-empty lines in order.
//! 2. An `Option N (label): "payload"` line yields its payload.
//! 3. The first line that is not commentary yields itself, with
//!    surrounding quotes removed. Commentary is a heading ending in `:`, a
//!    line weighing answers ("best response", "depends on the context"), or
//!    a line that talks about options while quoting one.
//! 4. Nothing qualifies: [`FALLBACK_REPLY`].

use std::sync::LazyLock;

use regex::Regex;

/// Reply used when no line of the output qualifies
pub const FALLBACK_REPLY: &str = "I'm not sure how to respond to that.";

/// Lowercase phrases marking a line as commentary rather than a reply
const META_MARKERS: &[&str] = &["best response", "depends on the context"];

/// `Option 2 (casual): "text"`, tolerating markdown emphasis around the label
static OPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^[*_\s]*option\s+\d+\s*(?:\([^)]*\))?[*_\s]*:[*_\s]*(.*)$"#)
        .expect("option line regex is valid")
});

const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”', '*', '_'];

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(QUOTE_CHARS).trim()
}

fn is_meta(line: &str) -> bool {
    if line.ends_with(':') {
        return true;
    }
    let lower = line.to_lowercase();
    if META_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    // "option" inside quoted text is an unlabelled alternative, not a reply
    lower.contains("option") && strip_quotes(line).contains(QUOTE_CHARS)
}

/// Extract one reply from generation output.
///
/// Returns `None` when the output is blank; that is a generation failure,
/// not a case for the fallback reply.
pub fn extract_direct_reply(output: &str) -> Option<String> {
    if output.trim().is_empty() {
        return None;
    }

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(caps) = OPTION_LINE.captures(line) {
            let payload = caps.get(1).map(|m| strip_quotes(m.as_str())).unwrap_or("");
            if !payload.is_empty() {
                return Some(payload.to_string());
            }
            continue;
        }

        if !is_meta(line) {
            let reply = strip_quotes(line);
            if !reply.is_empty() {
                return Some(reply.to_string());
            }
        }
    }

    Some(FALLBACK_REPLY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_payload_is_extracted() {
        let out = r#"Option 1 (direct): "I'm doing well, thanks!""#;
        assert_eq!(extract_direct_reply(out).unwrap(), "I'm doing well, thanks!");
    }

    #[test]
    fn test_first_option_wins() {
        let out = "Here are a few options:\n\
                   Option 1 (warm): \"That sounds lovely.\"\n\
                   Option 2 (curious): \"Tell me more!\"";
        assert_eq!(extract_direct_reply(out).unwrap(), "That sounds lovely.");
    }

    #[test]
    fn test_markdown_option_label() {
        let out = "**Option 1 (supportive):** \"I'm here for you.\"";
        assert_eq!(extract_direct_reply(out).unwrap(), "I'm here for you.");
    }

    #[test]
    fn test_plain_reply_passes_through() {
        assert_eq!(
            extract_direct_reply("  Sure, I can help with that.  ").unwrap(),
            "Sure, I can help with that."
        );
    }

    #[test]
    fn test_quoted_plain_reply_is_unquoted() {
        assert_eq!(extract_direct_reply("\"Hello there!\"").unwrap(), "Hello there!");
    }

    #[test]
    fn test_meta_lines_are_skipped() {
        let out = "The best response depends on the context.\n\nGlad to hear it!";
        assert_eq!(extract_direct_reply(out).unwrap(), "Glad to hear it!");
    }

    #[test]
    fn test_plain_reply_mentioning_option_passes_through() {
        let out = "Another option is to take a short walk outside.";
        assert_eq!(extract_direct_reply(out).unwrap(), out);
    }

    #[test]
    fn test_heading_line_is_skipped() {
        let out = "Here is my reply:
That must have been a long day.";
        assert_eq!(
            extract_direct_reply(out).unwrap(),
            "That must have been a long day."
        );
    }

    #[test]
    fn test_quoted_alternatives_line_is_skipped() {
        let out = "One option: say \"hi\" or \"hello\"\nHi there!";
        assert_eq!(extract_direct_reply(out).unwrap(), "Hi there!");
    }

    #[test]
    fn test_only_meta_lines_falls_back() {
        let out = "It depends on the context.\nThe best response would vary.";
        assert_eq!(extract_direct_reply(out).unwrap(), FALLBACK_REPLY);
    }

    #[test]
    fn test_blank_output_is_none() {
        assert!(extract_direct_reply("").is_none());
        assert!(extract_direct_reply(" \n\t\n").is_none());
    }

    #[test]
    fn test_empty_option_payload_is_skipped() {
        let out = "Option 1 (empty): \"\"\nNice to meet you.";
        assert_eq!(extract_direct_reply(out).unwrap(), "Nice to meet you.");
    }
}
