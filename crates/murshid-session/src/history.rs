// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded, compacted history context for prompt requests.
//!
//! Request payloads stay small by sending only the tail of the
//! conversation, with each message's content whitespace-collapsed and
//! long content shortened to its lead-in and conclusion.

use murshid_core::{ChatMessage, HistoryItem};

/// Maximum number of recent messages included with a prompt.
pub const HISTORY_LIMIT: usize = 12;

/// Content longer than this many characters is shortened.
const COMPRESS_THRESHOLD: usize = 800;
/// Leading characters kept when shortening.
const HEAD_KEEP: usize = 650;
/// Trailing characters kept when shortening.
const TAIL_KEEP: usize = 120;

/// Collapses whitespace and shortens very long content.
///
/// Boundaries count characters, not bytes, so Arabic and other multibyte
/// text is never split inside a scalar value. Compressing an already
/// compressed string yields the same string.
pub fn compress_content(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let total = collapsed.chars().count();
    if total <= COMPRESS_THRESHOLD {
        return collapsed;
    }

    let head: String = collapsed.chars().take(HEAD_KEEP).collect();
    let tail: String = collapsed
        .chars()
        .skip(total - TAIL_KEEP)
        .collect();
    format!("{head}... {tail}")
}

/// Builds the history slice sent alongside a prompt: the last
/// [`HISTORY_LIMIT`] messages, each compressed.
pub fn build_history(messages: &[ChatMessage]) -> Vec<HistoryItem> {
    let start = messages.len().saturating_sub(HISTORY_LIMIT);
    messages[start..]
        .iter()
        .map(|m| HistoryItem {
            role: m.role,
            content: compress_content(&m.content),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use murshid_core::Role;

    #[test]
    fn short_content_only_collapses_whitespace() {
        assert_eq!(compress_content("  hello \n\t world  "), "hello world");
    }

    #[test]
    fn empty_content_stays_empty() {
        assert_eq!(compress_content(""), "");
        assert_eq!(compress_content("   \n "), "");
    }

    #[test]
    fn long_content_keeps_head_and_tail() {
        let text = "a".repeat(1000);
        let compressed = compress_content(&text);
        assert_eq!(compressed.chars().count(), HEAD_KEEP + 4 + TAIL_KEEP);
        assert!(compressed.starts_with(&"a".repeat(HEAD_KEEP)));
        assert!(compressed.contains("... "));
        assert!(compressed.ends_with(&"a".repeat(TAIL_KEEP)));
    }

    #[test]
    fn exactly_threshold_is_untouched() {
        let text = "b".repeat(COMPRESS_THRESHOLD);
        assert_eq!(compress_content(&text), text);
    }

    #[test]
    fn compression_is_idempotent() {
        let long = format!("{} {}", "start".repeat(200), "end".repeat(100));
        let once = compress_content(&long);
        let twice = compress_content(&once);
        assert_eq!(once, twice);

        let short = "already compact";
        assert_eq!(compress_content(short), compress_content(&compress_content(short)));
    }

    #[test]
    fn multibyte_content_is_not_split_mid_character() {
        // 900 Arabic characters (2 bytes each): byte-indexed slicing would
        // land mid-character; character counting must not.
        let text = "م".repeat(900);
        let compressed = compress_content(&text);
        assert_eq!(compressed.chars().count(), HEAD_KEEP + 4 + TAIL_KEEP);
        assert!(compressed.starts_with('م'));
        assert!(compressed.ends_with('م'));
    }

    #[test]
    fn history_is_bounded_to_last_twelve() {
        let messages: Vec<ChatMessage> = (0..20)
            .map(|i| ChatMessage::user(format!("message {i}"), None))
            .collect();
        let history = build_history(&messages);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].content, "message 8");
        assert_eq!(history[11].content, "message 19");
    }

    #[test]
    fn history_keeps_roles() {
        let mut messages = vec![ChatMessage::user("question", None)];
        let mut reply = ChatMessage::assistant_placeholder(None);
        reply.content = "answer".into();
        messages.push(reply);

        let history = build_history(&messages);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
    }
}
