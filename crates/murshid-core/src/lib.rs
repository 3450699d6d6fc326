// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Murshid education-assistant chat client.
//!
//! This crate provides the foundational error types, shared message and
//! bookmark types, and the collaborator traits implemented by the HTTP
//! backend client and mocked by the test utilities. The session crate
//! builds the conversation state machine on top of these contracts.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MurshidError;
pub use types::{
    Bookmark, ChatId, ChatMessage, ChatRecord, HistoryItem, MessageId, MessageKind, NewBookmark,
    NewMessage, PromptRequest, Role, SavedMessage,
};

// Re-export all collaborator traits at crate root.
pub use traits::{
    BookmarkStore, ChatListNotifier, ChatStore, FragmentStream, NoopNotifier, PromptStreamer,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn murshid_error_has_all_variants() {
        let _unauthorized = MurshidError::Unauthorized;
        let _aborted = MurshidError::Aborted;
        let _stream = MurshidError::StreamRequest { status: 500 };
        let _api = MurshidError::Api {
            message: "test".into(),
            source: None,
        };
        let _config = MurshidError::Config("test".into());
        let _internal = MurshidError::Internal("test".into());
    }

    #[test]
    fn error_classification_helpers() {
        assert!(MurshidError::Unauthorized.is_unauthorized());
        assert!(!MurshidError::Unauthorized.is_aborted());
        assert!(MurshidError::Aborted.is_aborted());
        assert!(!MurshidError::api("boom").is_aborted());
        assert!(!MurshidError::StreamRequest { status: 503 }.is_unauthorized());
    }

    #[test]
    fn all_traits_are_object_safe() {
        // If any collaborator trait loses object safety, this stops compiling.
        fn _assert_streamer(_: &dyn PromptStreamer) {}
        fn _assert_chats(_: &dyn ChatStore) {}
        fn _assert_bookmarks(_: &dyn BookmarkStore) {}
        fn _assert_notifier(_: &dyn ChatListNotifier) {}
    }
}
