// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the chat session core.
//!
//! The HTTP client implements all of these against the REST backend; the
//! test utilities provide in-memory implementations.

pub mod bookmarks;
pub mod chats;
pub mod notifier;
pub mod stream;

pub use bookmarks::BookmarkStore;
pub use chats::ChatStore;
pub use notifier::{ChatListNotifier, NoopNotifier};
pub use stream::{FragmentStream, PromptStreamer};
