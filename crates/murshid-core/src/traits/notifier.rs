// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-list observer trait.
//!
//! An explicit capability injected into the session instead of a
//! process-wide listener registry, so the core stays testable without
//! ambient global state.

use async_trait::async_trait;

use crate::types::{ChatId, ChatRecord};

/// Observer for the external chat-list cache (e.g. a sidebar).
///
/// Notifications are fire-and-forget: the session never consumes a return
/// value and implementations must contain their own failures.
#[async_trait]
pub trait ChatListNotifier: Send + Sync {
    /// A conversation was created; the cache may prepend it without a refetch.
    async fn chat_created(&self, chat: &ChatRecord);

    /// A conversation's updated-at timestamp moved.
    async fn chat_updated(&self, id: &ChatId, updated_at: &str);

    /// The cache should refetch from the backend (picks up the true
    /// creation timestamp and title after the first persisted message).
    async fn refresh(&self);
}

/// A notifier that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl ChatListNotifier for NoopNotifier {
    async fn chat_created(&self, _chat: &ChatRecord) {}

    async fn chat_updated(&self, _id: &ChatId, _updated_at: &str) {}

    async fn refresh(&self) {}
}
