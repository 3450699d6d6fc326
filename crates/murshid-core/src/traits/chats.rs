// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-record persistence trait.

use async_trait::async_trait;

use crate::error::MurshidError;
use crate::types::{ChatId, ChatRecord, NewMessage, SavedMessage};

/// The chat-record API the persistence synchronizer writes through.
///
/// Both operations are issued fire-and-forget relative to the UI path:
/// the session renders messages before these calls resolve, and failures
/// never block the visible turn.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Creates a new conversation record with the given title.
    async fn create_chat(&self, title: &str) -> Result<ChatRecord, MurshidError>;

    /// Appends a message to a persisted conversation, returning the
    /// server-issued identity and meta for the committed message.
    async fn append_message(
        &self,
        chat_id: &ChatId,
        message: NewMessage,
    ) -> Result<SavedMessage, MurshidError>;
}
