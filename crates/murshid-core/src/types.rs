// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Murshid workspace.
//!
//! Wire-facing structs serialize camelCase to match the JSON backend.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Server-issued identifier for a persisted conversation.
///
/// Absent while the conversation is still ephemeral (no record created yet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub String);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a message.
///
/// Two identity regimes share this type: a client-minted ephemeral UUID
/// assigned the instant a message is appended, and the server-issued id
/// that replaces it once the backend commits the turn. A message carries
/// exactly one valid id at any time; the swap is a single rekey keyed by
/// the old id, never by list position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Mints a fresh ephemeral id.
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Kind discriminator for persisted chat messages.
///
/// The session core only ever appends [`MessageKind::Text`]; the other
/// variants exist because the backend contract allows them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Pdf,
    File,
    System,
}

/// A single turn in a conversation as held by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    /// UTF-8 text; grows append-only while an assistant turn is streaming.
    pub content: String,
    /// Attribute bag populated once the backend commits the message.
    pub meta: Option<serde_json::Value>,
    pub chat_id: Option<ChatId>,
    /// Derived from the bookmark set by id join; never authoritative here.
    pub bookmarked: bool,
    pub bookmark_id: Option<String>,
    pub saved_at: Option<String>,
}

impl ChatMessage {
    /// An optimistic user message, appended before any network call.
    pub fn user(content: impl Into<String>, chat_id: Option<ChatId>) -> Self {
        Self {
            id: MessageId::fresh(),
            role: Role::User,
            content: content.into(),
            meta: None,
            chat_id,
            bookmarked: false,
            bookmark_id: None,
            saved_at: None,
        }
    }

    /// The empty assistant placeholder a stream writes into.
    pub fn assistant_placeholder(chat_id: Option<ChatId>) -> Self {
        Self {
            id: MessageId::fresh(),
            role: Role::Assistant,
            content: String::new(),
            meta: None,
            chat_id,
            bookmarked: false,
            bookmark_id: None,
            saved_at: None,
        }
    }

    /// True once any non-whitespace content has arrived.
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// One compacted history entry sent alongside a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub role: Role,
    pub content: String,
}

/// Input to the prompt stream endpoint: the new prompt plus a bounded,
/// compacted slice of recent history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptRequest {
    pub prompt: String,
    pub history: Vec<HistoryItem>,
}

/// A conversation record as issued by the chat-record API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    pub id: ChatId,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Payload for appending a message to a persisted conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub role: Role,
    pub content: String,
}

impl NewMessage {
    /// A plain text message, the only kind the session core appends.
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            role,
            content: content.into(),
        }
    }
}

/// The backend's acknowledgement of a persisted message.
///
/// Carries the server-issued id that replaces the ephemeral one, and the
/// meta bag (eligibility flags for downstream features).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMessage {
    pub id: MessageId,
    pub created_at: String,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// A saved bookmark, keyed by message id (at most one per message).
///
/// `content` and `meta` are snapshots taken at bookmark time, not live
/// references to the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    #[serde(default)]
    pub chat_id: Option<ChatId>,
    pub message_id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    pub saved_at: String,
}

/// Payload for creating a bookmark from a message snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub chat_id: Option<ChatId>,
    pub message_id: MessageId,
    pub role: Role,
    pub content: String,
    pub meta: serde_json::Value,
}
