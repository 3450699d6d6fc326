// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-record API bindings.

use async_trait::async_trait;
use murshid_core::{
    ChatId, ChatMessage, ChatRecord, ChatStore, MessageId, MessageKind, MurshidError, NewMessage,
    Role, SavedMessage,
};
use serde::{Deserialize, Serialize};

use crate::ApiClient;

/// Summary entry in the paginated chat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatListItem {
    pub id: ChatId,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// One page of the chat list, in the backend's pagination envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPage {
    #[serde(default)]
    pub success: bool,
    pub data: Vec<ChatListItem>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    #[serde(default)]
    pub next_offset: Option<u64>,
}

/// A message as stored inside a conversation detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMessage {
    pub id: MessageId,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    pub role: Role,
}

impl PersistedMessage {
    /// Rehydrates a stored message into session form. Bookmark fields
    /// start cleared; the bookmark coordinator joins them in afterwards.
    pub fn into_message(self, chat_id: &ChatId) -> ChatMessage {
        ChatMessage {
            id: self.id,
            role: self.role,
            content: self.content,
            meta: self.meta,
            chat_id: Some(chat_id.clone()),
            bookmarked: false,
            bookmark_id: None,
            saved_at: None,
        }
    }
}

/// Full conversation detail with message history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDetail {
    pub id: ChatId,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<PersistedMessage>,
}

impl ApiClient {
    /// Fetches one page of the signed-in user's conversations.
    pub async fn list_chats(&self, limit: u64, offset: u64) -> Result<ChatPage, MurshidError> {
        self.get_json(&format!("/chats?limit={limit}&offset={offset}"))
            .await
    }

    /// Fetches a conversation with its full message history.
    pub async fn get_chat(&self, id: &ChatId) -> Result<ChatDetail, MurshidError> {
        self.get_json(&format!("/chats/{id}")).await
    }

    /// Deletes a conversation.
    pub async fn delete_chat(&self, id: &ChatId) -> Result<(), MurshidError> {
        self.delete_resource(&format!("/chats/{id}")).await
    }
}

#[async_trait]
impl ChatStore for ApiClient {
    async fn create_chat(&self, title: &str) -> Result<ChatRecord, MurshidError> {
        self.post_json("/chats", &serde_json::json!({ "title": title }))
            .await
    }

    async fn append_message(
        &self,
        chat_id: &ChatId,
        message: NewMessage,
    ) -> Result<SavedMessage, MurshidError> {
        self.post_json(&format!("/chats/{chat_id}/messages"), &message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::from_parts(base_url.to_string(), Some("test-token".into())).unwrap()
    }

    #[tokio::test]
    async fn create_chat_unwraps_envelope() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "success": true,
            "data": {
                "id": "chat-1",
                "title": "New Chat",
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z"
            }
        });
        Mock::given(method("POST"))
            .and(path("/chats"))
            .and(body_json(serde_json::json!({ "title": "New Chat" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let record = client.create_chat("New Chat").await.unwrap();
        assert_eq!(record.id, ChatId("chat-1".into()));
        assert_eq!(record.title, "New Chat");
        assert_eq!(record.created_at.as_deref(), Some("2026-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn append_message_posts_typed_payload() {
        let server = MockServer::start().await;
        let response = serde_json::json!({
            "id": "srv-msg-1",
            "createdAt": "2026-01-01T00:00:05Z",
            "meta": { "articleEligible": true }
        });
        Mock::given(method("POST"))
            .and(path("/chats/chat-1/messages"))
            .and(body_json(serde_json::json!({
                "type": "text",
                "role": "assistant",
                "content": "Hello"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(&response))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let saved = client
            .append_message(
                &ChatId("chat-1".into()),
                NewMessage::text(Role::Assistant, "Hello"),
            )
            .await
            .unwrap();
        assert_eq!(saved.id, MessageId("srv-msg-1".into()));
        assert_eq!(saved.meta.unwrap()["articleEligible"], true);
    }

    #[tokio::test]
    async fn append_message_maps_401_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats/chat-1/messages"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .append_message(&ChatId("chat-1".into()), NewMessage::text(Role::User, "hi"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn create_chat_surfaces_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chats"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({ "message": "title too long" })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.create_chat("x".repeat(500).as_str()).await.unwrap_err();
        assert!(err.to_string().contains("title too long"), "got: {err}");
    }

    #[tokio::test]
    async fn list_chats_reads_pagination_envelope() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "success": true,
            "data": [
                { "id": "c-1", "title": "Algebra help", "updatedAt": "2026-01-02T00:00:00Z" },
                { "id": "c-2", "title": "Essay review" }
            ],
            "total": 2,
            "limit": 20,
            "offset": 0,
            "nextOffset": null
        });
        Mock::given(method("GET"))
            .and(path("/chats"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let page = client.list_chats(20, 0).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data[0].title, "Algebra help");
        assert_eq!(page.next_offset, None);
    }

    #[tokio::test]
    async fn get_chat_returns_detail_with_messages() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "success": true,
            "data": {
                "id": "c-1",
                "title": "Algebra help",
                "userId": "u-1",
                "messages": [
                    { "id": "m-1", "type": "text", "role": "user", "content": "hi", "createdAt": "2026-01-01T00:00:00Z" },
                    { "id": "m-2", "type": "text", "role": "assistant", "content": "hello", "meta": { "articleEligible": false } }
                ]
            }
        });
        Mock::given(method("GET"))
            .and(path("/chats/c-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let detail = client.get_chat(&ChatId("c-1".into())).await.unwrap();
        assert_eq!(detail.messages.len(), 2);
        assert_eq!(detail.messages[1].role, Role::Assistant);

        let message = detail.messages[1].clone().into_message(&detail.id);
        assert_eq!(message.chat_id, Some(ChatId("c-1".into())));
        assert_eq!(message.meta.unwrap()["articleEligible"], false);
        assert!(!message.bookmarked);
    }

    #[tokio::test]
    async fn delete_chat_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/chats/c-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "deleted": true })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.delete_chat(&ChatId("c-1".into())).await.unwrap();
    }
}
