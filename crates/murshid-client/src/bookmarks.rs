// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookmark API bindings.
//!
//! The list endpoint has drifted across backend versions: it may answer
//! with a bare array, a `{ bookmarks }` wrapper, or a full page envelope.
//! All three shapes decode to the same bookmark list.

use async_trait::async_trait;
use murshid_core::{Bookmark, BookmarkStore, MurshidError, NewBookmark};
use serde::Deserialize;

use crate::ApiClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookmarksPage {
    bookmarks: Vec<Bookmark>,
    #[allow(dead_code)]
    total: u64,
    #[serde(default)]
    #[allow(dead_code)]
    offset: u64,
    #[serde(default)]
    #[allow(dead_code)]
    limit: u64,
    #[serde(default)]
    #[allow(dead_code)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BookmarksBody {
    Page(BookmarksPage),
    Wrapped { bookmarks: Vec<Bookmark> },
    Bare(Vec<Bookmark>),
}

impl BookmarksBody {
    fn into_bookmarks(self) -> Vec<Bookmark> {
        match self {
            BookmarksBody::Page(page) => page.bookmarks,
            BookmarksBody::Wrapped { bookmarks } => bookmarks,
            BookmarksBody::Bare(bookmarks) => bookmarks,
        }
    }
}

#[async_trait]
impl BookmarkStore for ApiClient {
    async fn list_bookmarks(&self, limit: usize) -> Result<Vec<Bookmark>, MurshidError> {
        let body: BookmarksBody = self
            .get_json(&format!("/users/bookmarks?limit={limit}"))
            .await?;
        Ok(body.into_bookmarks())
    }

    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<Bookmark, MurshidError> {
        self.post_json("/users/bookmarks", &bookmark).await
    }

    async fn delete_bookmark(&self, bookmark_id: &str) -> Result<(), MurshidError> {
        self.delete_resource(&format!("/users/bookmarks/{bookmark_id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murshid_core::{ChatId, MessageId, Role};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::from_parts(base_url.to_string(), Some("test-token".into())).unwrap()
    }

    fn sample_bookmark_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "chatId": "c-1",
            "messageId": "m-1",
            "role": "assistant",
            "content": "saved text",
            "meta": {},
            "savedAt": "2026-01-03T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn list_decodes_full_page_envelope() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "success": true,
            "data": {
                "bookmarks": [sample_bookmark_json("bm-1")],
                "total": 1,
                "offset": 0,
                "limit": 200,
                "hasMore": false
            }
        });
        Mock::given(method("GET"))
            .and(path("/users/bookmarks"))
            .and(query_param("limit", "200"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let bookmarks = client.list_bookmarks(200).await.unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].id, "bm-1");
        assert_eq!(bookmarks[0].message_id, MessageId("m-1".into()));
    }

    #[tokio::test]
    async fn list_decodes_bare_array() {
        let server = MockServer::start().await;
        let body = serde_json::json!([sample_bookmark_json("bm-2")]);
        Mock::given(method("GET"))
            .and(path("/users/bookmarks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let bookmarks = client.list_bookmarks(50).await.unwrap();
        assert_eq!(bookmarks.len(), 1);
        assert_eq!(bookmarks[0].id, "bm-2");
    }

    #[tokio::test]
    async fn list_decodes_wrapped_array() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "bookmarks": [sample_bookmark_json("bm-3")] });
        Mock::given(method("GET"))
            .and(path("/users/bookmarks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let bookmarks = client.list_bookmarks(50).await.unwrap();
        assert_eq!(bookmarks[0].id, "bm-3");
    }

    #[tokio::test]
    async fn create_posts_snapshot_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/bookmarks"))
            .and(body_json(serde_json::json!({
                "chatId": "c-1",
                "messageId": "m-9",
                "role": "assistant",
                "content": "worth keeping",
                "meta": {}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(sample_bookmark_json("bm-9")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let created = client
            .create_bookmark(NewBookmark {
                chat_id: Some(ChatId("c-1".into())),
                message_id: MessageId("m-9".into()),
                role: Role::Assistant,
                content: "worth keeping".into(),
                meta: serde_json::json!({}),
            })
            .await
            .unwrap();
        assert_eq!(created.id, "bm-9");
    }

    #[tokio::test]
    async fn delete_ignores_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/bookmarks/bm-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        client.delete_bookmark("bm-1").await.unwrap();
    }

    #[tokio::test]
    async fn list_maps_401_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/bookmarks"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(client.list_bookmarks(200).await.unwrap_err().is_unauthorized());
    }
}
