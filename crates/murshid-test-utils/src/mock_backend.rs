// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory chat and bookmark stores with failure injection.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use murshid_core::{
    Bookmark, BookmarkStore, ChatId, ChatRecord, ChatStore, MessageId, MurshidError, NewBookmark,
    NewMessage, Role, SavedMessage,
};

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// A message append recorded by [`InMemoryChatStore`].
#[derive(Debug, Clone)]
pub struct AppendedMessage {
    pub chat_id: ChatId,
    pub message: NewMessage,
    pub saved: SavedMessage,
}

/// In-memory [`ChatStore`] issuing `chat-N` / `srv-msg-N` server ids.
#[derive(Default)]
pub struct InMemoryChatStore {
    chats: Mutex<Vec<ChatRecord>>,
    appended: Mutex<Vec<AppendedMessage>>,
    counter: AtomicU64,
    create_calls: AtomicU64,
    fail_create: AtomicBool,
    fail_append: AtomicBool,
    unauthorized: AtomicBool,
    assistant_meta: Mutex<Option<serde_json::Value>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `create_chat` fail with a generic API error.
    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Makes `append_message` fail with a generic API error.
    pub fn set_fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    /// Makes every operation fail with `Unauthorized`.
    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.unauthorized.store(unauthorized, Ordering::SeqCst);
    }

    /// Meta bag attached to saved assistant messages (e.g. eligibility
    /// flags the backend computes at commit time).
    pub fn set_assistant_meta(&self, meta: serde_json::Value) {
        *self.assistant_meta.lock().expect("assistant_meta lock") = Some(meta);
    }

    /// Number of `create_chat` calls, successful or not.
    pub fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// All recorded appends, in arrival order.
    pub fn appended(&self) -> Vec<AppendedMessage> {
        self.appended.lock().expect("appended lock").clone()
    }

    /// All created chat records.
    pub fn chats(&self) -> Vec<ChatRecord> {
        self.chats.lock().expect("chats lock").clone()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn gate(&self) -> Result<(), MurshidError> {
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(MurshidError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn create_chat(&self, title: &str) -> Result<ChatRecord, MurshidError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.gate()?;
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(MurshidError::api("chat creation unavailable"));
        }

        let timestamp = now();
        let record = ChatRecord {
            id: ChatId(format!("chat-{}", self.next())),
            title: title.to_string(),
            created_at: Some(timestamp.clone()),
            updated_at: Some(timestamp),
        };
        self.chats.lock().expect("chats lock").push(record.clone());
        Ok(record)
    }

    async fn append_message(
        &self,
        chat_id: &ChatId,
        message: NewMessage,
    ) -> Result<SavedMessage, MurshidError> {
        self.gate()?;
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(MurshidError::api("message persistence unavailable"));
        }

        let meta = if message.role == Role::Assistant {
            self.assistant_meta.lock().expect("assistant_meta lock").clone()
        } else {
            None
        };
        let saved = SavedMessage {
            id: MessageId(format!("srv-msg-{}", self.next())),
            created_at: now(),
            meta,
        };
        self.appended.lock().expect("appended lock").push(AppendedMessage {
            chat_id: chat_id.clone(),
            message,
            saved: saved.clone(),
        });
        Ok(saved)
    }
}

/// In-memory [`BookmarkStore`] issuing `bm-N` ids, newest first.
#[derive(Default)]
pub struct InMemoryBookmarkStore {
    bookmarks: Mutex<Vec<Bookmark>>,
    counter: AtomicU64,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    unauthorized: AtomicBool,
}

impl InMemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn set_unauthorized(&self, unauthorized: bool) {
        self.unauthorized.store(unauthorized, Ordering::SeqCst);
    }

    /// The full stored set, newest first.
    pub fn stored(&self) -> Vec<Bookmark> {
        self.bookmarks.lock().expect("bookmarks lock").clone()
    }

    fn gate(&self) -> Result<(), MurshidError> {
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(MurshidError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl BookmarkStore for InMemoryBookmarkStore {
    async fn list_bookmarks(&self, limit: usize) -> Result<Vec<Bookmark>, MurshidError> {
        self.gate()?;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(MurshidError::api("bookmark listing unavailable"));
        }
        let bookmarks = self.bookmarks.lock().expect("bookmarks lock");
        Ok(bookmarks.iter().take(limit).cloned().collect())
    }

    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<Bookmark, MurshidError> {
        self.gate()?;
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(MurshidError::api("bookmark creation unavailable"));
        }

        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Bookmark {
            id: format!("bm-{id}"),
            chat_id: bookmark.chat_id,
            message_id: bookmark.message_id,
            role: bookmark.role,
            content: bookmark.content,
            meta: Some(bookmark.meta),
            saved_at: now(),
        };
        self.bookmarks
            .lock()
            .expect("bookmarks lock")
            .insert(0, created.clone());
        Ok(created)
    }

    async fn delete_bookmark(&self, bookmark_id: &str) -> Result<(), MurshidError> {
        self.gate()?;
        let mut bookmarks = self.bookmarks.lock().expect("bookmarks lock");
        let before = bookmarks.len();
        bookmarks.retain(|b| b.id != bookmark_id);
        if bookmarks.len() == before {
            return Err(MurshidError::api("bookmark not found"));
        }
        Ok(())
    }
}
