// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookmark coordinator.
//!
//! Owns the signed-in identity's bookmark set and the derived join onto
//! messages. Bookmarks are keyed by message id (one per message); message
//! fields (`bookmarked`, `bookmark_id`, `saved_at`) are recomputed from
//! the set after every change and are never authoritative on the message.

use std::collections::HashSet;
use std::sync::Arc;

use murshid_core::{
    Bookmark, BookmarkStore, ChatId, ChatMessage, MessageId, MurshidError, NewBookmark,
};
use tracing::debug;

/// How many bookmarks are fetched at session start.
const BOOKMARK_FETCH_LIMIT: usize = 200;

/// Tracks the bookmark set and in-flight create markers.
pub struct BookmarkCoordinator {
    store: Arc<dyn BookmarkStore>,
    bookmarks: Vec<Bookmark>,
    saving: HashSet<MessageId>,
}

impl BookmarkCoordinator {
    pub fn new(store: Arc<dyn BookmarkStore>) -> Self {
        Self {
            store,
            bookmarks: Vec::new(),
            saving: HashSet::new(),
        }
    }

    /// Fetches the bookmark set. Called once at session start.
    pub async fn load(&mut self) -> Result<(), MurshidError> {
        self.bookmarks = self.store.list_bookmarks(BOOKMARK_FETCH_LIMIT).await?;
        debug!(count = self.bookmarks.len(), "bookmarks loaded");
        Ok(())
    }

    /// The current bookmark set, newest first.
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// True while a create request for this message id is in flight.
    pub fn is_saving(&self, message_id: &MessageId) -> bool {
        self.saving.contains(message_id)
    }

    /// Looks up the bookmark for a message id, if any.
    pub fn find(&self, message_id: &MessageId) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| &b.message_id == message_id)
    }

    /// Toggles the bookmark for a message.
    ///
    /// Deletes when one exists (optimistic local removal); otherwise
    /// creates one from a snapshot of the message's current state and
    /// inserts it at the front of the set. The saving marker is removed
    /// on every path, success or failure.
    pub async fn toggle(
        &mut self,
        target: &ChatMessage,
        chat_id: Option<&ChatId>,
    ) -> Result<(), MurshidError> {
        if let Some(existing) = self.find(&target.id).cloned() {
            self.store.delete_bookmark(&existing.id).await?;
            self.bookmarks.retain(|b| b.id != existing.id);
            debug!(message_id = %target.id, "bookmark removed");
            return Ok(());
        }

        let payload = NewBookmark {
            chat_id: chat_id.or(target.chat_id.as_ref()).cloned(),
            message_id: target.id.clone(),
            role: target.role,
            content: target.content.clone(),
            meta: target.meta.clone().unwrap_or_else(|| serde_json::json!({})),
        };

        self.saving.insert(target.id.clone());
        let result = self.store.create_bookmark(payload).await;
        self.saving.remove(&target.id);

        let bookmark = result?;
        self.bookmarks.retain(|b| b.id != bookmark.id);
        self.bookmarks.insert(0, bookmark);
        debug!(message_id = %target.id, "bookmark created");
        Ok(())
    }

    /// Recomputes every message's derived bookmark fields by id join.
    /// Messages with no matching bookmark have the fields cleared.
    pub fn apply_to(&self, messages: &mut [ChatMessage]) {
        for message in messages.iter_mut() {
            match self.find(&message.id) {
                Some(entry) => {
                    message.bookmarked = true;
                    message.bookmark_id = Some(entry.id.clone());
                    message.saved_at = Some(entry.saved_at.clone());
                    if entry.chat_id.is_some() {
                        message.chat_id = entry.chat_id.clone();
                    }
                }
                None => {
                    message.bookmarked = false;
                    message.bookmark_id = None;
                    message.saved_at = None;
                }
            }
        }
    }
}
