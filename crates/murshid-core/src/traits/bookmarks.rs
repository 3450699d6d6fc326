// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookmark persistence trait.

use async_trait::async_trait;

use crate::error::MurshidError;
use crate::types::{Bookmark, NewBookmark};

/// The bookmark API backing the bookmark coordinator.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Fetches the signed-in identity's bookmarks, newest first.
    async fn list_bookmarks(&self, limit: usize) -> Result<Vec<Bookmark>, MurshidError>;

    /// Creates a bookmark from a message snapshot.
    async fn create_bookmark(&self, bookmark: NewBookmark) -> Result<Bookmark, MurshidError>;

    /// Deletes a bookmark by its own id (not the message id).
    async fn delete_bookmark(&self, bookmark_id: &str) -> Result<(), MurshidError>;
}
