// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Murshid session and integration tests.
//!
//! Provides deterministic, CI-runnable collaborator doubles so the chat
//! session core can be exercised without a backend:
//!
//! - [`MockStreamer`] - scripted prompt streams (fragments, failures, stalls)
//! - [`InMemoryChatStore`] - chat records with failure injection
//! - [`InMemoryBookmarkStore`] - bookmark set with failure injection
//! - [`RecordingNotifier`] - captures chat-list notifications

pub mod mock_backend;
pub mod mock_stream;
pub mod notifier;

pub use mock_backend::{AppendedMessage, InMemoryBookmarkStore, InMemoryChatStore};
pub use mock_stream::{MockStreamer, StreamScript};
pub use notifier::{NotifierEvent, RecordingNotifier};
