// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording chat-list notifier.

use std::sync::Mutex;

use async_trait::async_trait;
use murshid_core::{ChatId, ChatListNotifier, ChatRecord};

/// One captured chat-list notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEvent {
    Created { id: ChatId, title: String },
    Updated { id: ChatId, updated_at: String },
    Refreshed,
}

/// A [`ChatListNotifier`] that records every notification for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured events, in arrival order.
    pub fn events(&self) -> Vec<NotifierEvent> {
        self.events.lock().expect("events lock").clone()
    }

    pub fn created_count(&self) -> usize {
        self.count(|e| matches!(e, NotifierEvent::Created { .. }))
    }

    pub fn updated_count(&self) -> usize {
        self.count(|e| matches!(e, NotifierEvent::Updated { .. }))
    }

    pub fn refresh_count(&self) -> usize {
        self.count(|e| matches!(e, NotifierEvent::Refreshed))
    }

    fn count(&self, predicate: impl Fn(&NotifierEvent) -> bool) -> usize {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .filter(|e| predicate(e))
            .count()
    }

    fn push(&self, event: NotifierEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}

#[async_trait]
impl ChatListNotifier for RecordingNotifier {
    async fn chat_created(&self, chat: &ChatRecord) {
        self.push(NotifierEvent::Created {
            id: chat.id.clone(),
            title: chat.title.clone(),
        });
    }

    async fn chat_updated(&self, id: &ChatId, updated_at: &str) {
        self.push(NotifierEvent::Updated {
            id: id.clone(),
            updated_at: updated_at.to_string(),
        });
    }

    async fn refresh(&self) {
        self.push(NotifierEvent::Refreshed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notifier_records_in_order() {
        let notifier = RecordingNotifier::new();
        let record = ChatRecord {
            id: ChatId("c-1".into()),
            title: "New Chat".into(),
            created_at: None,
            updated_at: None,
        };

        notifier.chat_created(&record).await;
        notifier.chat_updated(&record.id, "2026-01-01T00:00:00Z").await;
        notifier.refresh().await;

        let events = notifier.events();
        assert_eq!(events.len(), 3);
        assert_eq!(notifier.created_count(), 1);
        assert_eq!(notifier.updated_count(), 1);
        assert_eq!(notifier.refresh_count(), 1);
        assert_eq!(
            events[0],
            NotifierEvent::Created {
                id: ChatId("c-1".into()),
                title: "New Chat".into()
            }
        );
    }
}
