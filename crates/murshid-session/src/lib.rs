// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session manager for the Murshid education assistant.
//!
//! [`ChatSession`] is the client-side core behind the chat screen. It
//! owns the ordered message list and the conversation identity, and per
//! turn it:
//! - appends the user message optimistically, before any network call
//! - lazily creates the backend chat record on the first persisted turn
//! - streams completion fragments into an assistant placeholder
//! - persists both sides of the turn through detached tasks that never
//!   block the visible stream
//! - reconciles server-issued message identities with a single rekey
//!   keyed by the ephemeral id
//!
//! The session is single-owner by construction: every mutation goes
//! through `&mut self`, and detached persistence tasks report back over
//! an event channel that the owner drains. Cancellation is cooperative,
//! via a per-turn token exposed through [`StopHandle`].

pub mod bookmarks;
pub mod history;

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use murshid_core::{
    BookmarkStore, ChatId, ChatListNotifier, ChatMessage, ChatStore, MessageId, MurshidError,
    NewMessage, PromptRequest, PromptStreamer, Role, SavedMessage,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bookmarks::BookmarkCoordinator;

/// Title given to a conversation created lazily on first send.
const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Literal shown as an assistant turn when a stream fails.
const APOLOGY: &str = "Something went wrong. Please try again.";

/// Options for constructing a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Resume an existing conversation instead of starting ephemeral.
    pub chat_id: Option<ChatId>,
    /// History to hydrate the message list with; may be empty for an
    /// existing conversation.
    pub initial_messages: Vec<ChatMessage>,
    /// Persist turns through the chat-record API.
    pub persist: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chat_id: None,
            initial_messages: Vec::new(),
            persist: true,
        }
    }
}

/// Completion results of detached persistence tasks, applied back to the
/// session at drain points.
#[derive(Debug)]
enum SessionEvent {
    UserMessageSaved {
        chat_id: ChatId,
        saved: SavedMessage,
    },
    AssistantMessageSaved {
        local_id: MessageId,
        chat_id: ChatId,
        saved: SavedMessage,
    },
    /// The task finished with nothing to apply (failure already logged).
    /// Keeps the in-flight count accurate.
    PersistSettled,
}

/// How a turn's fragment stream ended.
enum StreamOutcome {
    Completed,
    Aborted,
    Failed(MurshidError),
}

/// Cloneable handle that cancels the session's active stream, if any.
///
/// A fresh token is installed for every turn and cleared when the turn
/// settles; tokens are never reused across turns.
#[derive(Clone, Default)]
pub struct StopHandle {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl StopHandle {
    /// Requests cancellation of the active stream. No-op when idle.
    pub fn stop(&self) {
        if let Ok(guard) = self.active.lock()
            && let Some(token) = guard.as_ref()
        {
            token.cancel();
        }
    }

    fn install(&self, token: CancellationToken) {
        if let Ok(mut guard) = self.active.lock() {
            *guard = Some(token);
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.active.lock() {
            *guard = None;
        }
    }
}

/// The conversation state machine driving one chat screen.
pub struct ChatSession {
    streamer: Arc<dyn PromptStreamer>,
    chats: Arc<dyn ChatStore>,
    notifier: Arc<dyn ChatListNotifier>,
    bookmarks: BookmarkCoordinator,

    chat_id: Option<ChatId>,
    messages: Vec<ChatMessage>,
    input: String,
    loading: bool,
    streaming: bool,
    unauthorized: bool,
    error: Option<String>,
    article_eligible: Option<bool>,
    persist: bool,
    /// Set when a chat record was just created; the first successful
    /// message persistence then triggers exactly one chat-list refresh.
    pending_initial_sync: bool,

    stop_handle: StopHandle,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    inflight: usize,
    fragment_tx: Option<mpsc::UnboundedSender<String>>,
}

impl ChatSession {
    /// Creates a session for a fresh, ephemeral conversation.
    pub fn new(
        streamer: Arc<dyn PromptStreamer>,
        chats: Arc<dyn ChatStore>,
        bookmarks: Arc<dyn BookmarkStore>,
        notifier: Arc<dyn ChatListNotifier>,
    ) -> Self {
        Self::with_options(streamer, chats, bookmarks, notifier, SessionOptions::default())
    }

    /// Creates a session with explicit options (resume, no-persist).
    pub fn with_options(
        streamer: Arc<dyn PromptStreamer>,
        chats: Arc<dyn ChatStore>,
        bookmarks: Arc<dyn BookmarkStore>,
        notifier: Arc<dyn ChatListNotifier>,
        options: SessionOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            streamer,
            chats,
            notifier,
            bookmarks: BookmarkCoordinator::new(bookmarks),
            chat_id: options.chat_id,
            messages: options.initial_messages,
            input: String::new(),
            loading: false,
            streaming: false,
            unauthorized: false,
            error: None,
            article_eligible: None,
            persist: options.persist,
            pending_initial_sync: false,
            stop_handle: StopHandle::default(),
            events_tx,
            events_rx,
            inflight: 0,
            fragment_tx: None,
        }
    }

    // --- Read accessors ---

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// True while waiting for the first token of a turn.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// True while the fragment sequence is still open.
    pub fn streaming(&self) -> bool {
        self.streaming
    }

    /// True while a turn is active (loading or streaming).
    pub fn is_active(&self) -> bool {
        self.loading || self.streaming
    }

    pub fn unauthorized(&self) -> bool {
        self.unauthorized
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Per-turn eligibility signal from the last committed assistant
    /// message's meta; cleared when a new prompt is submitted.
    pub fn article_eligible(&self) -> Option<bool> {
        self.article_eligible
    }

    pub fn bookmarks(&self) -> &BookmarkCoordinator {
        &self.bookmarks
    }

    // --- Input buffer ---

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    // --- Operations ---

    /// Submits the input buffer as a prompt.
    ///
    /// No-op when the buffer is empty/whitespace or when a turn is
    /// already active (at most one active turn per session; rejected,
    /// not queued). Failures land in session state (`error`,
    /// `unauthorized`) rather than a return value: the turn itself is
    /// always contained and the session accepts the next submit.
    pub async fn send_prompt(&mut self) {
        let prompt = self.input.trim().to_string();
        if prompt.is_empty() {
            return;
        }
        if self.is_active() {
            debug!("send rejected: a turn is already active");
            return;
        }

        // Apply anything left over from the previous turn first.
        self.drain_events().await;

        self.loading = true;
        self.error = None;
        // New input invalidates the previous turn's eligibility signal.
        self.article_eligible = None;

        // History context for this turn: everything before it, which
        // excludes the user message appended below and the placeholder.
        let prior = history::build_history(&self.messages);

        self.messages
            .push(ChatMessage::user(prompt.clone(), self.chat_id.clone()));
        self.input.clear();

        let chat_id = self.ensure_chat().await;
        if let Some(chat_id) = &chat_id {
            self.spawn_persist(
                chat_id.clone(),
                NewMessage::text(Role::User, prompt.clone()),
                None,
            );
        }

        let placeholder = ChatMessage::assistant_placeholder(self.chat_id.clone());
        let reply_id = placeholder.id.clone();
        self.messages.push(placeholder);

        let cancel = CancellationToken::new();
        self.stop_handle.install(cancel.clone());
        self.streaming = true;

        let request = PromptRequest {
            prompt,
            history: prior,
        };
        let outcome = self.run_stream(request, &reply_id, &cancel).await;

        self.stop_handle.clear();
        self.streaming = false;
        self.loading = false;

        self.finish_turn(outcome, &reply_id);
        self.drain_events().await;
    }

    /// Requests cancellation of the active stream. No-op when idle.
    pub fn stop(&self) {
        self.stop_handle.stop();
    }

    /// A cloneable handle for cancelling from outside the owner (a stop
    /// button, a Ctrl-C handler).
    pub fn stop_handle(&self) -> StopHandle {
        self.stop_handle.clone()
    }

    /// Starts a fresh conversation: clears identity, messages, input,
    /// and error state.
    pub fn reset(&mut self) {
        self.chat_id = None;
        self.messages.clear();
        self.input.clear();
        self.error = None;
    }

    /// Opens an existing conversation: replaces identity and history,
    /// then re-joins bookmark state onto the new messages.
    pub fn hydrate(&mut self, chat_id: ChatId, messages: Vec<ChatMessage>) {
        self.chat_id = Some(chat_id);
        self.messages = messages;
        self.error = None;
        self.pending_initial_sync = false;
        self.refresh_bookmark_fields();
    }

    /// Fetches the bookmark set and joins it onto the messages. Called
    /// once at session start.
    pub async fn load_bookmarks(&mut self) {
        match self.bookmarks.load().await {
            Ok(()) => self.refresh_bookmark_fields(),
            Err(e) if e.is_unauthorized() => self.unauthorized = true,
            Err(e) => warn!(error = %e, "failed to load bookmarks"),
        }
    }

    /// Toggles the bookmark for a message and recomputes the join.
    /// Unauthorized sets the shared flag; other failures are logged only.
    pub async fn toggle_bookmark(&mut self, message_id: &MessageId) {
        let Some(target) = self.messages.iter().find(|m| &m.id == message_id).cloned() else {
            return;
        };
        match self.bookmarks.toggle(&target, self.chat_id.as_ref()).await {
            Ok(()) => {}
            Err(e) if e.is_unauthorized() => self.unauthorized = true,
            Err(e) => warn!(message_id = %message_id, error = %e, "bookmark toggle failed"),
        }
        self.refresh_bookmark_fields();
    }

    /// Mirrors streamed fragments to a channel (live rendering, tests).
    /// Only the most recent subscriber receives fragments.
    pub fn subscribe_fragments(&mut self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.fragment_tx = Some(tx);
        rx
    }

    /// Drops the fragment mirror; the subscriber's receiver then ends.
    pub fn clear_fragment_sink(&mut self) {
        self.fragment_tx = None;
    }

    /// Applies all persistence completions that have already arrived.
    pub async fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event).await;
        }
    }

    /// Waits for every in-flight persistence task to settle and applies
    /// the results. Turn completion never waits on this; callers that
    /// need a fully reconciled view (tests, shutdown) do.
    pub async fn settle(&mut self) {
        while self.inflight > 0 {
            match self.events_rx.recv().await {
                Some(event) => self.apply_event(event).await,
                None => break,
            }
        }
    }

    // --- Turn internals ---

    /// Drains the fragment stream for one turn, applying fragments in
    /// delivery order until the stream ends, fails, or the token fires.
    async fn run_stream(
        &mut self,
        request: PromptRequest,
        reply_id: &MessageId,
        cancel: &CancellationToken,
    ) -> StreamOutcome {
        let mut stream = match self.streamer.open_stream(request).await {
            Ok(stream) => stream,
            Err(e) if e.is_aborted() => return StreamOutcome::Aborted,
            Err(e) => return StreamOutcome::Failed(e),
        };

        let mut fragments = 0u64;
        let outcome = loop {
            tokio::select! {
                _ = cancel.cancelled() => break StreamOutcome::Aborted,
                next = stream.next() => match next {
                    Some(Ok(fragment)) => {
                        fragments += 1;
                        self.apply_fragment(reply_id, &fragment);
                    }
                    Some(Err(e)) if e.is_aborted() => break StreamOutcome::Aborted,
                    Some(Err(e)) => break StreamOutcome::Failed(e),
                    None => break StreamOutcome::Completed,
                },
            }
        };
        // Dropping the stream aborts the underlying request.
        drop(stream);
        debug!(fragments, "fragment stream closed");
        outcome
    }

    /// Applies one streamed fragment to the placeholder.
    ///
    /// The first non-empty fragment ends the loading phase ("waiting for
    /// first token"); streaming stays true until the sequence ends.
    fn apply_fragment(&mut self, reply_id: &MessageId, fragment: &str) {
        if self.loading && !fragment.is_empty() {
            self.loading = false;
        }
        if let Some(message) = self.messages.iter_mut().find(|m| &m.id == reply_id) {
            message.content.push_str(fragment);
        }
        if let Some(tx) = &self.fragment_tx
            && tx.send(fragment.to_string()).is_err()
        {
            self.fragment_tx = None;
        }
    }

    fn finish_turn(&mut self, outcome: StreamOutcome, reply_id: &MessageId) {
        match outcome {
            StreamOutcome::Completed => {
                let content = self
                    .messages
                    .iter()
                    .find(|m| &m.id == reply_id)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                if self.persist
                    && let Some(chat_id) = self.chat_id.clone()
                {
                    self.spawn_persist(
                        chat_id,
                        NewMessage::text(Role::Assistant, content),
                        Some(reply_id.clone()),
                    );
                }
            }
            StreamOutcome::Aborted => {
                // Cancellation is not an error. An untouched placeholder
                // disappears; partial content is kept and becomes the
                // final content for persistence.
                let partial = self
                    .messages
                    .iter()
                    .find(|m| &m.id == reply_id)
                    .filter(|m| m.has_content())
                    .map(|m| m.content.clone());
                match partial {
                    None => self.messages.retain(|m| &m.id != reply_id),
                    Some(content) => {
                        if self.persist
                            && let Some(chat_id) = self.chat_id.clone()
                        {
                            self.spawn_persist(
                                chat_id,
                                NewMessage::text(Role::Assistant, content),
                                Some(reply_id.clone()),
                            );
                        }
                    }
                }
            }
            StreamOutcome::Failed(e) if e.is_unauthorized() => {
                info!("stream unauthorized; discarding placeholder");
                self.unauthorized = true;
                self.messages.retain(|m| &m.id != reply_id);
            }
            StreamOutcome::Failed(e) => {
                warn!(error = %e, "chat stream failed");
                self.error = Some(APOLOGY.to_string());
                let placeholder_empty = self
                    .messages
                    .iter()
                    .find(|m| &m.id == reply_id)
                    .is_some_and(|m| !m.has_content());
                if placeholder_empty {
                    if let Some(message) =
                        self.messages.iter_mut().find(|m| &m.id == reply_id)
                    {
                        message.content = APOLOGY.to_string();
                    }
                } else {
                    let mut apology =
                        ChatMessage::assistant_placeholder(self.chat_id.clone());
                    apology.content = APOLOGY.to_string();
                    self.messages.push(apology);
                }
            }
        }
    }

    /// Creates the backend chat record on the first persisted turn.
    ///
    /// Creation failure degrades to an ephemeral conversation: the turn
    /// still runs, nothing is persisted, and no notifications fire.
    async fn ensure_chat(&mut self) -> Option<ChatId> {
        if !self.persist {
            return None;
        }
        if self.chat_id.is_some() {
            return self.chat_id.clone();
        }
        match self.chats.create_chat(DEFAULT_CHAT_TITLE).await {
            Ok(record) => {
                info!(chat_id = %record.id, "chat record created");
                self.chat_id = Some(record.id.clone());
                self.pending_initial_sync = true;
                self.notifier.chat_created(&record).await;
                Some(record.id)
            }
            Err(e) => {
                warn!(error = %e, "failed to create chat, continuing ephemeral");
                None
            }
        }
    }

    /// Spawns a detached persistence task for one message. The task
    /// reports through the event channel; the turn never awaits it.
    fn spawn_persist(&mut self, chat_id: ChatId, message: NewMessage, rekey: Option<MessageId>) {
        let store = self.chats.clone();
        let tx = self.events_tx.clone();
        self.inflight += 1;
        tokio::spawn(async move {
            let role = message.role;
            match store.append_message(&chat_id, message).await {
                Ok(saved) => {
                    let event = match rekey {
                        Some(local_id) => SessionEvent::AssistantMessageSaved {
                            local_id,
                            chat_id,
                            saved,
                        },
                        None => SessionEvent::UserMessageSaved { chat_id, saved },
                    };
                    let _ = tx.send(event);
                }
                Err(e) => {
                    // Best-effort: local state remains the source of
                    // truth for this session.
                    warn!(role = %role, error = %e, "message persistence failed");
                    let _ = tx.send(SessionEvent::PersistSettled);
                }
            }
        });
    }

    async fn apply_event(&mut self, event: SessionEvent) {
        self.inflight = self.inflight.saturating_sub(1);
        match event {
            SessionEvent::UserMessageSaved { chat_id, saved } => {
                self.notifier.chat_updated(&chat_id, &saved.created_at).await;
                if self.pending_initial_sync {
                    self.pending_initial_sync = false;
                    self.notifier.refresh().await;
                }
            }
            SessionEvent::AssistantMessageSaved {
                local_id,
                chat_id,
                saved,
            } => {
                let updated_at = saved.created_at.clone();
                self.article_eligible = saved
                    .meta
                    .as_ref()
                    .and_then(|m| m.get("articleEligible"))
                    .and_then(Value::as_bool);
                self.rekey_message(&local_id, &chat_id, saved);
                self.notifier.chat_updated(&chat_id, &updated_at).await;
                if self.pending_initial_sync {
                    self.pending_initial_sync = false;
                    self.notifier.refresh().await;
                }
            }
            SessionEvent::PersistSettled => {}
        }
    }

    /// Replaces the ephemeral id with the server-issued identity in one
    /// update. Keyed by the old id, never by list position: fragment
    /// appends and later turns may have moved the message since the
    /// persistence call was issued.
    fn rekey_message(&mut self, local_id: &MessageId, chat_id: &ChatId, saved: SavedMessage) {
        let Some(message) = self.messages.iter_mut().find(|m| &m.id == local_id) else {
            debug!(message_id = %local_id, "persisted message no longer present, skipping rekey");
            return;
        };
        message.id = saved.id;
        message.meta = saved.meta;
        message.chat_id = Some(chat_id.clone());
    }

    fn refresh_bookmark_fields(&mut self) {
        self.bookmarks.apply_to(&mut self.messages);
    }
}
