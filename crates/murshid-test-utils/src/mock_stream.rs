// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted prompt streamer for deterministic streaming tests.
//!
//! Each `open_stream` call consumes one [`StreamScript`] from a FIFO
//! queue. A script can fail at open, yield fragments then complete, fail
//! mid-stream, or stall: yield its fragments and then park forever,
//! notifying the test so it can cancel at a known point.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use murshid_core::{FragmentStream, MurshidError, PromptRequest, PromptStreamer};
use tokio::sync::{Mutex, Notify};

enum Ending {
    Complete,
    Fail(MurshidError),
    Stall,
}

/// One scripted response of the mock streamer.
pub struct StreamScript {
    open_error: Option<MurshidError>,
    fragments: Vec<String>,
    ending: Ending,
}

impl StreamScript {
    /// Yields the given fragments, then ends normally.
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            open_error: None,
            fragments: fragments.into_iter().map(Into::into).collect(),
            ending: Ending::Complete,
        }
    }

    /// Fails before any fragment is yielded.
    pub fn failing_open(error: MurshidError) -> Self {
        Self {
            open_error: Some(error),
            fragments: Vec::new(),
            ending: Ending::Complete,
        }
    }

    /// Yields the given fragments, then fails with the error.
    pub fn failing_after<I, S>(fragments: I, error: MurshidError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            open_error: None,
            fragments: fragments.into_iter().map(Into::into).collect(),
            ending: Ending::Fail(error),
        }
    }

    /// Yields the given fragments, then parks forever. The streamer's
    /// stall notifier fires when the parked tail is first polled.
    pub fn stalling_after<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            open_error: None,
            fragments: fragments.into_iter().map(Into::into).collect(),
            ending: Ending::Stall,
        }
    }
}

impl Default for StreamScript {
    fn default() -> Self {
        Self::fragments(["mock reply"])
    }
}

/// A mock prompt streamer that replays scripted responses.
///
/// When the script queue is empty, a default single-fragment reply is
/// streamed.
pub struct MockStreamer {
    scripts: Mutex<VecDeque<StreamScript>>,
    requests: Mutex<Vec<PromptRequest>>,
    stalled: Arc<Notify>,
}

impl MockStreamer {
    /// Creates a streamer with an empty script queue.
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            stalled: Arc::new(Notify::new()),
        }
    }

    /// Creates a streamer pre-loaded with the given scripts.
    pub fn with_scripts(scripts: Vec<StreamScript>) -> Self {
        Self {
            scripts: Mutex::new(VecDeque::from(scripts)),
            requests: Mutex::new(Vec::new()),
            stalled: Arc::new(Notify::new()),
        }
    }

    /// Queues another script.
    pub async fn push_script(&self, script: StreamScript) {
        self.scripts.lock().await.push_back(script);
    }

    /// Requests captured from every `open_stream` call, in order.
    pub async fn requests(&self) -> Vec<PromptRequest> {
        self.requests.lock().await.clone()
    }

    /// Notified when a stalling script has yielded all its fragments and
    /// parked; await this before cancelling to hit a deterministic point.
    pub fn stalled(&self) -> Arc<Notify> {
        self.stalled.clone()
    }
}

impl Default for MockStreamer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptStreamer for MockStreamer {
    async fn open_stream(&self, request: PromptRequest) -> Result<FragmentStream, MurshidError> {
        self.requests.lock().await.push(request);

        let script = self
            .scripts
            .lock()
            .await
            .pop_front()
            .unwrap_or_default();

        if let Some(error) = script.open_error {
            return Err(error);
        }

        let fragments: Vec<Result<String, MurshidError>> =
            script.fragments.into_iter().map(Ok).collect();
        let head = stream::iter(fragments);

        match script.ending {
            Ending::Complete => Ok(Box::pin(head)),
            Ending::Fail(error) => {
                let tail = stream::iter(vec![Err(error)]);
                Ok(Box::pin(head.chain(tail)))
            }
            Ending::Stall => {
                let notify = self.stalled.clone();
                let tail = stream::once(async move {
                    notify.notify_one();
                    futures::future::pending::<Result<String, MurshidError>>().await
                });
                Ok(Box::pin(head.chain(tail)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> PromptRequest {
        PromptRequest {
            prompt: prompt.into(),
            history: Vec::new(),
        }
    }

    #[tokio::test]
    async fn scripts_replay_in_order() {
        let streamer = MockStreamer::with_scripts(vec![
            StreamScript::fragments(["a", "b"]),
            StreamScript::fragments(["c"]),
        ]);

        let mut first = streamer.open_stream(request("one")).await.unwrap();
        let mut collected = String::new();
        while let Some(fragment) = first.next().await {
            collected.push_str(&fragment.unwrap());
        }
        assert_eq!(collected, "ab");

        let mut second = streamer.open_stream(request("two")).await.unwrap();
        assert_eq!(second.next().await.unwrap().unwrap(), "c");
        assert!(second.next().await.is_none());

        let requests = streamer.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].prompt, "two");
    }

    #[tokio::test]
    async fn empty_queue_falls_back_to_default_reply() {
        let streamer = MockStreamer::new();
        let mut stream = streamer.open_stream(request("any")).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "mock reply");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn failing_open_surfaces_before_fragments() {
        let streamer =
            MockStreamer::with_scripts(vec![StreamScript::failing_open(MurshidError::Unauthorized)]);
        let err = match streamer.open_stream(request("x")).await {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn stalling_script_notifies_when_parked() {
        let streamer = MockStreamer::with_scripts(vec![StreamScript::stalling_after(["partial"])]);
        let stalled = streamer.stalled();

        let mut stream = streamer.open_stream(request("x")).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), "partial");

        let poll_task = tokio::spawn(async move { stream.next().await });
        stalled.notified().await;
        poll_task.abort();
    }
}
