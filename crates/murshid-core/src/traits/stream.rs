// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt stream trait: the network primitive behind a chat turn.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::MurshidError;
use crate::types::PromptRequest;

/// A lazy, finite, non-restartable sequence of assistant text fragments,
/// yielded in the exact order the backend emitted them.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, MurshidError>> + Send>>;

/// Opens a cancellable stream of completion fragments for a prompt.
///
/// Authorization failures surface as [`MurshidError::Unauthorized`] before
/// the first fragment; any other non-success response surfaces as
/// [`MurshidError::StreamRequest`]. Dropping the returned stream aborts
/// the underlying request, which is how the session's cancellation token
/// takes effect.
#[async_trait]
pub trait PromptStreamer: Send + Sync {
    async fn open_stream(&self, request: PromptRequest) -> Result<FragmentStream, MurshidError>;
}
