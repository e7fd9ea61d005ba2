//! The high-level messages exchanged across the transport boundary: what the
//! dispatcher hands to the application (`ReceivedMessage`) and what the
//! application hands to the transport to send (`OutgoingMessage`).
//!
//! Request/Response *construction* beyond wiring headers onto the
//! appropriate `http` crate type is out of scope (§1) — this module only
//! carries the pieces the state machine itself must reason about: whether a
//! body is definitively empty (so `send` knows whether `END_STREAM` belongs
//! on the initial HEADERS) and how to pull the next frame.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::error::StreamError;
use crate::frame::{Frame, OutboundFrame};
use crate::queue::FrameQueue;

/// The received body of a message: either definitely empty (the initial
/// HEADERS carried `END_STREAM`) or backed by the stream's inbound frame
/// queue.
///
/// Mirrors §3's "lazy, finite, non-restartable sequence of Frames": once
/// `next` returns `None` or an `Err`, subsequent calls keep returning the
/// same terminal result.
pub struct RecvBody {
    inner: RecvBodyInner,
    done: bool,
}

enum RecvBodyInner {
    Empty,
    Queued(Arc<FrameQueue>),
}

impl RecvBody {
    pub(crate) fn empty() -> Self {
        RecvBody {
            inner: RecvBodyInner::Empty,
            done: false,
        }
    }

    pub(crate) fn queued(queue: Arc<FrameQueue>) -> Self {
        RecvBody {
            inner: RecvBodyInner::Queued(queue),
            done: false,
        }
    }

    /// True if the initial HEADERS already established this body as empty.
    pub fn is_known_empty(&self) -> bool {
        matches!(self.inner, RecvBodyInner::Empty)
    }

    /// Pull the next frame, if any.
    ///
    /// Returns `None` once the body has ended (cleanly, or the frame queue
    /// has already delivered its terminal condition on a prior call).
    pub async fn next(&mut self) -> Option<Result<Frame, StreamError>> {
        if self.done {
            return None;
        }
        match &self.inner {
            RecvBodyInner::Empty => {
                self.done = true;
                None
            }
            RecvBodyInner::Queued(queue) => match queue.read().await {
                Ok(Some(frame)) => Some(Ok(frame)),
                Ok(None) => {
                    self.done = true;
                    None
                }
                Err(e) => {
                    self.done = true;
                    Some(Err(e))
                }
            },
        }
    }
}

/// A received message: the initial HEADERS plus the body that follows.
pub enum ReceivedMessage {
    Request(http::Request<RecvBody>),
    Response(http::Response<RecvBody>),
}

impl ReceivedMessage {
    pub fn headers(&self) -> &http::HeaderMap {
        match self {
            ReceivedMessage::Request(req) => req.headers(),
            ReceivedMessage::Response(resp) => resp.headers(),
        }
    }

    pub fn body_mut(&mut self) -> &mut RecvBody {
        match self {
            ReceivedMessage::Request(req) => req.body_mut(),
            ReceivedMessage::Response(resp) => resp.body_mut(),
        }
    }
}

/// The outbound body an application drains through the transport's `send`.
///
/// Modeled after the donor stack's `http_body::Body` (`is_end_stream` +
/// `poll_frame`), specialized to this crate's own [`Frame`] vocabulary since
/// the wire codec (and therefore `http_body::Frame`'s HPACK-aware shape) is
/// out of scope here.
pub trait OutboundBody: Send {
    /// True if this body is known to be empty without polling — lets `send`
    /// decide whether `END_STREAM` belongs on the initial HEADERS (§4.4
    /// step 1) without an extra poll.
    fn is_empty(&self) -> bool;

    /// Pull the next frame to write. `Poll::Ready(None)` means the body has
    /// been fully drained.
    fn poll_next_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<OutboundFrame>>;
}

/// An empty outbound body — the common case for a GET-style request or a
/// status-only response.
pub struct EmptyBody;

impl OutboundBody for EmptyBody {
    fn is_empty(&self) -> bool {
        true
    }

    fn poll_next_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<OutboundFrame>> {
        Poll::Ready(None)
    }
}

/// The message an application hands to the transport to send.
pub enum OutgoingMessage<B> {
    Request(http::Request<B>),
    Response(http::Response<B>),
}

impl<B: OutboundBody> OutgoingMessage<B> {
    pub fn headers(&self) -> &http::HeaderMap {
        match self {
            OutgoingMessage::Request(req) => req.headers(),
            OutgoingMessage::Response(resp) => resp.headers(),
        }
    }

    pub fn body(&self) -> &B {
        match self {
            OutgoingMessage::Request(req) => req.body(),
            OutgoingMessage::Response(resp) => resp.body(),
        }
    }

    pub fn into_body(self) -> B {
        match self {
            OutgoingMessage::Request(req) => req.into_body(),
            OutgoingMessage::Response(resp) => resp.into_body(),
        }
    }
}
