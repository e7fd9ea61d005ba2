//! `FrameWriter`: the opaque collaborator that actually puts bytes on the
//! wire.
//!
//! The framing codec, HPACK, connection-level flow control, and SETTINGS
//! are all out of scope for this crate (§1) — `FrameWriter` is the seam
//! where that machinery is assumed to live. The caller is responsible for
//! serializing calls to a single `FrameWriter` across every stream on a
//! connection (§5 "the FrameWriter is assumed serialized by its owner");
//! this crate never issues two concurrent writes against the same writer
//! from within one stream transport.

use std::future::Future;
use std::net::SocketAddr;

use crate::error::{Reason, StreamError};
use crate::frame::{OutboundFrame, StreamId};

/// Writes frames for one HTTP/2 connection, shared across every stream
/// transport multiplexed over it.
///
/// The wire methods are spelled as `fn(..) -> impl Future<..> + Send` rather
/// than `async fn` so that a generic `W: FrameWriter` gives the caller a
/// provably `Send` future back: plain `async fn` in a trait carries no
/// `Send` bound on its returned future, which is not enough for this crate's
/// own `recv`/`local_reset`/`remote_reset` futures — themselves awaited from
/// a dispatcher's spawned task — to be `Send` in turn.
pub trait FrameWriter: Send + Sync + 'static {
    /// Write the initial (or only) HEADERS frame for `stream_id`.
    fn write_headers(
        &self,
        stream_id: StreamId,
        headers: http::HeaderMap,
        end_of_stream: bool,
    ) -> impl Future<Output = Result<(), StreamError>> + Send;

    /// Write a DATA frame for `stream_id`.
    fn write_data(
        &self,
        stream_id: StreamId,
        frame: OutboundFrame,
    ) -> impl Future<Output = Result<(), StreamError>> + Send;

    /// Write a RST_STREAM frame for `stream_id`. Only called for
    /// `Local`-origin resets (§4.6 "wire emission").
    fn write_reset(
        &self,
        stream_id: StreamId,
        reason: Reason,
    ) -> impl Future<Output = Result<(), StreamError>> + Send;

    /// Emit a WINDOW_UPDATE for `stream_id` refunding `delta` bytes of
    /// flow-control window.
    fn update_window(
        &self,
        stream_id: StreamId,
        delta: u32,
    ) -> impl Future<Output = Result<(), StreamError>> + Send;

    /// Used only to prefix log lines; no protocol significance.
    fn local_address(&self) -> Option<SocketAddr> {
        None
    }

    /// Used only to prefix log lines; no protocol significance.
    fn remote_address(&self) -> Option<SocketAddr> {
        None
    }
}
