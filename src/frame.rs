//! Wire-adjacent types the core exchanges with its `FrameWriter` collaborator
//! and with the application.
//!
//! The actual HTTP/2 framing codec (parsing bytes off the socket, HPACK,
//! CONTINUATION reassembly) is out of scope for this crate — see the crate
//! docs. What lives here is the small vocabulary the state machine itself
//! needs: a stream identifier, the post-decode frame shapes the admission
//! logic consumes, and the role that picks which message type is sent vs.
//! received.

use bytes::Bytes;
use std::fmt;

/// An HTTP/2 stream identifier.
///
/// Odd values are client-initiated; even values are reserved for server
/// push, which this core does not originate (see Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u32);

impl StreamId {
    /// The identifier a client uses for its first request.
    pub const FIRST_CLIENT_ID: StreamId = StreamId(1);

    pub const fn new(id: u32) -> Self {
        StreamId(id)
    }

    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub const fn is_client_initiated(self) -> bool {
        self.0 % 2 == 1
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StreamId {
    fn from(id: u32) -> Self {
        StreamId(id)
    }
}

/// A callback invoked by the application once it is done with a `Data`
/// frame's bytes. Invoking it causes a `WINDOW_UPDATE` to be emitted for the
/// stream by the amount consumed.
///
/// Boxed because the admission logic has no knowledge of the connection's
/// flow-control bookkeeping beyond "tell the FrameWriter to refund N bytes".
pub type WindowRefund = Box<dyn FnOnce(usize) + Send + Sync>;

/// A body frame, after the framing codec has decoded it and the admission
/// logic has validated it against the stream's current state.
pub enum Frame {
    /// A `DATA` frame.
    Data {
        bytes: Bytes,
        end_of_stream: bool,
        /// Call once the bytes have been consumed to refund flow-control
        /// window for this stream. `None` when no refund is owed (e.g. a
        /// zero-length frame).
        window_refund: Option<WindowRefund>,
    },
    /// A `HEADERS` frame received after `DATA` frames on the same
    /// half-stream — trailing metadata with `END_STREAM` set.
    Trailers { headers: http::HeaderMap },
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Data {
                bytes,
                end_of_stream,
                ..
            } => f
                .debug_struct("Frame::Data")
                .field("len", &bytes.len())
                .field("end_of_stream", end_of_stream)
                .finish(),
            Frame::Trailers { headers } => f
                .debug_struct("Frame::Trailers")
                .field("headers", headers)
                .finish(),
        }
    }
}

impl Frame {
    pub fn is_end_of_stream(&self) -> bool {
        match self {
            Frame::Data { end_of_stream, .. } => *end_of_stream,
            Frame::Trailers { .. } => true,
        }
    }

    /// Build a `Data` frame carrying no window-refund callback (used in
    /// tests and for frames the caller has decided not to flow-control).
    pub fn data(bytes: impl Into<Bytes>, end_of_stream: bool) -> Self {
        Frame::Data {
            bytes: bytes.into(),
            end_of_stream,
            window_refund: None,
        }
    }

    pub fn trailers(headers: http::HeaderMap) -> Self {
        Frame::Trailers { headers }
    }
}

/// A frame produced by the application's outbound body.
///
/// Distinct from [`Frame`]: the inbound vocabulary carries a window-refund
/// callback (a flow-control concept that only exists for bytes we have
/// received), which an outbound frame has no use for.
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    Data { bytes: Bytes, end_of_stream: bool },
    /// Trailers are, on the wire, a second `HEADERS` frame — the
    /// `FrameWriter` routes these through `write_headers`, not
    /// `write_data` (§6).
    Trailers { headers: http::HeaderMap },
}

impl OutboundFrame {
    pub fn is_end_of_stream(&self) -> bool {
        match self {
            OutboundFrame::Data { end_of_stream, .. } => *end_of_stream,
            OutboundFrame::Trailers { .. } => true,
        }
    }

    pub fn data(bytes: impl Into<Bytes>, end_of_stream: bool) -> Self {
        OutboundFrame::Data {
            bytes: bytes.into(),
            end_of_stream,
        }
    }
}

/// An inbound frame as handed to [`crate::transport::StreamTransport::recv`]
/// by the dispatcher, after the wire codec (out of scope here, §1) has
/// decoded it but before admission has validated it against stream state.
pub enum Http2Frame {
    /// A `HEADERS` frame — either the initial headers or, if received after
    /// body `DATA`, trailers.
    Headers {
        headers: http::HeaderMap,
        end_of_stream: bool,
    },
    /// A `DATA` frame.
    Data {
        bytes: Bytes,
        end_of_stream: bool,
        window_refund: Option<WindowRefund>,
    },
    /// A `RST_STREAM` frame.
    Reset { reason: crate::error::Reason },
}

impl fmt::Debug for Http2Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Http2Frame::Headers {
                headers,
                end_of_stream,
            } => f
                .debug_struct("Http2Frame::Headers")
                .field("headers", headers)
                .field("end_of_stream", end_of_stream)
                .finish(),
            Http2Frame::Data {
                bytes,
                end_of_stream,
                ..
            } => f
                .debug_struct("Http2Frame::Data")
                .field("len", &bytes.len())
                .field("end_of_stream", end_of_stream)
                .finish(),
            Http2Frame::Reset { reason } => {
                f.debug_struct("Http2Frame::Reset").field("reason", reason).finish()
            }
        }
    }
}

/// Selects which high-level message type this side sends vs. receives.
///
/// A `Client` sends a [`http::Request`] and receives a
/// [`http::Response`]; a `Server` does the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

/// Headers forbidden in HTTP/2 by RFC 9113 §8.2.2, regardless of direction.
///
/// Their presence on either the initial HEADERS or on trailers is a protocol
/// error (§3 invariant 5).
pub const CONNECTION_SPECIFIC_HEADERS: [&str; 5] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
];

/// Returns the first connection-specific header name found in `headers`, if
/// any.
pub fn find_connection_specific_header(headers: &http::HeaderMap) -> Option<&'static str> {
    CONNECTION_SPECIFIC_HEADERS
        .iter()
        .find(|name| headers.contains_key(**name))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_id_parity() {
        assert!(StreamId::new(1).is_client_initiated());
        assert!(!StreamId::new(2).is_client_initiated());
    }

    #[test]
    fn detects_connection_header() {
        let mut headers = http::HeaderMap::new();
        headers.insert("connection", http::HeaderValue::from_static("close"));
        assert_eq!(find_connection_specific_header(&headers), Some("connection"));
    }

    #[test]
    fn clean_headers_pass() {
        let mut headers = http::HeaderMap::new();
        headers.insert("content-type", http::HeaderValue::from_static("text/plain"));
        assert_eq!(find_connection_specific_header(&headers), None);
    }
}
