//! Error and reason-code types for the per-stream transport.
//!
//! Mirrors the donor crate's split between a peer/protocol facing error
//! (`StreamError`, analogous to `h2::Error`) and an implementation-bug
//! assertion type (`IllegalState`, analogous to `h2::proto::UserError`).

use std::{error, fmt, io};

/// Who caused a stream to be reset.
///
/// The tag determines whether a `RST_STREAM` frame must still be written to
/// the wire (`Local` → yes, we are the ones aborting) or whether the abort is
/// already the consequence of one we received (`Remote` → no frame emitted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    Local,
    Remote,
}

/// An HTTP/2 stream error code (RFC 7540 §7), plus the synthetic codes this
/// core uses for conditions the wire protocol itself has no code for.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reason(u32);

impl Reason {
    pub const NO_ERROR: Reason = Reason(0x0);
    pub const PROTOCOL_ERROR: Reason = Reason(0x1);
    pub const INTERNAL_ERROR: Reason = Reason(0x2);
    pub const FLOW_CONTROL_ERROR: Reason = Reason(0x3);
    pub const SETTINGS_TIMEOUT: Reason = Reason(0x4);
    pub const STREAM_CLOSED: Reason = Reason(0x5);
    pub const FRAME_SIZE_ERROR: Reason = Reason(0x6);
    pub const REFUSED_STREAM: Reason = Reason(0x7);
    pub const CANCEL: Reason = Reason(0x8);
    pub const COMPRESSION_ERROR: Reason = Reason(0x9);
    pub const CONNECT_ERROR: Reason = Reason(0xa);
    pub const ENHANCE_YOUR_CALM: Reason = Reason(0xb);
    pub const INADEQUATE_SECURITY: Reason = Reason(0xc);
    pub const HTTP_1_1_REQUIRED: Reason = Reason(0xd);

    /// Build a `Reason` from a raw wire error code.
    pub const fn from_wire(code: u32) -> Self {
        Reason(code)
    }

    /// The raw wire error code for this reason.
    pub const fn into_wire(self) -> u32 {
        self.0
    }

    fn description(self) -> Option<&'static str> {
        Some(match self {
            Reason::NO_ERROR => "not an error",
            Reason::PROTOCOL_ERROR => "protocol error",
            Reason::INTERNAL_ERROR => "internal error",
            Reason::FLOW_CONTROL_ERROR => "flow-control protocol violated",
            Reason::SETTINGS_TIMEOUT => "settings acknowledgement timeout",
            Reason::STREAM_CLOSED => "frame received on a closed stream",
            Reason::FRAME_SIZE_ERROR => "frame size incorrect",
            Reason::REFUSED_STREAM => "refused stream before processing any application logic",
            Reason::CANCEL => "stream no longer needed",
            Reason::COMPRESSION_ERROR => "unable to maintain the header compression context",
            Reason::CONNECT_ERROR => {
                "connection established in response to a CONNECT request was reset or abnormally closed"
            }
            Reason::ENHANCE_YOUR_CALM => "detected excessive load generating behavior",
            Reason::INADEQUATE_SECURITY => {
                "transport properties do not meet minimum security requirements"
            }
            Reason::HTTP_1_1_REQUIRED => "the endpoint requires HTTP/1.1",
            _ => return None,
        })
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reason").field(&self.0).finish()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(desc) => write!(f, "{desc}"),
            None => write!(f, "unknown reason 0x{:x}", self.0),
        }
    }
}

impl Default for Reason {
    fn default() -> Self {
        Reason::NO_ERROR
    }
}

/// An abort of a stream, tagged with who caused it.
///
/// `Local` means this side must still emit `RST_STREAM(reason)`. `Remote`
/// means the abort is already the consequence of a frame (or connection
/// event) received from the peer, so nothing further needs to go on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    Local(Reason),
    Remote(Reason),
}

impl StreamError {
    pub const fn reason(self) -> Reason {
        match self {
            StreamError::Local(r) | StreamError::Remote(r) => r,
        }
    }

    pub const fn initiator(self) -> Initiator {
        match self {
            StreamError::Local(_) => Initiator::Local,
            StreamError::Remote(_) => Initiator::Remote,
        }
    }

    /// True if a `RST_STREAM` frame must still be written to the wire for
    /// this error. Only `Local` errors require this; `Remote` errors are
    /// already a consequence of one.
    pub const fn requires_wire_reset(self) -> bool {
        matches!(self, StreamError::Local(_))
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StreamError::Local(reason) => write!(f, "stream reset by us: {reason}"),
            StreamError::Remote(reason) => write!(f, "stream reset by peer: {reason}"),
        }
    }
}

impl error::Error for StreamError {}

impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        io::Error::other(err)
    }
}

/// Why the application abandoned `on_receive_message` before it resolved.
///
/// The application's cancellation mechanism (a dropped future, a load-shedder
/// rejecting the stream, an explicit reset request, ...) is host-specific;
/// this is the small closed vocabulary the host translates its own
/// cancellation reason into before handing it to
/// [`crate::transport::StreamTransport::interrupt_receive_message`] (§4.6
/// "Mapping from application interrupts to resets").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The application asked for a specific reset code.
    Reset(Reason),
    /// The application had already observed a [`StreamError`] elsewhere
    /// (e.g. on a sibling stream sharing a connection-level failure) and is
    /// propagating its reason here.
    Failed(StreamError),
    /// A generic cancellation (the awaiting future was dropped, a timeout
    /// fired, ...) with no more specific reason available.
    Interrupted,
    /// The application load-shed the stream before doing any work with it.
    Rejected,
}

impl Interrupt {
    /// The reset code this interrupt maps to (§4.6's table); always a
    /// `Local`-origin reset, since the application is the one tearing the
    /// stream down here.
    pub const fn reset_reason(self) -> Reason {
        match self {
            Interrupt::Reset(reason) => reason,
            Interrupt::Failed(StreamError::Local(reason) | StreamError::Remote(reason)) => reason,
            Interrupt::Interrupted => Reason::CANCEL,
            Interrupt::Rejected => Reason::REFUSED_STREAM,
        }
    }
}

/// An implementation-bug assertion: the caller drove the transport in a way
/// the state machine does not permit (e.g. closing the local half twice).
///
/// Distinct from [`StreamError`] so callers can tell "this is a protocol or
/// peer event" apart from "this is a bug in how the transport was driven".
/// Hitting one of these never panics the process; the transport instead
/// folds it into a `Closed(InternalError)` transition and logs a `warn!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalState {
    /// `close_local` was called when the local half was already closed.
    DoubleLocalClose,
    /// A frame was admitted that the table says is unreachable for the
    /// current state (defensive; the table should have returned `false`
    /// first).
    UnreachableAdmission,
}

impl fmt::Display for IllegalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IllegalState::DoubleLocalClose => "local half closed more than once",
            IllegalState::UnreachableAdmission => "frame admitted into an unreachable state",
        })
    }
}

impl error::Error for IllegalState {}
