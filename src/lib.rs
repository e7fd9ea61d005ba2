//! A lock-free per-stream transport state machine for a single bidirectional
//! HTTP/2 stream.
//!
//! One [`StreamTransport`](transport::StreamTransport) mediates between a
//! dispatcher feeding inbound frames off the wire and an application
//! producing an outbound message — the stream-lifecycle slice of RFC 7540
//! §5.1, deliberately scoped out from the framing codec, HPACK, connection
//! multiplexing, and flow control that a full HTTP/2 implementation also
//! needs. Those are treated as external collaborators: see
//! [`writer::FrameWriter`].
//!
//! ### Scope
//!
//! - Lock-free state transitions via compare-and-swap over a single atomic
//!   cell ([`state`]).
//! - Inbound frame admission against that state ([`admission`]).
//! - The outbound writer loop and local half-close ([`outbound`]).
//! - Local/remote reset unification ([`reset`]).
//! - The inbound frame queue bridging admission and the application
//!   ([`queue`]).
//!
//! Out of scope: the wire codec, HPACK, SETTINGS/GOAWAY/PING, server push,
//! priority, and HTTP/1 compatibility.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

mod admission;
pub mod config;
pub mod error;
pub mod frame;
pub mod message;
mod outbound;
pub mod queue;
mod reset;
pub mod stats;
mod state;
pub mod transport;
pub mod writer;

pub use config::Config;
pub use error::{IllegalState, Initiator, Interrupt, Reason, StreamError};
pub use frame::{Frame, Http2Frame, OutboundFrame, Role, StreamId};
pub use message::{EmptyBody, OutboundBody, OutgoingMessage, ReceivedMessage, RecvBody};
pub use outbound::SendBody;
pub use queue::FrameQueue;
pub use stats::{NullStats, Stats};
pub use transport::StreamTransport;
pub use writer::FrameWriter;
