//! The reset coordinator (§4.6): unifies local- and remote-origin aborts into
//! a single CAS against the stream's [`StateCell`], then tears down whatever
//! the prior state was holding (a pending received-message promise, or a
//! frame queue) exactly once.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Initiator, Interrupt, Reason, StreamError};
use crate::queue::FrameQueue;
use crate::state::{RemoteState, StateCell, StreamState};
use crate::stats::Stats;
use crate::transport::StreamTransport;
use crate::writer::FrameWriter;

/// What a stream state held for the remote half at the moment it was reset,
/// and therefore what must be failed.
pub(crate) enum TornDown {
    /// No initial `HEADERS` had arrived; `on_receive_message` must fail.
    Pending,
    /// A frame queue was live (`Streaming` or `RemoteClosed`); it must be
    /// poisoned so pending and future reads observe the reset.
    Queue(Arc<FrameQueue>),
}

/// CAS any resettable state to `Closed(reason)`. Returns `None` if the state
/// was already `Closed` (idempotent no-op, §4.6 step 2); otherwise the
/// [`TornDown`] payload the prior state was holding.
pub(crate) fn try_reset(state: &StateCell, reason: Reason) -> Option<TornDown> {
    loop {
        let current = state.load();
        let torn = match current.as_ref() {
            StreamState::Closed(_) => return None,
            StreamState::Open(r) | StreamState::LocalClosed(r) => match r {
                RemoteState::Pending => TornDown::Pending,
                RemoteState::Streaming(q) => TornDown::Queue(Arc::clone(q)),
            },
            StreamState::RemoteClosed(q) => TornDown::Queue(Arc::clone(q)),
        };
        match state.compare_and_swap(&current, StreamState::Closed(reason)) {
            Ok(_) => return Some(torn),
            Err(_) => {
                trace!("reset CAS contended, retrying");
                continue;
            }
        }
    }
}

impl<W, S> StreamTransport<W, S>
where
    W: FrameWriter,
    S: Stats,
{
    /// We are aborting the stream; a `RST_STREAM(reason)` is written to the
    /// wire (§4.6 "Wire emission") before this resolves.
    pub async fn local_reset(&self, reason: Reason) {
        self.do_reset(reason, Initiator::Local).await;
    }

    /// The peer already aborted the stream (a `RST_STREAM` was received, or
    /// a connection-level event forces this stream down); no frame is
    /// written back.
    pub async fn remote_reset(&self, reason: Reason) {
        self.do_reset(reason, Initiator::Remote).await;
    }

    /// The application abandoned `on_receive_message` before it resolved
    /// (cancelled the awaiting future, load-shed the stream, ...); maps the
    /// reason via §4.6's table and performs the same local reset
    /// `local_reset` would, since the application is always the initiator
    /// here.
    pub async fn interrupt_receive_message(&self, interrupt: Interrupt) {
        self.local_reset(interrupt.reset_reason()).await;
    }

    /// Runs the reset inline on the caller's task: the `RST_STREAM` write
    /// (for a `Local`-origin reset) is awaited here, in sequence, before
    /// `on_reset` resolves — never spawned. Spawning would race the wire
    /// write against `on_reset` resolving (a caller could observe the reset
    /// as done before the frame reached the writer) and would need a live
    /// Tokio runtime at the call site, which a dispatcher driving `recv`
    /// does not guarantee.
    async fn do_reset(&self, reason: Reason, initiator: Initiator) {
        let Some(torn_down) = try_reset(&self.state, reason) else {
            trace!(stream_id = %self.stream_id(), ?reason, "reset on already-closed stream, ignored");
            return;
        };

        match torn_down {
            TornDown::Pending => {
                // Dropping the sender fails the receiver `on_receive_message` is
                // awaiting, without ever having to construct a message.
                self.recv.lock().unwrap().tx.take();
            }
            TornDown::Queue(q) => {
                q.fail(reason, true);
            }
        }

        match initiator {
            Initiator::Local => {
                self.stats.local_reset();
                debug!(stream_id = %self.stream_id(), ?reason, "local reset");
                if let Err(e) = self.writer.write_reset(self.stream_id(), reason).await {
                    debug!(stream_id = %self.stream_id(), error = %e, "failed to write RST_STREAM");
                }
            }
            Initiator::Remote => {
                self.stats.remote_reset();
                debug!(stream_id = %self.stream_id(), ?reason, "remote reset");
            }
        }

        let result = if reason == Reason::NO_ERROR {
            Ok(())
        } else {
            Err(match initiator {
                Initiator::Local => StreamError::Local(reason),
                Initiator::Remote => StreamError::Remote(reason),
            })
        };
        self.resolve_on_reset(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateCell;

    #[test]
    fn reset_on_pending_tears_down_pending() {
        let cell = StateCell::new();
        let torn = try_reset(&cell, Reason::CANCEL).unwrap();
        assert!(matches!(torn, TornDown::Pending));
        assert!(cell.load().is_closed());
    }

    #[test]
    fn reset_on_already_closed_is_noop() {
        let cell = StateCell::new();
        try_reset(&cell, Reason::CANCEL).unwrap();
        assert!(try_reset(&cell, Reason::INTERNAL_ERROR).is_none());
        assert!(matches!(cell.load().as_ref(), StreamState::Closed(r) if *r == Reason::CANCEL));
    }

    #[test]
    fn interrupt_mapping_matches_table() {
        assert_eq!(Interrupt::Reset(Reason::PROTOCOL_ERROR).reset_reason(), Reason::PROTOCOL_ERROR);
        assert_eq!(
            Interrupt::Failed(StreamError::Local(Reason::FLOW_CONTROL_ERROR)).reset_reason(),
            Reason::FLOW_CONTROL_ERROR
        );
        assert_eq!(
            Interrupt::Failed(StreamError::Remote(Reason::COMPRESSION_ERROR)).reset_reason(),
            Reason::COMPRESSION_ERROR
        );
        assert_eq!(Interrupt::Interrupted.reset_reason(), Reason::CANCEL);
        assert_eq!(Interrupt::Rejected.reset_reason(), Reason::REFUSED_STREAM);
    }

    #[tokio::test]
    async fn interrupt_receive_message_performs_local_reset() {
        use crate::config::Config;
        use crate::frame::{Role, StreamId};

        struct NoopWriter;
        impl FrameWriter for NoopWriter {
            async fn write_headers(
                &self,
                _: StreamId,
                _: http::HeaderMap,
                _: bool,
            ) -> Result<(), StreamError> {
                Ok(())
            }
            async fn write_data(&self, _: StreamId, _: crate::frame::OutboundFrame) -> Result<(), StreamError> {
                Ok(())
            }
            async fn write_reset(&self, _: StreamId, _: Reason) -> Result<(), StreamError> {
                Ok(())
            }
            async fn update_window(&self, _: StreamId, _: u32) -> Result<(), StreamError> {
                Ok(())
            }
        }

        let transport = StreamTransport::new(
            StreamId::new(1),
            NoopWriter,
            crate::stats::NullStats,
            Config::new(Role::Client),
        );
        transport.interrupt_receive_message(Interrupt::Interrupted).await;

        let result = transport.on_reset().await;
        assert!(matches!(result, Err(StreamError::Local(r)) if r == Reason::CANCEL));
    }

    #[test]
    fn reset_on_streaming_tears_down_queue() {
        let cell = StateCell::new();
        let q = Arc::new(FrameQueue::unbounded());
        cell.compare_and_swap(
            &cell.load(),
            StreamState::Open(RemoteState::Streaming(Arc::clone(&q))),
        )
        .unwrap();

        let torn = try_reset(&cell, Reason::CANCEL).unwrap();
        assert!(matches!(torn, TornDown::Queue(_)));
    }
}
