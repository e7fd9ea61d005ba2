//! The public per-stream transport object (§6).
//!
//! Wires the leaf components (§2's table) together: the atomic
//! [`StateCell`](crate::state::StateCell), the one-shot `on_receive_message`/
//! `on_reset` promises, and the injected [`FrameWriter`]/[`Stats`]
//! collaborators. The actual state-machine logic lives split across
//! `admission.rs` (inbound), `outbound.rs` (the `send` path), and `reset.rs`
//! (the shared reset coordinator) as further `impl` blocks on
//! [`StreamTransport`] — mirroring the donor's own habit of splitting one
//! connection type's behavior across `proto/streams/{mod,state,buffer}.rs`.

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::debug;

use crate::config::Config;
use crate::error::StreamError;
use crate::frame::{Role, StreamId};
use crate::message::ReceivedMessage;
use crate::state::StateCell;
use crate::stats::{NullStats, Stats};
use crate::writer::FrameWriter;

pub(crate) struct RecvSlot {
    pub(crate) tx: Option<oneshot::Sender<ReceivedMessage>>,
    rx: Option<oneshot::Receiver<ReceivedMessage>>,
}

pub(crate) struct ResetSlot {
    pub(crate) tx: Option<oneshot::Sender<Result<(), StreamError>>>,
    rx: Option<oneshot::Receiver<Result<(), StreamError>>>,
}

/// The per-stream transport: one instance per HTTP/2 stream, shared between
/// the dispatcher (feeds `recv`) and the application (drives `send`, awaits
/// `on_receive_message`/`on_reset`).
pub struct StreamTransport<W, S = NullStats> {
    stream_id: StreamId,
    config: Config,
    pub(crate) writer: Arc<W>,
    pub(crate) stats: Arc<S>,
    pub(crate) state: StateCell,
    pub(crate) recv: Mutex<RecvSlot>,
    pub(crate) reset: Mutex<ResetSlot>,
}

impl<W, S> StreamTransport<W, S>
where
    W: FrameWriter,
    S: Stats,
{
    /// Build a new transport in `Open(Pending)` for `stream_id` (§3
    /// "Lifecycles").
    pub fn new(stream_id: StreamId, writer: W, stats: S, config: Config) -> Self {
        let (recv_tx, recv_rx) = oneshot::channel();
        let (reset_tx, reset_rx) = oneshot::channel();
        StreamTransport {
            stream_id,
            config,
            writer: Arc::new(writer),
            stats: Arc::new(stats),
            state: StateCell::new(),
            recv: Mutex::new(RecvSlot {
                tx: Some(recv_tx),
                rx: Some(recv_rx),
            }),
            reset: Mutex::new(ResetSlot {
                tx: Some(reset_tx),
                rx: Some(reset_rx),
            }),
        }
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    pub(crate) fn role(&self) -> Role {
        self.config.role()
    }

    pub(crate) fn config(&self) -> Config {
        self.config
    }

    /// True once this stream has reached `Closed` (either direction).
    pub fn is_closed(&self) -> bool {
        self.state.load().is_closed()
    }

    /// Resolves with the initial `HEADERS` of the stream, once observed.
    ///
    /// Polled to completion at most once — this transport hands out the
    /// single-consumer receiver end of a `tokio::sync::oneshot` channel
    /// (§9 "Promises vs. async"). A second call panics, matching the
    /// donor's own single-consumer promise types.
    pub async fn on_receive_message(&self) -> Result<ReceivedMessage, oneshot::error::RecvError> {
        let rx = {
            let mut slot = self.recv.lock().unwrap();
            slot.rx
                .take()
                .expect("on_receive_message polled more than once")
        };
        rx.await
    }

    /// Resolves once the stream reaches `Closed`: `Ok(())` iff the terminal
    /// reason was `NoError`, otherwise the [`StreamError`] that caused it.
    pub async fn on_reset(&self) -> Result<(), StreamError> {
        let rx = {
            let mut slot = self.reset.lock().unwrap();
            slot.rx.take().expect("on_reset polled more than once")
        };
        match rx.await {
            Ok(result) => result,
            Err(_) => {
                debug!(stream_id = %self.stream_id, "on_reset sender dropped without resolving");
                Err(StreamError::Local(crate::error::Reason::INTERNAL_ERROR))
            }
        }
    }

    /// Resolve the `on_reset` promise exactly once; later calls (the promise
    /// was already resolved by an earlier reset or clean close) are no-ops,
    /// matching invariant 2 (§3).
    pub(crate) fn resolve_on_reset(&self, result: Result<(), StreamError>) {
        if let Some(tx) = self.reset.lock().unwrap().tx.take() {
            let _ = tx.send(result);
        }
    }
}
