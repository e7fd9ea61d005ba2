//! The atomic stream-state cell (§3, §4.2).
//!
//! The donor crate's `proto::streams::state::State` (see `h2/proto/streams/state.rs`)
//! is a plain `enum` mutated in place behind the connection-wide `Streams` lock. This
//! core has no connection-wide lock to piggyback on — each stream transport is meant to
//! be driven from independent tasks — so the state lives behind an `arc_swap::ArcSwap`
//! instead: an immutable `StreamState` value swapped in with a compare-and-swap, matching
//! the donor's own state diagram (`Open` / `HalfClosedLocal` / `HalfClosedRemote` /
//! `Closed`, renamed here to `Open` / `LocalClosed` / `RemoteClosed` / `Closed` per §3) but
//! without the lock.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::Reason;
use crate::queue::FrameQueue;

/// The remote (inbound) half of a stream, tracked while the overall
/// [`StreamState`] is anything but `RemoteClosed`/`Closed`.
#[derive(Clone)]
pub(crate) enum RemoteState {
    /// No initial HEADERS observed yet.
    Pending,
    /// Initial HEADERS observed; body frames flow through `q`.
    Streaming(Arc<FrameQueue>),
}

/// The stream's lifecycle state (§3).
///
/// `Open`/`LocalClosed` carry the [`RemoteState`] because the remote half can
/// still be `Pending` or `Streaming` independently of whether we've sent our
/// own `END_STREAM`. `RemoteClosed` carries the frame queue directly (the
/// remote half is definitionally done, but the queue may still hold buffered
/// frames for the application to drain). `Closed` is terminal and carries the
/// reason recorded at the moment it became so.
#[derive(Clone)]
pub(crate) enum StreamState {
    Open(RemoteState),
    LocalClosed(RemoteState),
    RemoteClosed(Arc<FrameQueue>),
    Closed(Reason),
}

impl StreamState {
    /// Extracts the [`RemoteState`] shared by `Open` and `LocalClosed` — the
    /// `RemoteOpen` helper named in the design notes' resolved open question,
    /// kept as a private function rather than a new public type.
    pub(crate) fn remote_of(&self) -> Option<&RemoteState> {
        match self {
            StreamState::Open(r) | StreamState::LocalClosed(r) => Some(r),
            StreamState::RemoteClosed(_) | StreamState::Closed(_) => None,
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(self, StreamState::Closed(_))
    }
}

/// A single atomically-swapped [`StreamState`] cell, initialized to
/// `Open(Pending)` (§3 "Initial").
pub(crate) struct StateCell {
    inner: ArcSwap<StreamState>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        StateCell {
            inner: ArcSwap::new(Arc::new(StreamState::Open(RemoteState::Pending))),
        }
    }

    /// The current state. Cheap: a single atomic load plus an `Arc` clone.
    pub(crate) fn load(&self) -> Arc<StreamState> {
        self.inner.load_full()
    }

    /// Attempt to swap `current` for `next`.
    ///
    /// Returns `Ok(next)` on success. On failure (the cell no longer held
    /// `current`), returns `Err(actual)` carrying whatever the cell actually
    /// held at the moment of the attempt, so the caller can re-evaluate its
    /// transition table against `actual` and retry (§4.3 "Retry discipline").
    pub(crate) fn compare_and_swap(
        &self,
        current: &Arc<StreamState>,
        next: StreamState,
    ) -> Result<Arc<StreamState>, Arc<StreamState>> {
        let next = Arc::new(next);
        let prev = self.inner.compare_and_swap(current, Arc::clone(&next));
        let prev: Arc<StreamState> = Arc::clone(&prev);
        if Arc::ptr_eq(&prev, current) {
            Ok(next)
        } else {
            Err(prev)
        }
    }
}
