//! The inbound frame queue: single-producer (inbound admission), single-
//! consumer (the application draining the received body).
//!
//! The donor crate buffers frames for an entire connection behind a shared
//! slab (`h2::proto::streams::buffer::Buffer`) because one `Prioritize`
//! worker serves every stream. This core is deliberately per-stream and has
//! exactly one producer and one consumer, so a plain `Mutex`-guarded
//! `VecDeque` plus a `Notify` is the idiomatic shape here. The mutex is
//! `std::sync::Mutex`, not `tokio::sync::Mutex`: `offer`/`fail` are called
//! from the non-suspending admission path (§5 "`recv` is non-suspending")
//! and must never hand control back to the executor mid-operation; only
//! `read` — the one genuinely suspending operation here — awaits.

use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;
use tracing::trace;

use crate::error::{Reason, StreamError};
use crate::frame::Frame;

/// The terminal condition a [`FrameQueue`] was failed with.
#[derive(Debug, Clone, Copy)]
struct Failure {
    reason: Reason,
    discard: bool,
}

struct Inner {
    buf: VecDeque<Frame>,
    failure: Option<Failure>,
}

/// Upper bound on buffered frames; `None` means unbounded.
#[derive(Debug, Clone, Copy)]
enum Capacity {
    Bounded(usize),
    Unbounded,
}

/// A FIFO queue of inbound body frames for a single stream's received body.
///
/// See §4.1: `offer` is the producer side (inbound admission), `read` is the
/// consumer side (the application draining `ReceivedMessage::body`), and
/// `fail` is the terminal transition applied once the owning half-stream
/// closes or resets.
pub struct FrameQueue {
    inner: Mutex<Inner>,
    notify: Notify,
    capacity: Capacity,
}

impl FrameQueue {
    /// A queue that may receive body frames before it is closed.
    pub fn unbounded() -> Self {
        FrameQueue {
            inner: Mutex::new(Inner {
                buf: VecDeque::new(),
                failure: None,
            }),
            notify: Notify::new(),
            capacity: Capacity::Unbounded,
        }
    }

    /// A queue of capacity 1. Per §9's resolved open question, this shape is
    /// used for a body that is already known to be empty (the initial
    /// HEADERS carried `END_STREAM`): it is never offered into, only failed,
    /// so that `RemoteClosed` always owns *some* queue to poison on a later
    /// reset.
    pub fn bounded_sentinel() -> Self {
        FrameQueue {
            inner: Mutex::new(Inner {
                buf: VecDeque::new(),
                failure: None,
            }),
            notify: Notify::new(),
            capacity: Capacity::Bounded(1),
        }
    }

    /// Offer a frame to the consumer. Returns `false` if the queue has
    /// already been failed, or if a bounded queue is at capacity.
    pub fn offer(&self, frame: Frame) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.failure.is_some() {
            return false;
        }
        if let Capacity::Bounded(cap) = self.capacity {
            if inner.buf.len() >= cap {
                return false;
            }
        }
        inner.buf.push_back(frame);
        drop(inner);
        self.notify.notify_one();
        true
    }

    /// Terminate the queue.
    ///
    /// With `discard = false`, frames already buffered remain readable and
    /// the failure surfaces only once they are drained. With `discard =
    /// true`, buffered frames are dropped immediately and the next `read`
    /// observes the failure right away — used when a RST_STREAM arrives and
    /// must win over whatever is still queued (§4.3 tie-break).
    pub fn fail(&self, reason: Reason, discard: bool) {
        let mut inner = self.inner.lock().unwrap();
        if inner.failure.is_some() {
            // Idempotent: first failure wins, matching `on_reset`'s
            // exactly-once semantics for the rest of the transport.
            return;
        }
        if discard {
            trace!(discard = true, ?reason, "frame queue failed, discarding buffered frames");
            inner.buf.clear();
        } else {
            trace!(discard = false, ?reason, "frame queue failed, draining buffered frames first");
        }
        inner.failure = Some(Failure { reason, discard });
        drop(inner);
        self.notify.notify_one();
    }

    /// Read the next frame, or observe the terminal condition once the
    /// buffer (if any) is drained.
    ///
    /// `Ok(Some(frame))` — a buffered frame.
    /// `Ok(None)` — the queue ended cleanly (failed with `Reason::NO_ERROR`).
    /// `Err(e)` — the queue was poisoned by a reset.
    pub async fn read(&self) -> Result<Option<Frame>, StreamError> {
        loop {
            let notified = {
                let mut inner = self.inner.lock().unwrap();
                if let Some(frame) = inner.buf.pop_front() {
                    return Ok(Some(frame));
                }
                if let Some(failure) = inner.failure {
                    return if failure.reason == Reason::NO_ERROR {
                        Ok(None)
                    } else {
                        Err(StreamError::Remote(failure.reason))
                    };
                }
                self.notify.notified()
            };
            notified.await;
        }
    }
}
