//! Shared test collaborators for the integration test binaries.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use h2_stream_core::{FrameWriter, OutboundBody, OutboundFrame, Reason, Stats, StreamError, StreamId};

#[derive(Debug, Clone)]
pub enum Event {
    Headers { end_of_stream: bool },
    Data { len: usize, end_of_stream: bool },
    Reset { reason: Reason },
}

#[derive(Clone, Default)]
pub struct MockWriter(Arc<Mutex<Vec<Event>>>);

impl MockWriter {
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

impl FrameWriter for MockWriter {
    async fn write_headers(
        &self,
        _stream_id: StreamId,
        _headers: http::HeaderMap,
        end_of_stream: bool,
    ) -> Result<(), StreamError> {
        self.0.lock().unwrap().push(Event::Headers { end_of_stream });
        Ok(())
    }

    async fn write_data(&self, _stream_id: StreamId, frame: OutboundFrame) -> Result<(), StreamError> {
        if let OutboundFrame::Data { bytes, end_of_stream } = frame {
            self.0.lock().unwrap().push(Event::Data {
                len: bytes.len(),
                end_of_stream,
            });
        }
        Ok(())
    }

    async fn write_reset(&self, _stream_id: StreamId, reason: Reason) -> Result<(), StreamError> {
        self.0.lock().unwrap().push(Event::Reset { reason });
        Ok(())
    }

    async fn update_window(&self, _stream_id: StreamId, _delta: u32) -> Result<(), StreamError> {
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CountingStats(pub Arc<Counts>);

#[derive(Default)]
pub struct Counts {
    pub local_reset: AtomicUsize,
    pub remote_reset: AtomicUsize,
    pub remote_bytes: AtomicUsize,
}

impl Stats for CountingStats {
    fn local_reset(&self) {
        self.0.local_reset.fetch_add(1, Ordering::SeqCst);
    }

    fn remote_reset(&self) {
        self.0.remote_reset.fetch_add(1, Ordering::SeqCst);
    }

    fn remote_data_frame(&self, len: usize) {
        self.0.remote_bytes.fetch_add(len, Ordering::SeqCst);
    }
}

pub struct VecBody {
    frames: VecDeque<OutboundFrame>,
}

impl VecBody {
    pub fn new(frames: Vec<OutboundFrame>) -> Self {
        VecBody {
            frames: frames.into(),
        }
    }
}

impl OutboundBody for VecBody {
    fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn poll_next_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<OutboundFrame>> {
        let this = Pin::into_inner(self);
        Poll::Ready(this.frames.pop_front())
    }
}

pub fn ok_headers(status: u16) -> http::HeaderMap {
    let mut headers = http::HeaderMap::new();
    headers.insert(
        "x-status",
        http::HeaderValue::from_str(&status.to_string()).unwrap(),
    );
    headers
}
