//! The outbound writer (§4.4) and `close_local` (§4.5).
//!
//! `send` is split into two stages matching the donor's own habit of
//! returning a `ResponseFuture` distinct from the body-drain future: the
//! `send` call itself resolves once the initial `HEADERS` are on the wire
//! (the "outer future" of §4.4), and hands back a [`SendBody`] whose
//! `finish` drains the rest (the "inner future").

use std::future::poll_fn;
use std::pin::Pin;

use tracing::warn;

use crate::error::{IllegalState, Initiator, Reason, StreamError};
use crate::message::{OutboundBody, OutgoingMessage};
use crate::frame::OutboundFrame;
use crate::state::StreamState;
use crate::stats::Stats;
use crate::transport::StreamTransport;
use crate::writer::FrameWriter;

/// The not-yet-drained body of an outbound message, returned by
/// [`StreamTransport::send`] once the initial `HEADERS` have been written.
///
/// `body` is `None` when the message's body was already known empty — the
/// initial `HEADERS` already carried `END_STREAM` and there is nothing left
/// to drain.
pub struct SendBody<'a, W, S, B> {
    transport: &'a StreamTransport<W, S>,
    body: Option<Pin<Box<B>>>,
}

impl<W, S> StreamTransport<W, S>
where
    W: FrameWriter,
    S: Stats,
{
    /// Send a message: write the initial `HEADERS`, then hand back a handle
    /// to drain the body (§4.4).
    pub async fn send<B>(&self, message: OutgoingMessage<B>) -> Result<SendBody<'_, W, S, B>, StreamError>
    where
        B: OutboundBody,
    {
        let current = self.state.load();
        match current.as_ref() {
            StreamState::Closed(reason) => {
                // The initiator tag is only recoverable from `on_reset`,
                // which already resolved with it; `reason` alone is all a
                // fresh `send` has to report.
                return Err(StreamError::Remote(*reason));
            }
            StreamState::LocalClosed(_) => {
                warn!(stream_id = %self.stream_id(), error = %IllegalState::DoubleLocalClose, "send called after local half already closed");
                self.local_reset(Reason::INTERNAL_ERROR).await;
                return Err(StreamError::Local(Reason::INTERNAL_ERROR));
            }
            StreamState::Open(_) | StreamState::RemoteClosed(_) => {}
        }

        let headers = message.headers().clone();
        let end_of_stream = message.body().is_empty();
        if let Err(e) = self
            .writer
            .write_headers(self.stream_id(), headers, end_of_stream)
            .await
        {
            self.handle_outbound_error(e).await;
            return Err(e);
        }

        if end_of_stream {
            self.close_local().await;
            return Ok(SendBody {
                transport: self,
                body: None,
            });
        }

        Ok(SendBody {
            transport: self,
            body: Some(Box::pin(message.into_body())),
        })
    }

    /// Local `END_STREAM` reached (§4.5): advances the state and, once both
    /// halves are done, resolves `on_reset`.
    pub(crate) async fn close_local(&self) {
        loop {
            let current = self.state.load();
            match current.as_ref() {
                StreamState::Closed(_) => return,
                StreamState::LocalClosed(_) => {
                    warn!(stream_id = %self.stream_id(), error = %IllegalState::DoubleLocalClose, "close_local called twice");
                    self.local_reset(Reason::INTERNAL_ERROR).await;
                    return;
                }
                StreamState::RemoteClosed(_) => {
                    match self
                        .state
                        .compare_and_swap(&current, StreamState::Closed(Reason::NO_ERROR))
                    {
                        Ok(_) => {
                            self.resolve_on_reset(Ok(()));
                            return;
                        }
                        Err(_) => continue,
                    }
                }
                StreamState::Open(remote) => {
                    match self
                        .state
                        .compare_and_swap(&current, StreamState::LocalClosed(remote.clone()))
                    {
                        Ok(_) => return,
                        Err(_) => continue,
                    }
                }
            }
        }
    }

    async fn handle_outbound_error(&self, err: StreamError) {
        match err.initiator() {
            Initiator::Local => self.local_reset(err.reason()).await,
            Initiator::Remote => self.remote_reset(err.reason()).await,
        }
    }
}

impl<'a, W, S, B> SendBody<'a, W, S, B>
where
    W: FrameWriter,
    S: Stats,
    B: OutboundBody,
{
    /// Drain the body to completion: write each frame in order, then close
    /// the local half once an end-of-stream frame has gone out.
    pub async fn finish(mut self) -> Result<(), StreamError> {
        // An empty body was already closed out by `send` itself (it knows
        // `end_of_stream` before this handle even exists); nothing to do.
        let Some(mut body) = self.body.take() else {
            return Ok(());
        };

        loop {
            let frame = poll_fn(|cx| body.as_mut().poll_next_frame(cx)).await;
            let Some(frame) = frame else { break };
            let is_end = frame.is_end_of_stream();

            let result = match frame {
                OutboundFrame::Data { bytes, end_of_stream } => {
                    self.transport.stats.local_data_frame(bytes.len());
                    self.transport
                        .writer
                        .write_data(
                            self.transport.stream_id(),
                            OutboundFrame::Data { bytes, end_of_stream },
                        )
                        .await
                }
                OutboundFrame::Trailers { headers } => {
                    self.transport.stats.local_trailers();
                    self.transport
                        .writer
                        .write_headers(self.transport.stream_id(), headers, true)
                        .await
                }
            };

            if let Err(e) = result {
                self.transport.handle_outbound_error(e).await;
                return Err(e);
            }
            if is_end {
                break;
            }
        }

        self.transport.close_local().await;
        Ok(())
    }
}
