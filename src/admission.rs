//! Inbound admission (§4.3): `recv(frame) -> bool`.
//!
//! Each arm below is one cell of the admission table. Where a cell's
//! transition requires building a new queue or delivering the received
//! message, the compare-and-swap is attempted *before* any value that the
//! frame itself owns (header map, body bytes, window-refund callback) is
//! consumed, so a lost CAS race can retry without having to clone anything.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::Reason;
use crate::frame::{find_connection_specific_header, Frame, Http2Frame, Role};
use crate::message::{RecvBody, ReceivedMessage};
use crate::queue::FrameQueue;
use crate::state::{RemoteState, StreamState};
use crate::stats::Stats;
use crate::transport::StreamTransport;
use crate::writer::FrameWriter;

impl<W, S> StreamTransport<W, S>
where
    W: FrameWriter,
    S: Stats,
{
    /// Admit one inbound frame. Returns `false` only when the stream was
    /// already `Closed` and therefore could not be advanced further; the
    /// return value is advisory (§4.3), never an error by itself.
    ///
    /// Awaits only when the frame itself triggers a reset (§4.6): the
    /// `RST_STREAM` write for a `Local`-origin reset happens inline here
    /// rather than on a spawned task, so it is ordered before this call
    /// returns.
    pub async fn recv(&self, frame: Http2Frame) -> bool {
        match frame {
            Http2Frame::Reset { reason } => {
                if self.state.load().is_closed() {
                    return false;
                }
                self.remote_reset(reason).await;
                true
            }
            Http2Frame::Headers {
                headers,
                end_of_stream,
            } => self.recv_headers(headers, end_of_stream).await,
            Http2Frame::Data {
                bytes,
                end_of_stream,
                window_refund,
            } => self.recv_data(bytes, end_of_stream, window_refund).await,
        }
    }

    async fn recv_headers(&self, headers: http::HeaderMap, end_of_stream: bool) -> bool {
        if self.state.load().is_closed() {
            return false;
        }
        if let Some(name) = find_connection_specific_header(&headers) {
            debug!(stream_id = %self.stream_id(), header = name, "connection-specific header rejected");
            self.local_reset(Reason::PROTOCOL_ERROR).await;
            return true;
        }

        loop {
            let current = self.state.load();
            match current.as_ref() {
                StreamState::Closed(_) => return false,

                StreamState::Open(RemoteState::Pending) => {
                    if end_of_stream {
                        let q = self.new_empty_body_queue();
                        match self
                            .state
                            .compare_and_swap(&current, StreamState::RemoteClosed(Arc::clone(&q)))
                        {
                            Ok(_) => {
                                q.fail(Reason::NO_ERROR, false);
                                self.deliver_message(headers, RecvBody::empty());
                                return true;
                            }
                            Err(_) => continue,
                        }
                    } else {
                        let q = Arc::new(FrameQueue::unbounded());
                        match self.state.compare_and_swap(
                            &current,
                            StreamState::Open(RemoteState::Streaming(Arc::clone(&q))),
                        ) {
                            Ok(_) => {
                                self.deliver_message(headers, RecvBody::queued(Arc::clone(&q)));
                                return true;
                            }
                            Err(_) => continue,
                        }
                    }
                }

                StreamState::Open(RemoteState::Streaming(q)) => {
                    if end_of_stream {
                        let q = Arc::clone(q);
                        match self
                            .state
                            .compare_and_swap(&current, StreamState::RemoteClosed(Arc::clone(&q)))
                        {
                            Ok(_) => {
                                self.stats.remote_trailers();
                                q.offer(Frame::trailers(headers));
                                q.fail(Reason::NO_ERROR, false);
                                return true;
                            }
                            Err(_) => continue,
                        }
                    } else {
                        trace!(stream_id = %self.stream_id(), "HEADERS without END_STREAM after body already open");
                        self.local_reset(Reason::INTERNAL_ERROR).await;
                        return true;
                    }
                }

                StreamState::LocalClosed(RemoteState::Pending) => {
                    if end_of_stream {
                        match self
                            .state
                            .compare_and_swap(&current, StreamState::Closed(Reason::NO_ERROR))
                        {
                            Ok(_) => {
                                self.deliver_message(headers, RecvBody::empty());
                                self.resolve_on_reset(Ok(()));
                                return true;
                            }
                            Err(_) => continue,
                        }
                    } else {
                        let q = Arc::new(FrameQueue::unbounded());
                        match self.state.compare_and_swap(
                            &current,
                            StreamState::LocalClosed(RemoteState::Streaming(Arc::clone(&q))),
                        ) {
                            Ok(_) => {
                                self.deliver_message(headers, RecvBody::queued(Arc::clone(&q)));
                                return true;
                            }
                            Err(_) => continue,
                        }
                    }
                }

                StreamState::LocalClosed(RemoteState::Streaming(q)) => {
                    if end_of_stream {
                        let q = Arc::clone(q);
                        match self
                            .state
                            .compare_and_swap(&current, StreamState::Closed(Reason::NO_ERROR))
                        {
                            Ok(_) => {
                                self.stats.remote_trailers();
                                q.offer(Frame::trailers(headers));
                                q.fail(Reason::NO_ERROR, false);
                                self.resolve_on_reset(Ok(()));
                                return true;
                            }
                            Err(_) => continue,
                        }
                    } else {
                        self.local_reset(Reason::INTERNAL_ERROR).await;
                        return true;
                    }
                }

                StreamState::RemoteClosed(_) => {
                    if end_of_stream {
                        self.local_reset(Reason::INTERNAL_ERROR).await;
                    } else {
                        self.local_reset(Reason::STREAM_CLOSED).await;
                    }
                    return true;
                }
            }
        }
    }

    async fn recv_data(
        &self,
        bytes: bytes::Bytes,
        end_of_stream: bool,
        window_refund: Option<crate::frame::WindowRefund>,
    ) -> bool {
        if self.state.load().is_closed() {
            return false;
        }

        loop {
            let current = self.state.load();
            match current.as_ref() {
                StreamState::Closed(_) => return false,

                StreamState::Open(RemoteState::Pending)
                | StreamState::LocalClosed(RemoteState::Pending) => {
                    trace!(stream_id = %self.stream_id(), "DATA before initial HEADERS");
                    self.local_reset(Reason::INTERNAL_ERROR).await;
                    return true;
                }

                StreamState::Open(RemoteState::Streaming(q)) => {
                    if end_of_stream {
                        let q = Arc::clone(q);
                        match self
                            .state
                            .compare_and_swap(&current, StreamState::RemoteClosed(Arc::clone(&q)))
                        {
                            Ok(_) => {
                                self.stats.remote_data_frame(bytes.len());
                                q.offer(Frame::Data {
                                    bytes,
                                    end_of_stream: true,
                                    window_refund,
                                });
                                q.fail(Reason::NO_ERROR, false);
                                return true;
                            }
                            Err(_) => continue,
                        }
                    } else {
                        self.stats.remote_data_frame(bytes.len());
                        let offered = q.offer(Frame::Data {
                            bytes,
                            end_of_stream: false,
                            window_refund,
                        });
                        if !offered {
                            self.local_reset(Reason::STREAM_CLOSED).await;
                        }
                        return true;
                    }
                }

                StreamState::LocalClosed(RemoteState::Streaming(q)) => {
                    if end_of_stream {
                        let q = Arc::clone(q);
                        match self
                            .state
                            .compare_and_swap(&current, StreamState::Closed(Reason::NO_ERROR))
                        {
                            Ok(_) => {
                                self.stats.remote_data_frame(bytes.len());
                                q.offer(Frame::Data {
                                    bytes,
                                    end_of_stream: true,
                                    window_refund,
                                });
                                q.fail(Reason::NO_ERROR, false);
                                self.resolve_on_reset(Ok(()));
                                return true;
                            }
                            Err(_) => continue,
                        }
                    } else {
                        self.stats.remote_data_frame(bytes.len());
                        let offered = q.offer(Frame::Data {
                            bytes,
                            end_of_stream: false,
                            window_refund,
                        });
                        if !offered {
                            self.local_reset(Reason::STREAM_CLOSED).await;
                        }
                        return true;
                    }
                }

                StreamState::RemoteClosed(_) => {
                    self.local_reset(Reason::STREAM_CLOSED).await;
                    return true;
                }
            }
        }
    }

    fn new_empty_body_queue(&self) -> Arc<FrameQueue> {
        if self.config().sentinel_queue() {
            Arc::new(FrameQueue::bounded_sentinel())
        } else {
            Arc::new(FrameQueue::unbounded())
        }
    }

    fn deliver_message(&self, headers: http::HeaderMap, body: RecvBody) {
        let message = match self.role() {
            Role::Client => {
                let mut response = http::Response::new(body);
                *response.headers_mut() = headers;
                ReceivedMessage::Response(response)
            }
            Role::Server => {
                let mut request = http::Request::new(body);
                *request.headers_mut() = headers;
                ReceivedMessage::Request(request)
            }
        };
        if let Some(tx) = self.recv.lock().unwrap().tx.take() {
            let _ = tx.send(message);
        }
    }
}
