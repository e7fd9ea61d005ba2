//! Observability hook for the transport.
//!
//! The donor crate wires its connection-level counters straight into
//! `tracing` spans and a handful of ad hoc atomics; this core instead
//! exposes a small trait so an embedder can route counts into whatever
//! metrics backend it already has (or none at all, via [`NullStats`]).
//! Metrics export itself (Prometheus, StatsD, ...) is out of scope (§1) —
//! this is only the seam.

/// Counters and histograms a [`crate::transport::StreamTransport`] reports
/// against over its lifetime.
///
/// All methods have a default no-op body so an implementer only overrides
/// the handful it cares about.
pub trait Stats: Send + Sync + 'static {
    /// We originated a `RST_STREAM`.
    fn local_reset(&self) {}

    /// The peer originated a `RST_STREAM`.
    fn remote_reset(&self) {}

    /// We sent trailers.
    fn local_trailers(&self) {}

    /// The peer sent trailers.
    fn remote_trailers(&self) {}

    /// We sent a `DATA` frame carrying `len` bytes.
    fn local_data_frame(&self, len: usize) {
        let _ = len;
    }

    /// We received a `DATA` frame carrying `len` bytes.
    fn remote_data_frame(&self, len: usize) {
        let _ = len;
    }
}

/// A [`Stats`] implementation that discards everything. The default for a
/// [`crate::config::Config`] that doesn't name one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStats;

impl Stats for NullStats {}
