//! Constructor knobs for a [`crate::transport::StreamTransport`] (§1.1).
//!
//! There is no on-disk config file or environment variable at this layer —
//! everything here is plumbed directly by whichever component builds the
//! transport (typically a connection actor that already knows its own role).

use crate::frame::Role;

/// How a [`crate::transport::StreamTransport`] is wired up.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    role: Role,
    sentinel_queue: bool,
}

impl Config {
    /// A transport for the given [`Role`], using the sentinel-queue shape
    /// (§9) for bodies the initial `HEADERS` already proves empty.
    pub fn new(role: Role) -> Self {
        Config {
            role,
            sentinel_queue: true,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn sentinel_queue(&self) -> bool {
        self.sentinel_queue
    }

    /// Disable the sentinel-queue shape: an empty-body `RemoteClosed` gets an
    /// unbounded queue that is immediately failed with `NoError` instead of a
    /// capacity-1 one. Exists for implementations that want a single queue
    /// constructor path; the default matches §9's resolved design note.
    pub fn without_sentinel_queue(mut self) -> Self {
        self.sentinel_queue = false;
        self
    }
}
