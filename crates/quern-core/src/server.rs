//! Placeholder network server.

use quern_error::Result;
use tracing::info;

/// The network face of the engine. Serving is not implemented; `serve` logs
/// the address it would bind and returns.
#[derive(Debug, Default)]
pub struct Server;

impl Server {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Would bind `addr` and accept connections.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature matches the eventual behavior.
    pub fn serve(&self, addr: &str) -> Result<()> {
        info!(%addr, "server stub invoked, not binding");
        Ok(())
    }
}
