//! HTTP server configuration object and helpers.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const BIND_ADDR_VAR: &str = "BIND_ADDR";
const NOTIFY_TIMEOUT_VAR: &str = "NOTIFY_TIMEOUT_MS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 2_000;

/// Builder-style configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) dispatch_timeout: Duration,
}

impl ServerConfig {
    /// Construct a server configuration from explicit values.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, dispatch_timeout: Duration) -> Self {
        Self {
            bind_addr,
            dispatch_timeout,
        }
    }

    /// Build configuration from the environment.
    ///
    /// Reads `BIND_ADDR` (default `0.0.0.0:8080`) and `NOTIFY_TIMEOUT_MS`
    /// (default 2000, the budget for one notification dispatch).
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when a variable is set but unparseable.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = env::var(BIND_ADDR_VAR)
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
            .parse::<SocketAddr>()
            .map_err(|e| std::io::Error::other(format!("invalid {BIND_ADDR_VAR}: {e}")))?;
        let timeout_ms = match env::var(NOTIFY_TIMEOUT_VAR) {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| std::io::Error::other(format!("invalid {NOTIFY_TIMEOUT_VAR}: {e}")))?,
            Err(_) => DEFAULT_NOTIFY_TIMEOUT_MS,
        };
        Ok(Self {
            bind_addr,
            dispatch_timeout: Duration::from_millis(timeout_ms),
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the per-dispatch notification timeout.
    #[must_use]
    pub fn dispatch_timeout(&self) -> Duration {
        self.dispatch_timeout
    }
}
