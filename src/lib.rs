//! Connwatch - connection-health monitoring for persistent streaming connections.
//!
//! A [`ConnectionMonitor`](monitor::ConnectionMonitor) supervises one
//! long-lived bidirectional connection (a WebSocket subscription channel, for
//! example). The owner reports when the connection opens, closes and
//! heartbeats; the monitor checks on its own schedule whether the connection
//! has gone silent and, within a bounded attempt budget, asks the owner to
//! reopen it.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`connection`] - The [`Reopen`](connection::Reopen) capability the monitor calls
//! - [`error`] - Error types for the crate
//! - [`monitor`] - The monitor, its state machine and check-interval curve
//! - [`cli`] - Command-line interface for the `connwatch` binary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use connwatch::config::MonitorConfig;
//! use connwatch::connection::Reopen;
//! use connwatch::monitor::ConnectionMonitor;
//!
//! struct Socket;
//!
//! impl Reopen for Socket {
//!     fn reopen(&self) {
//!         // schedule a redial on the socket's own task
//!     }
//! }
//!
//! # async fn run() -> connwatch::error::Result<()> {
//! let monitor = ConnectionMonitor::new(MonitorConfig::reconnecting(10, 3, 30), Arc::new(Socket))?;
//! monitor.start();
//! monitor.record_connect();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod monitor;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
