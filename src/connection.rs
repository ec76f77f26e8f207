//! The monitor's single outbound capability: asking the owner to reopen.
//!
//! The monitor never touches the transport. When it decides a connection is
//! stale it calls [`Reopen::reopen`] on whatever its owner handed it and moves
//! on; success or failure comes back later through `record_connect` /
//! `record_disconnect`.

use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Request from a monitor that its connection be torn down and re-established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenRequest;

/// Something that can be asked to reopen a connection.
///
/// Called from the monitor's background task with the state guard released,
/// so an implementation may call `record_connect`, `record_disconnect`,
/// `record_ping` or `status` on the same monitor. `start` and `stop` wait for
/// the dispatch to finish and must not be called from here. Return promptly;
/// slow work belongs on another task.
pub trait Reopen: Send + Sync {
    fn reopen(&self);
}

impl<T: Reopen + ?Sized> Reopen for Arc<T> {
    fn reopen(&self) {
        (**self).reopen();
    }
}

/// Lets a connection own its monitor without a reference cycle.
///
/// A dropped target means the connection is gone, so the request is skipped.
impl<T: Reopen> Reopen for Weak<T> {
    fn reopen(&self) {
        match self.upgrade() {
            Some(target) => target.reopen(),
            None => debug!("Connection dropped, skipping reopen"),
        }
    }
}

/// Channel hand-off to the owner's task.
impl Reopen for mpsc::UnboundedSender<ReopenRequest> {
    fn reopen(&self) {
        if self.send(ReopenRequest).is_err() {
            warn!("Reopen receiver closed, request dropped");
        }
    }
}
