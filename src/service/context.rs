//! Per-connection link context storage
//!
//! Fixed-capacity map from connection handle to per-peer state. Capacity
//! is set at construction and never grows; the link layer is expected to
//! enforce the same (or a smaller) concurrency limit.

use heapless::LinearMap;

use crate::link::traits::ConnHandle;

/// State kept for one connected peer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientContext {
    /// Whether the peer has written the status CCCD to enable notifications
    pub notifications_enabled: bool,
}

/// Returned by [`LinkCtxStore::occupy`] when every slot holds a live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreFull;

/// Fixed-capacity store of per-connection contexts.
///
/// A context exists for a handle exactly while the store tracks that
/// session: `occupy` on connect, `release` on disconnect. Slots are
/// reused, and reuse always starts from a zeroed context so no
/// subscription state leaks between sessions.
pub struct LinkCtxStore<const N: usize> {
    links: LinearMap<ConnHandle, ClientContext, N>,
}

impl<const N: usize> LinkCtxStore<N> {
    /// Create an empty store
    pub const fn new() -> Self {
        Self {
            links: LinearMap::new(),
        }
    }

    /// Number of slots, fixed at construction
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of currently tracked connections
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns true if no connection is tracked
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Claim a slot for a connection, resetting its context.
    ///
    /// If the handle is already tracked (the link layer reused it
    /// without a disconnect reaching us), the existing slot is reset
    /// rather than duplicated.
    pub fn occupy(&mut self, conn: ConnHandle) -> Result<&mut ClientContext, StoreFull> {
        self.links
            .insert(conn, ClientContext::default())
            .map_err(|_| StoreFull)?;
        self.links.get_mut(&conn).ok_or(StoreFull)
    }

    /// Find the context for a tracked connection
    pub fn lookup(&mut self, conn: ConnHandle) -> Option<&mut ClientContext> {
        self.links.get_mut(&conn)
    }

    /// Release the slot of a connection.
    ///
    /// Returns true if the connection was tracked.
    pub fn release(&mut self, conn: ConnHandle) -> bool {
        self.links.remove(&conn).is_some()
    }
}

impl<const N: usize> Default for LinkCtxStore<N> {
    fn default() -> Self {
        Self::new()
    }
}
