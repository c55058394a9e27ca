//! Event types crossing the service's two boundaries
//!
//! [`LinkEvent`] comes in from the host's BLE stack glue;
//! [`ServiceEvent`] goes out to the application handler.

use crate::link::traits::ConnHandle;

/// Events fed to the service by the host's BLE stack glue.
///
/// The service ignores writes and CCCD writes that target attribute
/// handles it does not own, so the glue may forward its whole event
/// stream unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent<'a> {
    /// A peer connected and the link layer assigned it a handle
    Connected { conn: ConnHandle },
    /// The session ended; the handle may later be reused for a new peer
    Disconnected { conn: ConnHandle },
    /// A peer wrote a characteristic value attribute
    Write {
        conn: ConnHandle,
        attr: u16,
        data: &'a [u8],
    },
    /// A peer wrote a client characteristic configuration descriptor
    CccdWrite {
        conn: ConnHandle,
        attr: u16,
        notifications: bool,
    },
    /// The stack drained a queued notification; more may be sent
    NotifyComplete { conn: ConnHandle },
}

/// Events delivered to the application handler.
///
/// Borrowed payloads are valid only for the duration of the handler
/// invocation and must be copied out if they are to be retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceEvent<'a> {
    /// The peer wrote `data` to the control point
    RxData { conn: ConnHandle, data: &'a [u8] },
    /// The outbound queue drained; the next send may proceed
    TxReady { conn: ConnHandle },
    /// The peer enabled status notifications
    NotificationsEnabled { conn: ConnHandle },
    /// The peer disabled status notifications
    NotificationsDisabled { conn: ConnHandle },
}

impl ServiceEvent<'_> {
    /// Connection the event belongs to
    pub fn conn(&self) -> ConnHandle {
        match *self {
            ServiceEvent::RxData { conn, .. }
            | ServiceEvent::TxReady { conn }
            | ServiceEvent::NotificationsEnabled { conn }
            | ServiceEvent::NotificationsDisabled { conn } => conn,
        }
    }
}

/// Application callback invoked synchronously for every service event
pub trait FidoEventHandler {
    fn on_event(&mut self, event: ServiceEvent<'_>);
}
