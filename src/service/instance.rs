//! Service instance: characteristic registration, link event dispatch,
//! and the notification send pipeline.
//!
//! All entry points are synchronous and non-blocking. The service is
//! built for a single-threaded event loop; a multi-threaded host must
//! serialize access to the instance itself.

use log::{debug, warn};

use crate::config::{gatt, service, uuid};
use crate::link::traits::{CharHandles, CharProps, ConnHandle, LinkError, LinkLayer};
use crate::service::context::LinkCtxStore;
use crate::service::events::{FidoEventHandler, LinkEvent, ServiceEvent};

/// Errors returned by [`FidoService::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// No data handler was supplied
    NullHandler,
    /// The link layer refused a characteristic registration
    Registration(LinkError),
}

/// Errors returned by [`FidoService::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// Payload exceeds the negotiated MTU minus notification overhead;
    /// the caller must chunk
    TooLong,
    /// The connection handle does not name a tracked session
    InvalidConnection,
    /// The peer has not enabled notifications on the status
    /// characteristic; the transport would drop the data silently
    NotSubscribed,
    /// The outbound queue is full; retry after the next `TxReady`
    Busy,
    /// The link layer failed for another reason
    Link,
}

/// Initialization parameters for the service
pub struct ServiceConfig<H> {
    /// Application handler invoked for every service event. Required.
    pub data_handler: Option<H>,
}

/// Attribute handles owned by one service instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHandles {
    pub control_point: CharHandles,
    pub status: CharHandles,
    pub control_point_length: CharHandles,
    pub service_revision_bitfield: CharHandles,
    pub service_revision: CharHandles,
}

/// FIDO GATT transport service instance.
///
/// Owns the link layer handle, the attribute handles, the per-connection
/// context store (capacity `MAX_CLIENTS`, fixed at construction) and the
/// application handler. The host feeds every link event into
/// [`on_link_evt`](Self::on_link_evt); the application pushes data out
/// with [`send`](Self::send), gated by [`ServiceEvent::TxReady`].
pub struct FidoService<L, H, const MAX_CLIENTS: usize> {
    link: L,
    handles: ServiceHandles,
    links: LinkCtxStore<MAX_CLIENTS>,
    handler: H,
}

impl<L, H, const MAX_CLIENTS: usize> FidoService<L, H, MAX_CLIENTS>
where
    L: LinkLayer,
    H: FidoEventHandler,
{
    /// Initialize the service: register its characteristics and build an
    /// empty context store.
    ///
    /// Fails with [`InitError::NullHandler`] if no data handler is
    /// supplied, or [`InitError::Registration`] if the link layer
    /// rejects a characteristic.
    pub fn init(mut link: L, config: ServiceConfig<H>) -> Result<Self, InitError> {
        let handler = config.data_handler.ok_or(InitError::NullHandler)?;
        let handles = Self::register_characteristics(&mut link)?;

        Ok(Self {
            link,
            handles,
            links: LinkCtxStore::new(),
            handler,
        })
    }

    fn register_characteristics(link: &mut L) -> Result<ServiceHandles, InitError> {
        let control_point = link
            .register_characteristic(uuid::FIDO_CONTROL_POINT, CharProps::write_only(), &[])
            .map_err(InitError::Registration)?;
        let status = link
            .register_characteristic(uuid::FIDO_STATUS, CharProps::notify_only(), &[])
            .map_err(InitError::Registration)?;
        let control_point_length = link
            .register_characteristic(
                uuid::FIDO_CONTROL_POINT_LENGTH,
                CharProps::read_only(),
                &(gatt::MAX_DATA_LEN as u16).to_be_bytes(),
            )
            .map_err(InitError::Registration)?;
        let service_revision_bitfield = link
            .register_characteristic(
                uuid::FIDO_SERVICE_REVISION_BITFIELD,
                CharProps::read_write(),
                &[service::REVISION_BITFIELD_FIDO2],
            )
            .map_err(InitError::Registration)?;
        let service_revision = link
            .register_characteristic(
                uuid::FIDO_SERVICE_REVISION,
                CharProps::read_only(),
                service::SERVICE_REVISION,
            )
            .map_err(InitError::Registration)?;

        Ok(ServiceHandles {
            control_point,
            status,
            control_point_length,
            service_revision_bitfield,
            service_revision,
        })
    }

    /// Single entry point for the host's link event feed.
    ///
    /// Updates per-connection state and invokes the application handler
    /// synchronously where the event taxonomy calls for it. Events that
    /// do not concern this service are ignored.
    pub fn on_link_evt(&mut self, event: LinkEvent<'_>) {
        match event {
            LinkEvent::Connected { conn } => self.on_connected(conn),
            LinkEvent::Disconnected { conn } => self.on_disconnected(conn),
            LinkEvent::CccdWrite {
                conn,
                attr,
                notifications,
            } if attr == self.handles.status.cccd => {
                self.on_subscription_change(conn, notifications)
            }
            LinkEvent::Write { conn, attr, data } if attr == self.handles.control_point.value => {
                self.on_control_point_write(conn, data)
            }
            LinkEvent::NotifyComplete { conn } => self.on_notify_complete(conn),
            _ => {
                // Write or CCCD write on an attribute we do not own
                debug!("fido: ignoring link event for foreign attribute");
            }
        }
    }

    /// Send `data` to a peer as one status notification.
    ///
    /// One call maps to one notification packet; payloads larger than
    /// the negotiated MTU minus 3 bytes of ATT overhead must be chunked
    /// by the caller, each chunk gated by [`ServiceEvent::TxReady`].
    /// Never retries and never blocks.
    pub fn send(&mut self, conn: ConnHandle, data: &[u8]) -> Result<usize, SendError> {
        let limit = self
            .link
            .att_mtu(conn)
            .saturating_sub(gatt::NOTIFICATION_OVERHEAD);
        if data.len() > limit {
            return Err(SendError::TooLong);
        }

        let subscribed = match self.links.lookup(conn) {
            Some(ctx) => ctx.notifications_enabled,
            None => return Err(SendError::InvalidConnection),
        };
        if !subscribed {
            return Err(SendError::NotSubscribed);
        }

        match self.link.notify(conn, self.handles.status.value, data) {
            Ok(()) => Ok(data.len()),
            Err(LinkError::Busy) => Err(SendError::Busy),
            Err(_) => Err(SendError::Link),
        }
    }

    /// Attribute handles registered for this instance
    pub fn handles(&self) -> &ServiceHandles {
        &self.handles
    }

    /// The link layer this instance was built with
    pub fn link(&self) -> &L {
        &self.link
    }

    /// The application handler supplied at init
    pub fn handler(&self) -> &H {
        &self.handler
    }

    fn on_connected(&mut self, conn: ConnHandle) {
        if self.links.occupy(conn).is_err() {
            // More concurrent links than slots is a host configuration
            // error; the peer is left untracked
            warn!("fido: no free link context for conn {}", conn.0);
        }
    }

    fn on_disconnected(&mut self, conn: ConnHandle) {
        if self.links.release(conn) {
            debug!("fido: released link context for conn {}", conn.0);
        }
    }

    fn on_subscription_change(&mut self, conn: ConnHandle, notifications: bool) {
        let ctx = match self.links.lookup(conn) {
            Some(ctx) => ctx,
            None => {
                warn!("fido: CCCD write for unknown conn {}", conn.0);
                return;
            }
        };

        // Repeated CCCD writes with the same value are no-ops
        if notifications == ctx.notifications_enabled {
            return;
        }
        ctx.notifications_enabled = notifications;

        let event = if notifications {
            ServiceEvent::NotificationsEnabled { conn }
        } else {
            ServiceEvent::NotificationsDisabled { conn }
        };
        self.handler.on_event(event);
    }

    fn on_control_point_write(&mut self, conn: ConnHandle, data: &[u8]) {
        if self.links.lookup(conn).is_none() {
            // A write for a link we do not track; drop it rather than
            // surface a fault for a stack inconsistency
            warn!("fido: control point write for unknown conn {}", conn.0);
            return;
        }
        self.handler.on_event(ServiceEvent::RxData { conn, data });
    }

    fn on_notify_complete(&mut self, conn: ConnHandle) {
        let subscribed = self
            .links
            .lookup(conn)
            .map_or(false, |ctx| ctx.notifications_enabled);
        if subscribed {
            self.handler.on_event(ServiceEvent::TxReady { conn });
        }
    }
}
