//! Link layer trait for abstraction and testability
//!
//! This trait defines the interface the service needs from the host's
//! BLE stack, allowing the real stack glue to be swapped with a mock
//! for testing.

/// Handle naming one active peer connection.
///
/// Assigned by the link layer, opaque to the service, and valid only
/// while the session is active. The link layer may reuse a handle for a
/// new peer after the disconnect event has been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnHandle(pub u16);

/// Errors reported by the link layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The per-connection outbound notification queue is full
    Busy,
    /// Attribute table space exhausted during registration
    NoResources,
    /// Any other stack failure
    Failed,
}

/// GATT characteristic properties requested at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharProps {
    pub read: bool,
    pub write: bool,
    pub notify: bool,
}

impl CharProps {
    pub const fn read_only() -> Self {
        Self {
            read: true,
            write: false,
            notify: false,
        }
    }

    pub const fn write_only() -> Self {
        Self {
            read: false,
            write: true,
            notify: false,
        }
    }

    pub const fn notify_only() -> Self {
        Self {
            read: false,
            write: false,
            notify: true,
        }
    }

    pub const fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            notify: false,
        }
    }
}

/// Attribute handles assigned to one registered characteristic
///
/// `cccd` is zero when the characteristic has no client characteristic
/// configuration descriptor (i.e. it does not support notifications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharHandles {
    /// Handle of the characteristic value attribute
    pub value: u16,
    /// Handle of the CCCD attribute, or 0 if none
    pub cccd: u16,
}

/// Abstract link layer interface for testability
///
/// All operations are synchronous and non-blocking: a notification is
/// either queued by the stack or rejected immediately.
pub trait LinkLayer {
    /// Register one characteristic in the attribute table.
    ///
    /// `initial_value` seeds the value attribute for readable
    /// characteristics; it may be empty.
    fn register_characteristic(
        &mut self,
        uuid: u16,
        props: CharProps,
        initial_value: &[u8],
    ) -> Result<CharHandles, LinkError>;

    /// Currently negotiated ATT MTU for a connection.
    ///
    /// Returns the default MTU when no exchange has taken place or the
    /// handle is not known to the stack.
    fn att_mtu(&self, conn: ConnHandle) -> usize;

    /// Queue one handle value notification on a connection.
    ///
    /// Returns [`LinkError::Busy`] when the outbound queue is full; the
    /// stack signals queue drain with a notify-complete link event.
    fn notify(&mut self, conn: ConnHandle, attr: u16, data: &[u8]) -> Result<(), LinkError>;
}

#[cfg(test)]
pub mod mock {
    //! Mock link layer for testing

    use super::*;
    use crate::config::gatt::{DEFAULT_ATT_MTU, MAX_DATA_LEN};
    use core::cell::RefCell;
    use heapless::Vec;

    /// One characteristic registered with the mock
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RegisteredChar {
        pub uuid: u16,
        pub props: CharProps,
        pub handles: CharHandles,
        pub initial_value: Vec<u8, 16>,
    }

    /// One notification queued through the mock
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Notification {
        pub conn: ConnHandle,
        pub attr: u16,
        pub data: Vec<u8, MAX_DATA_LEN>,
    }

    /// Mock link layer for unit testing
    pub struct MockLinkLayer {
        /// Next attribute handle to hand out
        next_handle: RefCell<u16>,
        /// Characteristics registered so far
        registered: RefCell<Vec<RegisteredChar, 8>>,
        /// Record of queued notifications
        tx_history: RefCell<Vec<Notification, 8>>,
        /// Error to return on next notify
        next_notify_error: RefCell<Option<LinkError>>,
        /// Error to return on next registration
        next_register_error: RefCell<Option<LinkError>>,
        /// Negotiated MTU reported for every connection
        att_mtu: RefCell<usize>,
    }

    impl MockLinkLayer {
        /// Create a new mock link layer
        pub fn new() -> Self {
            Self {
                next_handle: RefCell::new(1),
                registered: RefCell::new(Vec::new()),
                tx_history: RefCell::new(Vec::new()),
                next_notify_error: RefCell::new(None),
                next_register_error: RefCell::new(None),
                att_mtu: RefCell::new(DEFAULT_ATT_MTU),
            }
        }

        /// Set an error to be returned by the next notify() call
        pub fn set_next_notify_error(&self, error: LinkError) {
            *self.next_notify_error.borrow_mut() = Some(error);
        }

        /// Set an error to be returned by the next register_characteristic() call
        pub fn set_next_register_error(&self, error: LinkError) {
            *self.next_register_error.borrow_mut() = Some(error);
        }

        /// Set the MTU reported for every connection
        pub fn set_att_mtu(&self, mtu: usize) {
            *self.att_mtu.borrow_mut() = mtu;
        }

        /// Get all queued notifications
        pub fn notifications(&self) -> Vec<Notification, 8> {
            self.tx_history.borrow().clone()
        }

        /// Get all registered characteristics
        pub fn registered_characteristics(&self) -> Vec<RegisteredChar, 8> {
            self.registered.borrow().clone()
        }

        /// Look up a registered characteristic by UUID
        pub fn find_registered(&self, uuid: u16) -> Option<RegisteredChar> {
            self.registered
                .borrow()
                .iter()
                .find(|c| c.uuid == uuid)
                .cloned()
        }
    }

    impl Default for MockLinkLayer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LinkLayer for MockLinkLayer {
        fn register_characteristic(
            &mut self,
            uuid: u16,
            props: CharProps,
            initial_value: &[u8],
        ) -> Result<CharHandles, LinkError> {
            if let Some(error) = self.next_register_error.borrow_mut().take() {
                return Err(error);
            }

            let mut next = self.next_handle.borrow_mut();
            let value = *next;
            *next += 1;
            let cccd = if props.notify {
                let h = *next;
                *next += 1;
                h
            } else {
                0
            };

            let handles = CharHandles { value, cccd };
            let mut value_copy = Vec::new();
            value_copy
                .extend_from_slice(initial_value)
                .map_err(|_| LinkError::NoResources)?;
            self.registered
                .borrow_mut()
                .push(RegisteredChar {
                    uuid,
                    props,
                    handles,
                    initial_value: value_copy,
                })
                .map_err(|_| LinkError::NoResources)?;

            Ok(handles)
        }

        fn att_mtu(&self, _conn: ConnHandle) -> usize {
            *self.att_mtu.borrow()
        }

        fn notify(&mut self, conn: ConnHandle, attr: u16, data: &[u8]) -> Result<(), LinkError> {
            if let Some(error) = self.next_notify_error.borrow_mut().take() {
                return Err(error);
            }

            let mut bytes = Vec::new();
            bytes
                .extend_from_slice(data)
                .map_err(|_| LinkError::Failed)?;
            let _ = self.tx_history.borrow_mut().push(Notification {
                conn,
                attr,
                data: bytes,
            });

            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_register_assigns_cccd_for_notify() {
            let mut link = MockLinkLayer::new();

            let plain = link
                .register_characteristic(0xFFF1, CharProps::write_only(), &[])
                .unwrap();
            assert_eq!(plain.cccd, 0);

            let notifying = link
                .register_characteristic(0xFFF2, CharProps::notify_only(), &[])
                .unwrap();
            assert_ne!(notifying.cccd, 0);
            assert_ne!(notifying.value, plain.value);
            assert_ne!(notifying.cccd, notifying.value);
        }

        #[test]
        fn test_notify_records_history() {
            let mut link = MockLinkLayer::new();

            link.notify(ConnHandle(3), 7, &[0xAA, 0xBB]).unwrap();

            let history = link.notifications();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].conn, ConnHandle(3));
            assert_eq!(history[0].attr, 7);
            assert_eq!(history[0].data.as_slice(), &[0xAA, 0xBB]);
        }

        #[test]
        fn test_scripted_notify_error_clears() {
            let mut link = MockLinkLayer::new();

            link.set_next_notify_error(LinkError::Busy);
            assert_eq!(link.notify(ConnHandle(1), 7, &[0x01]), Err(LinkError::Busy));

            // Error should be cleared, next call should succeed
            link.notify(ConnHandle(1), 7, &[0x02]).unwrap();
            assert_eq!(link.notifications().len(), 1);
        }

        #[test]
        fn test_default_mtu() {
            let link = MockLinkLayer::new();
            assert_eq!(link.att_mtu(ConnHandle(0)), DEFAULT_ATT_MTU);

            link.set_att_mtu(247);
            assert_eq!(link.att_mtu(ConnHandle(0)), 247);
        }
    }
}
