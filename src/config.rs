//! Protocol and service constants for the FIDO GATT transport

/// 16-bit UUIDs of the FIDO service and its characteristics
pub mod uuid {
    pub const FIDO_SERVICE: u16 = 0xFFFD;
    pub const FIDO_CONTROL_POINT: u16 = 0xFFF1;
    pub const FIDO_STATUS: u16 = 0xFFF2;
    pub const FIDO_CONTROL_POINT_LENGTH: u16 = 0xFFF3;
    pub const FIDO_SERVICE_REVISION_BITFIELD: u16 = 0xFFF4;
    pub const FIDO_SERVICE_REVISION: u16 = 0x2A28;
}

/// ATT protocol constants
pub mod gatt {
    /// Opcode byte of a handle value notification
    pub const OPCODE_LENGTH: usize = 1;

    /// Attribute handle bytes of a handle value notification
    pub const HANDLE_LENGTH: usize = 2;

    /// Fixed per-notification overhead subtracted from the ATT MTU
    pub const NOTIFICATION_OVERHEAD: usize = OPCODE_LENGTH + HANDLE_LENGTH;

    /// ATT MTU before any MTU exchange has taken place
    pub const DEFAULT_ATT_MTU: usize = 23;

    /// Largest ATT MTU the host stack is configured to negotiate
    pub const MAX_ATT_MTU: usize = 247;

    /// Largest payload a single notification can carry at the maximum MTU
    pub const MAX_DATA_LEN: usize = MAX_ATT_MTU - NOTIFICATION_OVERHEAD;
}

/// Service defaults
pub mod service {
    /// Default number of concurrent peer connections tracked by the service
    pub const MAX_CLIENTS: usize = 4;

    /// FIDO2/CTAP2 flag of the service revision bitfield characteristic
    pub const REVISION_BITFIELD_FIDO2: u8 = 0x20;

    /// U2F revision string published by the service revision characteristic
    pub const SERVICE_REVISION: &[u8] = b"1.2";
}
