//! Boundary with the host BLE stack
//!
//! The service never talks to a radio directly; the host implements
//! [`LinkLayer`] on top of its stack and wires the service in.

pub mod traits;

pub use traits::{CharHandles, CharProps, ConnHandle, LinkError, LinkLayer};
