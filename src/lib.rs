#![cfg_attr(not(test), no_std)]

//! FIDO GATT transport service.
//!
//! A payload-agnostic, bidirectional transport over BLE: peers write
//! requests to the control point characteristic and receive responses as
//! handle value notifications on the status characteristic. The host's
//! BLE stack glue implements [`link::LinkLayer`] and feeds link events
//! into [`service::FidoService`].

pub mod config;
pub mod link;
pub mod service;
