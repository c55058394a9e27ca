//! FIDO service core
//!
//! Per-connection subscription state, link event dispatch, and the
//! flow-controlled notification send pipeline.

pub mod context;
pub mod events;
pub mod instance;

pub use context::{ClientContext, LinkCtxStore, StoreFull};
pub use events::{FidoEventHandler, LinkEvent, ServiceEvent};
pub use instance::{FidoService, InitError, SendError, ServiceConfig, ServiceHandles};
