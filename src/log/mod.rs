//! Records, handlers and the handler registry
//!
//! This module provides the emission path behind every
//! [`Loggable`](crate::Loggable): a record is dispatched to the handlers
//! registered for the logger's identity, which filter and write it.

pub mod handler;
pub mod record;
pub mod registry;

pub use handler::{Handler, HandlerSpec, SharedBuffer, Sink, StreamHandler, TracingHandler};
pub use record::Record;
pub use registry::HandlerRegistry;
