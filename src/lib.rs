//! Source-level debugging on top of the JDWP wire protocol.
//!
//! The [Session] turns requests like "break at `Main.java:12`" into JDWP
//! commands and the events the VM sends back into source positions. The
//! connection itself is behind the [Transport] trait and the mapping of source
//! lines to methods behind [PositionLookup].

#![deny(missing_debug_implementations)]

extern crate self as jdwp_bridge;

pub mod codec;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod signature;
pub mod source;
pub mod spec;
pub mod transport;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use notify::Notification;
pub use session::Session;
pub use source::{PositionLookup, SourceIndex, SourcePosition};
pub use transport::{Reply, Transport};

pub(crate) use jdwp_bridge_macros::jdwp_command;
