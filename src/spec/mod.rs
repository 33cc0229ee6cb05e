//! The subset of the JDWP wire model this crate speaks.
//!
//! Commands are grouped into modules by command set, the same way the JDWP
//! documentation groups them.

mod commands;
mod constants;
mod protocol;
mod types;

pub use commands::*;
pub use constants::*;
pub use protocol::*;
pub use types::*;
