//! Test doubles for the host sources.

mod filesystem;
mod scenarios;

pub use filesystem::{MockCommands, MockFs};
pub use scenarios::{NET_DEV_HEADER, net_dev_line};
