//! Readers for the Linux `/proc` filesystem.

pub mod parser;
pub mod system;

pub use system::SystemCollector;
