//! Raw counter acquisition from the host.
//!
//! Providers read the host only through the traits in this module, so the
//! same provider code runs against the real `/proc` and `/sys` on Linux and
//! against `MockFs` in tests.
//!
//! ```text
//!   Provider::sample ──► SystemCollector (/proc)      ──┐
//!                   ──► sysfs::{net, block, thermal}  ──┼──► FileSystem (trait)
//!                   ──► CommandRunner (sh -c)            │      ├─ RealFs
//!                                                        │      └─ MockFs
//! ```
//!
//! # Usage
//!
//! ```
//! use multiload::collector::{MockFs, procfs::SystemCollector};
//!
//! let fs = MockFs::typical_system();
//! let load = SystemCollector::new(&fs).loadavg().unwrap();
//! assert_eq!(load.total, 150);
//! ```

mod error;
pub mod mock;
pub mod procfs;
pub mod sysfs;
pub mod traits;

pub use error::CollectError;
pub use mock::{MockCommands, MockFs};
pub use traits::{CommandOutput, CommandRunner, FileSystem, RealFs, ShellRunner, Sources};
