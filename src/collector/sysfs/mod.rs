//! Readers for the Linux `/sys` filesystem.

pub mod block;
pub mod net;
pub mod thermal;

use std::path::Path;

use crate::collector::traits::FileSystem;

pub use block::{SECTOR_SIZE, list_disks};
pub use net::{NetIfaceCache, NetInfo, list_usable_ifaces};
pub use thermal::{ThermalZone, list_thermal_zones};

/// Frequency governor of the first CPU, if cpufreq is available.
pub fn cpu_governor(fs: &dyn FileSystem) -> Option<String> {
    fs.read_to_string(Path::new(
        "/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor",
    ))
    .ok()
    .map(|g| g.trim().to_string())
    .filter(|g| !g.is_empty())
}
