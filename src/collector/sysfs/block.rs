//! Whole-disk enumeration from `/proc/diskstats` and `/sys/block`.

use std::path::PathBuf;

use crate::collector::error::CollectError;
use crate::collector::procfs::SystemCollector;
use crate::collector::procfs::parser::DiskStats;
use crate::collector::traits::FileSystem;

/// Size of a diskstats sector, fixed by the kernel regardless of hardware.
pub const SECTOR_SIZE: u64 = 512;

/// Device name prefixes that never represent physical storage.
const VIRTUAL_PREFIXES: [&str; 2] = ["loop", "ram"];

fn is_whole_disk(fs: &dyn FileSystem, device: &str) -> bool {
    // sysfs spells '/' in device names (cciss/c0d0) as '!'
    let sys_name = device.replace('/', "!");
    fs.exists(&PathBuf::from("/sys/block").join(sys_name))
}

/// Lists whole physical disks in diskstats order; partitions and virtual
/// devices are dropped so that traffic is not counted twice.
pub fn list_disks(fs: &dyn FileSystem) -> Result<Vec<DiskStats>, CollectError> {
    let disks = SystemCollector::new(fs).diskstats()?;
    Ok(disks
        .into_iter()
        .filter(|d| !VIRTUAL_PREFIXES.iter().any(|p| d.device.starts_with(p)))
        .filter(|d| is_whole_disk(fs, &d.device))
        .collect())
}
