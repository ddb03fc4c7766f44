//! System collector for gathering global counters from `/proc/`.

use crate::collector::error::CollectError;
use crate::collector::procfs::parser::{
    CpuInfo, DiskStats, GlobalStat, LoadAvg, MemInfo, NetDevStats, parse_cpuinfo,
    parse_diskstats, parse_global_stat, parse_loadavg, parse_meminfo, parse_net_dev,
};
use crate::collector::traits::FileSystem;
use std::path::Path;

/// Reads system-wide counters from `/proc/`.
pub struct SystemCollector<'a> {
    fs: &'a dyn FileSystem,
    proc_path: &'a str,
}

impl<'a> SystemCollector<'a> {
    /// Creates a collector reading from `/proc`.
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self::with_proc_path(fs, "/proc")
    }

    /// Creates a collector rooted at a different proc mount.
    pub fn with_proc_path(fs: &'a dyn FileSystem, proc_path: &'a str) -> Self {
        Self { fs, proc_path }
    }

    fn read(&self, file: &str) -> Result<String, CollectError> {
        let path = format!("{}/{}", self.proc_path, file);
        Ok(self.fs.read_to_string(Path::new(&path))?)
    }

    /// Collects memory information from `/proc/meminfo`.
    pub fn meminfo(&self) -> Result<MemInfo, CollectError> {
        Ok(parse_meminfo(&self.read("meminfo")?)?)
    }

    /// Collects CPU time slices from `/proc/stat`.
    pub fn global_stat(&self) -> Result<GlobalStat, CollectError> {
        Ok(parse_global_stat(&self.read("stat")?)?)
    }

    /// Reads the static CPU description. Absent file yields defaults.
    pub fn cpuinfo(&self) -> CpuInfo {
        self.read("cpuinfo")
            .map(|c| parse_cpuinfo(&c))
            .unwrap_or_default()
    }

    /// Collects load average from `/proc/loadavg`.
    pub fn loadavg(&self) -> Result<LoadAvg, CollectError> {
        Ok(parse_loadavg(&self.read("loadavg")?)?)
    }

    /// Collects disk I/O statistics from `/proc/diskstats`.
    pub fn diskstats(&self) -> Result<Vec<DiskStats>, CollectError> {
        Ok(parse_diskstats(&self.read("diskstats")?)?)
    }

    /// Collects network device counters from `/proc/net/dev`.
    pub fn net_dev(&self) -> Result<Vec<NetDevStats>, CollectError> {
        Ok(parse_net_dev(&self.read("net/dev")?)?)
    }

    /// Seconds since boot from `/proc/uptime`. `None` when unavailable.
    pub fn uptime(&self) -> Option<u64> {
        let content = self.read("uptime").ok()?;
        let secs: f64 = content.split_whitespace().next()?.parse().ok()?;
        Some(secs as u64)
    }

    /// Kernel name and release, e.g. `"Linux 6.1.0"`. Empty when unavailable.
    pub fn kernel(&self) -> String {
        let ostype = self.read("sys/kernel/ostype").unwrap_or_default();
        let release = self.read("sys/kernel/osrelease").unwrap_or_default();
        format!("{} {}", ostype.trim(), release.trim())
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_system_collector_typical_system() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(&fs);

        assert_eq!(collector.meminfo().unwrap().mem_total, 16384000);
        assert_eq!(collector.global_stat().unwrap().cpu_count(), 2);
        assert_eq!(collector.loadavg().unwrap().total, 150);
        assert_eq!(collector.diskstats().unwrap().len(), 4);
        assert_eq!(collector.net_dev().unwrap().len(), 2);
        assert_eq!(collector.cpuinfo().processors, 2);
        assert_eq!(collector.kernel(), "Linux 6.1.0-13-amd64");
        assert_eq!(collector.uptime(), Some(12345));
    }

    #[test]
    fn test_system_collector_missing_file() {
        let fs = MockFs::new();
        let collector = SystemCollector::new(&fs);

        assert!(matches!(collector.meminfo(), Err(CollectError::Io(_))));
        assert_eq!(collector.kernel(), "");
        assert_eq!(collector.uptime(), None);
        assert_eq!(collector.cpuinfo().processors, 0);
    }

    #[test]
    fn test_system_collector_parse_failure() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/loadavg", "garbage\n");
        let collector = SystemCollector::new(&fs);

        assert!(matches!(collector.loadavg(), Err(CollectError::Parse(_))));
    }
}
