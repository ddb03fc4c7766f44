//! Network interface enumeration from `/proc/net/dev` and `/sys/class/net`.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use crate::collector::error::CollectError;
use crate::collector::procfs::SystemCollector;
use crate::collector::traits::FileSystem;

const SYS_CLASS_NET: &str = "/sys/class/net";

/// `IFF_UP` from `<linux/if.h>`.
pub const IFF_UP: u32 = 0x1;
/// `IFF_LOOPBACK` from `<linux/if.h>`.
pub const IFF_LOOPBACK: u32 = 0x8;

/// One usable interface with its cumulative counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetInfo {
    pub name: String,
    /// Hardware address as printed by sysfs; empty when unknown.
    pub address: String,
    pub is_loopback: bool,
    pub byte_read: u64,
    pub byte_write: u64,
    pub pk_read: u64,
    pub pk_write: u64,
}

impl NetInfo {
    /// Whether the hardware address identifies the device.
    ///
    /// Tunnels and loopback report no address or an all-zero one; those are
    /// never treated as mirrors of each other.
    pub fn has_identity(&self) -> bool {
        !self.address.is_empty() && self.address.chars().any(|c| c != '0' && c != ':')
    }
}

#[derive(Debug, Clone)]
struct IfaceMeta {
    address: String,
    is_loopback: bool,
}

/// Cache of static per-interface properties, keyed by interface name.
///
/// Entries for interfaces that disappear are evicted on the next listing.
#[derive(Debug, Default)]
pub struct NetIfaceCache {
    entries: HashMap<String, IfaceMeta>,
}

impl NetIfaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approximate heap usage in bytes.
    pub fn footprint(&self) -> usize {
        self.entries
            .iter()
            .map(|(k, v)| k.capacity() + v.address.capacity() + std::mem::size_of::<IfaceMeta>())
            .sum()
    }

    fn lookup(&mut self, fs: &dyn FileSystem, name: &str) -> &IfaceMeta {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| read_meta(fs, name))
    }
}

fn iface_dir(name: &str) -> PathBuf {
    PathBuf::from(SYS_CLASS_NET).join(name)
}

fn read_flags(fs: &dyn FileSystem, name: &str) -> Option<u32> {
    let raw = fs.read_to_string(&iface_dir(name).join("flags")).ok()?;
    let raw = raw.trim();
    u32::from_str_radix(raw.strip_prefix("0x").unwrap_or(raw), 16).ok()
}

fn read_meta(fs: &dyn FileSystem, name: &str) -> IfaceMeta {
    let address = fs
        .read_to_string(&iface_dir(name).join("address"))
        .map(|a| a.trim().to_string())
        .unwrap_or_default();
    let is_loopback = match read_flags(fs, name) {
        Some(flags) => flags & IFF_LOOPBACK != 0,
        None => name == "lo",
    };
    IfaceMeta {
        address,
        is_loopback,
    }
}

/// Lists interfaces that are administratively up, in kernel order.
///
/// Interfaces without a sysfs entry are assumed up. Fails only when
/// `/proc/net/dev` itself cannot be read.
pub fn list_usable_ifaces(
    fs: &dyn FileSystem,
    cache: &mut NetIfaceCache,
) -> Result<Vec<NetInfo>, CollectError> {
    let devices = SystemCollector::new(fs).net_dev()?;

    cache
        .entries
        .retain(|name, _| devices.iter().any(|d| &d.interface == name));

    let mut ifaces = Vec::with_capacity(devices.len());
    for dev in devices {
        let up = read_flags(fs, &dev.interface).is_none_or(|flags| flags & IFF_UP != 0);
        if !up {
            debug!(iface = %dev.interface, "skipping interface that is down");
            continue;
        }
        let meta = cache.lookup(fs, &dev.interface);
        ifaces.push(NetInfo {
            address: meta.address.clone(),
            is_loopback: meta.is_loopback,
            name: dev.interface,
            byte_read: dev.rx_bytes,
            byte_write: dev.tx_bytes,
            pk_read: dev.rx_packets,
            pk_write: dev.tx_packets,
        });
    }

    Ok(ifaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_list_usable_ifaces_typical() {
        let fs = MockFs::typical_system();
        let mut cache = NetIfaceCache::new();

        let ifaces = list_usable_ifaces(&fs, &mut cache).unwrap();
        assert_eq!(ifaces.len(), 2);
        assert_eq!(ifaces[0].name, "lo");
        assert!(ifaces[0].is_loopback);
        assert!(!ifaces[0].has_identity());
        assert_eq!(ifaces[1].name, "eth0");
        assert!(!ifaces[1].is_loopback);
        assert_eq!(ifaces[1].address, "52:54:00:12:34:56");
        assert!(ifaces[1].has_identity());
        assert_eq!(ifaces[1].byte_read, 987654321);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_list_usable_ifaces_skips_down() {
        let mut fs = MockFs::typical_system();
        fs.add_net_iface("eth0", "52:54:00:12:34:56", 0x1002);
        let mut cache = NetIfaceCache::new();

        let ifaces = list_usable_ifaces(&fs, &mut cache).unwrap();
        assert_eq!(ifaces.len(), 1);
        assert_eq!(ifaces[0].name, "lo");
    }

    #[test]
    fn test_list_usable_ifaces_without_sysfs() {
        let mut fs = MockFs::new();
        fs.set_net_dev(&[("lo", 1, 1, 1, 1), ("ppp0", 2, 2, 2, 2)]);
        let mut cache = NetIfaceCache::new();

        let ifaces = list_usable_ifaces(&fs, &mut cache).unwrap();
        assert_eq!(ifaces.len(), 2);
        assert!(ifaces[0].is_loopback);
        assert!(!ifaces[1].is_loopback);
        assert_eq!(ifaces[1].address, "");
    }

    #[test]
    fn test_cache_evicts_vanished_ifaces() {
        let mut fs = MockFs::typical_system();
        let mut cache = NetIfaceCache::new();
        list_usable_ifaces(&fs, &mut cache).unwrap();
        assert_eq!(cache.len(), 2);

        fs.set_net_dev(&[("lo", 1, 1, 1, 1)]);
        list_usable_ifaces(&fs, &mut cache).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.footprint() > 0);
    }

    #[test]
    fn test_list_usable_ifaces_missing_proc() {
        let fs = MockFs::new();
        let mut cache = NetIfaceCache::new();
        assert!(list_usable_ifaces(&fs, &mut cache).is_err());
    }
}
