//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` and `/sys` states for the
//! providers' tests.

use super::filesystem::MockFs;

/// Header lines of `/proc/net/dev`.
pub const NET_DEV_HEADER: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
";

/// Renders one `/proc/net/dev` line.
pub fn net_dev_line(iface: &str, rx_bytes: u64, rx_packets: u64, tx_bytes: u64, tx_packets: u64) -> String {
    format!(
        "{iface:>6}: {rx_bytes} {rx_packets} 0 0 0 0 0 0 {tx_bytes} {tx_packets} 0 0 0 0 0 0\n"
    )
}

impl MockFs {
    /// Creates a typical single-host system: two CPUs, one ethernet interface
    /// plus loopback, one NVMe disk and one SATA disk, two thermal zones.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 1234\n");
        fs.add_file("/proc/sys/kernel/ostype", "Linux\n");
        fs.add_file("/proc/sys/kernel/osrelease", "6.1.0-13-amd64\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        3072000 kB
Dirty:              1024 kB
Writeback:             0 kB
Shmem:            256000 kB
Slab:             512000 kB
SReclaimable:     256000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 5000 250 1500 40000 500 100 50 0 0 0
cpu1 5000 250 1500 40000 500 100 50 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/cpuinfo",
            "\
processor\t: 0
vendor_id\t: GenuineIntel
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 1800.000

processor\t: 1
vendor_id\t: GenuineIntel
model name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz
cpu MHz\t\t: 1600.000
",
        );
        fs.add_file(
            "/sys/devices/system/cpu/cpu0/cpufreq/scaling_governor",
            "powersave\n",
        );

        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0
   7       0 loop0 10 0 100 0 0 0 0 0 0 0 0 0 0 0 0
",
        );
        fs.add_block_device("sda");
        fs.add_block_device("nvme0n1");
        fs.add_block_device("loop0");

        let mut net_dev = NET_DEV_HEADER.to_string();
        net_dev.push_str(&net_dev_line("lo", 12345678, 9876, 12345678, 9876));
        net_dev.push_str(&net_dev_line("eth0", 987654321, 654321, 123456789, 456789));
        fs.add_file("/proc/net/dev", net_dev);
        fs.add_net_iface("lo", "00:00:00:00:00:00", 0x9);
        fs.add_net_iface("eth0", "52:54:00:12:34:56", 0x1003);

        fs.add_thermal_zone(0, "acpitz", 45000, Some(105000));
        fs.add_thermal_zone(1, "x86_pkg_temp", 52000, None);

        fs
    }

    /// Rewrites `/proc/net/dev` with the given interface counters
    /// `(name, rx_bytes, rx_packets, tx_bytes, tx_packets)`.
    pub fn set_net_dev(&mut self, ifaces: &[(&str, u64, u64, u64, u64)]) {
        let mut content = NET_DEV_HEADER.to_string();
        for &(name, rxb, rxp, txb, txp) in ifaces {
            content.push_str(&net_dev_line(name, rxb, rxp, txb, txp));
        }
        self.add_file("/proc/net/dev", content);
    }
}
