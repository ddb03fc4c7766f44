//! Disk throughput, split into reads and writes.

use tracing::debug;

use crate::caption::{Caption, CaptionComponent};
use crate::collector::procfs::parser::DiskStats;
use crate::collector::sysfs::{SECTOR_SIZE, list_disks};
use crate::dataset::{Dataset, DatasetMode};
use crate::fmt::{FmtStyle, format_bytes_rate};
use crate::rates::CounterDeltas;

use super::{
    ConfigValue, Filter, Provider, ProviderConfig, ProviderDescriptor, ProviderError,
    SamplingContext, strings_footprint,
};

const READ: usize = 0;
const WRITE: usize = 1;
const CATEGORIES: usize = 2;

const MIN_CEILING: u64 = 100;

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "disk",
    label: "Disk",
    description: "Shows disk I/O, split by direction (read/write).",
    help: "Only whole disks are counted; partitions and loop devices are ignored.",
    hue: 30,
    n: CATEGORIES,
    series: &["Read", "Write"],
    mode: DatasetMode::Delta,
    init,
};

struct DiskProvider {
    deltas: CounterDeltas<CATEGORIES>,
    count: [bool; CATEGORIES],
    filter: Filter,
    used_disks: Vec<String>,
}

fn init(config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    config.add_entry(
        "count_read",
        "Count reads",
        "Draw bytes read from disks.",
        ConfigValue::Bool(true),
    )?;
    config.add_entry(
        "count_write",
        "Count writes",
        "Draw bytes written to disks.",
        ConfigValue::Bool(true),
    )?;
    config.add_entry(
        "filter",
        "Filter",
        "Disks that aren't in this list will not be used. \
         If this list is empty, all available disks will be used.",
        ConfigValue::List(Filter::default()),
    )?;

    Ok(Box::new(DiskProvider {
        deltas: CounterDeltas::new(),
        count: [true; CATEGORIES],
        filter: Filter::default(),
        used_disks: Vec::new(),
    }))
}

/// Keeps the first device for each `major:minor` pair.
fn dedup_by_device_number(disks: Vec<DiskStats>) -> Vec<DiskStats> {
    let mut kept: Vec<DiskStats> = Vec::with_capacity(disks.len());
    for disk in disks {
        if let Some(first) = kept
            .iter()
            .find(|k| (k.major, k.minor) == (disk.major, disk.minor))
        {
            debug!(
                disk = %disk.device,
                same_as = %first.device,
                "skipping disk with duplicate device number"
            );
            continue;
        }
        kept.push(disk);
    }
    kept
}

impl Provider for DiskProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        let config = ctx.config();
        self.count[READ] = config.get_bool("count_read").unwrap_or(true);
        self.count[WRITE] = config.get_bool("count_write").unwrap_or(true);
        self.filter = config.get_list("filter").cloned().unwrap_or_default();
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        let disks = list_disks(ctx.sources().fs)?;
        if disks.is_empty() {
            return Err(ProviderError::DataUnavailable(
                "Cannot find any usable disk".to_string(),
            ));
        }

        let mut totals = [0u64; CATEGORIES];
        self.used_disks.clear();

        for disk in dedup_by_device_number(disks) {
            if !self.filter.includes(&disk.device) {
                continue;
            }
            if self.count[READ] {
                totals[READ] = totals[READ]
                    .saturating_add(disk.read_sectors.saturating_mul(SECTOR_SIZE));
            }
            if self.count[WRITE] {
                totals[WRITE] = totals[WRITE]
                    .saturating_add(disk.write_sectors.saturating_mul(SECTOR_SIZE));
            }
            self.used_disks.push(disk.device);
        }

        let diff = self.deltas.update(totals, ctx.is_first_call());
        ctx.set_data(READ, diff[READ]);
        ctx.set_data(WRITE, diff[WRITE]);
        ctx.set_max(MIN_CEILING);
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>() + self.filter.footprint() + strings_footprint(&self.used_disks)
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        for (i, label) in ["Read", "Write"].iter().enumerate() {
            if self.count[i] {
                let rate = dataset.per_second(dataset.latest(i));
                caption.body_line(format_args!(
                    "{}: {}",
                    label,
                    format_bytes_rate(rate, FmtStyle::Detail)
                ));
            } else {
                caption.body_line(format_args!("{}: not measuring", label));
            }
        }
        caption.set(
            CaptionComponent::Footer,
            format_args!("Monitored disks: {}", self.used_disks.join(", ")),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::caption::CaptionComponent;
    use crate::collector::MockFs;
    use crate::provider::ProviderError;
    use crate::provider::testing::Harness;

    fn diskstats(sda: (u64, u64), nvme: (u64, u64)) -> String {
        format!(
            "8 0 sda 100 0 {} 0 50 0 {} 0 0 0 0 0 0 0 0\n\
             8 1 sda1 90 0 {} 0 40 0 {} 0 0 0 0 0 0 0 0\n\
             259 0 nvme0n1 10 0 {} 0 5 0 {} 0 0 0 0 0 0 0 0\n\
             7 0 loop0 1 0 999 0 0 0 0 0 0 0 0 0 0 0 0\n",
            sda.0, sda.1, sda.0, sda.1, nvme.0, nvme.1
        )
    }

    fn disks(sda: (u64, u64), nvme: (u64, u64)) -> MockFs {
        let mut fs = MockFs::new();
        fs.add_file("/proc/diskstats", diskstats(sda, nvme));
        fs.add_block_device("sda");
        fs.add_block_device("nvme0n1");
        fs.add_block_device("loop0");
        fs
    }

    #[test]
    fn test_sectors_to_bytes() {
        let mut h = Harness::new("disk", disks((1000, 2000), (10, 20)));
        assert_eq!(h.tick().unwrap().values, [0, 0]);

        h.fs = disks((1002, 2004), (11, 20));
        let tick = h.tick().unwrap();
        // partitions and loop devices are not counted twice
        assert_eq!(tick.values, [3 * 512, 4 * 512]);
        assert_eq!(tick.ceiling, 100);

        let caption = h.caption();
        assert_eq!(
            caption.get(CaptionComponent::Body),
            "Read: 1.5 KiB/s\nWrite: 2.0 KiB/s"
        );
        assert_eq!(
            caption.get(CaptionComponent::Footer),
            "Monitored disks: sda, nvme0n1"
        );
    }

    #[test]
    fn test_huge_sector_counts_saturate() {
        let huge = u64::MAX / 4;
        let mut h = Harness::new("disk", disks((huge, huge), (huge, 0)));
        assert_eq!(h.tick().unwrap().values, [0, 0]);

        h.fs = disks((huge, huge), (huge, 7));
        assert_eq!(h.tick().unwrap().values, [0, 0]);
    }

    #[test]
    fn test_counter_regression_clamps_per_category() {
        let mut h = Harness::new("disk", disks((1000, 2000), (0, 0)));
        h.tick().unwrap();
        h.fs = disks((10, 2010), (0, 0));
        assert_eq!(h.tick().unwrap().values, [0, 10 * 512]);
    }

    #[test]
    fn test_filter_and_disabled_category() {
        let mut h = Harness::new("disk", disks((1000, 2000), (10, 20)));
        h.set("filter", "nvme0n1");
        h.set("count_write", "false");
        h.tick().unwrap();

        h.fs = disks((5000, 5000), (12, 30));
        assert_eq!(h.tick().unwrap().values, [2 * 512, 0]);

        let caption = h.caption();
        assert_eq!(
            caption.get(CaptionComponent::Body),
            "Read: 1.0 KiB/s\nWrite: not measuring"
        );
        assert_eq!(caption.get(CaptionComponent::Footer), "Monitored disks: nvme0n1");
    }

    #[test]
    fn test_duplicate_device_number_counted_once() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/diskstats",
            "   8 0 sda 1 0 100 0 1 0 100 0 0 0 0 0 0 0 0\n   8 0 sdx 1 0 100 0 1 0 100 0 0 0 0 0 0 0 0\n",
        );
        fs.add_block_device("sda");
        fs.add_block_device("sdx");
        let mut h = Harness::new("disk", fs);
        h.tick().unwrap();
        assert_eq!(
            h.caption().get(CaptionComponent::Footer),
            "Monitored disks: sda"
        );
    }

    #[test]
    fn test_no_disks_is_data_unavailable() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/diskstats", "   7 0 loop0 1 0 2 0 0 0 0 0 0 0 0 0 0 0 0\n");
        fs.add_block_device("loop0");
        let mut h = Harness::new("disk", fs);
        assert!(matches!(h.tick(), Err(ProviderError::DataUnavailable(_))));
    }
}
