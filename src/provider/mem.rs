//! Physical memory usage.

use crate::caption::{Caption, CaptionComponent};
use crate::collector::procfs::SystemCollector;
use crate::collector::procfs::parser::MemInfo;
use crate::dataset::{Dataset, DatasetMode};
use crate::fmt::{FmtStyle, format_kib, format_percent};

use super::{Provider, ProviderConfig, ProviderDescriptor, ProviderError, SamplingContext};

const USED: usize = 0;
const SHARED: usize = 1;
const BUFFERS: usize = 2;
const CACHE: usize = 3;

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "mem",
    label: "Memory",
    description: "Shows RAM usage, split by kind (programs/shared/buffers/cache).",
    help: "Values are in KiB. Reclaimable slab is accounted as cache.",
    hue: 120,
    n: 4,
    series: &["Used by programs", "Shared", "Buffers", "Cache"],
    mode: DatasetMode::Absolute,
    init,
};

#[derive(Default)]
struct MemProvider {
    total: u64,
}

fn init(_config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    Ok(Box::new(MemProvider::default()))
}

/// Splits memory into `[used, shared, buffers, cache]` KiB. The parts never
/// add up to more than `MemTotal`.
fn breakdown(mem: &MemInfo) -> [u64; 4] {
    let cache = (mem.cached + mem.s_reclaimable).saturating_sub(mem.shmem);
    let used = mem
        .mem_total
        .saturating_sub(mem.mem_free)
        .saturating_sub(mem.buffers)
        .saturating_sub(cache)
        .saturating_sub(mem.shmem);
    [used, mem.shmem, mem.buffers, cache]
}

impl Provider for MemProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        let mem = SystemCollector::new(ctx.sources().fs).meminfo()?;
        let [used, shared, buffers, cache] = breakdown(&mem);
        ctx.set_data(USED, used);
        ctx.set_data(SHARED, shared);
        ctx.set_data(BUFFERS, buffers);
        ctx.set_data(CACHE, cache);
        self.total = mem.mem_total;
        ctx.set_max(mem.mem_total);
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        for (i, label) in DESCRIPTOR.series.iter().enumerate() {
            let kib = dataset.latest(i);
            caption.body_line(format_args!(
                "{}: {} ({})",
                label,
                format_kib(kib, FmtStyle::Detail),
                format_percent(kib, self.total)
            ));
        }
        let in_use = dataset.latest(USED) + dataset.latest(SHARED);
        caption.set(
            CaptionComponent::Footer,
            format_args!(
                "{} of {} in use",
                format_kib(in_use, FmtStyle::Detail),
                format_kib(self.total, FmtStyle::Detail)
            ),
        );
    }
}
