//! Swap space usage.

use crate::caption::{Caption, CaptionComponent};
use crate::collector::procfs::SystemCollector;
use crate::dataset::{Dataset, DatasetMode};
use crate::fmt::{FmtStyle, format_kib, format_percent};

use super::{Provider, ProviderConfig, ProviderDescriptor, ProviderError, SamplingContext};

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "swap",
    label: "Swap",
    description: "Shows swap usage.",
    help: "Values are in KiB.",
    hue: 300,
    n: 1,
    series: &["Used"],
    mode: DatasetMode::Absolute,
    init,
};

#[derive(Default)]
struct SwapProvider {
    total: u64,
}

fn init(_config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    Ok(Box::new(SwapProvider::default()))
}

impl Provider for SwapProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        let mem = SystemCollector::new(ctx.sources().fs).meminfo()?;
        if mem.swap_total == 0 {
            return Err(ProviderError::DataUnavailable(
                "No swap space configured".to_string(),
            ));
        }
        self.total = mem.swap_total;
        ctx.set_data(0, mem.swap_total.saturating_sub(mem.swap_free));
        ctx.set_max(mem.swap_total);
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        let used = dataset.latest(0);
        caption.body_line(format_args!(
            "Used: {} ({})",
            format_kib(used, FmtStyle::Detail),
            format_percent(used, self.total)
        ));
        caption.set(
            CaptionComponent::Footer,
            format_args!("Total: {}", format_kib(self.total, FmtStyle::Detail)),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::caption::CaptionComponent;
    use crate::collector::MockFs;
    use crate::provider::ProviderError;
    use crate::provider::testing::Harness;

    #[test]
    fn test_used_swap() {
        let mut h = Harness::new("swap", MockFs::typical_system());
        let tick = h.tick().unwrap();
        assert_eq!(tick.values, [1_024_000]);
        assert_eq!(tick.ceiling, 4_096_000);

        let caption = h.caption();
        assert_eq!(
            caption.get(CaptionComponent::Body),
            "Used: 1000.0 MiB (25.0%)"
        );
        assert_eq!(caption.get(CaptionComponent::Footer), "Total: 3.9 GiB");
    }

    #[test]
    fn test_no_swap_is_data_unavailable() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 500 kB\nSwapTotal: 0 kB\nSwapFree: 0 kB\n",
        );
        let mut h = Harness::new("swap", fs);
        assert_eq!(
            h.tick().unwrap_err(),
            ProviderError::DataUnavailable("No swap space configured".into())
        );
    }
}
