//! System load average.

use crate::caption::{Caption, CaptionComponent};
use crate::collector::procfs::SystemCollector;
use crate::collector::procfs::parser::LoadAvg;
use crate::dataset::{Dataset, DatasetMode};

use super::{Provider, ProviderConfig, ProviderDescriptor, ProviderError, SamplingContext};

/// Load is plotted in hundredths, so a floor of 100 is a load of 1.0.
const SCALE: f64 = 100.0;
const MIN_CEILING: u64 = 100;

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "load",
    label: "Load average",
    description: "Shows the 1-minute system load average.",
    help: "Load is the average number of runnable and uninterruptible tasks.",
    hue: 0,
    n: 1,
    series: &["1 minute"],
    mode: DatasetMode::Absolute,
    init,
};

#[derive(Default)]
struct LoadProvider {
    last: LoadAvg,
    kernel: String,
}

fn init(_config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    Ok(Box::new(LoadProvider::default()))
}

impl Provider for LoadProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        let proc = SystemCollector::new(ctx.sources().fs);
        let load = proc.loadavg()?;
        if self.kernel.is_empty() {
            self.kernel = proc.kernel();
        }

        ctx.set_data(0, (load.load1.max(0.0) * SCALE).round() as u64);
        ctx.set_max(MIN_CEILING);
        self.last = load;
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>() + self.kernel.capacity()
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        let load1 = dataset.latest(0) as f64 / SCALE;
        caption.body_line(format_args!("1 minute: {:.2}", load1));
        caption.body_line(format_args!("5 minutes: {:.2}", self.last.load5));
        caption.body_line(format_args!("15 minutes: {:.2}", self.last.load15));
        caption.body_line(format_args!(
            "Processes: {} running of {}",
            self.last.running, self.last.total
        ));
        if !self.kernel.is_empty() {
            caption.set(CaptionComponent::Footer, format_args!("{}", self.kernel));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::caption::CaptionComponent;
    use crate::collector::MockFs;
    use crate::provider::testing::Harness;

    #[test]
    fn test_load_in_hundredths() {
        let mut h = Harness::new("load", MockFs::typical_system());
        let tick = h.tick().unwrap();
        assert_eq!(tick.values, [15]);
        assert_eq!(tick.ceiling, 100);

        h.fs.add_file("/proc/loadavg", "3.42 2.00 1.00 4/200 999\n");
        assert_eq!(h.tick().unwrap().values, [342]);
    }

    #[test]
    fn test_caption() {
        let mut h = Harness::new("load", MockFs::typical_system());
        h.tick().unwrap();
        let caption = h.caption();
        assert_eq!(
            caption.get(CaptionComponent::Body),
            "1 minute: 0.15\n5 minutes: 0.10\n15 minutes: 0.05\nProcesses: 1 running of 150"
        );
        assert_eq!(
            caption.get(CaptionComponent::Footer),
            "Linux 6.1.0-13-amd64"
        );
    }

    #[test]
    fn test_malformed_loadavg() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/loadavg", "0.1\n");
        let mut h = Harness::new("load", fs);
        assert!(h.tick().is_err());
    }
}
