//! CPU time split into user, nice, system and I/O wait.

use crate::caption::{Caption, CaptionComponent};
use crate::collector::procfs::SystemCollector;
use crate::collector::procfs::parser::CpuStat;
use crate::collector::sysfs::cpu_governor;
use crate::dataset::{Dataset, DatasetMode};
use crate::fmt::{FmtStyle, format_duration, format_permille};
use crate::rates::CounterDeltas;

use super::{
    ConfigValue, Provider, ProviderConfig, ProviderDescriptor, ProviderError, SamplingContext,
};

const USER: usize = 0;
const NICE: usize = 1;
const SYSTEM: usize = 2;
const IOWAIT: usize = 3;
const TOTAL: usize = 4;

/// Values are permille of the elapsed jiffies, so the axis is fixed.
const FULL_SCALE: u64 = 1000;

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "cpu",
    label: "Processor",
    description: "Shows CPU usage, split by kind (user/nice/system/iowait).",
    help: "Interrupt handling time is accounted as system time.",
    hue: 200,
    n: 4,
    series: &["User", "Nice", "System", "I/O wait"],
    mode: DatasetMode::Delta,
    init,
};

#[derive(Default)]
struct CpuProvider {
    deltas: CounterDeltas<5>,
    count_iowait: bool,
    model: String,
    mhz: f64,
    cpus: usize,
    governor: Option<String>,
    uptime: Option<u64>,
}

fn init(config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    config.add_entry(
        "count_iowait",
        "Count I/O wait",
        "Draw time spent waiting for I/O to complete.",
        ConfigValue::Bool(true),
    )?;
    Ok(Box::new(CpuProvider {
        count_iowait: true,
        ..CpuProvider::default()
    }))
}

fn cumulative(cpu: &CpuStat) -> [u64; 5] {
    [
        cpu.user,
        cpu.nice,
        cpu.system.saturating_add(cpu.irq).saturating_add(cpu.softirq),
        cpu.iowait,
        cpu.total(),
    ]
}

impl CpuProvider {
    fn refresh_description(&mut self, proc: &SystemCollector<'_>, cpu_lines: usize) {
        let info = proc.cpuinfo();
        self.model = info.model_name;
        self.mhz = info.mhz;
        self.cpus = if info.processors > 0 {
            info.processors
        } else {
            cpu_lines
        };
    }
}

impl Provider for CpuProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        self.count_iowait = ctx.config().get_bool("count_iowait").unwrap_or(true);
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        let fs = ctx.sources().fs;
        let proc = SystemCollector::new(fs);
        let stat = proc.global_stat()?;
        let aggregate = stat.aggregate().ok_or_else(|| {
            ProviderError::DataUnavailable("No aggregate cpu line in /proc/stat".to_string())
        })?;

        if ctx.is_first_call() || self.cpus == 0 {
            self.refresh_description(&proc, stat.cpu_count());
        }
        self.governor = cpu_governor(fs);
        self.uptime = proc.uptime();

        let diff = self.deltas.update(cumulative(aggregate), ctx.is_first_call());
        let total = diff[TOTAL];
        let permille = |jiffies: u64| -> u64 {
            if total == 0 {
                0
            } else {
                (jiffies as u128 * FULL_SCALE as u128 / total as u128) as u64
            }
        };

        ctx.set_data(USER, permille(diff[USER]));
        ctx.set_data(NICE, permille(diff[NICE]));
        ctx.set_data(SYSTEM, permille(diff[SYSTEM]));
        ctx.set_data(
            IOWAIT,
            if self.count_iowait {
                permille(diff[IOWAIT])
            } else {
                0
            },
        );
        ctx.set_max(FULL_SCALE);
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.model.capacity()
            + self.governor.as_ref().map_or(0, String::capacity)
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        if !self.model.is_empty() {
            caption.set(CaptionComponent::Title, format_args!("{}", self.model));
        }

        let used: u64 = (0..dataset.n_series()).map(|i| dataset.latest(i)).sum();
        caption.body_line(format_args!("Total use: {}", format_permille(used)));
        for (i, label) in DESCRIPTOR.series.iter().enumerate() {
            if i == IOWAIT && !self.count_iowait {
                caption.body_line(format_args!("{}: not measuring", label));
            } else {
                caption.body_line(format_args!(
                    "{}: {}",
                    label,
                    format_permille(dataset.latest(i))
                ));
            }
        }

        caption.set(
            CaptionComponent::Footer,
            format_args!(
                "{} CPU{}, {:.0} MHz",
                self.cpus,
                if self.cpus == 1 { "" } else { "s" },
                self.mhz
            ),
        );
        if let Some(governor) = &self.governor {
            caption.append(CaptionComponent::Footer, format_args!(", governor {}", governor));
        }
        if let Some(uptime) = self.uptime {
            caption.append(
                CaptionComponent::Footer,
                format_args!(", uptime {}", format_duration(uptime, FmtStyle::Detail)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::caption::CaptionComponent;
    use crate::collector::MockFs;
    use crate::provider::ProviderError;
    use crate::provider::testing::Harness;

    fn set_stat(fs: &mut MockFs, line: &str) {
        fs.add_file("/proc/stat", format!("cpu  {}\ncpu0 {}\n", line, line));
    }

    #[test]
    fn test_permille_of_elapsed_jiffies() {
        let mut h = Harness::new("cpu", MockFs::typical_system());
        let t0 = h.tick().unwrap();
        assert_eq!(t0.values, [0, 0, 0, 0]);
        assert_eq!(t0.ceiling, 1000);

        // +100 user, +30 system, +800 idle, +50 iowait, +10 irq, +10 softirq
        set_stat(&mut h.fs, "10100 500 3030 80800 1050 210 110 0 0 0");
        assert_eq!(h.tick().unwrap().values, [100, 0, 50, 50]);

        let caption = h.caption();
        assert_eq!(
            caption.get(CaptionComponent::Title),
            "Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz"
        );
        assert_eq!(
            caption.get(CaptionComponent::Body),
            "Total use: 20.0%\nUser: 10.0%\nNice: 0.0%\nSystem: 5.0%\nI/O wait: 5.0%"
        );
        assert_eq!(
            caption.get(CaptionComponent::Footer),
            "2 CPUs, 1800 MHz, governor powersave, uptime 3h 25m"
        );
    }

    #[test]
    fn test_iowait_disabled() {
        let mut h = Harness::new("cpu", MockFs::typical_system());
        h.set("count_iowait", "false");
        h.tick().unwrap();
        set_stat(&mut h.fs, "10100 500 3030 80800 1050 210 110 0 0 0");
        assert_eq!(h.tick().unwrap().values, [100, 0, 50, 0]);
        assert!(
            h.caption()
                .get(CaptionComponent::Body)
                .ends_with("I/O wait: not measuring")
        );
    }

    #[test]
    fn test_no_elapsed_time_reports_zero() {
        let mut h = Harness::new("cpu", MockFs::typical_system());
        h.tick().unwrap();
        assert_eq!(h.tick().unwrap().values, [0, 0, 0, 0]);
    }

    #[test]
    fn test_counter_reset_reports_zero() {
        let mut h = Harness::new("cpu", MockFs::typical_system());
        h.tick().unwrap();
        set_stat(&mut h.fs, "10 0 10 100 0 0 0 0 0 0");
        let values = h.tick().unwrap().values;
        assert!(values.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_huge_counters_saturate() {
        let half = u64::MAX / 2;
        let mut h = Harness::new("cpu", MockFs::typical_system());
        set_stat(&mut h.fs, &format!("{} 0 {} {} 0 {} 0 0 0 0", half, half, half, half));
        h.tick().unwrap();
        set_stat(
            &mut h.fs,
            &format!("{} 0 {} {} 0 {} 0 0 0 0", half + 100, half, half, half),
        );
        let values = h.tick().unwrap().values;
        assert!(values.iter().all(|&v| v <= 1000));
    }

    #[test]
    fn test_missing_stat_is_collect_error() {
        let mut h = Harness::new("cpu", MockFs::new());
        assert!(matches!(h.tick(), Err(ProviderError::Collect(_))));
    }
}
