//! Hottest thermal zone temperature.

use crate::caption::{Caption, CaptionComponent};
use crate::collector::sysfs::list_thermal_zones;
use crate::dataset::{Dataset, DatasetMode};
use crate::fmt::format_millidegrees;

use super::{
    ConfigValue, Filter, Provider, ProviderConfig, ProviderDescriptor, ProviderError,
    SamplingContext,
};

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "temp",
    label: "Temperature",
    description: "Shows the temperature of the hottest thermal sensor.",
    help: "Values are in millidegrees Celsius. Sensors can be filtered by zone name or type.",
    hue: 0,
    n: 1,
    series: &["Temperature"],
    mode: DatasetMode::Absolute,
    init,
};

#[derive(Default)]
struct TempProvider {
    filter: Filter,
    hottest: Option<(String, String)>,
    critical: Option<u64>,
}

fn init(config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    config.add_entry(
        "filter",
        "Filter",
        "Sensors that aren't in this list will not be used, matched by zone name \
         (thermal_zone0) or type (x86_pkg_temp). If this list is empty, all sensors are used.",
        ConfigValue::List(Filter::default()),
    )?;
    Ok(Box::new(TempProvider::default()))
}

impl Provider for TempProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        self.filter = ctx.config().get_list("filter").cloned().unwrap_or_default();
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        let zones = list_thermal_zones(ctx.sources().fs);
        if zones.is_empty() {
            return Err(ProviderError::DataUnavailable(
                "Cannot find any usable temperature sensor".to_string(),
            ));
        }

        let retained: Vec<_> = zones
            .into_iter()
            .filter(|z| self.filter.includes(&z.name) || self.filter.includes(&z.kind))
            .collect();

        let hottest = retained.iter().max_by_key(|z| z.millidegrees);
        let critical = retained
            .iter()
            .filter_map(|z| z.critical)
            .max()
            .map(|c| c.max(0) as u64);

        self.hottest = hottest.map(|z| (z.name.clone(), z.kind.clone()));
        self.critical = critical;

        ctx.set_data(0, hottest.map_or(0, |z| z.millidegrees.max(0) as u64));
        ctx.set_max(critical.unwrap_or(0));
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.filter.footprint()
            + self
                .hottest
                .as_ref()
                .map_or(0, |(name, kind)| name.capacity() + kind.capacity())
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        caption.body_line(format_args!(
            "Temperature: {}",
            format_millidegrees(dataset.latest(0))
        ));
        if let Some(critical) = self.critical {
            caption.body_line(format_args!("Critical: {}", format_millidegrees(critical)));
        }
        match &self.hottest {
            Some((name, kind)) if !kind.is_empty() => caption.set(
                CaptionComponent::Footer,
                format_args!("Hottest sensor: {} ({})", name, kind),
            ),
            Some((name, _)) => {
                caption.set(CaptionComponent::Footer, format_args!("Hottest sensor: {}", name))
            }
            None => caption.set(CaptionComponent::Footer, format_args!("No sensor selected")),
        }
    }
}
