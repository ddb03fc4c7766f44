//! Network traffic, split into inbound, outbound and local.

use tracing::debug;

use crate::caption::{Caption, CaptionComponent};
use crate::collector::sysfs::{NetIfaceCache, NetInfo, list_usable_ifaces};
use crate::dataset::{Dataset, DatasetMode};
use crate::fmt::{FmtStyle, format_bytes_rate, format_rate};
use crate::rates::CounterDeltas;

use super::{
    ConfigValue, Filter, Provider, ProviderConfig, ProviderDescriptor, ProviderError,
    SamplingContext, strings_footprint,
};

const IN: usize = 0;
const OUT: usize = 1;
const LOCAL: usize = 2;
const CATEGORIES: usize = 3;

/// Axis floor, so an idle link is not drawn as full-height noise.
const MIN_CEILING: u64 = 100;

pub(super) const DESCRIPTOR: ProviderDescriptor = ProviderDescriptor {
    name: "net",
    label: "Network",
    description: "Shows network I/O, split by direction (input/output/local).",
    help: "Local traffic includes I/O generated by loopback devices of any type. \
           For example, ADB (Android Debug Bridge) traffic is counted as local.",
    hue: 53,
    n: CATEGORIES,
    series: &["Inbound", "Outbound", "Local"],
    mode: DatasetMode::Delta,
    init,
};

struct NetProvider {
    ifaces: NetIfaceCache,
    deltas: CounterDeltas<CATEGORIES>,
    count: [bool; CATEGORIES],
    use_packets: bool,
    filter: Filter,
    used_ifaces: Vec<String>,
}

fn init(config: &mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    config.add_entry(
        "count_in",
        "Count inbound traffic",
        "Draw cumulative inbound traffic.",
        ConfigValue::Bool(true),
    )?;
    config.add_entry(
        "count_out",
        "Count outbound traffic",
        "Draw cumulative outbound traffic.",
        ConfigValue::Bool(true),
    )?;
    config.add_entry(
        "count_local",
        "Count local traffic",
        "Draw cumulative local traffic, including local servers and toolkits like ADB.",
        ConfigValue::Bool(true),
    )?;
    config.add_entry(
        "use_packets",
        "Use packets",
        "Calculate values using packets instead of bytes.",
        ConfigValue::Bool(false),
    )?;
    config.add_entry(
        "filter",
        "Filter",
        "Devices that aren't in this list will not be used. \
         If this list is empty, all available devices will be used.",
        ConfigValue::List(Filter::default()),
    )?;

    Ok(Box::new(NetProvider {
        ifaces: NetIfaceCache::new(),
        deltas: CounterDeltas::new(),
        count: [true; CATEGORIES],
        use_packets: false,
        filter: Filter::default(),
        used_ifaces: Vec::new(),
    }))
}

/// Drops interfaces that mirror an earlier one (same hardware address),
/// such as monitor-mode devices created on top of a wireless card.
fn dedup_by_address(ifaces: Vec<NetInfo>) -> Vec<NetInfo> {
    let mut kept: Vec<NetInfo> = Vec::with_capacity(ifaces.len());
    for iface in ifaces {
        if iface.has_identity()
            && let Some(first) = kept.iter().find(|k| k.address == iface.address)
        {
            debug!(
                iface = %iface.name,
                mirror_of = %first.name,
                address = %iface.address,
                "skipping interface with duplicate hardware address"
            );
            continue;
        }
        kept.push(iface);
    }
    kept
}

impl NetProvider {
    fn read_bytes_or_packets(&self, iface: &NetInfo) -> (u64, u64) {
        if self.use_packets {
            (iface.pk_read, iface.pk_write)
        } else {
            (iface.byte_read, iface.byte_write)
        }
    }

    fn format_value(&self, per_second: u64) -> String {
        if self.use_packets {
            format_rate(per_second, "packets", FmtStyle::Detail)
        } else {
            format_bytes_rate(per_second, FmtStyle::Detail)
        }
    }
}

impl Provider for NetProvider {
    fn configure(&mut self, ctx: &mut SamplingContext<'_>) {
        let config = ctx.config();
        self.count[IN] = config.get_bool("count_in").unwrap_or(true);
        self.count[OUT] = config.get_bool("count_out").unwrap_or(true);
        self.count[LOCAL] = config.get_bool("count_local").unwrap_or(true);
        self.use_packets = config.get_bool("use_packets").unwrap_or(false);
        self.filter = config.get_list("filter").cloned().unwrap_or_default();
        ctx.set_need_data_reset();
    }

    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError> {
        let ifaces = list_usable_ifaces(ctx.sources().fs, &mut self.ifaces)?;
        if ifaces.is_empty() {
            return Err(ProviderError::DataUnavailable(
                "Cannot find any usable network interface".to_string(),
            ));
        }

        let mut totals = [0u64; CATEGORIES];
        self.used_ifaces.clear();

        for iface in dedup_by_address(ifaces) {
            if !self.filter.includes(&iface.name) {
                continue;
            }

            let (read, write) = self.read_bytes_or_packets(&iface);
            if iface.is_loopback {
                if self.count[LOCAL] {
                    totals[LOCAL] = totals[LOCAL].saturating_add(read);
                }
            } else {
                if self.count[IN] {
                    totals[IN] = totals[IN].saturating_add(read);
                }
                if self.count[OUT] {
                    totals[OUT] = totals[OUT].saturating_add(write);
                }
            }
            self.used_ifaces.push(iface.name);
        }

        let diff = self.deltas.update(totals, ctx.is_first_call());
        for (i, value) in diff.into_iter().enumerate() {
            ctx.set_data(i, value);
        }
        ctx.set_max(MIN_CEILING);
        Ok(())
    }

    fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.ifaces.footprint()
            + self.filter.footprint()
            + strings_footprint(&self.used_ifaces)
    }

    fn caption(&self, caption: &mut Caption, dataset: &Dataset) {
        let labels = ["Inbound traffic", "Outbound traffic", "Local traffic"];
        for (i, label) in labels.iter().enumerate() {
            if self.count[i] {
                let rate = dataset.per_second(dataset.latest(i));
                caption.body_line(format_args!("{}: {}", label, self.format_value(rate)));
            } else {
                caption.body_line(format_args!("{}: not measuring", label));
            }
        }
        caption.set(
            CaptionComponent::Footer,
            format_args!("Monitored interfaces: {}", self.used_ifaces.join(", ")),
        );
    }
}
