//! Process-wide table of provider descriptors.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::dataset::DatasetMode;

use super::{Provider, ProviderConfig, ProviderError};

/// Creates a provider, registering its configuration entries with defaults.
pub type InitFn = fn(&mut ProviderConfig) -> Result<Box<dyn Provider>, ProviderError>;

/// Static description of a provider kind.
#[derive(Debug, Clone, Copy)]
pub struct ProviderDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub help: &'static str,
    /// Color hint, hue in degrees (0-359).
    pub hue: u16,
    /// Number of series produced per tick.
    pub n: usize,
    pub series: &'static [&'static str],
    pub mode: DatasetMode,
    pub init: InitFn,
}

struct Registry {
    descriptors: Vec<ProviderDescriptor>,
    by_name: HashMap<&'static str, usize>,
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let descriptors = vec![
        super::cpu::DESCRIPTOR,
        super::mem::DESCRIPTOR,
        super::net::DESCRIPTOR,
        super::swap::DESCRIPTOR,
        super::load::DESCRIPTOR,
        super::disk::DESCRIPTOR,
        super::temp::DESCRIPTOR,
        super::parm::DESCRIPTOR,
    ];
    let by_name = descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name, i))
        .collect();
    Registry {
        descriptors,
        by_name,
    }
});

/// All descriptors in display order.
pub fn registry() -> &'static [ProviderDescriptor] {
    &REGISTRY.descriptors
}

/// Looks up a descriptor by provider name.
pub fn find(name: &str) -> Option<&'static ProviderDescriptor> {
    let registry = &*REGISTRY;
    registry
        .by_name
        .get(name)
        .map(|&i| &registry.descriptors[i])
}

/// Provider names in display order.
pub fn names() -> impl Iterator<Item = &'static str> {
    registry().iter().map(|d| d.name)
}
