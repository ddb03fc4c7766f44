//! Provider abstraction for sampled metric sources.
//!
//! Every metric kind (CPU, memory, network, ...) implements [`Provider`] and
//! is described by a static [`ProviderDescriptor`] in the [`registry`]. The
//! sampler owns each active provider exclusively and drives it through a
//! [`SamplingContext`] once per tick.

mod config;
mod context;
mod cpu;
mod disk;
mod load;
mod mem;
mod net;
mod parm;
pub mod registry;
mod swap;
mod temp;

pub use config::{ConfigEntry, ConfigValue, ConfigurationError, Filter, ProviderConfig};
pub use context::SamplingContext;
pub use registry::{ProviderDescriptor, find, registry};

use serde::Serialize;

use crate::caption::Caption;
use crate::collector::CollectError;
use crate::dataset::Dataset;

/// How serious a per-graph failure is, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Error types that can occur while activating or sampling a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Rejected configuration value or unusable configuration.
    Configuration(String),
    /// No usable source was found this tick.
    DataUnavailable(String),
    /// Provider state could not be created.
    Allocation(String),
    /// Reading or parsing a host source failed.
    Collect(String),
}

impl ProviderError {
    pub fn severity(&self) -> Severity {
        match self {
            ProviderError::DataUnavailable(_) | ProviderError::Collect(_) => Severity::Warning,
            ProviderError::Configuration(_) | ProviderError::Allocation(_) => Severity::Error,
        }
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Configuration(msg)
            | ProviderError::DataUnavailable(msg)
            | ProviderError::Allocation(msg)
            | ProviderError::Collect(msg) => msg,
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            ProviderError::DataUnavailable(msg) => write!(f, "data unavailable: {}", msg),
            ProviderError::Allocation(msg) => write!(f, "allocation error: {}", msg),
            ProviderError::Collect(msg) => write!(f, "collection error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<CollectError> for ProviderError {
    fn from(e: CollectError) -> Self {
        ProviderError::Collect(e.to_string())
    }
}

impl From<ConfigurationError> for ProviderError {
    fn from(e: ConfigurationError) -> Self {
        ProviderError::Configuration(e.to_string())
    }
}

/// A sampling unit producing a fixed number of series per tick.
///
/// Implementations are created by their descriptor's `init`, owned by the
/// sampler thread and dropped there between ticks, so no method ever runs
/// concurrently with another on the same value.
pub trait Provider: Send {
    /// Re-reads configuration entries after any of them changed.
    ///
    /// Must call [`SamplingContext::set_need_data_reset`] so history computed
    /// under the old configuration is discarded.
    fn configure(&mut self, ctx: &mut SamplingContext<'_>);

    /// Takes one sample, writing every value and the ceiling into `ctx`.
    fn sample(&mut self, ctx: &mut SamplingContext<'_>) -> Result<(), ProviderError>;

    /// Best-effort size of the provider state in bytes, caches included.
    fn footprint(&self) -> usize;

    /// Called when sampling resumes after a pause. Must call
    /// [`SamplingContext::set_first_call`] so the elapsed gap is not reported
    /// as a spike.
    fn resume(&mut self, ctx: &mut SamplingContext<'_>) {
        ctx.set_first_call();
    }

    /// Describes the latest committed sample. Never mutates state.
    fn caption(&self, caption: &mut Caption, dataset: &Dataset);
}

/// Bytes held by a list of strings, for footprint accounting.
#[allow(clippy::ptr_arg)]
pub(crate) fn strings_footprint(strings: &Vec<String>) -> usize {
    strings.capacity() * std::mem::size_of::<String>()
        + strings.iter().map(String::capacity).sum::<usize>()
}
