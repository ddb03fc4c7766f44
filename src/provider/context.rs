//! Per-tick carrier between the sampler and a provider.

use crate::collector::Sources;

use super::{ProviderConfig, ProviderError};

/// Inputs and outputs of one provider call.
///
/// Built fresh for every call. A sample only counts once every value slot
/// and the ceiling were written.
pub struct SamplingContext<'a> {
    sources: Sources<'a>,
    config: &'a ProviderConfig,
    first_call: bool,
    need_reset: bool,
    values: Vec<Option<u64>>,
    ceiling: Option<u64>,
}

impl<'a> SamplingContext<'a> {
    pub fn new(
        sources: Sources<'a>,
        config: &'a ProviderConfig,
        n_values: usize,
        first_call: bool,
    ) -> Self {
        Self {
            sources,
            config,
            first_call,
            need_reset: false,
            values: vec![None; n_values],
            ceiling: None,
        }
    }

    pub fn sources(&self) -> Sources<'a> {
        self.sources
    }

    pub fn config(&self) -> &'a ProviderConfig {
        self.config
    }

    /// True on the first sample after activation, resume or reset.
    pub fn is_first_call(&self) -> bool {
        self.first_call
    }

    /// Forces first-call semantics on the next sample.
    pub fn set_first_call(&mut self) {
        self.first_call = true;
    }

    /// Asks the sampler to discard the series history.
    pub fn set_need_data_reset(&mut self) {
        self.need_reset = true;
    }

    pub fn need_data_reset(&self) -> bool {
        self.need_reset
    }

    pub fn n_values(&self) -> usize {
        self.values.len()
    }

    /// Writes the value of series `index`. Out-of-range writes are ignored
    /// and leave the sample incomplete.
    pub fn set_data(&mut self, index: usize, value: u64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = Some(value);
        } else {
            tracing::debug!(index, n = self.values.len(), "value index out of range");
        }
    }

    /// Writes the minimum axis ceiling for this tick.
    pub fn set_max(&mut self, ceiling: u64) {
        self.ceiling = Some(ceiling);
    }

    /// Consumes the context, returning the values and ceiling if the
    /// provider wrote all of them.
    pub fn into_sample(self) -> Result<(Vec<u64>, u64), ProviderError> {
        let written = self.values.iter().filter(|v| v.is_some()).count();
        let (Some(ceiling), true) = (self.ceiling, written == self.values.len()) else {
            return Err(ProviderError::DataUnavailable(format!(
                "incomplete sample: {} of {} values{}",
                written,
                self.values.len(),
                if self.ceiling.is_none() { ", no ceiling" } else { "" }
            )));
        };
        Ok((self.values.into_iter().flatten().collect(), ceiling))
    }
}
