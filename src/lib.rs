//! multiload - system load graph providers and sampling core.
//!
//! This library provides the pieces a load-monitor front end draws from:
//! - `provider` - the eight built-in providers (cpu, mem, net, swap, load,
//!   disk, temp, parm), their typed configuration and registry
//! - `sampler` - the sampler thread that ticks every active graph and
//!   publishes immutable frames
//! - `dataset`, `autoscaler`, `caption` - per-graph history, axis scaling
//!   and tooltip text
//!
//! The `multiloadd` binary runs a sampler from the command line.

pub mod autoscaler;
pub mod caption;
pub mod collector;
pub mod config;
pub mod dataset;
pub mod fmt;
pub mod notifier;
pub mod provider;
pub mod rates;
pub mod sampler;
