//! Icicle layout: configuration, the per-build measurement and the prefix
//! partition builder.
//!
//! `build` is the entry point hosts call; `Partitioner` is the same builder
//! with an attached logger.

mod config;
mod measure;
mod partition;

pub use config::{LayoutConfig, RawLayoutConfig};
pub use measure::Measurement;
pub use partition::{Partitioner, build};
