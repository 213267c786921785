//! Error types shared by every module.

mod types;

pub use types::{ColorSpecError, ConfigError, IcicleError, Result};
