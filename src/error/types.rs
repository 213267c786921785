use thiserror::Error;

/// Unified result type for the icicle crate.
pub type Result<T> = std::result::Result<T, IcicleError>;

/// Errors that abort a build attempt.
///
/// None of these are panics: hosts surface them as messages and keep the
/// previously built registry.
#[derive(Debug, Error)]
pub enum IcicleError {
    #[error("layout configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("colour specification error: {0}")]
    ColorSpec(#[from] ColorSpecError),
    #[error("no items left after filtering sentinel rows")]
    EmptyInput,
}

/// Invalid or missing layout configuration field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("`{field}` is missing")]
    Missing { field: &'static str },
    #[error("`{field}` is not a number: `{value}`")]
    NotNumeric { field: &'static str, value: String },
    #[error("`{field}` must be positive, got {value}")]
    NonPositive { field: &'static str, value: i64 },
    #[error("unknown colour policy `{0}`")]
    UnknownPolicy(String),
}

/// Invalid colour specification, raised at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorSpecError {
    #[error("{values} values but {colors} colours")]
    LengthMismatch { values: usize, colors: usize },
    #[error("value `{0}` is declared more than once")]
    DuplicateValue(String),
    #[error("cannot parse colour `{0}`")]
    InvalidColor(String),
}
