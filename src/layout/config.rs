use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Validated layout parameters, all strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Minimum run size for a rectangle to be emitted.
    pub cutoff: u32,
    /// Lower bound on the width of one character column.
    pub min_char_width: u32,
}

impl LayoutConfig {
    pub fn new(
        canvas_width: u32,
        canvas_height: u32,
        cutoff: u32,
        min_char_width: u32,
    ) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("canvas_width", canvas_width),
            ("canvas_height", canvas_height),
            ("cutoff", cutoff),
            ("min_char_width", min_char_width),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { field, value: 0 });
            }
        }
        Ok(Self {
            canvas_width,
            canvas_height,
            cutoff,
            min_char_width,
        })
    }
}

/// Unvalidated layout fields as typed into a host form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawLayoutConfig {
    pub canvas_width: Option<String>,
    pub canvas_height: Option<String>,
    pub cutoff: Option<String>,
    pub min_char_width: Option<String>,
}

impl TryFrom<&RawLayoutConfig> for LayoutConfig {
    type Error = ConfigError;

    fn try_from(raw: &RawLayoutConfig) -> Result<Self, Self::Error> {
        Self::new(
            parse_field("canvas_width", raw.canvas_width.as_deref())?,
            parse_field("canvas_height", raw.canvas_height.as_deref())?,
            parse_field("cutoff", raw.cutoff.as_deref())?,
            parse_field("min_char_width", raw.min_char_width.as_deref())?,
        )
    }
}

fn parse_field(field: &'static str, value: Option<&str>) -> Result<u32, ConfigError> {
    let text = value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .ok_or(ConfigError::Missing { field })?;
    let number: i64 = text.parse().map_err(|_| ConfigError::NotNumeric {
        field,
        value: text.to_string(),
    })?;
    if number <= 0 {
        return Err(ConfigError::NonPositive {
            field,
            value: number,
        });
    }
    u32::try_from(number).map_err(|_| ConfigError::NotNumeric {
        field,
        value: text.to_string(),
    })
}
