use serde::Serialize;

use crate::error::{IcicleError, Result};
use crate::item::Item;
use crate::layout::config::LayoutConfig;

/// Row height and character width shared by every depth of one build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub row_height: f64,
    pub char_width: f64,
}

impl Measurement {
    /// `row_height = canvas_height / item_count`,
    /// `char_width = max(canvas_width / longest_name, min_char_width)`.
    pub fn new(config: &LayoutConfig, item_count: usize, longest_name: usize) -> Result<Self> {
        if item_count == 0 {
            return Err(IcicleError::EmptyInput);
        }
        let longest = longest_name.max(1);

        let row_height = f64::from(config.canvas_height) / item_count as f64;
        let char_width =
            (f64::from(config.canvas_width) / longest as f64).max(f64::from(config.min_char_width));
        Ok(Self {
            row_height,
            char_width,
        })
    }

    /// Measure a prepared item list. Name length is counted in characters,
    /// matching how prefixes are sliced.
    pub fn for_items(config: &LayoutConfig, items: &[Item]) -> Result<Self> {
        let longest = items
            .iter()
            .map(|item| item.name.chars().count())
            .max()
            .unwrap_or(0);
        Self::new(config, items.len(), longest)
    }
}
