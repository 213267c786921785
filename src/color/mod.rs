//! Colour resolution for icicle runs.
//!
//! `core` holds the RGB value type and the text-contrast rule; `resolve`
//! holds the category-to-colour specification and the two run policies.

mod core;
mod resolve;

pub use core::{CONTRAST_THRESHOLD, HIGHLIGHT_SHIFT, Rgb, TextColor, contrast_text_color};
pub use resolve::{ColorPolicy, ColorSpec};
