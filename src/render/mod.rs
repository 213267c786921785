//! Render pass: turns a registry into drawing primitives.
//!
//! Nothing here draws. Hosts map [`DrawCommand`]s onto whatever canvas they own.

mod core;

pub use core::{Anchor, DrawCommand, DrawListRenderer, RenderSettings, draw_commands};
