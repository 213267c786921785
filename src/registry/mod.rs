//! Ordered rectangle registry produced by a layout build.
//!
//! The registry is the single source of truth for renderers and hit-testing;
//! the only mutation allowed after a build is flipping selection.

mod core;

pub use core::{Annotation, BuildStats, RectId, Rectangle, Registry};
