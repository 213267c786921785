//! Prefix-decomposition ("icicle") layout for sorted name lists.
//!
//! Names sharing a prefix collapse into one rectangle coloured from the
//! categories of its members; the remainders are laid out to its right,
//! level by level, until every name is spelled out. The crate computes the
//! rectangles and selection state only. Loading data and drawing pixels
//! belong to the host.
//!
//! ```
//! use name_icicle::{ColorPolicy, ColorSpec, Item, LayoutConfig, Rgb, build};
//!
//! let items = vec![
//!     Item::new("Ann", Some("F")),
//!     Item::new("Anna", Some("F")),
//!     Item::new("Anne", Some("M")),
//! ];
//! let spec = ColorSpec::parse("F,M", "(255,0,0),(0,0,255)", Rgb::NEUTRAL)?;
//! let config = LayoutConfig::new(700, 300, 1, 10)?;
//! let registry = build(&items, &spec, &config, ColorPolicy::WeightedBlend)?;
//!
//! let root = registry.by_path("Ann").unwrap();
//! assert_eq!(root.base_color, Rgb::new(170, 0, 85));
//! # Ok::<(), name_icicle::IcicleError>(())
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod item;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod selection;
pub mod session;

pub use color::{ColorPolicy, ColorSpec, Rgb, TextColor, contrast_text_color};
pub use error::{ColorSpecError, ConfigError, IcicleError, Result};
pub use geometry::Bounds;
pub use item::{Item, SENTINEL_NAME, prepare_items};
pub use layout::{LayoutConfig, Measurement, Partitioner, RawLayoutConfig, build};
pub use logging::{LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult, MemorySink};
pub use metrics::{MetricSnapshot, SessionMetrics};
pub use registry::{Annotation, BuildStats, RectId, Rectangle, Registry};
pub use render::{DrawCommand, DrawListRenderer, RenderSettings, draw_commands};
pub use selection::{hit_test, toggle, toggle_at};
pub use session::{IcicleView, RebuildOutcome};
