//! Host-facing handle owning the current registry.
//!
//! A rebuild swaps the whole registry in one assignment and only on
//! success, so a failed attempt leaves the previous view intact. Renderers
//! hold `Arc<Registry>` snapshots; toggling goes through
//! [`Arc::make_mut`], so a snapshot taken earlier never changes under them.

use std::sync::Arc;

use blake3::Hash;
use serde_json::Value;

use crate::color::{ColorPolicy, ColorSpec};
use crate::error::Result;
use crate::item::Item;
use crate::layout::{LayoutConfig, Partitioner};
use crate::logging::{LogLevel, Logger, METRICS_TARGET, SESSION_TARGET, event_with_fields, json_kv};
use crate::metrics::{MetricSnapshot, SessionMetrics};
use crate::registry::{RectId, Registry};
use crate::selection;

/// Summary of an accepted rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildOutcome {
    pub rectangles: usize,
    /// False when the new registry hashes identically to the one it replaced.
    pub changed: bool,
    pub fingerprint: Hash,
}

#[derive(Debug, Default)]
pub struct IcicleView {
    registry: Option<Arc<Registry>>,
    logger: Option<Logger>,
    metrics: SessionMetrics,
}

impl IcicleView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build a fresh registry and install it. On error the previous registry
    /// stays in place and the error is returned for the host to display.
    pub fn rebuild(
        &mut self,
        items: &[Item],
        spec: &ColorSpec,
        config: &LayoutConfig,
        policy: ColorPolicy,
    ) -> Result<RebuildOutcome> {
        let mut partitioner = Partitioner::new(spec, config, policy);
        if let Some(logger) = &self.logger {
            partitioner = partitioner.with_logger(logger.clone());
        }

        let registry = match partitioner.build(items) {
            Ok(registry) => registry,
            Err(err) => {
                self.metrics.record_rejected();
                self.log(
                    LogLevel::Warn,
                    "rebuild_rejected",
                    [
                        json_kv("error", err.to_string()),
                        json_kv("kept_previous", self.registry.is_some()),
                    ],
                );
                return Err(err);
            }
        };

        let fingerprint = registry.fingerprint();
        let changed = self
            .registry
            .as_ref()
            .is_none_or(|previous| previous.fingerprint() != fingerprint);
        let rectangles = registry.len();
        self.registry = Some(Arc::new(registry));
        self.metrics.record_rebuild(rectangles, changed);
        self.log(
            LogLevel::Info,
            "rebuild_accepted",
            [
                json_kv("rectangles", rectangles),
                json_kv("changed", changed),
                json_kv("fingerprint", fingerprint.to_hex().to_string()),
            ],
        );

        Ok(RebuildOutcome {
            rectangles,
            changed,
            fingerprint,
        })
    }

    /// Shared handle on the current registry for a renderer.
    pub fn snapshot(&self) -> Option<Arc<Registry>> {
        self.registry.clone()
    }

    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_deref()
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<RectId> {
        self.registry
            .as_deref()
            .and_then(|registry| selection::hit_test(registry, x, y))
    }

    /// Toggle the rectangle under the point, if any. Every call counts as a
    /// click; one that lands on nothing is recorded as a miss.
    pub fn toggle_at(&mut self, x: f64, y: f64) -> Option<RectId> {
        let hit = self.toggle_hit(x, y);
        self.metrics.record_click(hit.is_some());
        hit
    }

    fn toggle_hit(&mut self, x: f64, y: f64) -> Option<RectId> {
        // Skip the copy-on-write clone when the click lands on nothing.
        let id = self.hit_test(x, y)?;
        let registry = Arc::make_mut(self.registry.as_mut()?);
        let selected = selection::toggle(registry, id)?;
        self.log(
            LogLevel::Trace,
            "toggled",
            [json_kv("rect", id.0), json_kv("selected", selected)],
        );
        Some(id)
    }

    pub fn clear_selection(&mut self) -> usize {
        let Some(registry) = self.registry.as_mut() else {
            return 0;
        };
        let current: &Registry = registry;
        if selection::selected(current).is_empty() {
            return 0;
        }
        selection::clear(Arc::make_mut(registry))
    }

    /// Drop the current registry; hosts call this when the data source goes away.
    pub fn reset(&mut self) {
        self.registry = None;
    }

    pub fn metrics(&self) -> MetricSnapshot {
        self.metrics.snapshot()
    }

    pub fn emit_metrics(&self) {
        if let Some(logger) = &self.logger {
            let _ = logger.log_event(self.metrics.snapshot().to_log_event(METRICS_TARGET));
        }
    }

    fn log<const N: usize>(&self, level: LogLevel, message: &str, fields: [(String, Value); N]) {
        if let Some(logger) = &self.logger {
            let _ = logger.log_event(event_with_fields(level, SESSION_TARGET, message, fields));
        }
    }
}
