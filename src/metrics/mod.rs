use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Counters a view session accumulates across rebuilds and clicks.
#[derive(Debug, Default, Clone)]
pub struct SessionMetrics {
    rebuilds: u64,
    rejected_rebuilds: u64,
    unchanged_rebuilds: u64,
    toggles: u64,
    missed_clicks: u64,
    last_rectangles: usize,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rebuild(&mut self, rectangles: usize, changed: bool) {
        self.rebuilds = self.rebuilds.saturating_add(1);
        if !changed {
            self.unchanged_rebuilds = self.unchanged_rebuilds.saturating_add(1);
        }
        self.last_rectangles = rectangles;
    }

    pub fn record_rejected(&mut self) {
        self.rejected_rebuilds = self.rejected_rebuilds.saturating_add(1);
    }

    pub fn record_click(&mut self, hit: bool) {
        if hit {
            self.toggles = self.toggles.saturating_add(1);
        } else {
            self.missed_clicks = self.missed_clicks.saturating_add(1);
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            rebuilds: self.rebuilds,
            rejected_rebuilds: self.rejected_rebuilds,
            unchanged_rebuilds: self.unchanged_rebuilds,
            toggles: self.toggles,
            missed_clicks: self.missed_clicks,
            last_rectangles: self.last_rectangles as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub rebuilds: u64,
    pub rejected_rebuilds: u64,
    pub unchanged_rebuilds: u64,
    pub toggles: u64,
    pub missed_clicks: u64,
    pub last_rectangles: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "session_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("rebuilds".to_string(), json!(self.rebuilds));
        map.insert("rejected_rebuilds".to_string(), json!(self.rejected_rebuilds));
        map.insert("unchanged_rebuilds".to_string(), json!(self.unchanged_rebuilds));
        map.insert("toggles".to_string(), json!(self.toggles));
        map.insert("missed_clicks".to_string(), json!(self.missed_clicks));
        map.insert("last_rectangles".to_string(), json!(self.last_rectangles));
        map
    }
}
