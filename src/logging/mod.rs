//! Structured JSON logging for layout builds and view sessions.
//!
//! Events carry a target such as `icicle::layout` plus free-form fields and
//! serialize to one JSON object each. Where events end up is decided by the
//! host through a [`LogSink`].

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub type LogFields = Map<String, Value>;

pub const LAYOUT_TARGET: &str = "icicle::layout";
pub const SESSION_TARGET: &str = "icicle::session";
pub const METRICS_TARGET: &str = "icicle::metrics";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty", default)]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts_ms: current_ms(),
            level,
            target: target.into(),
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    pub fn with_fields(
        level: LogLevel,
        target: impl Into<String>,
        message: impl Into<String>,
        fields: LogFields,
    ) -> Self {
        Self {
            fields,
            ..Self::new(level, target, message)
        }
    }

    pub fn to_json_line(&self) -> LoggingResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("log sink poisoned")]
    Poisoned,
}

pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent) -> LoggingResult<()>;
}

/// Cheap-to-clone handle over a shared sink, filtering below `min_level`.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    min_level: LogLevel,
}

impl Logger {
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
            min_level: LogLevel::Trace,
        }
    }

    pub fn null() -> Self {
        Self::new(NullSink)
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) -> LoggingResult<()> {
        self.log_event(LogEvent::new(level, target, message))
    }

    pub fn log_with_fields(
        &self,
        level: LogLevel,
        target: &str,
        message: &str,
        fields: LogFields,
    ) -> LoggingResult<()> {
        self.log_event(LogEvent::with_fields(level, target, message, fields))
    }

    pub fn log_event(&self, event: LogEvent) -> LoggingResult<()> {
        if !self.enabled(event.level) {
            return Ok(());
        }
        self.sink.log(&event)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

/// Buffers events in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.message).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.events.lock() {
            guard.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        let mut guard = self.events.lock().map_err(|_| LoggingError::Poisoned)?;
        guard.push(event.clone());
        Ok(())
    }
}

pub fn event_with_fields(
    level: LogLevel,
    target: &str,
    message: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) -> LogEvent {
    let map: LogFields = fields.into_iter().collect();
    LogEvent::with_fields(level, target, message, map)
}

pub fn json_kv(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}
