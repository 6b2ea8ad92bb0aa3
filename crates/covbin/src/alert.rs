//! Alert reporting.
//!
//! Every coverage model owns an [`AlertLog`]. It emits each alert as a
//! `tracing` event, keeps per-severity counts and a bounded history, and
//! forwards to an optional user-supplied [`AlertSink`].

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Suspicious but harmless
    Warning,
    /// Test error; the operation completed
    Error,
    /// Test failure; the operation completed
    Failure,
    /// The operation stopped
    Fatal,
}

impl Severity {
    const fn slot(self) -> usize {
        match self {
            Self::Warning => 0,
            Self::Error => 1,
            Self::Failure => 2,
            Self::Fatal => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Failure => "FAILURE",
            Self::Fatal => "FATAL",
        })
    }
}

/// One reported alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Severity
    pub severity: Severity,
    /// Message text
    pub message: String,
}

/// Receiver for alerts raised by a coverage model
pub trait AlertSink: fmt::Debug {
    /// Handle one alert
    fn alert(&mut self, severity: Severity, message: &str);
}

/// Number of alerts kept in the history
const HISTORY_LIMIT: usize = 256;

/// Per-model alert log
#[derive(Debug, Default)]
pub struct AlertLog {
    source: String,
    counts: [u64; 4],
    history: VecDeque<Alert>,
    sink: Option<Box<dyn AlertSink>>,
}

impl AlertLog {
    /// Create an alert log that tags events with `source`
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            ..Self::default()
        }
    }

    /// Change the tag attached to emitted events
    pub fn set_source(&mut self, source: &str) {
        source.clone_into(&mut self.source);
    }

    /// Forward alerts to `sink` in addition to logging them
    pub fn set_sink(&mut self, sink: Box<dyn AlertSink>) {
        self.sink = Some(sink);
    }

    /// Raise an alert
    pub fn raise(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Warning => tracing::warn!(model = %self.source, "{message}"),
            Severity::Error | Severity::Failure | Severity::Fatal => {
                tracing::error!(model = %self.source, %severity, "{message}");
            }
        }
        self.counts[severity.slot()] += 1;
        if let Some(sink) = &mut self.sink {
            sink.alert(severity, &message);
        }
        if self.history.len() == HISTORY_LIMIT {
            let _ = self.history.pop_front();
        }
        self.history.push_back(Alert { severity, message });
    }

    /// Number of alerts raised at `severity`
    #[must_use]
    pub fn count(&self, severity: Severity) -> u64 {
        self.counts[severity.slot()]
    }

    /// Total alerts raised at any severity
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Most recent alerts, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Alert> {
        self.history.iter()
    }

    /// Most recent alert
    #[must_use]
    pub fn last(&self) -> Option<&Alert> {
        self.history.back()
    }
}
