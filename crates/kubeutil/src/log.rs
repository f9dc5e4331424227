// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional line-oriented log sink.
//!
//! Callers such as test harnesses want the exact command lines and apply
//! output echoed into their own writer. The sink is optional: [`Log::none`]
//! drops every line. Structured `tracing` events are emitted regardless.

use std::fmt;
use std::sync::Arc;

/// Receives formatted progress lines.
pub trait LogSink: Send + Sync {
    fn line(&self, msg: &str);
}

/// Cheap, cloneable handle to an optional [`LogSink`].
#[derive(Clone, Default)]
pub struct Log {
    sink: Option<Arc<dyn LogSink>>,
}

impl Log {
    /// A handle that discards everything.
    pub fn none() -> Self {
        Self { sink: None }
    }

    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Format and forward one line; no-op without a sink.
    pub fn logf(&self, args: fmt::Arguments<'_>) {
        if let Some(ref sink) = self.sink {
            sink.line(&args.to_string());
        }
    }
}

impl fmt::Debug for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Log").field("enabled", &self.is_enabled()).finish()
    }
}

impl From<Option<Arc<dyn LogSink>>> for Log {
    fn from(sink: Option<Arc<dyn LogSink>>) -> Self {
        Self { sink }
    }
}

/// Sink that forwards lines to `tracing` at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn line(&self, msg: &str) {
        tracing::info!(target: "kh::log", "{}", msg);
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
