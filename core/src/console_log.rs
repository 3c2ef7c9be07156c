//! Bounded console log
//!
//! Transient log lines live in a FIFO of fixed capacity, independent of the
//! entity registry. They are rendered onto a static pool of line widgets,
//! newest at the bottom.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::clock::format_elapsed;
use crate::config::ConsoleStamp;
use crate::entity::LoggedEntity;
use crate::overlay::panic_message;
use crate::router::MISSING_VALUE_TEXT;

/// A console entry, stamped when it was logged
#[derive(Debug)]
pub struct ConsoleLogLine {
    /// Sequence number, unique per overlay
    pub seq: u64,
    /// Tick counter at log time
    pub ticks: u64,
    /// Time since overlay creation at log time
    pub elapsed: Duration,
    pub entity: LoggedEntity,
}

impl ConsoleLogLine {
    /// `"<stamp> : <value>"`, reading the entity's value now
    ///
    /// A panic while reading the host object is caught; the line then
    /// shows [`MISSING_VALUE_TEXT`] and `failed` is set.
    pub fn format(&self, stamp: ConsoleStamp) -> FormattedLine {
        let read = panic::catch_unwind(AssertUnwindSafe(|| self.entity.read()));
        let (value, failed) = match read {
            Ok(Ok(value)) => (value.to_string(), false),
            Ok(Err(e)) => {
                tracing::debug!("console line '{}': {}", self.entity.name(), e);
                (MISSING_VALUE_TEXT.to_string(), false)
            }
            Err(payload) => {
                tracing::error!(
                    "console line '{}' failed while being read: {}",
                    self.entity.name(),
                    panic_message(payload.as_ref())
                );
                (MISSING_VALUE_TEXT.to_string(), true)
            }
        };
        let text = match stamp {
            ConsoleStamp::Ticks => format!("{} : {}", self.ticks, value),
            ConsoleStamp::Elapsed => format!("{} : {}", format_elapsed(self.elapsed), value),
        };
        FormattedLine { text, failed }
    }
}

/// Text of one console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    pub text: String,
    /// The host object panicked while being read
    pub failed: bool,
}

/// Texts for the whole console line pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleLayout {
    /// One entry per pool widget, top to bottom
    pub texts: Vec<String>,
    /// Lines whose read panicked
    pub failures: usize,
}

/// Ring buffer holding at most `capacity` lines
#[derive(Debug)]
pub struct ConsoleLogBuffer {
    lines: VecDeque<ConsoleLogLine>,
    capacity: usize,
}

impl ConsoleLogBuffer {
    /// Create a buffer; a zero capacity is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest once full
    ///
    /// Returns the evicted line, if any.
    pub fn push(&mut self, line: ConsoleLogLine) -> Option<ConsoleLogLine> {
        let evicted = if self.lines.len() >= self.capacity {
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(line);
        evicted
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines oldest first
    pub fn iter(&self) -> impl Iterator<Item = &ConsoleLogLine> {
        self.lines.iter()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Texts for a pool of `pool_size` line widgets
    ///
    /// The most recent `min(len, pool_size)` lines fill the bottom-most
    /// widgets, oldest at the top; widgets above them stay blank.
    pub fn layout(&self, pool_size: usize, stamp: ConsoleStamp) -> ConsoleLayout {
        let mut layout = ConsoleLayout {
            texts: vec![String::new(); pool_size],
            failures: 0,
        };
        let shown = self.lines.len().min(pool_size);
        let first_widget = pool_size - shown;
        let first_line = self.lines.len() - shown;
        for (offset, line) in self.lines.iter().skip(first_line).enumerate() {
            let formatted = line.format(stamp);
            layout.failures += usize::from(formatted.failed);
            layout.texts[first_widget + offset] = formatted.text;
        }
        layout
    }
}
