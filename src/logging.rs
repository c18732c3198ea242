//! Log sinks.
//!
//! The terminal UI owns the screen, so while it runs log records go to an
//! in-memory ring shown on the logs page. Plain command line modes log to
//! stderr through `colog`.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// One formatted log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Bounded ring of the most recent log records.
#[derive(Debug)]
pub struct LogBuffer {
    lines: Mutex<VecDeque<LogLine>>,
    capacity: usize,
    level: LevelFilter,
}

impl LogBuffer {
    pub fn new(capacity: usize, level: LevelFilter) -> Self {
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
            level,
        }
    }

    fn lines(&self) -> MutexGuard<'_, VecDeque<LogLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, line: LogLine) {
        let mut lines = self.lines();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// The last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> Vec<LogLine> {
        let lines = self.lines();
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }
}

impl Log for LogBuffer {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.push(LogLine {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}

struct SharedBuffer(Arc<LogBuffer>);

impl Log for SharedBuffer {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.0.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.0.log(record)
    }

    fn flush(&self) {}
}

/// Route every log record into a new buffer and return it.
pub fn install_buffer(level: LevelFilter, capacity: usize) -> Result<Arc<LogBuffer>, SetLoggerError> {
    let buffer = Arc::new(LogBuffer::new(capacity, level));
    log::set_boxed_logger(Box::new(SharedBuffer(Arc::clone(&buffer))))?;
    log::set_max_level(level);
    install_panic_hook();
    Ok(buffer)
}

/// Log to stderr, colored unless `color` is off.
pub fn install_stderr(level: LevelFilter, color: bool) {
    let mut clog = colog::default_builder();
    clog.filter(None, level);
    if !color {
        clog.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));
    }
    clog.init();
    install_panic_hook();
}

fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));
}
