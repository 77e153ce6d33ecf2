//! Centralized logging configuration for the emulator.
//!
//! Per-category log levels are stored in atomics so the hot emulation loop
//! can check them without locking, and messages are built lazily through a
//! closure so disabled categories cost nothing.
//!
//! Levels come from the `EMUWALKER_LOG` environment variable, either a bare
//! level applied to every category (`EMUWALKER_LOG=debug`) or a
//! comma-separated list of `category=level` pairs
//! (`EMUWALKER_LOG=ssu=trace,stubs=warn`).

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Once;

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for different emulator components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// CPU execution (instruction execution, PC tracing)
    Cpu,
    /// Bus/memory access
    Bus,
    /// Synchronous serial unit
    Ssu,
    /// LCD/framebuffer
    Lcd,
    /// Unimplemented features/stubs (SLEEP, TRAPA, undefined opcodes)
    Stubs,
}

const CATEGORY_COUNT: usize = 5;

impl LogCategory {
    fn index(self) -> usize {
        match self {
            LogCategory::Cpu => 0,
            LogCategory::Bus => 1,
            LogCategory::Ssu => 2,
            LogCategory::Lcd => 3,
            LogCategory::Stubs => 4,
        }
    }

    fn name(self) -> &'static str {
        match self {
            LogCategory::Cpu => "CPU",
            LogCategory::Bus => "BUS",
            LogCategory::Ssu => "SSU",
            LogCategory::Lcd => "LCD",
            LogCategory::Stubs => "STUB",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpu" => Some(LogCategory::Cpu),
            "bus" => Some(LogCategory::Bus),
            "ssu" => Some(LogCategory::Ssu),
            "lcd" => Some(LogCategory::Lcd),
            "stubs" | "stub" => Some(LogCategory::Stubs),
            _ => None,
        }
    }
}

static LEVELS: [AtomicU8; CATEGORY_COUNT] = [
    AtomicU8::new(LogLevel::Off as u8),
    AtomicU8::new(LogLevel::Off as u8),
    AtomicU8::new(LogLevel::Off as u8),
    AtomicU8::new(LogLevel::Off as u8),
    AtomicU8::new(LogLevel::Off as u8),
];

static INIT: Once = Once::new();

/// Set the level for a single category.
pub fn set_level(category: LogCategory, level: LogLevel) {
    LEVELS[category.index()].store(level as u8, Ordering::Relaxed);
}

/// Set every category to the same level.
pub fn set_all_levels(level: LogLevel) {
    for slot in &LEVELS {
        slot.store(level as u8, Ordering::Relaxed);
    }
}

/// Current level for a category.
pub fn level(category: LogCategory) -> LogLevel {
    LogLevel::from_u8(LEVELS[category.index()].load(Ordering::Relaxed))
}

/// Configure levels from the `EMUWALKER_LOG` environment variable.
/// Safe to call more than once; only the first call reads the environment.
pub fn init_from_env() {
    INIT.call_once(|| {
        let spec = match std::env::var("EMUWALKER_LOG") {
            Ok(s) => s,
            Err(_) => return,
        };
        apply_spec(&spec);
    });
}

fn apply_spec(spec: &str) {
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('=') {
            Some((cat, lvl)) => {
                if let (Some(cat), Some(lvl)) = (LogCategory::parse(cat), LogLevel::from_str(lvl))
                {
                    set_level(cat, lvl);
                }
            }
            None => {
                if let Some(lvl) = LogLevel::from_str(part) {
                    set_all_levels(lvl);
                }
            }
        }
    }
}

/// Log a message if the category's configured level admits it.
///
/// The closure is only invoked when the message will actually be emitted.
pub fn log<F>(category: LogCategory, level: LogLevel, message: F)
where
    F: FnOnce() -> String,
{
    if level == LogLevel::Off || self::level(category) < level {
        return;
    }
    eprintln!("[{}] {}", category.name(), message());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing() {
        assert_eq!(LogLevel::from_str("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("5"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str("bogus"), None);
    }

    // The level table is global, so the spec/level assertions live in one
    // test to keep the default parallel test runner away from each other.
    #[test]
    fn spec_configures_levels() {
        apply_spec("ssu=trace,stubs=warn");
        assert_eq!(level(LogCategory::Ssu), LogLevel::Trace);
        assert_eq!(level(LogCategory::Stubs), LogLevel::Warn);

        apply_spec("info");
        assert_eq!(level(LogCategory::Cpu), LogLevel::Info);
        assert_eq!(level(LogCategory::Bus), LogLevel::Info);

        set_level(LogCategory::Cpu, LogLevel::Off);
        let mut called = false;
        log(LogCategory::Cpu, LogLevel::Debug, || {
            called = true;
            String::new()
        });
        assert!(!called);

        set_all_levels(LogLevel::Off);
    }
}
