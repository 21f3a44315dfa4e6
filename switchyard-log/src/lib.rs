//! Switchyard Logging
//!
//! Namespaced debug logging for the Switchyard controller router. Every
//! message carries a target such as `switchyard::resolver`; debug output is
//! switched on per target through the `SWITCHYARD_DEBUG` environment variable.
//!
//! # Usage
//!
//! ```rust
//! use switchyard_log::{debug, info, warn};
//!
//! debug!(target: "switchyard::resolver", "methodAction: {}", "getAction");
//! info!("Autorouting for route {}", "/user");
//! warn!("Unable to autoRoute {}", "UserController");
//! ```
//!
//! # Environment Variables
//!
//! - `SWITCHYARD_DEBUG=switchyard::*` - Enable debug logging for matching targets.
//!   Accepts a comma separated list, `*` wildcards and `-target` exclusions.
//!   `1` or `true` enables every target.
//! - `SWITCHYARD_LOG_LEVEL=trace|debug|info|warn|error|off` - Minimum level
//! - `SWITCHYARD_LOG_FORMAT=pretty|compact|json` - Output format
//! - `SWITCHYARD_LOG_COLOR=1|0` - Enable/disable colors

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => "TRACE".magenta(),
            Level::Debug => "DEBUG".blue(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
            Level::Off => "OFF".white(),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Compact,
    Json,
}

impl Format {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Namespaces
// ============================================================================

/// A set of debug namespaces parsed from a `SWITCHYARD_DEBUG` style string.
///
/// `"switchyard::*,-switchyard::routes"` enables every switchyard target
/// except route binding. Exclusions always win over inclusions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl Namespaces {
    /// Parse a comma (or whitespace) separated namespace list.
    pub fn parse(spec: &str) -> Self {
        let mut namespaces = Self::default();

        for item in spec.split([',', ' ']).map(str::trim).filter(|s| !s.is_empty()) {
            match item {
                "1" | "true" | "TRUE" | "True" => namespaces.include.push("*".to_string()),
                "0" | "false" | "FALSE" | "False" => {}
                _ => match item.strip_prefix('-') {
                    Some(excluded) => namespaces.exclude.push(excluded.to_string()),
                    None => namespaces.include.push(item.to_string()),
                },
            }
        }

        namespaces
    }

    /// Whether nothing is enabled.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty()
    }

    /// Whether debug output is enabled for `target`.
    pub fn enabled(&self, target: &str) -> bool {
        if self.exclude.iter().any(|p| wildcard_match(p, target)) {
            return false;
        }
        self.include.iter().any(|p| wildcard_match(p, target))
    }
}

/// Match `target` against a pattern where `*` matches any run of characters.
fn wildcard_match(pattern: &str, target: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or("");
    let Some(mut rest) = target.strip_prefix(first) else {
        return false;
    };

    let remaining: Vec<&str> = parts.collect();
    let Some((last, middle)) = remaining.split_last() else {
        // No wildcard at all: exact match.
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }

    rest.ends_with(last)
}

// ============================================================================
// Global Configuration
// ============================================================================

/// Fast path flag: true when at least one namespace is enabled.
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: Lazy<RwLock<LogConfig>> = Lazy::new(|| RwLock::new(LogConfig::from_env()));

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub namespaces: Namespaces,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            namespaces: Namespaces::default(),
            level: Level::Info,
            format: Format::Pretty,
            color: false,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Build the configuration from `SWITCHYARD_*` environment variables.
    pub fn from_env() -> Self {
        let namespaces = env::var("SWITCHYARD_DEBUG")
            .map(|v| Namespaces::parse(&v))
            .unwrap_or_default();

        let level = env::var("SWITCHYARD_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::from_str(&s))
            .unwrap_or(Level::Info);

        let format = env::var("SWITCHYARD_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::from_str(&s))
            .unwrap_or(Format::Pretty);

        let color = env::var("SWITCHYARD_LOG_COLOR")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or_else(|_| env::var("NO_COLOR").is_err() && env::var("TERM").is_ok());

        let timestamps = env::var("SWITCHYARD_LOG_TIMESTAMPS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        DEBUG_ENABLED.store(!namespaces.is_empty(), Ordering::SeqCst);
        LOG_LEVEL.store(level as u8, Ordering::SeqCst);

        Self {
            namespaces,
            level,
            format,
            color,
            timestamps,
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Initialize logging eagerly. Otherwise this happens on the first log call.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// Whether debug output is enabled for `target`.
#[inline]
pub fn is_debug_enabled(target: &str) -> bool {
    init();
    DEBUG_ENABLED.load(Ordering::Relaxed) && CONFIG.read().namespaces.enabled(target)
}

/// Whether messages at `level` pass the level filter.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set the minimum level at runtime.
pub fn set_level(level: Level) {
    init();
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    CONFIG.write().level = level;
}

/// Replace the enabled debug namespaces at runtime.
pub fn set_namespaces(spec: &str) {
    init();
    let namespaces = Namespaces::parse(spec);
    DEBUG_ENABLED.store(!namespaces.is_empty(), Ordering::SeqCst);
    CONFIG.write().namespaces = namespaces;
}

pub fn set_format(format: Format) {
    init();
    CONFIG.write().format = format;
}

/// Snapshot of the current configuration.
pub fn config() -> LogConfig {
    CONFIG.read().clone()
}

// ============================================================================
// Log Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    let config = CONFIG.read();
    match config.format {
        Format::Pretty => log_pretty(level, target, message, &config),
        Format::Compact => log_compact(level, target, message, &config),
        Format::Json => log_json(level, target, message),
    }
}

fn log_pretty(level: Level, target: &str, message: &str, config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let _ = write!(stderr, "{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    if config.color {
        use colored::Colorize;
        let _ = writeln!(stderr, "{:5} {} {}", level.colored(), target.dimmed(), message);
        return;
    }

    let _ = writeln!(stderr, "{:5} [{}] {}", level.as_str(), target, message);
}

fn log_compact(level: Level, target: &str, message: &str, config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let _ = write!(stderr, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }

    let initial = level.as_str().chars().next().unwrap_or('?');
    let _ = writeln!(stderr, "{} {}: {}", initial, target, message);
}

#[cfg(feature = "json")]
fn log_json(level: Level, target: &str, message: &str) {
    #[derive(serde::Serialize)]
    struct LogEntry<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let entry = LogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
    };

    if let Ok(json) = serde_json::to_string(&entry) {
        eprintln!("{}", json);
    }
}

#[cfg(not(feature = "json"))]
fn log_json(level: Level, target: &str, message: &str) {
    eprintln!(
        r#"{{"timestamp":"{}","level":"{}","target":"{:?}","message":{:?}}}"#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        target,
        message
    );
}

// ============================================================================
// Macros
// ============================================================================

/// Log a trace message. Requires the target's namespace and `trace` level.
#[macro_export]
macro_rules! trace {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Trace) && $crate::is_debug_enabled($target) {
            $crate::log($crate::Level::Trace, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::trace!(target: module_path!(), $($arg)+)
    };
}

/// Log a debug message.
///
/// Emitted when the target matches `SWITCHYARD_DEBUG`, regardless of the
/// level filter, or when the level filter is `debug` or lower.
///
/// ```rust
/// use switchyard_log::debug;
///
/// let action = "listAction";
/// debug!(target: "switchyard::dispatch", "calling {}", action);
/// ```
#[macro_export]
macro_rules! debug {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_debug_enabled($target) || $crate::is_level_enabled($crate::Level::Debug) {
            $crate::log($crate::Level::Debug, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::debug!(target: module_path!(), $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Info) {
            $crate::log($crate::Level::Info, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::info!(target: module_path!(), $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Warn) {
            $crate::log($crate::Level::Warn, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::warn!(target: module_path!(), $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    (target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($crate::Level::Error) {
            $crate::log($crate::Level::Error, $target, &format!($($arg)+));
        }
    };
    ($($arg:tt)+) => {
        $crate::error!(target: module_path!(), $($arg)+)
    };
}
