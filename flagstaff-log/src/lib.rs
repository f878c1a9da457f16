//! Flagstaff Logging
//!
//! Lightweight logging macros shared by the Flagstaff crates. Output goes to
//! stderr and is controlled through `FLAGSTAFF_*` environment variables.
//!
//! # Usage
//!
//! ```rust
//! use flagstaff_log::{debug, info, warn, error, trace};
//!
//! let flag = "newDashboard";
//! trace!("evaluating {}", flag);
//! info!("override set for {}", flag);
//! warn!("ignoring unparsable value for {}", flag);
//! error!("registry failed to load");
//!
//! debug!(target: "flagstaff::engine", "environment is now {}", "staging");
//! ```
//!
//! # Environment Variables
//!
//! - `FLAGSTAFF_DEBUG=1` - Enable debug logging
//! - `FLAGSTAFF_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `FLAGSTAFF_LOG_FORMAT=json|pretty|compact` - Set output format
//! - `FLAGSTAFF_LOG_COLOR=1|0` - Enable/disable colors
//! - `FLAGSTAFF_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `FLAGSTAFF_LOG_MODULE=1|0` - Include the log target

use once_cell::sync::OnceCell;
use std::env;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Per-evaluation detail
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level
    Error = 4,
    /// Nothing is logged
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
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

    fn from_u8(raw: u8) -> Self {
        match raw {
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

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable, optionally colored
    Pretty,
    /// One short line per record
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: OnceCell<LogConfig> = OnceCell::new();

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
    /// Print the record target (module path by default)
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
            module_path: true,
        }
    }
}

impl LogConfig {
    /// Read the configuration from `FLAGSTAFF_*` environment variables.
    pub fn from_env() -> Self {
        let debug = env_flag("FLAGSTAFF_DEBUG").unwrap_or(false);

        let level = env::var("FLAGSTAFF_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("FLAGSTAFF_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = env_flag("FLAGSTAFF_LOG_COLOR").unwrap_or_else(|| {
            env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal()
        });

        Self {
            debug,
            level,
            format,
            color,
            timestamps: env_flag("FLAGSTAFF_LOG_TIMESTAMPS").unwrap_or(true),
            module_path: env_flag("FLAGSTAFF_LOG_MODULE").unwrap_or(true),
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

// ============================================================================
// Public API
// ============================================================================

/// Initialize logging from the environment.
///
/// Called lazily by the first record that passes the level filter. Calling it
/// again has no effect.
pub fn init() {
    let _ = config();
}

/// Initialize logging with an explicit configuration.
///
/// Returns `false` when logging was already initialized.
pub fn init_with(config: LogConfig) -> bool {
    let debug = config.debug;
    let level = config.level;
    let installed = CONFIG.set(config).is_ok();
    if installed {
        DEBUG_ENABLED.store(debug, Ordering::SeqCst);
        LOG_LEVEL.store(level as u8, Ordering::SeqCst);
    }
    installed
}

/// The active configuration.
pub fn config() -> &'static LogConfig {
    CONFIG.get_or_init(|| {
        let config = LogConfig::from_env();
        DEBUG_ENABLED.store(config.debug, Ordering::SeqCst);
        LOG_LEVEL.store(config.level as u8, Ordering::SeqCst);
        config
    })
}

#[inline]
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
}

pub fn current_level() -> Level {
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Change the level at runtime.
pub fn set_level(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Toggle debug mode at runtime. Enabling it lowers the level to `Debug`.
pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

// ============================================================================
// Log Output
// ============================================================================

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    let config = config();
    if !is_level_enabled(level) && !(level == Level::Debug && is_debug_enabled()) {
        return;
    }

    match config.format {
        Format::Pretty => write_pretty(level, target, message, config),
        Format::Compact => write_compact(level, target, message, config),
        Format::Json => write_json(level, target, message),
    }
}

fn write_pretty(level: Level, target: &str, message: &str, config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(stderr, "{} ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    if config.color {
        let _ = write!(stderr, "{:5} ", level.colored());
    } else {
        let _ = write!(stderr, "{:5} ", level.as_str());
    }

    #[cfg(not(feature = "color"))]
    let _ = write!(stderr, "{:5} ", level.as_str());

    if config.module_path && !target.is_empty() {
        let _ = write!(stderr, "[{}] ", target);
    }

    let _ = writeln!(stderr, "{}", message);
}

fn write_compact(level: Level, target: &str, message: &str, config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let _ = write!(stderr, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }

    let _ = write!(stderr, "{} ", &level.as_str()[..1]);

    if config.module_path && !target.is_empty() {
        let _ = write!(stderr, "{}: ", target);
    }

    let _ = writeln!(stderr, "{}", message);
}

#[cfg(feature = "json")]
fn write_json(level: Level, target: &str, message: &str) {
    eprintln!("{}", json_line(level, target, message));
}

#[cfg(feature = "json")]
fn json_line(level: Level, target: &str, message: &str) -> String {
    #[derive(serde::Serialize)]
    struct Record<'a> {
        timestamp: String,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let record = Record {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&record).unwrap_or_default()
}

#[cfg(not(feature = "json"))]
fn write_json(level: Level, target: &str, message: &str) {
    eprintln!(
        r#"{{"timestamp":"{}","level":"{}","target":"{}","message":"{}"}}"#,
        chrono::Utc::now().to_rfc3339(),
        level.as_str(),
        escape_json(target),
        escape_json(message)
    );
}

#[cfg(not(feature = "json"))]
fn escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {{
        $crate::init();
        if $crate::is_level_enabled($level)
            || ($level == $crate::Level::Debug && $crate::is_debug_enabled())
        {
            $crate::log($level, $target, &format!($($arg)+));
        }
    }};
    ($level:expr, $($arg:tt)+) => {
        $crate::__log_at!($level, target: module_path!(), $($arg)+)
    };
}

/// Log a trace record. Used for per-evaluation detail.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug record.
///
/// Enabled by `FLAGSTAFF_DEBUG=1` or `FLAGSTAFF_LOG_LEVEL=debug`.
///
/// # Example
///
/// ```rust
/// use flagstaff_log::debug;
///
/// let name = "betaFeatures";
/// debug!("loaded {}", name);
/// debug!(target: "flagstaff::registry", "loaded {}", name);
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Debug, $($arg)+) };
}

/// Log an info record.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Info, $($arg)+) };
}

/// Log a warning record.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Warn, $($arg)+) };
}

/// Log an error record.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log_at!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tests
// ============================================================================
