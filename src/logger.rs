//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only printed with `--verbose`
//! - `banner()` for the interactive session's timestamped status lines
//!
//! Colors follow the persisted theme: bright on dark terminals, plain on
//! light ones.
//!
//! # Example
//!
//! ```ignore
//! log!("svg"; "loaded {}x{}", width, height);
//! debug!("export"; "dropping stale result #{}", ticket);
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::status::StatusKind;
use crate::theme::Theme;

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Dark palette flag (set from the persisted theme)
static DARK: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// Select the color palette for the given theme
pub fn set_theme(theme: Theme) {
    DARK.store(theme == Theme::Dark, Ordering::SeqCst);
}

fn is_dark() -> bool {
    DARK.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match (module_lower, is_dark()) {
        ("svg" | "session", true) => prefix.bright_blue().bold().to_string(),
        ("svg" | "session", false) => prefix.blue().bold().to_string(),
        ("export", true) => prefix.bright_green().bold().to_string(),
        ("export", false) => prefix.green().bold().to_string(),
        ("error", true) => prefix.bright_red().bold().to_string(),
        ("error", false) => prefix.red().bold().to_string(),
        (_, true) => prefix.bright_yellow().bold().to_string(),
        (_, false) => prefix.yellow().bold().to_string(),
    }
}

// ============================================================================
// Banner (timestamped status lines)
// ============================================================================

/// Get current UTC time formatted as HH:MM:SS
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Status display for the interactive session
///
/// Each message replaces whatever sits on the current line (usually the
/// prompt), so a result arriving while the user is idle does not get
/// glued onto `svgpng> `.
///
/// # Example
///
/// ```ignore
/// let mut banner = Banner::new();
/// banner.show(StatusKind::Success, "SVG rendered successfully");
/// banner.show(StatusKind::Error, "invalid SVG code: no valid SVG element found");
/// ```
pub struct Banner;

/// Global banner shared by every session reporter.
static BANNER: LazyLock<Mutex<Banner>> = LazyLock::new(|| Mutex::new(Banner::new()));

impl Banner {
    pub const fn new() -> Self {
        Self
    }

    /// Display a message with the symbol for its kind.
    pub fn show(&mut self, kind: StatusKind, message: &str) {
        let line = compose(&now(), kind, message);

        let mut stdout = stdout().lock();
        execute!(
            stdout,
            cursor::MoveToColumn(0),
            Clear(ClearType::CurrentLine)
        )
        .ok();
        writeln!(stdout, "{line}").ok();
        stdout.flush().ok();
    }
}

/// Build a banner line: `[HH:MM:SS] ✓ message`.
fn compose(timestamp: &str, kind: StatusKind, message: &str) -> String {
    let symbol = match (kind, is_dark()) {
        (StatusKind::Success, true) => "✓".bright_green().to_string(),
        (StatusKind::Success, false) => "✓".green().to_string(),
        (StatusKind::Error, true) => "✗".bright_red().to_string(),
        (StatusKind::Error, false) => "✗".red().to_string(),
        (StatusKind::Info, true) => "ℹ".bright_cyan().to_string(),
        (StatusKind::Info, false) => "ℹ".cyan().to_string(),
    };
    let timestamp = format!("[{timestamp}]").dimmed().to_string();
    format!("{timestamp} {symbol} {message}")
}

/// Global banner: show one message
pub fn banner(kind: StatusKind, message: &str) {
    BANNER.lock().show(kind, message);
}

// ============================================================================
// Tests
// ============================================================================
