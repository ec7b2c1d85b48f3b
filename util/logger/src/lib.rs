//! A thin, uniform logging facade shared by every crate in the
//! workspace, modeled on `ckb-logger`: callers depend on this crate
//! rather than on `log` directly, so the backend can be swapped (or a
//! test-only silent logger installed) without touching call sites.
//!
//! This crate never installs a global logger on its own — exactly like
//! `ckb-logger` leaves `env_logger`/`ckb-logger-service` wiring to the
//! embedding binary. [`init`] is provided only for tests and small
//! standalone tools that want a sane default.

pub use log::{Level, LevelFilter, log_enabled};
pub use log::{debug, error, info, trace, warn};

use ansi_term::Colour;
use once_cell::sync::OnceCell;
use std::io::Write;

static INIT: OnceCell<()> = OnceCell::new();

/// The colour `ckb-logger` assigns each level, so a level name is
/// recognizable at a glance in a scrolling terminal.
fn level_colour(level: Level) -> Colour {
    match level {
        Level::Error => Colour::Red,
        Level::Warn => Colour::Yellow,
        Level::Info => Colour::Green,
        Level::Debug => Colour::Blue,
        Level::Trace => Colour::Purple,
    }
}

/// Initialize a colorized, timestamped `env_logger` backend. Idempotent:
/// safe to call from multiple test modules.
pub fn init_test_logger() {
    INIT.get_or_init(|| {
        let _ = env_logger::Builder::from_default_env()
            .is_test(true)
            .format(|buf, record| {
                let level = level_colour(record.level()).paint(record.level().to_string());
                writeln!(buf, "{} {} {}", level, record.target(), record.args())
            })
            .try_init();
    });
}

/// Log a line at `info` level tagged with a subsystem target, mirroring
/// the `target: "..."` idiom used across the corpus (e.g. `ckb-notify`'s
/// `debug!(target: "notify", ...)`).
#[macro_export]
macro_rules! info_target {
    ($target:expr, $($arg:tt)+) => {
        $crate::info!(target: $target, $($arg)+)
    };
}

/// Log a line at `warn` level tagged with a subsystem target.
#[macro_export]
macro_rules! warn_target {
    ($target:expr, $($arg:tt)+) => {
        $crate::warn!(target: $target, $($arg)+)
    };
}
