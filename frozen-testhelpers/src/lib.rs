#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use color_eyre::eyre;
pub use frozen_testhelpers_macros::test;

use log::{Level, LevelFilter, Log, Metadata, Record};
use owo_colors::{OwoColorize, Style};
use std::io::Write;
use std::sync::Once;

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Catppuccin palette
        let level_style = match record.level() {
            Level::Error => Style::new().fg_rgb::<243, 139, 168>(),
            Level::Warn => Style::new().fg_rgb::<249, 226, 175>(),
            Level::Info => Style::new().fg_rgb::<166, 227, 161>(),
            Level::Debug => Style::new().fg_rgb::<137, 180, 250>(),
            Level::Trace => Style::new().fg_rgb::<148, 226, 213>(),
        };

        eprintln!(
            "{} - {}: {}",
            record.level().style(level_style),
            record
                .target()
                .style(Style::new().fg_rgb::<137, 180, 250>()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Reads the log verbosity from `FROZEN_LOG`. Unset or unrecognized values
/// mean `trace`.
pub fn level_from_env() -> LevelFilter {
    resolve_level(std::env::var("FROZEN_LOG").ok().as_deref())
}

fn resolve_level(value: Option<&str>) -> LevelFilter {
    value.and_then(parse_level).unwrap_or(LevelFilter::Trace)
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Installs color-eyre and color-backtrace (except on miri) and a simple
/// stderr logger. Safe to call from every test: only the first call in a
/// process does anything.
pub fn setup() {
    static SETUP: Once = Once::new();
    SETUP.call_once(install);
}

fn install() {
    #[cfg(not(miri))]
    {
        use color_eyre::config::HookBuilder;
        use regex::Regex;
        use std::sync::LazyLock;

        /// Frames hidden from backtraces: panic machinery, the test runner,
        /// and thread startup.
        static IGNORE_FRAMES: LazyLock<Option<Regex>> = LazyLock::new(|| {
            Regex::new(r"^(std::panic|core::panic|test::run_test|__pthread_cond_wait|std::sys::(pal|backtrace)|std::thread::Builder|core::ops::function|test::__rust_begin_short_backtrace|<core::panic::|<alloc::boxed::Box<F,A> as core::ops::function::FnOnce<Args>>::call_once)")
                .ok()
        });

        fn keep(name: &str) -> bool {
            IGNORE_FRAMES
                .as_ref()
                .is_none_or(|ignore| !ignore.is_match(name))
        }

        let eyre_filter = move |frames: &mut Vec<&color_eyre::config::Frame>| {
            frames.retain(|frame| {
                frame
                    .name
                    .as_ref()
                    .map(|n| keep(&n.to_string()))
                    .unwrap_or(true)
            });
        };

        // another hook may already be installed, e.g. by a test binary's own setup
        let _ = HookBuilder::default()
            .add_frame_filter(Box::new(eyre_filter))
            .install();

        {
            use color_backtrace::{BacktracePrinter, Frame};

            let filter = move |frames: &mut Vec<&Frame>| {
                frames.retain(|frame| frame.name.as_ref().map(|name| keep(name)).unwrap_or(true));
            };

            let stderr = color_backtrace::termcolor::StandardStream::stderr(
                color_backtrace::termcolor::ColorChoice::Auto,
            );
            let printer = BacktracePrinter::new().add_frame_filter(Box::new(filter));
            printer.install(Box::new(stderr));
        }
    }

    if log::set_boxed_logger(Box::new(SimpleLogger)).is_ok() {
        log::set_max_level(level_from_env());
    }
}

#[cfg(test)]
mod tests {
    use super::{LevelFilter, parse_level, resolve_level};

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" warn "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("Off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn unset_or_unknown_level_means_trace() {
        assert_eq!(resolve_level(None), LevelFilter::Trace);
        assert_eq!(resolve_level(Some("loud")), LevelFilter::Trace);
        assert_eq!(resolve_level(Some("off")), LevelFilter::Off);
        assert_eq!(resolve_level(Some("error")), LevelFilter::Error);
    }
}
