//! The `log` module defines an interface to epinet's internal logging
//! facilities, as distinct from _reporting_, which records model output.
//!
//! This module (re)exports the five logging macros: `error!`, `warn!`,
//! `info!`, `debug!` and `trace!` where `error!` represents the
//! highest-priority log messages and `trace!` the lowest. To emit a log
//! message, simply use one of these macros in your code:
//!
//! ```rust
//! use epinet::info;
//!
//! pub fn do_a_thing() {
//!     info!("A thing is being done.");
//! }
//! ```
//!
//! Logging is _disabled_ by default. Log messages are enabled/disabled using
//! the functions:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with
//!    priority at least `level`
//!
//! In addition, per-module filtering of messages can be configured using
//! `set_module_filter()` / `remove_module_filter()`:
//!
//! ```rust
//! use epinet::log::{set_module_filter, set_log_level, LevelFilter};
//!
//! pub fn setup_logging() {
//!     // Enable `info` log messages globally.
//!     set_log_level(LevelFilter::Info);
//!     // Enable all log messages for the `epinet::propagation` module.
//!     set_module_filter("epinet::propagation", LevelFilter::Trace);
//! }
//! ```

pub use log::{debug, error, info, trace, warn, LevelFilter};

use log4rs::append::console::ConsoleAppender;
use log4rs::config::runtime::ConfigBuilder;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::{Config, Handle};

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, MutexGuard};

// Logging disabled.
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;

// Use an ISO 8601 timestamp format and color coded level tag
const DEFAULT_LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// Holds logging configuration. Its primary responsibility is to keep track of
/// the filter levels of modules and hold a handle to the global logger.
///
/// Because loggers are globally installed, only one instance of this struct
/// should exist. The public API are free functions which fetch the singleton
/// and call the appropriate member function.
#[derive(Default)]
struct LogConfiguration {
    /// The "default" level filter for modules ("targets") without an
    /// explicitly set filter. A global filter level of `LevelFilter::Off`
    /// disables logging.
    global_log_level: Option<LevelFilter>,
    /// Module ("target") specific level filters, keyed by module path.
    module_levels: HashMap<String, LevelFilter>,
    /// Handle to the `log4rs` logger.
    root_handle: Option<Handle>,
}

impl LogConfiguration {
    fn global_log_level(&self) -> LevelFilter {
        self.global_log_level.unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Sets the global logger to conform to this `LogConfiguration`.
    fn set_config(&mut self) {
        let encoder = Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN));
        let stdout: ConsoleAppender = ConsoleAppender::builder().encoder(encoder).build();
        let mut config: ConfigBuilder =
            Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));

        // Add module specific configuration
        for (module, level) in &self.module_levels {
            config = config.logger(Logger::builder().build(module.clone(), *level));
        }

        // The `Root` determines the global log level
        let root = Root::builder()
            .appender("stdout")
            .build(self.global_log_level());
        let new_config = match config.build(root) {
            Err(e) => {
                panic!("failed to build log config: {e}");
            }
            Ok(config) => config,
        };

        match self.root_handle {
            Some(ref mut handle) => {
                // The global logger has already been initialized
                handle.set_config(new_config);
            }

            None => {
                // The global logger has not yet been initialized
                self.root_handle = Some(log4rs::init_config(new_config).unwrap());
            }
        }
    }
}

/// Enables the logger with no global level filter / full logging. Equivalent
/// to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to
/// `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off`
/// disables logging.
pub fn set_log_level(level: LevelFilter) {
    let mut log_configuration = get_log_configuration();
    if log_configuration.global_log_level == Some(level) {
        return;
    }
    log_configuration.global_log_level = Some(level);
    log_configuration.set_config();
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    let mut log_configuration = get_log_configuration();
    let previous = log_configuration
        .module_levels
        .insert(module_path.to_string(), level_filter);
    if previous == Some(level_filter) {
        // Don't bother building and setting an identical config
        return;
    }
    log_configuration.set_config();
}

/// Removes a module-specific level filter for the given module path. The
/// global level filter will apply to the module.
pub fn remove_module_filter(module_path: &str) {
    let mut log_configuration = get_log_configuration();
    if log_configuration.module_levels.remove(module_path).is_some() {
        log_configuration.set_config();
    }
}

/// Fetches a guard for the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION
        .lock()
        .expect("logging configuration mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Logger installation is global to the process, so these tests exercise
    // the configuration bookkeeping through the public API in one sequence.
    #[test]
    fn configure_and_reconfigure() {
        set_log_level(LevelFilter::Info);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level(), LevelFilter::Info);
            assert!(config.root_handle.is_some());
        }

        set_module_filter("epinet::propagation", LevelFilter::Trace);
        {
            let config = get_log_configuration();
            assert_eq!(
                config.module_levels.get("epinet::propagation"),
                Some(&LevelFilter::Trace)
            );
        }

        remove_module_filter("epinet::propagation");
        {
            let config = get_log_configuration();
            assert!(!config.module_levels.contains_key("epinet::propagation"));
        }

        disable_logging();
        let config = get_log_configuration();
        assert_eq!(config.global_log_level(), LevelFilter::Off);
    }
}
