#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod overlay_config;
mod shortcut_config;

pub(crate) use {
    config::Config, logging_config::LoggingConfig, overlay_config::OverlayConfig,
    shortcut_config::ShortcutConfig,
};

use dictation_core::{DEFAULT_SHORTCUT, ERROR_DISMISS_DELAY, SUCCESS_DISMISS_DELAY};

pub(crate) const DEFAULT_LOG_FILTER: &str = "dictation_shell=debug,dictation_core=debug";

pub(crate) fn default_shortcut() -> String {
    DEFAULT_SHORTCUT.to_string()
}

pub(crate) fn default_success_dismiss_ms() -> u64 {
    SUCCESS_DISMISS_DELAY.as_millis() as u64
}

pub(crate) fn default_error_dismiss_ms() -> u64 {
    ERROR_DISMISS_DELAY.as_millis() as u64
}

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
