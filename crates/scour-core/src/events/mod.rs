//! Process lifecycle events shared by every `scour` command.

use tracing::{error, info};

use crate::registry::builtin_registry;

/// Logged once the command line is parsed, before any backend is touched.
pub fn log_app_startup(command: &str) {
    let registered_kinds = builtin_registry().map(|r| r.len()).unwrap_or(0);
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION"),
        command = command,
        registered_kinds = registered_kinds
    );
}

pub fn log_app_shutdown(command: &str, succeeded: bool) {
    info!(
        event = "core.app.shutdown_started",
        command = command,
        succeeded = succeeded
    );
}

pub fn log_app_error(command: &str, error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        command = command,
        error = %error,
        error_type = std::any::type_name_of_val(error)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_events() {
        log_app_startup("kinds");
        log_app_shutdown("kinds", true);

        let test_error = std::io::Error::other("fixture unreadable");
        log_app_error("run", &test_error);
        log_app_shutdown("run", false);
    }
}
