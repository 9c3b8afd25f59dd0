use crate::shell::APP_NAME;
use tracing::debug;

/// Formats an error for the user: one line, context chain included, no backtrace.
pub fn format_user_error(err: &anyhow::Error) -> String {
    format!("{APP_NAME}: {err:#}")
}

/// Display error in a user-friendly format without stack traces.
pub fn display_user_error(err: &anyhow::Error) {
    debug!("user error: {:?}", err);
    eprintln!("{}", format_user_error(err));
}
