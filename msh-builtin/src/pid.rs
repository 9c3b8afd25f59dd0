use super::ShellProxy;
use msh_types::{Context, ExitStatus};

/// Prints the shell pid and, once something has been launched, the last child pid.
pub fn command(ctx: &Context, _argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus {
    if ctx
        .write_stdout(&format!("Shell PID: {}", ctx.shell_pid))
        .is_err()
    {
        return ExitStatus::ExitedWith(1);
    }
    if let Some(child) = proxy.last_child_pid() {
        if ctx
            .write_stdout(&format!("Last child PID: {child}"))
            .is_err()
        {
            return ExitStatus::ExitedWith(1);
        }
    }
    ExitStatus::ExitedWith(0)
}
