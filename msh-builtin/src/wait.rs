use super::ShellProxy;
use msh_types::{Context, ExitStatus};

/// Blocks until every tracked background job has terminated.
///
/// The draining itself needs the shell's job table, so it is dispatched back to the shell.
pub fn command(ctx: &Context, argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus {
    match proxy.dispatch(ctx, "wait", argv) {
        Ok(_) => ExitStatus::ExitedWith(0),
        Err(e) => {
            ctx.write_stderr(&format!("wait: {e}")).ok();
            ExitStatus::ExitedWith(1)
        }
    }
}
