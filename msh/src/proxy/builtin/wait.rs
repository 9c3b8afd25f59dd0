//! Wait command handler.

use crate::shell::Shell;
use anyhow::Result;
use msh_builtin::NO_JOBS;
use msh_types::Context;

/// Execute the `wait` builtin command.
///
/// Blocks the shell until every tracked background job has terminated.
pub fn execute(shell: &mut Shell, ctx: &Context, _argv: Vec<String>) -> Result<()> {
    if shell.jobs().is_empty() {
        ctx.write_stdout(NO_JOBS)?;
        return Ok(());
    }
    shell.wait_jobs(ctx)
}
