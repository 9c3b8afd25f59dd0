use msh_types::{MshError, MshResult};
use nix::unistd::{ForkResult, Pid, fork};
use std::io::Write;
use tracing::debug;

use super::process::Process;

/// Forks and executes `process` in the child. Returns the child's pid to the parent.
pub(crate) fn fork_process(process: &Process, foreground: bool) -> MshResult<Pid> {
    debug!(
        "FORK: starting '{}' (foreground: {})",
        process.cmd(),
        foreground
    );

    // anything still buffered would otherwise be written by both processes
    std::io::stdout().flush().ok();
    std::io::stderr().flush().ok();

    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!("FORK: parent - child pid: {}", child);
            Ok(child)
        }
        Ok(ForkResult::Child) => process.exec(foreground),
        Err(err) => Err(MshError::Fork(err)),
    }
}
