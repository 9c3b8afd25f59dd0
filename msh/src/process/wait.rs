use msh_types::{MshError, MshResult};
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tracing::{debug, error};

use super::state::ProcessState;

/// `waitpid` target meaning "any child of this process".
const ANY_CHILD: i32 = -1;

fn terminated(status: WaitStatus) -> Option<(Pid, ProcessState)> {
    match status {
        WaitStatus::Exited(pid, code) => {
            debug!("WAIT_EXITED: process {} exited with status {}", pid, code);
            Some((pid, ProcessState::exited(code)))
        }
        WaitStatus::Signaled(pid, signal, core_dumped) => {
            debug!(
                "WAIT_SIGNALED: process {} killed by {:?} (core dumped: {})",
                pid, signal, core_dumped
            );
            Some((pid, ProcessState::signaled(signal)))
        }
        status => {
            debug!("WAIT_IGNORED: non-terminal status {:?}", status);
            None
        }
    }
}

/// Blocks until the given child terminates. No other child is consumed.
pub fn wait_pid_job(pid: Pid) -> MshResult<ProcessState> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some((_, state)) = terminated(status) {
                    return Ok(state);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => {
                // already collected elsewhere
                debug!("WAIT_PID_ECHILD: no child {} - treating as completed", pid);
                return Ok(ProcessState::exited(0));
            }
            Err(err) => return Err(MshError::Wait(err)),
        }
    }
}

/// Non-blocking poll for any terminated child.
///
/// Returns `None` when no terminated child is immediately available, when there are no
/// children at all, or on an unexpected error (which is logged).
pub fn poll_any_child() -> Option<(Pid, ProcessState)> {
    loop {
        match waitpid(Pid::from_raw(ANY_CHILD), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => return None,
            Ok(status) => {
                if let Some(res) = terminated(status) {
                    return Some(res);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => return None,
            Err(err) => {
                error!("POLL_ANY_CHILD: unexpected waitpid error: {}", err);
                return None;
            }
        }
    }
}

/// Blocks until any child terminates. `Ok(None)` means there are no children left.
pub fn wait_any_child() -> MshResult<Option<(Pid, ProcessState)>> {
    loop {
        match waitpid(Pid::from_raw(ANY_CHILD), None) {
            Ok(status) => {
                if let Some(res) = terminated(status) {
                    return Ok(Some(res));
                }
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => return Ok(None),
            Err(err) => return Err(MshError::Wait(err)),
        }
    }
}
