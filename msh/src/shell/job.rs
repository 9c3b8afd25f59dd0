use crate::process::{poll_any_child, wait_any_child};
use crate::shell::{APP_NAME, Shell};
use anyhow::Result;
use msh_types::Context;
use tracing::{debug, warn};

pub fn completion_notice(position: usize) -> String {
    format!("[{position}]+ Done")
}

/// Collects every child that has already terminated, without blocking.
///
/// Tracked jobs are removed and announced with their former position; other
/// terminated children are collected silently.
pub fn reap_finished(shell: &mut Shell, ctx: &Context) -> Result<()> {
    let reaped = shell.jobs.reap_with(poll_any_child);
    for job in reaped {
        debug!(
            "REAP_DONE: job {} (pid {}, cmd '{}') {} (exit code {})",
            job.position,
            job.job.pid,
            job.job.cmd,
            job.state,
            job.state.exit_code()
        );
        ctx.write_stdout(&completion_notice(job.position))?;
    }
    Ok(())
}

/// Waits for any child, repeatedly, until the job table is empty.
pub fn wait_jobs(shell: &mut Shell, ctx: &Context) -> Result<()> {
    debug!("WAIT_JOBS_START: {} tracked jobs", shell.jobs.len());
    let lost = shell.jobs.drain_with(
        || Ok(wait_any_child()?),
        |pid, state, position| {
            debug!(
                "WAIT_JOBS_EVENT: pid {} {} (exit code {}, tracked position: {:?})",
                pid,
                state,
                state.exit_code(),
                position
            );
            ctx.write_stdout(&format!("Process {pid} finished"))
        },
    )?;
    for job in lost {
        warn!("WAIT_JOBS_LOST: pid {} cmd '{}'", job.pid, job.cmd);
        ctx.write_stderr(&format!(
            "{APP_NAME}: process {} is no longer a child of this shell",
            job.pid
        ))?;
    }
    Ok(())
}
