use super::ShellProxy;
use anyhow::Result;
use msh_types::{Context, ExitStatus};

pub const NO_JOBS: &str = "No background processes";

pub fn command(ctx: &Context, argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus {
    match list(ctx, argv, proxy) {
        Ok(()) => ExitStatus::ExitedWith(0),
        Err(e) => {
            ctx.write_stderr(&format!("jobs: {e}")).ok();
            ExitStatus::ExitedWith(1)
        }
    }
}

// Presence in the table means running; liveness is not re-polled here.
fn list(ctx: &Context, _argv: Vec<String>, proxy: &mut dyn ShellProxy) -> Result<()> {
    let jobs = proxy.background_jobs();
    if jobs.is_empty() {
        ctx.write_stdout(NO_JOBS)?;
        return Ok(());
    }
    for job in jobs {
        ctx.write_stdout(&format!(
            "[{}] {} Running {}",
            job.position, job.pid, job.cmd
        ))?;
    }
    Ok(())
}
