use crate::parser::{ParsedLine, parse_line};
use crate::process::fork::fork_process;
use crate::process::{Job, Process, wait_pid_job};
use crate::shell::Shell;
use anyhow::{Context as _, Result};
use msh_types::Context;
use nix::unistd::Pid;
use tracing::debug;

/// Tokenizes one input line and runs it, either as a builtin or as an external program.
///
/// Builtins are recognized by the first token only.
pub fn eval_str(shell: &mut Shell, ctx: &Context, input: &str) -> Result<()> {
    let parsed = parse_line(input, &shell.limits())?;
    let Some(name) = parsed.program() else {
        return Ok(());
    };

    if let Some(builtin) = msh_builtin::get_command(name) {
        debug!("EVAL_BUILTIN: {} {:?}", name, parsed.argv);
        // builtins report their own failures; the status is not propagated
        builtin(ctx, parsed.argv, shell);
        return Ok(());
    }

    launch(shell, ctx, &parsed)?;
    Ok(())
}

/// Starts an external program.
///
/// In the foreground this blocks until that child terminates. In the background
/// the child is added to the job table and `[<table size>] <pid>` is printed.
pub fn launch(shell: &mut Shell, ctx: &Context, parsed: &ParsedLine) -> Result<Pid> {
    let process = Process::new(&parsed.argv)?;

    if parsed.background {
        // refuse before forking so no child is left untracked
        shell.jobs.ensure_capacity()?;
    }

    let pid = fork_process(&process, !parsed.background)?;
    shell.last_child = Some(pid);

    if parsed.background {
        let position = shell
            .jobs
            .push(Job::new(pid, parsed.cmdline()))
            .with_context(|| format!("failed to track process {pid}"))?;
        ctx.write_stdout(&format!("[{position}] {pid}"))?;
    } else {
        let state = wait_pid_job(pid)?;
        debug!(
            "LAUNCH_FOREGROUND_DONE: pid {} {} (exit code {})",
            pid,
            state,
            state.exit_code()
        );
    }
    Ok(pid)
}
