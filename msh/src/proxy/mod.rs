//! Shell proxy implementation for builtin command dispatch.
//!
//! This module provides the `ShellProxy` trait implementation for `Shell`,
//! routing builtin commands that need the job table to their handlers.

mod builtin;

use crate::shell::Shell;
use anyhow::{Result, bail};
use msh_builtin::{JobSummary, ShellProxy};
use msh_types::Context;
use nix::unistd::Pid;
use tracing::debug;

impl ShellProxy for Shell {
    fn exit_shell(&mut self) {
        self.exit();
    }

    fn dispatch(&mut self, ctx: &Context, cmd: &str, argv: Vec<String>) -> Result<()> {
        debug!("DISPATCH: {} {:?}", cmd, argv);
        match cmd {
            "wait" => builtin::wait::execute(self, ctx, argv),
            _ => bail!("unknown command: {cmd}"),
        }
    }

    fn last_child_pid(&self) -> Option<Pid> {
        self.last_child()
    }

    fn background_jobs(&self) -> Vec<JobSummary> {
        self.jobs().summaries()
    }
}
