pub mod eval;
pub mod job;

use crate::config::Config;
use crate::parser::Limits;
use crate::process::JobTable;
use anyhow::Result;
use msh_types::{Context, ExitStatus};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::unistd::{Pid, getpid};
use tracing::{debug, warn};

pub const APP_NAME: &str = "msh";

/// All mutable shell state. Owned by the main loop and passed explicitly.
pub struct Shell {
    pub pid: Pid,
    pub exited: Option<ExitStatus>,
    pub config: Config,
    pub(crate) jobs: JobTable,
    /// Most recently launched child, foreground or background. Never cleared.
    pub(crate) last_child: Option<Pid>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("pid", &self.pid)
            .field("jobs", &self.jobs.len())
            .field("last_child", &self.last_child)
            .finish()
    }
}

impl Shell {
    pub fn new(config: Config) -> Self {
        let jobs = JobTable::new(config.max_jobs);
        Shell {
            pid: getpid(),
            exited: None,
            config,
            jobs,
            last_child: None,
        }
    }

    /// Keeps a terminal interrupt from killing the interactive shell itself.
    /// Children restore the default disposition before exec.
    pub fn set_signals(&mut self) {
        let action = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        unsafe {
            if let Err(e) = sigaction(Signal::SIGINT, &action) {
                warn!("Failed to set SIGINT handler: {}", e);
            }
            if let Err(e) = sigaction(Signal::SIGQUIT, &action) {
                warn!("Failed to set SIGQUIT handler: {}", e);
            }
        }
        debug!("Signal handlers setup completed");
    }

    pub fn limits(&self) -> Limits {
        self.config.limits()
    }

    pub fn eval_str(&mut self, ctx: &Context, input: &str) -> Result<()> {
        eval::eval_str(self, ctx, input)
    }

    pub fn exit(&mut self) {
        self.exited = Some(ExitStatus::ExitedWith(0));
    }

    pub fn last_child(&self) -> Option<Pid> {
        self.last_child
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// Non-blocking sweep run before every prompt.
    pub fn reap_finished(&mut self, ctx: &Context) -> Result<()> {
        job::reap_finished(self, ctx)
    }

    /// Blocks until every tracked background job has terminated.
    pub fn wait_jobs(&mut self, ctx: &Context) -> Result<()> {
        job::wait_jobs(self, ctx)
    }
}
