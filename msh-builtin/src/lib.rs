use anyhow::Result;
use msh_types::{Context, ExitStatus};
use nix::unistd::Pid;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

mod jobs;
mod pid;
mod wait;

pub use jobs::NO_JOBS;

#[cfg(test)]
pub(crate) mod testing;

/// Snapshot of one tracked background job, as shown to builtins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    /// 1-based position in the job table
    pub position: usize,
    pub pid: Pid,
    pub cmd: String,
}

/// Trait that provides an interface for builtin commands to interact with the shell
/// This allows builtin commands to perform shell operations without direct coupling
pub trait ShellProxy {
    /// Initiates shell exit process
    fn exit_shell(&mut self);

    /// Dispatches a command to the shell's command execution system
    /// Used for commands that need to be handled by the main shell logic
    fn dispatch(&mut self, ctx: &Context, cmd: &str, argv: Vec<String>) -> Result<()>;

    /// Pid of the most recently launched child, foreground or background
    fn last_child_pid(&self) -> Option<Pid>;

    /// Background jobs currently tracked, in table order
    fn background_jobs(&self) -> Vec<JobSummary>;
}

/// Type alias for builtin command function signature
/// All builtin commands must conform to this signature
pub type BuiltinCommand =
    fn(ctx: &Context, argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus;

/// Global registry of all builtin commands
pub static BUILTIN_COMMAND: Lazy<HashMap<&'static str, BuiltinCommand>> = Lazy::new(|| {
    let mut builtin = HashMap::new();

    builtin.insert("exit", exit as BuiltinCommand);
    builtin.insert("pid", pid::command as BuiltinCommand);

    // Job tracking
    builtin.insert("jobs", jobs::command as BuiltinCommand);
    builtin.insert("wait", wait::command as BuiltinCommand);

    builtin
});

/// Retrieves a builtin command function by name
/// Returns None if the command is not found
pub fn get_command(name: &str) -> Option<BuiltinCommand> {
    BUILTIN_COMMAND.get(name).copied()
}

/// Built-in exit command implementation.
/// Background jobs are left running; they are not waited for.
pub fn exit(_ctx: &Context, _argv: Vec<String>, proxy: &mut dyn ShellProxy) -> ExitStatus {
    debug!("Exit command called - initiating normal shell exit");
    proxy.exit_shell();
    ExitStatus::ExitedWith(0)
}
