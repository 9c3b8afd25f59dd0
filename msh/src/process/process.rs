use msh_types::{MshError, MshResult};
use nix::errno::Errno;
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::unistd::execvp;
use std::ffi::CString;

/// Exit status of a child whose program could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit status of a child whose program was found but could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// An external command ready to be executed in a forked child.
///
/// The argument vector is converted up front so that nothing in the child
/// has to allocate or can fail before `execvp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub(crate) cmd: String,
    pub(crate) argv: Vec<CString>,
}

impl Process {
    pub fn new(argv: &[String]) -> MshResult<Self> {
        let cmd = argv
            .first()
            .cloned()
            .ok_or_else(|| MshError::InvalidArgument("empty command".to_string()))?;
        let argv = argv
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| {
                    MshError::InvalidArgument(format!("{arg:?} contains a NUL byte"))
                })
            })
            .collect::<MshResult<Vec<CString>>>()?;
        Ok(Process { cmd, argv })
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    /// Resets inherited signal dispositions in the child.
    ///
    /// Background children keep SIGINT/SIGQUIT ignored, as they would under a shell
    /// without job control, so a terminal interrupt only reaches the foreground.
    /// SIGPIPE is ignored by the Rust runtime at startup and goes back to default
    /// for every child.
    fn set_signals(&self, foreground: bool) {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
        let interrupt = if foreground { &default } else { &ignore };
        unsafe {
            let _ = sigaction(Signal::SIGINT, interrupt);
            let _ = sigaction(Signal::SIGQUIT, interrupt);
            let _ = sigaction(Signal::SIGPIPE, &default);
        }
    }

    /// Replaces the current (child) process image. Never returns: on failure the
    /// error is reported on stderr and the child exits non-zero.
    pub fn exec(&self, foreground: bool) -> ! {
        self.set_signals(foreground);

        let err = match execvp(&self.argv[0], &self.argv) {
            Ok(never) => match never {},
            Err(err) => err,
        };
        let (code, message) = exec_failure(&self.cmd, err);
        eprintln!("{message}");
        // _exit: the parent's buffered stdio must not be flushed a second time
        unsafe { libc::_exit(code) }
    }
}

/// Exit status and message of a child whose `execvp` failed with `err`.
fn exec_failure(cmd: &str, err: Errno) -> (i32, String) {
    match err {
        Errno::ENOENT => (EXIT_NOT_FOUND, format!("msh: {cmd}: command not found")),
        source => {
            let err = MshError::Exec {
                cmd: cmd.to_string(),
                source,
            };
            (EXIT_NOT_EXECUTABLE, format!("msh: {err}"))
        }
    }
}
