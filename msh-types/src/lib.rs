use anyhow::Result;
use libc::{STDERR_FILENO, STDOUT_FILENO};
use nix::unistd::{Pid, isatty};
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::mem;
use std::os::unix::io::FromRawFd;
use std::os::unix::io::RawFd;
use thiserror::Error;
use tracing::warn;

/// Mini shell specific error types
#[derive(Error, Debug)]
pub enum MshError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("fork failed: {0}")]
    Fork(nix::errno::Errno),

    #[error("{cmd}: {source}")]
    Exec {
        cmd: String,
        source: nix::errno::Errno,
    },

    #[error("wait failed: {0}")]
    Wait(nix::errno::Errno),

    #[error("job table full: at most {capacity} background processes")]
    JobTableFull { capacity: usize },

    #[error("process {pid} is already tracked")]
    DuplicateJob { pid: Pid },

    #[error("input line too long: {len} characters (max {max})")]
    LineTooLong { len: usize, max: usize },

    #[error("too many arguments: {count} (max {max})")]
    TooManyArguments { count: usize, max: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type MshResult<T> = std::result::Result<T, MshError>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitStatus {
    ExitedWith(i32),
}

/// Per-invocation view of the shell handed to builtins.
#[derive(Clone)]
pub struct Context {
    pub shell_pid: Pid,
    pub interactive: bool,
    pub outfile: RawFd,
    pub errfile: RawFd,
}

impl Context {
    pub fn new(shell_pid: Pid) -> Self {
        let interactive = match isatty(libc::STDIN_FILENO) {
            Ok(tty) => tty,
            Err(err) => {
                warn!("isatty failed on stdin: {}", err);
                false
            }
        };
        Context {
            shell_pid,
            interactive,
            outfile: STDOUT_FILENO,
            errfile: STDERR_FILENO,
        }
    }

    /// Context writing to the given descriptors instead of the standard streams.
    pub fn with_output(shell_pid: Pid, outfile: RawFd, errfile: RawFd) -> Self {
        Context {
            shell_pid,
            interactive: false,
            outfile,
            errfile,
        }
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        f.debug_struct("Context")
            .field("shell_pid", &self.shell_pid)
            .field("interactive", &self.interactive)
            .field("outfile", &self.outfile)
            .field("errfile", &self.errfile)
            .finish()
    }
}

impl Context {
    pub fn write_stdout(&self, msg: &str) -> Result<()> {
        if self.outfile == STDOUT_FILENO {
            // keep ordering with print! output still sitting in std's buffer
            let mut out = std::io::stdout().lock();
            writeln!(out, "{msg}")?;
            out.flush()?;
            return Ok(());
        }
        let mut file = unsafe { File::from_raw_fd(self.outfile) };
        let res = writeln!(&mut file, "{msg}");
        mem::forget(file);
        res?;
        Ok(())
    }

    pub fn write_stderr(&self, msg: &str) -> Result<()> {
        if self.errfile == STDERR_FILENO {
            eprintln!("{msg}");
            return Ok(());
        }
        let mut file = unsafe { File::from_raw_fd(self.errfile) };
        let res = writeln!(&mut file, "{msg}");
        mem::forget(file);
        res?;
        Ok(())
    }
}
