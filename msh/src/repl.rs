use crate::errors::display_user_error;
use crate::shell::Shell;
use anyhow::Result;
use msh_types::Context;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

pub const SHUTDOWN_BANNER: &str = "Shell terminated!";

pub fn startup_banner(pid: nix::unistd::Pid) -> String {
    format!("Mini-Shell started (PID: {pid})\nType 'exit' to quit\n")
}

/// The interactive read-eval loop.
pub struct Repl<'a> {
    pub shell: &'a mut Shell,
}

impl<'a> Repl<'a> {
    pub fn new(shell: &'a mut Shell) -> Self {
        Repl { shell }
    }

    fn print_prompt(&self) -> Result<()> {
        let mut out = std::io::stdout().lock();
        write!(out, "{}", self.shell.config.prompt)?;
        out.flush()?;
        Ok(())
    }

    /// Reads a line without its line terminator. `None` on end of input.
    ///
    /// Invalid UTF-8 is replaced rather than treated as an error; a read error
    /// ends the session like end of input does.
    fn read_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> Option<String> {
        buf.clear();
        match input.read_until(b'\n', buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(buf);
                Some(line.trim_end_matches(['\n', '\r']).to_string())
            }
            Err(err) => {
                warn!("failed to read input: {}", err);
                None
            }
        }
    }

    pub fn run<R: BufRead>(&mut self, ctx: &Context, mut input: R) -> Result<()> {
        let banner = self.shell.config.banner;
        if banner {
            ctx.write_stdout(&startup_banner(self.shell.pid))?;
        }

        let mut buf = Vec::new();
        loop {
            if let Err(err) = self.shell.reap_finished(ctx) {
                display_user_error(&err);
            }

            self.print_prompt()?;
            let Some(line) = Self::read_line(&mut input, &mut buf) else {
                debug!("end of input");
                break;
            };

            if let Err(err) = self.shell.eval_str(ctx, &line) {
                display_user_error(&err);
            }
            if self.shell.exited.is_some() {
                debug!("exit requested");
                break;
            }
        }

        if banner {
            ctx.write_stdout(SHUTDOWN_BANNER)?;
        }
        Ok(())
    }
}
