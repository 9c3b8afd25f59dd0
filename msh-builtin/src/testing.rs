use crate::{JobSummary, ShellProxy};
use anyhow::Result;
use msh_types::Context;
use nix::unistd::{Pid, close, getpid, pipe};
use std::fs::File;
use std::io::Read;
use std::os::unix::io::FromRawFd;

#[derive(Default)]
pub struct MockProxy {
    pub exited: bool,
    pub last_child: Option<Pid>,
    pub jobs: Vec<JobSummary>,
    pub dispatched: Vec<(String, Vec<String>)>,
}

impl MockProxy {
    pub fn with_jobs(jobs: &[(i32, &str)]) -> Self {
        let jobs = jobs
            .iter()
            .enumerate()
            .map(|(i, (pid, cmd))| JobSummary {
                position: i + 1,
                pid: Pid::from_raw(*pid),
                cmd: cmd.to_string(),
            })
            .collect();
        MockProxy {
            jobs,
            ..Default::default()
        }
    }
}

impl ShellProxy for MockProxy {
    fn exit_shell(&mut self) {
        self.exited = true;
    }

    fn dispatch(&mut self, ctx: &Context, cmd: &str, argv: Vec<String>) -> Result<()> {
        self.dispatched.push((cmd.to_string(), argv));
        if cmd == "wait" {
            for job in self.jobs.drain(..) {
                ctx.write_stdout(&format!("Process {} finished", job.pid))?;
            }
        }
        Ok(())
    }

    fn last_child_pid(&self) -> Option<Pid> {
        self.last_child
    }

    fn background_jobs(&self) -> Vec<JobSummary> {
        self.jobs.clone()
    }
}

fn drain(fd: i32) -> String {
    let mut file = unsafe { File::from_raw_fd(fd) };
    let mut buf = String::new();
    file.read_to_string(&mut buf).unwrap();
    buf
}

/// Runs `f` with a context whose stdout/stderr are pipes and returns what was written.
pub fn capture<T>(f: impl FnOnce(&Context) -> T) -> (T, String, String) {
    let (out_rd, out_wr) = pipe().unwrap();
    let (err_rd, err_wr) = pipe().unwrap();
    let ctx = Context::with_output(getpid(), out_wr, err_wr);
    let res = f(&ctx);
    close(out_wr).unwrap();
    close(err_wr).unwrap();
    (res, drain(out_rd), drain(err_rd))
}
