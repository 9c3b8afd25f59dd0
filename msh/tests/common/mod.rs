#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

use tempfile::TempDir;

/// Isolated XDG directories so a user's own config or log never leaks in.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox {
            dir: TempDir::new().expect("create sandbox dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_msh"));
        cmd.env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("XDG_CACHE_HOME", self.path().join("cache"))
            .env_remove("MSH_LOG_STDERR")
            .env("MSH_LOG", "debug");
        cmd
    }

    pub fn write_config(&self, contents: &str) -> std::path::PathBuf {
        let path = self.path().join("msh.toml");
        std::fs::write(&path, contents).expect("write config");
        path
    }

    pub fn spawn(&self, args: &[&str]) -> Child {
        self.command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to execute msh")
    }
}

/// Feeds `script` to an interactive msh on stdin and collects everything it printed.
pub fn run_script_with(sandbox: &Sandbox, args: &[&str], script: &str) -> Output {
    let mut cmd = sandbox.command();
    cmd.args(args);
    run_script_in(cmd, script)
}

/// Like `run_script_with`, for a command whose environment the caller adjusted.
pub fn run_script_in(mut cmd: Command, script: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to execute msh");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(script.as_bytes())
        .expect("write script");
    child.wait_with_output().expect("wait for msh")
}

pub fn run_script(script: &str) -> Output {
    run_script_with(&Sandbox::new(), &[], script)
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Pids announced by background notices of the form `[<n>] <pid>`.
pub fn started_pids(out: &str) -> Vec<i32> {
    let mut pids = Vec::new();
    for piece in out.split('[').skip(1) {
        let Some((position, rest)) = piece.split_once("] ") else {
            continue;
        };
        if position.parse::<usize>().is_err() {
            continue;
        }
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let after = &rest[digits.len()..];
        // job listings continue with " Running"; notices end the line
        if !digits.is_empty() && (after.is_empty() || after.starts_with('\n')) {
            pids.push(digits.parse().expect("pid"));
        }
    }
    pids
}

/// The `SigIgn` mask from a dump of `/proc/<pid>/status`, which may share its
/// line with a prompt.
pub fn ignored_signals(status: &str) -> u64 {
    let line = status
        .lines()
        .find_map(|line| line.split_once("SigIgn:").map(|(_, mask)| mask))
        .expect("SigIgn line");
    u64::from_str_radix(line.trim(), 16).expect("hex mask")
}

pub fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
