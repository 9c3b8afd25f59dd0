#![allow(clippy::module_inception)]

pub mod fork;
pub mod job;
pub mod process;
pub mod state;
pub mod wait;

pub use job::{Job, JobTable, ReapedJob};
pub use process::Process;
pub use state::ProcessState;
pub use wait::{poll_any_child, wait_any_child, wait_pid_job};
