//! Builtin handlers that run against the shell's own state.

pub mod wait;
