use nix::sys::signal::Signal;

/// How a child terminated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ProcessState {
    /// Exit code, or 128 + signal number when killed.
    code: u8,
    signal: Option<Signal>,
}

impl ProcessState {
    pub fn exited(code: i32) -> Self {
        ProcessState {
            code: code as u8,
            signal: None,
        }
    }

    pub fn signaled(signal: Signal) -> Self {
        ProcessState {
            code: (128 + signal as i32) as u8,
            signal: Some(signal),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.code
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.signal {
            Some(Signal::SIGKILL) => formatter.write_str("killed"),
            Some(Signal::SIGTERM) => formatter.write_str("terminated"),
            _ => formatter.write_str("done"),
        }
    }
}
