//! Splits an input line into an argument vector and a background flag.
//!
//! Tokens are separated by spaces and horizontal tabs only. There is no quoting,
//! escaping or expansion; a trailing `&` token requests background execution.

use msh_types::{MshError, MshResult};

const DELIMITERS: [char; 2] = [' ', '\t'];
const BACKGROUND_TOKEN: &str = "&";

pub const DEFAULT_MAX_LINE_LEN: usize = 256;
pub const DEFAULT_MAX_ARGS: usize = 32;

/// Input bounds enforced before a line is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_line_len: usize,
    pub max_args: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_args: DEFAULT_MAX_ARGS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub argv: Vec<String>,
    pub background: bool,
}

impl ParsedLine {
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// The command line as it will be shown in job listings.
    pub fn cmdline(&self) -> String {
        self.argv.join(" ")
    }
}

pub fn parse_line(line: &str, limits: &Limits) -> MshResult<ParsedLine> {
    let len = line.chars().count();
    if len > limits.max_line_len {
        return Err(MshError::LineTooLong {
            len,
            max: limits.max_line_len,
        });
    }

    let mut argv: Vec<String> = line
        .split(DELIMITERS)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    let background = argv.last().is_some_and(|t| t == BACKGROUND_TOKEN);
    if background {
        argv.pop();
    }

    if argv.len() > limits.max_args {
        return Err(MshError::TooManyArguments {
            count: argv.len(),
            max: limits.max_args,
        });
    }

    Ok(ParsedLine { argv, background })
}
