//! Errors raised by formatters

use std::io;

/// Failure of the formatter itself, as opposed to an assertion mismatch.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// A fallible formatter function returned an error
    #[error("formatter failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The formatter program could not be started
    #[error("failed to run formatter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Piping text to or from the formatter program failed
    #[error("formatter I/O error: {0}")]
    Io(#[from] io::Error),

    /// The formatter program exited unsuccessfully
    #[error("formatter `{program}` exited with code {code}{}", render_stderr(.stderr))]
    Exit {
        program: String,
        code: i32,
        stderr: String,
    },

    /// The formatter program was killed before it could exit
    #[error("formatter `{program}` was terminated{}", render_signal(.signal))]
    Terminated {
        program: String,
        signal: Option<i32>,
    },

    /// The formatter program wrote something that is not UTF-8
    #[error("formatter `{program}` produced non-UTF-8 output")]
    NotUtf8 { program: String },
}

fn render_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

fn render_signal(signal: &Option<i32>) -> String {
    match signal {
        Some(n) => format!(" by signal {n}"),
        None => String::new(),
    }
}
