use std::ffi::OsString;
use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use crate::error::FormatError;

/// Something that canonically reformats source text.
///
/// Every `Fn(&str) -> String` is a formatter, so plain functions and closures
/// can be handed to a fixture directly.
pub trait Formatter {
    fn format_all(&self, text: &str) -> Result<String, FormatError>;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> String,
{
    fn format_all(&self, text: &str) -> Result<String, FormatError> {
        Ok(self(text))
    }
}

/// Adapts a formatter function that can fail.
pub struct Fallible<F>(pub F);

impl<F, E> Formatter for Fallible<F>
where
    F: Fn(&str) -> Result<String, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn format_all(&self, text: &str) -> Result<String, FormatError> {
        (self.0)(text).map_err(|e| FormatError::Failed(e.into()))
    }
}

/// Runs an external program that reads source on stdin and writes the
/// formatted result to stdout, e.g. `rustfmt --emit stdout`.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Builds a formatter from `[program, args...]`; `None` when empty.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut iter = argv.into_iter();
        let program = iter.next()?;
        Some(Self::new(program).args(iter))
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Formatter for CommandFormatter {
    fn format_all(&self, text: &str) -> Result<String, FormatError> {
        log::trace!(
            "Running formatter {:?} {:?} on {} bytes",
            self.program,
            self.args,
            text.len()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FormatError::Spawn {
                program: self.program_name(),
                source,
            })?;

        // Feed stdin from another thread so a child that writes before it has
        // read all of its input cannot block on a full stdout pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.to_owned();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output()?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Ok(())) => {}
                // The child may exit without reading everything; its exit
                // status below is what matters then.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    return Err(std::io::Error::other("stdin writer thread panicked").into());
                }
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(match output.status.code() {
                Some(code) => {
                    log::debug!("Formatter {:?} exited with code {code}", self.program);
                    FormatError::Exit {
                        program: self.program_name(),
                        code,
                        stderr,
                    }
                }
                None => {
                    let signal = terminating_signal(&output.status);
                    log::debug!("Formatter {:?} terminated by signal {signal:?}", self.program);
                    FormatError::Terminated {
                        program: self.program_name(),
                        signal,
                    }
                }
            });
        }

        String::from_utf8(output.stdout).map_err(|_| FormatError::NotUtf8 {
            program: self.program_name(),
        })
    }
}

#[cfg(unix)]
fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_formatters() {
        let upper = |s: &str| s.to_uppercase();
        assert_eq!(upper.format_all("abc").unwrap(), "ABC");
    }

    #[test]
    fn fallible_errors_are_wrapped() {
        let f = Fallible(|s: &str| -> Result<String, String> {
            if s.is_empty() {
                Err("empty input".to_string())
            } else {
                Ok(s.to_string())
            }
        });
        assert_eq!(f.format_all("x").unwrap(), "x");
        let err = f.format_all("").unwrap_err();
        assert!(matches!(err, FormatError::Failed(_)));
        assert_eq!(err.to_string(), "formatter failed: empty input");
    }

    #[test]
    fn from_argv_requires_a_program() {
        assert!(CommandFormatter::from_argv(Vec::<String>::new()).is_none());
        let cmd = CommandFormatter::from_argv(["rustfmt", "--emit", "stdout"]).unwrap();
        assert_eq!(cmd.program, OsString::from("rustfmt"));
        assert_eq!(cmd.args.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn command_pipes_through_program() {
        let cat = CommandFormatter::new("cat");
        assert_eq!(cat.format_all("fn main() {}\n").unwrap(), "fn main() {}\n");

        let upper = CommandFormatter::new("tr").args(["a-z", "A-Z"]);
        assert_eq!(upper.format_all("abc\n").unwrap(), "ABC\n");
    }

    #[cfg(unix)]
    #[test]
    fn command_failure_reports_exit_code() {
        let failing = CommandFormatter::new("sh").args(["-c", "echo broken >&2; exit 3"]);
        match failing.format_all("x") {
            Err(FormatError::Exit { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("expected exit error, got {other:?}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let missing = CommandFormatter::new("fmtcheck-no-such-formatter");
        assert!(matches!(
            missing.format_all("x"),
            Err(FormatError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn killed_child_reports_the_signal() {
        let killed = CommandFormatter::new("sh").args(["-c", "kill -9 $$"]);
        let err = killed.format_all("x").unwrap_err();
        match &err {
            FormatError::Terminated { program, signal } => {
                assert_eq!(program, "sh");
                assert_eq!(*signal, Some(9));
            }
            other => panic!("expected termination error, got {other:?}"),
        }
        assert!(!err.to_string().contains("code"));
        assert!(err.to_string().contains("signal 9"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_output_is_rejected() {
        let invalid = CommandFormatter::new("printf").arg("\\377");
        match invalid.format_all("") {
            Err(FormatError::NotUtf8 { program }) => assert_eq!(program, "printf"),
            other => panic!("expected non-UTF-8 error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn large_output_does_not_block() {
        let line = "let value = some_function(argument_one, argument_two);\n";
        let input = line.repeat(200_000);
        assert!(input.len() > 8 * 1024 * 1024);

        let output = CommandFormatter::new("cat").format_all(&input).unwrap();
        assert_eq!(output.len(), input.len());
        assert!(output == input);
    }

    #[cfg(unix)]
    #[test]
    fn child_ignoring_stdin_is_not_an_error() {
        let input = "x".repeat(5 * 1024 * 1024);
        let output = CommandFormatter::new("true").format_all(&input).unwrap();
        assert_eq!(output, "");
    }
}
