use std::borrow::Cow;

use crate::error::FormatError;
use crate::formatter::Formatter;
use crate::mismatch::AssertionMismatch;
use crate::reporter::{AssertionReporter, PanicReporter};

/// Result of comparing formatter output against its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Unchanged,
    Changed(AssertionMismatch),
}

impl Verdict {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Verdict::Unchanged)
    }
}

/// Asserts that a formatter leaves already-formatted text alone.
///
/// The formatter and the reporter are both injected. Mismatches go to the
/// reporter; errors raised by the formatter are returned to the caller
/// untouched.
///
/// ```rust
/// use fmtcheck::FormatFixture;
///
/// let trim = |s: &str| format!("{}\n", s.trim_end());
/// let mut fixture = FormatFixture::new(trim);
/// fixture.assert_format("let x = 1;\n").unwrap();
/// ```
pub struct FormatFixture<F, R = PanicReporter> {
    formatter: F,
    reporter: R,
    normalize_line_endings: bool,
}

impl<F: Formatter> FormatFixture<F, PanicReporter> {
    /// Fixture that fails the current test on the first mismatch.
    pub fn new(formatter: F) -> Self {
        Self::with_reporter(formatter, PanicReporter)
    }
}

impl<F: Formatter, R: AssertionReporter> FormatFixture<F, R> {
    pub fn with_reporter(formatter: F, reporter: R) -> Self {
        Self {
            formatter,
            reporter,
            normalize_line_endings: false,
        }
    }

    /// Compare with `\r\n` folded to `\n` on both sides. Off by default, so
    /// comparisons are exact.
    pub fn normalize_line_endings(mut self, normalize: bool) -> Self {
        self.normalize_line_endings = normalize;
        self
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    /// Formats `input` and compares the result with `input`, without
    /// reporting anything.
    pub fn check(&self, input: &str) -> Result<Verdict, FormatError> {
        let actual = self.formatter.format_all(input)?;
        Ok(self.compare(&actual, input))
    }

    /// Passes when formatting `input` returns it unchanged.
    pub fn assert_format(&mut self, input: &str) -> Result<(), FormatError> {
        log::debug!("Asserting format of {} bytes", input.len());
        let actual = self.formatter.format_all(input)?;
        self.report(&actual, input);
        Ok(())
    }

    /// Passes when formatting `input` yields exactly `expected`.
    pub fn assert_format_to(&mut self, input: &str, expected: &str) -> Result<(), FormatError> {
        log::debug!(
            "Asserting format of {} bytes against {} expected bytes",
            input.len(),
            expected.len()
        );
        let actual = self.formatter.format_all(input)?;
        self.report(&actual, expected);
        Ok(())
    }

    /// Passes when the formatter's output is a fixed point: formatting it a
    /// second time changes nothing. `input` itself need not be formatted.
    pub fn assert_idempotent(&mut self, input: &str) -> Result<(), FormatError> {
        log::debug!("Asserting idempotence on {} bytes", input.len());
        let once = self.formatter.format_all(input)?;
        let twice = self.formatter.format_all(&once)?;
        self.report(&twice, &once);
        Ok(())
    }

    fn report(&mut self, actual: &str, expected: &str) {
        let actual = self.normalize(actual);
        let expected = self.normalize(expected);
        self.reporter.assert_equal(&actual, &expected);
    }

    fn compare(&self, actual: &str, expected: &str) -> Verdict {
        let actual = self.normalize(actual);
        let expected = self.normalize(expected);
        if actual == expected {
            Verdict::Unchanged
        } else {
            Verdict::Changed(AssertionMismatch::new(actual, expected))
        }
    }

    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.normalize_line_endings && text.contains("\r\n") {
            Cow::Owned(text.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(text)
        }
    }
}
