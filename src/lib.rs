pub mod config;
pub mod error;
pub mod fixture;
pub mod formatter;
pub mod mismatch;
pub mod reporter;

pub use error::FormatError;
pub use fixture::{FormatFixture, Verdict};
pub use formatter::{CommandFormatter, Fallible, Formatter};
pub use mismatch::AssertionMismatch;
pub use reporter::{AssertionReporter, PanicReporter, RecordingReporter};

/// Asserts that `formatter` returns `input` unchanged, failing the current
/// test otherwise.
///
/// # Examples
///
/// ```rust
/// let identity = |s: &str| s.to_string();
/// fmtcheck::assert_format(identity, "fn main() {}\n").unwrap();
/// ```
///
/// # Errors
///
/// Returns the formatter's own error if formatting fails.
pub fn assert_format<F: Formatter>(formatter: F, input: &str) -> Result<(), FormatError> {
    FormatFixture::new(formatter).assert_format(input)
}
