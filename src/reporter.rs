use crate::mismatch::AssertionMismatch;

/// Records the outcome of comparing formatter output against what was
/// expected.
pub trait AssertionReporter {
    fn assert_equal(&mut self, actual: &str, expected: &str);
}

impl<R: AssertionReporter + ?Sized> AssertionReporter for &mut R {
    fn assert_equal(&mut self, actual: &str, expected: &str) {
        (**self).assert_equal(actual, expected);
    }
}

/// Fails the running test on the first mismatch, with a coloured diff.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanicReporter;

impl AssertionReporter for PanicReporter {
    fn assert_equal(&mut self, actual: &str, expected: &str) {
        similar_asserts::assert_eq!(expected: expected, actual: actual);
    }
}

/// Keeps every mismatch and lets the caller decide what to do with them.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    passed: usize,
    failures: Vec<AssertionMismatch>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failures(&self) -> &[AssertionMismatch] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of passed assertions, or every recorded mismatch.
    pub fn finish(self) -> Result<usize, Vec<AssertionMismatch>> {
        if self.failures.is_empty() {
            Ok(self.passed)
        } else {
            Err(self.failures)
        }
    }
}

impl AssertionReporter for RecordingReporter {
    fn assert_equal(&mut self, actual: &str, expected: &str) {
        if actual == expected {
            self.passed += 1;
        } else {
            log::debug!("Recorded mismatch #{}", self.failures.len() + 1);
            self.failures.push(AssertionMismatch::new(actual, expected));
        }
    }
}
