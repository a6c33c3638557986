use std::fmt;

/// A formatter produced text that differs from what the assertion expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionMismatch {
    pub actual: String,
    pub expected: String,
}

impl AssertionMismatch {
    pub fn new(actual: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            actual: actual.into(),
            expected: expected.into(),
        }
    }

    /// Line diff from `expected` to `actual`, `-` for expected-only lines and
    /// `+` for lines the formatter produced.
    pub fn diff(&self) -> String {
        let mut lines = diff::lines(&self.expected, &self.actual);
        // Both sides ending in a newline leave an empty shared last line.
        if let Some(diff::Result::Both("", "")) = lines.last() {
            lines.pop();
        }
        lines
            .into_iter()
            .map(|d| match d {
                diff::Result::Left(l) => format!("-{l}"),
                diff::Result::Right(r) => format!("+{r}"),
                diff::Result::Both(b, _) => format!(" {b}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for AssertionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "formatted output differs from expected")?;
        writeln!(f, "expected: {:?}", self.expected)?;
        writeln!(f, "actual:   {:?}", self.actual)?;
        write!(f, "diff:\n{}", self.diff())
    }
}

impl std::error::Error for AssertionMismatch {}
