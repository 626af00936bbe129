//! Parsing options for document extraction.

/// Default exclusive upper bound for publication years.
pub const DEFAULT_YEAR_LIMIT: u16 = 2030;

/// Options for controlling document parsing behavior.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Documents whose publication year is not strictly below this are rejected.
    pub year_limit: u16,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            year_limit: DEFAULT_YEAR_LIMIT,
        }
    }
}

impl ParseOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exclusive year limit.
    pub fn with_year_limit(mut self, limit: u16) -> Self {
        self.year_limit = limit;
        self
    }
}

/// How to handle per-document and per-archive errors during a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Abort the run on the first failure.
    Strict,
    /// Log and skip failing documents and archives.
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::new();
        assert_eq!(options.year_limit, 2030);
        assert_eq!(ErrorMode::default(), ErrorMode::Lenient);
    }

    #[test]
    fn test_year_limit_builder() {
        let options = ParseOptions::default().with_year_limit(1950);
        assert_eq!(options.year_limit, 1950);
    }
}
