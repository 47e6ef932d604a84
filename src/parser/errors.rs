//! Parser error types
//!
//! Error codes:
//! - SHARDCOST_PARSE_ERROR (REJECT)
//!
//! A parse error aborts planning of that query only.

use std::fmt;

/// Severity levels for parser errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The query is rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Parser error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorCode {
    /// Query text outside the supported grammar
    ParseError,
}

impl ParseErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ParseErrorCode::ParseError => "SHARDCOST_PARSE_ERROR",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error raised while tokenizing or parsing a query
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    code: ParseErrorCode,
    message: String,
    /// Byte offset into the query text, if known
    offset: Option<usize>,
}

impl ParseError {
    fn new(message: impl Into<String>, offset: Option<usize>) -> Self {
        Self {
            code: ParseErrorCode::ParseError,
            message: message.into(),
            offset,
        }
    }

    /// Query is empty or whitespace only
    pub fn empty_query() -> Self {
        Self::new("Query text is empty", None)
    }

    /// A token other than the expected one was found
    pub fn unexpected_token(expected: &str, found: &str, offset: usize) -> Self {
        Self::new(
            format!("Expected {} but found {}", expected, found),
            Some(offset),
        )
    }

    /// A character that starts no token
    pub fn unexpected_character(ch: char, offset: usize) -> Self {
        Self::new(format!("Unexpected character '{}'", ch), Some(offset))
    }

    /// A string literal without closing quote
    pub fn unterminated_string(offset: usize) -> Self {
        Self::new("Unterminated string literal", Some(offset))
    }

    /// A qualifier that names neither collection nor alias
    pub fn unknown_alias(alias: &str) -> Self {
        Self::new(format!("Unknown collection alias '{}'", alias), None)
    }

    /// Join condition that does not relate the two joined collections
    pub fn invalid_join(reason: impl Into<String>) -> Self {
        Self::new(reason, None)
    }

    pub fn code(&self) -> ParseErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(offset) = self.offset {
            write!(f, " (at offset {})", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_with_offset() {
        let err = ParseError::unexpected_token("FROM", "end of input", 17);
        let display = format!("{}", err);
        assert!(display.contains("SHARDCOST_PARSE_ERROR"));
        assert!(display.contains("FROM"));
        assert!(display.contains("offset 17"));
    }

    #[test]
    fn test_error_display_without_offset() {
        let display = format!("{}", ParseError::unknown_alias("x"));
        assert!(!display.contains("offset"));
        assert!(display.contains("'x'"));
    }
}
