// ABOUTME: Error types for the unnested transformer including ErrorCode enum and TransformError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of transform failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// A CSS selector in the markup adapter failed to compile.
    Selector,
    /// The page markup did not match the expected structural contract.
    Structure,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Selector => "selector error",
            ErrorCode::Structure => "structure mismatch",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for transform operations.
///
/// Comment-data extraction never produces one of these; a missing author link
/// or contents region degrades to the `[deleted]` sentinel instead. Structural
/// faults terminate the current update pass; the next pass retries from scratch.
#[derive(Debug, thiserror::Error)]
pub struct TransformError {
    pub code: ErrorCode,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unnested: {}: {}", self.op, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl TransformError {
    /// Create a Selector error.
    pub fn selector(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Selector,
            op: op.into(),
            source,
        }
    }

    /// Create a Structure error.
    pub fn structure(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code: ErrorCode::Structure,
            op: op.into(),
            source,
        }
    }

    /// Returns true if this is a Selector error.
    pub fn is_selector(&self) -> bool {
        self.code == ErrorCode::Selector
    }

    /// Returns true if this is a Structure error.
    pub fn is_structure(&self) -> bool {
        self.code == ErrorCode::Structure
    }
}
