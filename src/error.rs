//! Error types for gfakit

use std::fmt;

use thiserror::Error;

/// Result type alias for gfakit operations
pub type Result<T> = std::result::Result<T, GfaError>;

/// The kind of a [`GfaError`], independent of any context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    Type,
    Value,
    Version,
    NotUnique,
    NotFound,
    Inconsistency,
    Runtime,
    Argument,
    Assertion,
    Io,
    Json,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Format => "format",
            ErrorKind::Type => "type",
            ErrorKind::Value => "value",
            ErrorKind::Version => "version",
            ErrorKind::NotUnique => "not-unique",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Inconsistency => "inconsistency",
            ErrorKind::Runtime => "runtime",
            ErrorKind::Argument => "argument",
            ErrorKind::Assertion => "assertion",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
        };
        f.write_str(name)
    }
}

/// Main error type for gfakit
#[derive(Error, Debug)]
pub enum GfaError {
    /// A string does not follow the grammar of its datatype, or a line
    /// has the wrong shape
    #[error("format error: {0}")]
    Format(String),

    /// A value has the wrong type for its datatype, or the datatype is unknown
    #[error("type error: {0}")]
    Type(String),

    /// Syntactically valid content that is out of range
    #[error("value error: {0}")]
    Value(String),

    /// Content valid only for the other GFA version
    #[error("version error: {0}")]
    Version(String),

    /// A name or unique key is already used by a non-virtual line
    #[error("not unique: {0}")]
    NotUnique(String),

    /// A required field, tag or line is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Two pieces of information contradict each other
    #[error("inconsistency: {0}")]
    Inconsistency(String),

    /// The operation is not allowed in the current state
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Malformed argument combination
    #[error("argument error: {0}")]
    Argument(String),

    /// An internal invariant was violated
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error raised while reading a given input line
    #[error("GFA parse error at line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<GfaError>,
    },
}

impl GfaError {
    /// Kind of the underlying error, looking through line-number context.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GfaError::Format(_) => ErrorKind::Format,
            GfaError::Type(_) => ErrorKind::Type,
            GfaError::Value(_) => ErrorKind::Value,
            GfaError::Version(_) => ErrorKind::Version,
            GfaError::NotUnique(_) => ErrorKind::NotUnique,
            GfaError::NotFound(_) => ErrorKind::NotFound,
            GfaError::Inconsistency(_) => ErrorKind::Inconsistency,
            GfaError::Runtime(_) => ErrorKind::Runtime,
            GfaError::Argument(_) => ErrorKind::Argument,
            GfaError::Assertion(_) => ErrorKind::Assertion,
            GfaError::Io(_) => ErrorKind::Io,
            GfaError::Json(_) => ErrorKind::Json,
            GfaError::AtLine { source, .. } => source.kind(),
        }
    }

    /// Prefix the message with `context`, keeping the error kind.
    ///
    /// IO and JSON errors are returned unchanged.
    pub fn context(self, context: impl fmt::Display) -> Self {
        let wrap = |msg: String| format!("{}: {}", context, msg);
        match self {
            GfaError::Format(m) => GfaError::Format(wrap(m)),
            GfaError::Type(m) => GfaError::Type(wrap(m)),
            GfaError::Value(m) => GfaError::Value(wrap(m)),
            GfaError::Version(m) => GfaError::Version(wrap(m)),
            GfaError::NotUnique(m) => GfaError::NotUnique(wrap(m)),
            GfaError::NotFound(m) => GfaError::NotFound(wrap(m)),
            GfaError::Inconsistency(m) => GfaError::Inconsistency(wrap(m)),
            GfaError::Runtime(m) => GfaError::Runtime(wrap(m)),
            GfaError::Argument(m) => GfaError::Argument(wrap(m)),
            GfaError::Assertion(m) => GfaError::Assertion(wrap(m)),
            GfaError::AtLine { line, source } => GfaError::AtLine {
                line,
                source: Box::new(source.context(context)),
            },
            other => other,
        }
    }

    /// Attach a 1-based input line number.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            GfaError::AtLine { .. } => self,
            other => GfaError::AtLine {
                line,
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_sees_through_line_context() {
        let err = GfaError::NotUnique("segment 1".to_string()).at_line(7);
        assert_eq!(err.kind(), ErrorKind::NotUnique);
        assert_eq!(
            err.to_string(),
            "GFA parse error at line 7: not unique: segment 1"
        );
    }

    #[test]
    fn test_context_keeps_kind() {
        let err = GfaError::Format("bad".to_string()).context("field 'sequence'");
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(err.to_string(), "format error: field 'sequence': bad");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GfaError = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
