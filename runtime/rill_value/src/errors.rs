//! Structured runtime errors for the value model.
//!
//! Every failure the coercion engine or a variant can produce is a typed
//! [`ErrorKind`], never a bare string or a panic — this is what lets the
//! quiet (non-fail-fast) mode turn failures into ERROR-variant values that
//! calling code can branch on.
//!
//! Factory functions (e.g. [`invalid_cast`]) are the public construction
//! API; they populate both the kind and a rendered message.


use thiserror::Error;

use crate::value::Type;

/// Result of any uniform-contract operation.
pub type ValueResult = Result<crate::value::Value, ValueError>;

/// Typed error categories.
///
/// `InvalidOperation` covers the per-variant `INVALID_<VARIANT>_OPERATION`
/// family — the variant tag travels in the kind so callers can still match
/// on the specific source type.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// A cast to an unsupported target type.
    InvalidCast { from: Type, to: Type },
    /// An operation the variant does not support.
    InvalidOperation { variant: Type, operation: &'static str },
    /// Collection or string replication beyond the hard cap.
    MultiplierTooLarge { multiplier: i64, cap: i64 },
    /// A string operation would produce an oversized result.
    StringTooLarge { length: usize },
    /// A pattern argument failed to compile.
    BadRegex { pattern: String },
    /// An attempt to overwrite write-once metadata.
    MetadataImmutable { key: &'static str },
    /// Re-constraining with a different fingerprint.
    ConstraintViolation { previous: String, attempted: String },
    /// The reactive evaluation stack exceeded its depth bound.
    RecursionLimit { depth: usize, stack: Vec<String> },
    /// An `assert` (`.:`) failure. Never silenced by quiet mode.
    AssertionFailed { detail: String },
    /// A stateful resource was in the wrong lifecycle state.
    WrongState { detail: String },
    /// An arbitrary host failure, wrapped.
    Exception { detail: String },
}

impl ErrorKind {
    /// Stable uppercase code for diagnostics and the JSON projection.
    pub fn code(&self) -> String {
        match self {
            ErrorKind::InvalidCast { .. } => "INVALID_CAST".to_string(),
            ErrorKind::InvalidOperation { variant, .. } => {
                format!("INVALID_{}_OPERATION", variant.name())
            }
            ErrorKind::MultiplierTooLarge { .. } => "MULTIPLIER_TOO_LARGE".to_string(),
            ErrorKind::StringTooLarge { .. } => "STRING_TOO_LARGE".to_string(),
            ErrorKind::BadRegex { .. } => "BAD_REGEX".to_string(),
            ErrorKind::MetadataImmutable { .. } => "METADATA_IMMUTABLE".to_string(),
            ErrorKind::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION".to_string(),
            ErrorKind::RecursionLimit { .. } => "RECURSION_LIMIT".to_string(),
            ErrorKind::AssertionFailed { .. } => "ASSERTION_FAILED".to_string(),
            ErrorKind::WrongState { .. } => "WRONG_STATE".to_string(),
            ErrorKind::Exception { .. } => "EXCEPTION".to_string(),
        }
    }

    /// Whether quiet mode may convert this into an ERROR-variant value.
    ///
    /// Assertion failures and recursion-limit errors always propagate.
    pub fn quietable(&self) -> bool {
        !matches!(
            self,
            ErrorKind::AssertionFailed { .. } | ErrorKind::RecursionLimit { .. }
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidCast { from, to } => {
                write!(f, "cannot cast {} to {}", from.name(), to.name())
            }
            ErrorKind::InvalidOperation { variant, operation } => {
                write!(f, "{} does not support {operation}", variant.name())
            }
            ErrorKind::MultiplierTooLarge { multiplier, cap } => {
                write!(f, "multiplier {multiplier} exceeds the cap of {cap}")
            }
            ErrorKind::StringTooLarge { length } => {
                write!(f, "string result of {length} characters is too large")
            }
            ErrorKind::BadRegex { pattern } => write!(f, "bad pattern: {pattern}"),
            ErrorKind::MetadataImmutable { key } => {
                write!(f, "metadata key {key} is write-once")
            }
            ErrorKind::ConstraintViolation { previous, attempted } => {
                write!(
                    f,
                    "value already constrained by {previous}, cannot re-constrain with {attempted}"
                )
            }
            ErrorKind::RecursionLimit { depth, .. } => {
                write!(f, "reactive evaluation exceeded {depth} nested invocations")
            }
            ErrorKind::AssertionFailed { detail } => write!(f, "assertion failed: {detail}"),
            ErrorKind::WrongState { detail } => write!(f, "{detail}"),
            ErrorKind::Exception { detail } => write!(f, "{detail}"),
        }
    }
}

/// Where in the source an error originated, when known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source name (file path or REPL chunk label).
    pub source: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// A structured runtime error: kind, rendered message, optional provenance.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct ValueError {
    /// The typed category.
    pub kind: ErrorKind,
    /// Human-readable rendering, pre-built by the factory functions.
    pub message: String,
    /// Source provenance, attached at scope boundaries when available.
    pub location: Option<SourceLocation>,
}

impl ValueError {
    /// Build from a kind, rendering the default message.
    pub fn new(kind: ErrorKind) -> Self {
        let message = kind.to_string();
        ValueError {
            kind,
            message,
            location: None,
        }
    }

    /// Attach a source location.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether quiet mode may absorb this error into an ERROR value.
    pub fn quietable(&self) -> bool {
        self.kind.quietable()
    }
}

// Factory functions — the canonical construction API.

pub fn invalid_cast(from: Type, to: Type) -> ValueError {
    ValueError::new(ErrorKind::InvalidCast { from, to })
}

pub fn invalid_operation(variant: Type, operation: &'static str) -> ValueError {
    ValueError::new(ErrorKind::InvalidOperation { variant, operation })
}

pub fn multiplier_too_large(multiplier: i64, cap: i64) -> ValueError {
    ValueError::new(ErrorKind::MultiplierTooLarge { multiplier, cap })
}

pub fn string_too_large(length: usize) -> ValueError {
    ValueError::new(ErrorKind::StringTooLarge { length })
}

pub fn bad_regex(pattern: impl Into<String>) -> ValueError {
    ValueError::new(ErrorKind::BadRegex {
        pattern: pattern.into(),
    })
}

pub fn metadata_immutable(key: &'static str) -> ValueError {
    ValueError::new(ErrorKind::MetadataImmutable { key })
}

pub fn constraint_violation(previous: impl Into<String>, attempted: impl Into<String>) -> ValueError {
    ValueError::new(ErrorKind::ConstraintViolation {
        previous: previous.into(),
        attempted: attempted.into(),
    })
}

pub fn recursion_limit(depth: usize, stack: Vec<String>) -> ValueError {
    ValueError::new(ErrorKind::RecursionLimit { depth, stack })
}

pub fn assertion_failed(detail: impl Into<String>) -> ValueError {
    ValueError::new(ErrorKind::AssertionFailed {
        detail: detail.into(),
    })
}

pub fn wrong_state(detail: impl Into<String>) -> ValueError {
    ValueError::new(ErrorKind::WrongState {
        detail: detail.into(),
    })
}

pub fn exception(detail: impl Into<String>) -> ValueError {
    ValueError::new(ErrorKind::Exception {
        detail: detail.into(),
    })
}
