//! Unified error interface for Trellis.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that
//! callers embedding the container can branch on stable machine codes
//! instead of display strings.
//!
//! # Code Convention
//!
//! - UPPER_SNAKE_CASE, prefixed with the owning layer
//!   (`GRAPH_`, `CONTEXT_`, `RESOLVE_`, `INTERCEPT_`, `CONTAINER_`)
//! - Stable once published (API contract)
//!
//! # Example
//!
//! ```
//! use trellis_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     Unsatisfied(String),
//!     Ambiguous(String),
//! }
//!
//! impl ErrorCode for LookupError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Unsatisfied(_) => "RESOLVE_UNSATISFIED",
//!             Self::Ambiguous(_) => "RESOLVE_AMBIGUOUS",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         false
//!     }
//! }
//!
//! assert_eq!(LookupError::Ambiguous("Svc".into()).code(), "RESOLVE_AMBIGUOUS");
//! ```

/// Unified error code interface.
///
/// # Recoverability
///
/// An error is recoverable when retrying the operation can succeed
/// after the caller changes some runtime state — e.g., resolving a
/// request-scoped bean fails with `CONTEXT_NOT_ACTIVE`, the caller
/// activates the request context, and the retry succeeds. Errors that
/// require a metadata-graph or code change (unknown binding type,
/// ambiguous resolution) are not recoverable.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    ///
    /// UPPER_SNAKE_CASE, layer-prefixed, stable across versions.
    fn code(&self) -> &'static str;

    /// Returns whether retrying after a state change can succeed.
    fn is_recoverable(&self) -> bool;
}

/// Validates that an error code follows workspace conventions.
///
/// # Checks
///
/// 1. Non-empty
/// 2. Starts with the expected layer prefix
/// 3. UPPER_SNAKE_CASE
///
/// # Panics
///
/// Panics with a descriptive message if any check fails. Intended for
/// use in tests covering every variant of an error enum.
///
/// # Example
///
/// ```
/// use trellis_types::{ErrorCode, assert_error_code};
///
/// #[derive(Debug)]
/// struct Stopped;
///
/// impl ErrorCode for Stopped {
///     fn code(&self) -> &'static str { "CONTAINER_STOPPED" }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_code(&Stopped, "CONTAINER_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Validates every error in `errors` with [`assert_error_code`].
///
/// Use with a list of all variants of an error enum so a newly added
/// variant cannot slip in with a malformed code.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

/// Checks if a string is UPPER_SNAKE_CASE.
fn is_upper_snake_case(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
