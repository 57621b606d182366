//! Error types for the dependency injection container.

use thiserror::Error;

use crate::validation::ValidationReport;

/// Dependency injection errors.
///
/// Every failure during registration, build, resolution, or disposal surfaces
/// as one of these variants and propagates synchronously to the caller of the
/// triggering operation. The only swallowed failures are destroy-hook errors
/// during disposal, which are logged and do not stop the remaining instances
/// from being disposed.
///
/// # Examples
///
/// ```rust
/// use anvil_di::{DiError, ServiceCollection, Token};
///
/// # tokio_test::block_on(async {
/// let provider = ServiceCollection::new().build();
/// let err = provider
///     .get_required_service(Token::named("missing"))
///     .await
///     .unwrap_err();
/// assert!(matches!(err, DiError::NotRegistered(_)));
/// # });
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Required resolution has no matching descriptor
    #[error("no service registered for {0}")]
    NotRegistered(String),
    /// Operation attempted on a provider that was already disposed
    #[error("provider has been disposed")]
    DisposedProviderUse,
    /// Descriptor declares none (or more than one) of implementation/factory/value
    #[error("invalid descriptor for {token}: {reason}")]
    InvalidDescriptor {
        /// Token the descriptor was being built for
        token: String,
        /// What the descriptor got wrong
        reason: &'static str,
    },
    /// Scoped service resolved from the root, or a scoped dependency injected
    /// into a root-resolved descriptor, while scope validation is enabled
    #[error("scope violation: {0}")]
    ScopeViolation(String),
    /// A descriptor identity is on the resolution stack without a recorded
    /// placeholder. Internal invariant breach, distinct from ordinary
    /// user-level cycles, which the placeholder protocol handles transparently.
    #[error("{0} is on the resolution stack without a partial instance")]
    CircularStructural(String),
    /// Build-time validation collected missing-dependency edges
    #[error("{0}")]
    Validation(ValidationReport),
    /// Resolved instance could not be downcast to the requested type
    #[error("type mismatch for {0}")]
    TypeMismatch(&'static str),
    /// A service reference was read while its instance was still under
    /// construction (only reachable from inside a circular construction)
    #[error("{0} is still under construction")]
    NotReady(&'static str),
    /// A user constructor, factory, or initializer reported a failure
    #[error("construction of {token} failed: {message}")]
    Construction {
        /// Token of the failing descriptor
        token: String,
        /// Failure description supplied by the construction step
        message: String,
    },
}

impl DiError {
    /// Wraps an application-level failure raised inside a constructor,
    /// factory, or initialize hook.
    pub fn construction(token: impl Into<String>, message: impl Into<String>) -> Self {
        DiError::Construction {
            token: token.into(),
            message: message.into(),
        }
    }
}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
