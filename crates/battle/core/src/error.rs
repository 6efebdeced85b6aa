//! Common error infrastructure for battle-core.
//!
//! This module provides shared types and traits used across all error types in
//! battle-core. Domain-specific errors (e.g. `PipelineError`, `ReplayError`)
//! are defined alongside the operations that raise them.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each stage has its own error type with specific variants
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **Terminal per action**: No error is retried; a failed action never blocks
//!   the actions after it

/// Severity level of an error, used for categorization and logging priority.
///
/// - **Recoverable**: The action failed but the battle continues normally
/// - **Validation**: Invalid input (unknown caster, malformed payload)
/// - **Internal**: Unexpected state inconsistency that requires investigation
/// - **Fatal**: The peer's battle state can no longer be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the action is dropped, the battle goes on.
    ///
    /// Examples: caster already dead, ability not learned
    Recoverable,

    /// Validation error - invalid input, should not be retried unchanged.
    ///
    /// Examples: unknown caster, descriptor pointing at an empty slot
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: status store at capacity, ability table missing an entry
    Internal,

    /// Fatal error - peers have diverged.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug or divergence.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for log filtering and for asserting on failures in tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
