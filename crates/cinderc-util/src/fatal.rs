//! Fatal error conditions.
//!
//! The compiler distinguishes exactly two classes of unrecoverable error:
//! structural limits (the input exceeded a fixed resource bound) and
//! internal invariant violations (an upstream phase handed us inconsistent
//! state). Both abort the current translation unit; neither is recovered
//! from. Everything else in the symbol subsystem is total: a lookup that
//! finds nothing returns `None` and lets the caller decide.

use thiserror::Error;

/// An unrecoverable condition for the current translation unit.
///
/// The driver reports these through its diagnostics sink and abandons the
/// unit; no attempt is made to continue with inconsistent state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fatal {
    /// Scope nesting exceeded the supported depth.
    ///
    /// Structural-limit class: the input is at fault, but the condition is
    /// still fatal to the unit.
    #[error("block nesting exceeds the supported depth ({limit})")]
    ScopeDepthExceeded { limit: u32 },

    /// A symbol was removed from the scope index without being linked
    /// into it.
    ///
    /// Internal-error class: signals a defect in an upstream phase.
    #[error("internal error: symbol not present in the scope index")]
    UnlinkedSymbol,

    /// A virtual register was requested for a type that is neither
    /// integral, pointer, nor floating.
    ///
    /// Internal-error class: signals a defect in an upstream phase.
    #[error("internal error: type has no register class")]
    NoRegisterClass,
}

/// Result type alias for operations that can hit a fatal condition.
pub type FatalResult<T> = std::result::Result<T, Fatal>;
