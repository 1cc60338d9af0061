//! # Error Types
//!
//! Error handling for the decoding engine.
//!
//! We use `thiserror` to generate the `Error` implementations. Low-level
//! components (reader, masks, tagged pointers, dispatch) return these errors
//! directly; the view layer is the boundary that turns every one of them into
//! a placeholder the host can display.

use thiserror::Error;

use crate::types::Address;

/// Main error type for decoding operations
///
/// ## Error Categories
///
/// 1. **Unsupported layout**: `UnsupportedWidth`, `UnknownVariant`, `UnsupportedLayout`
/// 2. **Read failure**: `ReadFailed`
/// 3. **Invariant violation**: `MissingMember`, `TypeNotFound`, `InvariantViolation`
/// 4. **Environment**: `InvalidArgument`, `Io` (loading binaries, CLI input)
///
/// See [`DecodeError::category`].
#[derive(Error, Debug)]
pub enum DecodeError
{
    /// A raw value was requested with a byte width other than 4 or 8
    #[error("Unsupported pointer width: {0} bytes (only 4 and 8 are supported)")]
    UnsupportedWidth(u64),

    /// A discriminant has no entry in the layout that should describe it
    ///
    /// Raised by the dispatcher instead of silently picking a default variant.
    #[error("Unknown variant {discriminant} in layout {layout}")]
    UnknownVariant
    {
        /// Name of the layout table that was consulted
        layout: String,
        /// Symbolic name (or raw value) of the discriminant
        discriminant: String,
    },

    /// The value's shape is not something the engine knows how to decode
    #[error("Unsupported layout: {0}")]
    UnsupportedLayout(String),

    /// Reading process memory failed (unmapped memory, dead process, short read)
    #[error("Failed to read {len} bytes at {address}: {reason}")]
    ReadFailed
    {
        /// Address of the attempted read
        address: Address,
        /// Number of bytes requested
        len: usize,
        /// Reason reported by the memory reader
        reason: String,
    },

    /// A member the layout promised is absent from the type
    #[error("Member '{member}' missing from {type_name}")]
    MissingMember
    {
        /// Type that was searched
        type_name: String,
        /// Member that was expected
        member: String,
    },

    /// A type the layout promised is absent from the type system
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// Any other broken assumption about the target's layout
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// Invalid argument passed to an engine function
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error (loading binaries or memory dumps)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by the view layer to pick a recovery policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory
{
    /// Fall back to the raw underlying fields ("could not format")
    UnsupportedLayout,
    /// Show an "unavailable" placeholder
    ReadFailure,
    /// A defect: log it at error level, then fall back to raw fields
    InvariantViolation,
    /// Errors outside a decode (bad input files, bad arguments)
    Environment,
}

impl DecodeError
{
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory
    {
        match self {
            DecodeError::UnsupportedWidth(_) | DecodeError::UnknownVariant { .. } | DecodeError::UnsupportedLayout(_) => {
                ErrorCategory::UnsupportedLayout
            }
            DecodeError::ReadFailed { .. } => ErrorCategory::ReadFailure,
            DecodeError::MissingMember { .. } | DecodeError::TypeNotFound(_) | DecodeError::InvariantViolation(_) => {
                ErrorCategory::InvariantViolation
            }
            DecodeError::InvalidArgument(_) | DecodeError::Io(_) => ErrorCategory::Environment,
        }
    }

    pub(crate) fn missing_member(type_name: &str, member: &str) -> Self
    {
        DecodeError::MissingMember {
            type_name: type_name.to_string(),
            member: member.to_string(),
        }
    }
}

/// Convenience type alias for `Result<T, DecodeError>`
///
/// ```rust
/// use bitview_core::error::DecodeResult;
/// fn foo() -> DecodeResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
