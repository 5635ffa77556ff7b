//! Status taxonomy for every fallible operation in this crate.
//!
//! The set of error kinds is closed and flat, mirroring the original
//! `ITC_Status_t` codes: there is no nesting, no wrapped causes, and no
//! numeric detail beyond the kind itself.

use thiserror::Error;

/// Everything that can go wrong in an ITC operation.
///
/// There is deliberately no `Success` variant: `Result::Ok` already carries
/// that, and mixing it into this enum would just reintroduce the in-band
/// status code this type exists to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItcError {
    /// Unspecified internal failure.
    #[error("operation failed")]
    Failure,
    /// A logically impossible request, e.g. a null/empty input where one
    /// isn't allowed.
    #[error("invalid parameter")]
    InvalidParam,
    /// The output buffer was too small to hold the encoded value.
    #[error("insufficient resources")]
    InsufficientResources,
    /// `sum` was called on two IDs that both own some point in [0,1).
    #[error("overlapping id interval")]
    OverlappingIdInterval,
    /// An `IdTree` invariant (I1-I4) was violated.
    #[error("corrupt id")]
    CorruptId,
    /// An `EventTree` invariant (E1-E4) was violated.
    #[error("corrupt event")]
    CorruptEvent,
    /// A `Stamp` is missing a component, or its wire encoding is malformed.
    #[error("corrupt stamp")]
    CorruptStamp,
    /// Lifting a counter would exceed the configured maximum.
    #[error("event counter overflow")]
    EventCounterOverflow,
    /// Sinking a counter would go below zero.
    #[error("event counter underflow")]
    EventCounterUnderflow,
    /// A decoded counter needs more bytes than the configured `Counter`
    /// width supports.
    #[error("unsupported event counter size")]
    EventUnsupportedCounterSize,
}

/// Convenience alias used throughout the crate's public API.
pub type Status<T> = Result<T, ItcError>;
