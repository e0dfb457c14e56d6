//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call:
//!     → context.rs (caller cancellation token + deadline)
//!     → [dispatch races the transport against the context]
//!     → failure.rs (status code → failure verdict)
//!     → InvokeError consumed by external retry / circuit breaking
//! ```
//!
//! # Design Decisions
//! - No retries here; the returned error is the only signal
//! - Failure policy may only narrow the canonical code set, never widen it
//! - Cancellation always wins a race it is ready for

pub mod context;
pub mod failure;

pub use context::CallContext;
pub use failure::{failure_label, FailureSet, CANONICAL_FAILURE_CODES, FAILURE_TYPE_PREFIX};
