//! Bounded-retry combinator with per-attempt deadlines.
//!
//! Wraps an arbitrary fallible async operation with an attempt ceiling, a
//! fresh per-attempt timeout, an optional inter-attempt delay, a stop
//! predicate, and attempt/error observers.

mod policy;
mod run;

pub use policy::{RetryPolicy, DEFAULT_ATTEMPT_TIMEOUT};
pub use run::run_with_retry;
