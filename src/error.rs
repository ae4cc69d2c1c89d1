//! Error types reported to callers of the runtime.
//!
//! Stream errors themselves are user defined (`Err` type parameter of every
//! observable) and travel through `Observer::error`. The types here describe
//! misuse of the runtime API that is reported to the caller instead.

use thiserror::Error;

/// An operation is invalid given the terminal state of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
  #[error("the subject has already completed")]
  Completed,
  #[error("the subject has already errored")]
  Errored,
}
