//! Operator stages.
//!
//! Every operator is a pair of types: an `XxxOp` observable holding its
//! upstream and configuration, and an `XxxObserver` placed between the
//! upstream and the downstream observer when the pipeline is subscribed.
//! Operators are built through [`ObservableExt`](crate::observable::ObservableExt).

pub mod catch_error;
pub mod debounce;
pub mod default_if_empty;
pub mod distinct_until_changed;
pub mod filter;
pub mod finalize;
pub mod map;
pub mod merge_map;
pub mod start_with;
pub mod switch_map;
pub mod take;
pub mod take_until;
pub mod tap;
