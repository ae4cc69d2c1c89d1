//! # rxflow: a single-threaded reactive event-stream runtime
//!
//! Push-based streams for one thread: subjects to push values in, cold
//! sources, a statically typed operator pipeline and subscriptions whose
//! teardown releases every resource the pipeline opened.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::convert::Infallible;
//!
//! use rxflow::prelude::*;
//!
//! from_iter::<_, Infallible>(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| println!("Value: {}", v));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A lazily started producer; operators live on [`ObservableExt`] |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subject`] / [`BehaviorSubject`] | Multicast sources values are pushed into |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Runs delayed callbacks for the timing operators |
//!
//! ## Feature Flags
//!
//! - **`timer`** (default): `LocalPoolScheduler`, real time on a `futures`
//!   local executor
//! - **`tokio-scheduler`**: `TokioLocalScheduler`, real time on a tokio
//!   `LocalSet`
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Subject`]: subject::Subject
//! [`BehaviorSubject`]: subject::BehaviorSubject
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;
