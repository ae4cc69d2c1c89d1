//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Core traits
pub use crate::observable::{Observable, ObservableExt};
// Creation
pub use crate::observable::{
  create, defer, empty, fork_join, from_iter, interval, never, of, throw_err, timer,
  BoxedObservable, Emitter, Teardown,
};
// Observer
pub use crate::observer::{BoxedObserver, Notification, NotificationObserver, Observer, ObserverNext};
// Scheduler
#[cfg(all(feature = "timer", not(target_arch = "wasm32")))]
pub use crate::scheduler::LocalPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioLocalScheduler;
pub use crate::scheduler::{Scheduler, TaskHandle, VirtualTimeScheduler};
// Subject
pub use crate::subject::{BehaviorSubject, Subject};
// Subscription
pub use crate::{
  error::StateError,
  subscriber::Subscriber,
  subscription::{Subscription, SubscriptionGuard},
};
