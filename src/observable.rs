//! The `Observable` trait and its operator extension trait.
//!
//! An observable is a lazily started producer. Nothing happens until
//! [`ObservableExt::subscribe`] (or one of its siblings) is called; every
//! operator returns a new observable wrapping its upstream, so a pipeline is a
//! statically typed chain of stage structs built left to right.

use std::{fmt::Debug, time::Duration};

use crate::{
  observer::{Notification, NotificationObserver, Observer, ObserverNext},
  ops::{
    catch_error::CatchErrorOp,
    debounce::DebounceOp,
    default_if_empty::DefaultIfEmptyOp,
    distinct_until_changed::{DistinctUntilChangedOp, EqFn},
    filter::{FilterOp, TryFilterOp},
    finalize::FinalizeOp,
    map::{MapOp, TryMapOp},
    merge_map::MergeMapOp,
    start_with::StartWithOp,
    switch_map::SwitchMapOp,
    take::TakeOp,
    take_until::TakeUntilOp,
    tap::{TapOp, TryTapOp},
  },
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::Subscription,
};

pub mod boxed;
pub mod create;
pub mod defer;
pub mod fork_join;
pub mod from_iter;
pub mod of;
pub mod timer;

pub use boxed::BoxedObservable;
pub use create::{create, Create, Emitter, Teardown};
pub use defer::{defer, Defer};
pub use fork_join::{fork_join, ForkJoin};
pub use from_iter::{from_iter, FromIter};
pub use of::{empty, never, of, throw_err, Empty, Never, Of, ThrowErr};
pub use timer::{interval, timer, Interval, Timer};

/// A producer of a sequence of values over time.
///
/// `actual_subscribe` starts the production for one subscriber. The stage
/// must register every resource it opens on `subscription`, so that closing
/// the subscription releases it, and must stop delivering once the
/// subscription is closed.
pub trait Observable: Sized {
  type Item;
  type Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<Self::Item, Self::Err> + 'static;
}

/// Operators and subscribe entry points available on every observable.
pub trait ObservableExt: Observable {
  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  #[inline]
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Like `map`, but a closure returning `Err` terminates the stream with
  /// that error.
  #[inline]
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Result<B, Self::Err>,
  {
    TryMapOp::new(self, f)
  }

  /// Emit only those items from an Observable that pass a predicate test.
  #[inline]
  fn filter<F>(self, filter: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp::new(self, filter)
  }

  #[inline]
  fn try_filter<F>(self, filter: F) -> TryFilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> Result<bool, Self::Err>,
  {
    TryFilterOp::new(self, filter)
  }

  /// Invoke `f` for every value as a side effect; values pass unchanged.
  #[inline]
  fn tap<F>(self, f: F) -> TapOp<Self, F>
  where
    F: FnMut(&Self::Item),
  {
    TapOp::new(self, f)
  }

  #[inline]
  fn try_tap<F>(self, f: F) -> TryTapOp<Self, F>
  where
    F: FnMut(&Self::Item) -> Result<(), Self::Err>,
  {
    TryTapOp::new(self, f)
  }

  /// Only emit a value if it differs from the last emitted one.
  #[inline]
  fn distinct_until_changed(self) -> DistinctUntilChangedOp<Self, EqFn<Self::Item>>
  where
    Self::Item: PartialEq + Clone,
  {
    DistinctUntilChangedOp::new(self, <Self::Item as PartialEq>::eq as EqFn<Self::Item>)
  }

  /// `distinct_until_changed` with a custom equality, `eq(previous, current)`.
  #[inline]
  fn distinct_until_changed_by<F>(self, eq: F) -> DistinctUntilChangedOp<Self, F>
  where
    F: FnMut(&Self::Item, &Self::Item) -> bool,
    Self::Item: Clone,
  {
    DistinctUntilChangedOp::new(self, eq)
  }

  /// Emit a value only after `duration` has passed without another value.
  #[inline]
  fn debounce<SD>(self, duration: Duration, scheduler: SD) -> DebounceOp<Self, SD>
  where
    SD: Scheduler,
  {
    DebounceOp::new(self, duration, scheduler)
  }

  /// Emit `value` if the source completes without emitting anything.
  #[inline]
  fn default_if_empty(self, value: Self::Item) -> DefaultIfEmptyOp<Self, Self::Item> {
    DefaultIfEmptyOp::new(self, value)
  }

  /// Call `f` exactly once when the subscription ends, whether by
  /// completion, error or unsubscribe.
  #[inline]
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce(),
  {
    FinalizeOp::new(self, f)
  }

  /// Map every value to an inner observable and only forward the latest one.
  #[inline]
  fn switch_map<Inner, F>(self, f: F) -> SwitchMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: Observable<Err = Self::Err>,
  {
    SwitchMapOp::new(self, f)
  }

  /// Map every value to an inner observable and run all of them concurrently.
  #[inline]
  fn merge_map<Inner, F>(self, f: F) -> MergeMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: Observable<Err = Self::Err>,
  {
    MergeMapOp::new(self, f, usize::MAX)
  }

  /// `merge_map` running at most `concurrent` inner observables at once;
  /// values arriving while saturated are buffered in arrival order.
  #[inline]
  fn merge_map_with<Inner, F>(self, f: F, concurrent: usize) -> MergeMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: Observable<Err = Self::Err>,
  {
    MergeMapOp::new(self, f, concurrent)
  }

  /// Map every value to an inner observable and subscribe to them one at a
  /// time, in arrival order.
  #[inline]
  fn concat_map<Inner, F>(self, f: F) -> MergeMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: Observable<Err = Self::Err>,
  {
    MergeMapOp::new(self, f, 1)
  }

  /// Replace an upstream error with the observable returned by `f`.
  #[inline]
  fn catch_error<R, F>(self, f: F) -> CatchErrorOp<Self, F>
  where
    F: FnOnce(Self::Err) -> R,
    R: Observable<Item = Self::Item>,
  {
    CatchErrorOp::new(self, f)
  }

  /// Emit only the first `count` values.
  #[inline]
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  /// Forward values until `notifier` emits, then complete.
  #[inline]
  fn take_until<N>(self, notifier: N) -> TakeUntilOp<Self, N>
  where
    N: Observable<Err = Self::Err>,
  {
    TakeUntilOp::new(self, notifier)
  }

  /// Emit `value` before anything the source emits.
  #[inline]
  fn start_with(self, value: Self::Item) -> StartWithOp<Self, Self::Item> {
    StartWithOp::new(self, value)
  }

  /// Erase the concrete type of this pipeline.
  #[inline]
  fn box_it(self) -> BoxedObservable<Self::Item, Self::Err>
  where
    Self: 'static,
  {
    BoxedObservable::new(self)
  }

  /// Apply a reusable stage, e.g. a function bundling several operators.
  #[inline]
  fn pipe<R, F>(self, stage: F) -> R
  where
    F: FnOnce(Self) -> R,
  {
    stage(self)
  }

  /// Subscribe with a next-only handler.
  ///
  /// An error reaching this subscriber is raised as a panic; use
  /// [`ObservableExt::subscribe_with`] to handle errors.
  fn subscribe<N>(self, next: N) -> Subscription
  where
    N: FnMut(Self::Item) + 'static,
    Self::Err: Debug,
  {
    self.subscribe_observer(ObserverNext::new(next))
  }

  /// Subscribe with a single handler receiving every [`Notification`].
  fn subscribe_with<H>(self, handler: H) -> Subscription
  where
    H: FnMut(Notification<Self::Item, Self::Err>) + 'static,
  {
    self.subscribe_observer(NotificationObserver::new(handler))
  }

  /// Subscribe any [`Observer`].
  fn subscribe_observer<O>(self, observer: O) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + 'static,
  {
    let subscription = Subscription::new();
    self.actual_subscribe(Subscriber::new(observer, subscription.clone()), &subscription);
    subscription
  }
}

impl<T: Observable> ObservableExt for T {}
