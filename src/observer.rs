//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion).

use std::fmt::Debug;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable. `error` and `complete` are terminal: a well behaved source
/// never calls anything on the observer after one of them.
pub trait Observer<Item, Err> {
  /// Receive the next value from the observable
  fn next(&mut self, value: Item);

  /// Handle an error from the observable
  fn error(&mut self, err: Err);

  /// Handle completion of the observable
  fn complete(&mut self);

  /// Checks if the observer is closed.
  ///
  /// Sources that produce values in a loop (like `from_iter`) use it to stop
  /// early once nobody listens anymore.
  fn is_closed(&self) -> bool;
}

impl<Item, Err, O> Observer<Item, Err> for Box<O>
where
  O: Observer<Item, Err> + ?Sized,
{
  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// Type-erased observer used wherever observers of different concrete types
/// are stored side by side (subjects, boxed observables, `create`).
pub type BoxedObserver<Item, Err> = Box<dyn Observer<Item, Err>>;

// ============================================================================
// Notification
// ============================================================================

/// One event of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Notification<Item, Err> {
  /// Deliver this notification to `observer`.
  pub fn accept<O>(self, observer: &mut O)
  where
    O: Observer<Item, Err> + ?Sized,
  {
    match self {
      Notification::Next(value) => observer.next(value),
      Notification::Error(err) => observer.error(err),
      Notification::Complete => observer.complete(),
    }
  }

  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Notification::Next(_)) }
}

// ============================================================================
// Closure observers
// ============================================================================

/// Observer built from a next-only closure.
///
/// There is no error handler, so an error reaching it is raised as a panic
/// carrying the error's `Debug` output.
pub struct ObserverNext<N> {
  next: N,
  closed: bool,
}

impl<N> ObserverNext<N> {
  pub fn new(next: N) -> Self { Self { next, closed: false } }
}

impl<Item, Err, N> Observer<Item, Err> for ObserverNext<N>
where
  N: FnMut(Item),
  Err: Debug,
{
  fn next(&mut self, value: Item) { (self.next)(value) }

  fn error(&mut self, err: Err) {
    self.closed = true;
    panic!("unhandled stream error: {err:?}");
  }

  fn complete(&mut self) { self.closed = true; }

  fn is_closed(&self) -> bool { self.closed }
}

/// Observer that hands every [`Notification`] to one handler.
pub struct NotificationObserver<H> {
  handler: H,
  closed: bool,
}

impl<H> NotificationObserver<H> {
  pub fn new(handler: H) -> Self { Self { handler, closed: false } }
}

impl<Item, Err, H> Observer<Item, Err> for NotificationObserver<H>
where
  H: FnMut(Notification<Item, Err>),
{
  fn next(&mut self, value: Item) { (self.handler)(Notification::Next(value)) }

  fn error(&mut self, err: Err) {
    self.closed = true;
    (self.handler)(Notification::Error(err))
  }

  fn complete(&mut self) {
    self.closed = true;
    (self.handler)(Notification::Complete)
  }

  fn is_closed(&self) -> bool { self.closed }
}
