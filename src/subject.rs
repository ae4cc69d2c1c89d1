//! Subjects: observables that are also observers.
//!
//! A [`Subject`] multicasts every value pushed into it to all of its current
//! subscribers, in subscription order. Once it received `error` or
//! `complete` it is terminated: later pushes are dropped and late subscribers
//! only receive the cached terminal notification.
//!
//! Pushing into a subject from inside one of its own subscribers' callbacks
//! is allowed. The push is queued and delivered once the current fan-out has
//! finished, so every subscriber still observes the same order.
//!
//! ```
//! use std::convert::Infallible;
//!
//! use rxflow::prelude::*;
//!
//! let subject = Subject::<i32, Infallible>::new();
//! subject.clone().subscribe(|v| println!("a: {v}"));
//! subject.clone().map(|v| v * 10).subscribe(|v| println!("b: {v}"));
//!
//! subject.next(1);
//! subject.complete();
//! ```

use std::{
  any::Any,
  cell::RefCell,
  collections::VecDeque,
  panic::{self, AssertUnwindSafe},
  rc::Rc,
};

use crate::{
  error::StateError,
  observable::Observable,
  observer::{Notification, Observer},
  subscription::Subscription,
};

pub mod behavior_subject;
mod subscribers;

pub use behavior_subject::BehaviorSubject;
use subscribers::{Registration, Subscribers};

#[derive(Clone)]
enum Terminal<Err> {
  Completed,
  Errored(Err),
}

type PanicPayload = Box<dyn Any + Send>;

struct SubjectState<Item, Err> {
  observers: Subscribers<Item, Err>,
  terminal: Option<Terminal<Err>>,
  queue: VecDeque<Notification<Item, Err>>,
  emitting: bool,
  // Current value of a `BehaviorSubject`, written when a value is dequeued.
  latest: Option<Rc<RefCell<Item>>>,
}

pub struct Subject<Item, Err> {
  inner: Rc<RefCell<SubjectState<Item, Err>>>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Subject { inner: self.inner.clone() } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::with_latest(None) }
}

/// Clears the emitting flag when a fan-out ends, even by unwinding.
struct EmittingGuard<'a, Item, Err>(&'a RefCell<SubjectState<Item, Err>>);

impl<Item, Err> Drop for EmittingGuard<'_, Item, Err> {
  fn drop(&mut self) {
    if let Ok(mut state) = self.0.try_borrow_mut() {
      state.emitting = false;
      if std::thread::panicking() {
        state.queue.clear();
      }
    }
  }
}

/// Runs one delivery. A panic is kept, the first one wins, so the rest of
/// the fan-out still happens before it is raised again.
fn isolated(panicked: &mut Option<PanicPayload>, delivery: impl FnOnce()) {
  if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(delivery)) {
    panicked.get_or_insert(payload);
  }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  fn with_latest(latest: Option<Rc<RefCell<Item>>>) -> Self {
    Subject {
      inner: Rc::new(RefCell::new(SubjectState {
        observers: Subscribers::default(),
        terminal: None,
        queue: VecDeque::new(),
        emitting: false,
        latest,
      })),
    }
  }

  /// Subject keeping `latest` up to date with every value it delivers.
  pub(crate) fn tracking(latest: Rc<RefCell<Item>>) -> Self { Self::with_latest(Some(latest)) }

  /// Number of observers currently registered.
  pub fn subscriber_count(&self) -> usize { self.inner.borrow().observers.len() }

  /// Whether `error` or `complete` was pushed.
  pub fn is_terminated(&self) -> bool { self.inner.borrow().terminal.is_some() }

  /// `Ok` while the subject accepts values, otherwise the terminal state.
  pub fn check_active(&self) -> Result<(), StateError> {
    match self.inner.borrow().terminal {
      None => Ok(()),
      Some(Terminal::Completed) => Err(StateError::Completed),
      Some(Terminal::Errored(_)) => Err(StateError::Errored),
    }
  }
}

impl<Item: Clone, Err: Clone> Subject<Item, Err> {
  /// Push a value to every current subscriber. Dropped once terminated.
  pub fn next(&self, value: Item) { self.emit(Notification::Next(value)) }

  /// Terminate with an error, delivered once to every current subscriber.
  pub fn error(&self, err: Err) { self.emit(Notification::Error(err)) }

  /// Terminate successfully.
  pub fn complete(&self) { self.emit(Notification::Complete) }

  fn emit(&self, notification: Notification<Item, Err>) {
    {
      let mut state = self.inner.borrow_mut();
      if state.terminal.is_some() {
        tracing::debug!("push dropped, subject already terminated");
        return;
      }
      match &notification {
        Notification::Next(_) => {}
        Notification::Error(err) => state.terminal = Some(Terminal::Errored(err.clone())),
        Notification::Complete => state.terminal = Some(Terminal::Completed),
      }
      if notification.is_terminal() {
        tracing::debug!(subscribers = state.observers.len(), "subject terminated");
      }
      state.queue.push_back(notification);
      if state.emitting {
        return;
      }
      state.emitting = true;
    }
    self.drain_queue(|_| {});
  }

  /// Runs `first`, then delivers queued notifications until the queue is
  /// empty. The caller must have set the emitting flag.
  fn drain_queue(&self, first: impl FnOnce(&mut Option<PanicPayload>)) {
    let guard = EmittingGuard(&self.inner);
    let mut panicked = None;
    first(&mut panicked);
    loop {
      let (notification, targets) = {
        let mut state = self.inner.borrow_mut();
        let Some(notification) = state.queue.pop_front() else {
          break;
        };
        if let (Notification::Next(value), Some(latest)) = (&notification, &state.latest) {
          *latest.borrow_mut() = value.clone();
        }
        let targets = if notification.is_terminal() {
          state.observers.drain()
        } else {
          state.observers.snapshot()
        };
        (notification, targets)
      };
      Self::deliver(notification, targets, &mut panicked);
    }
    drop(guard);
    if let Some(payload) = panicked {
      panic::resume_unwind(payload);
    }
  }

  fn deliver<I>(
    notification: Notification<Item, Err>,
    targets: I,
    panicked: &mut Option<PanicPayload>,
  ) where
    I: IntoIterator<Item = Registration<Item, Err>>,
  {
    for target in targets {
      if !target.is_live() {
        continue;
      }
      let notification = notification.clone();
      isolated(panicked, || notification.accept(&mut **target.observer.borrow_mut()));
    }
  }

  /// Register `observer`, then hand it `current` before any value pushed
  /// after this call. Pushes made while `current` is delivered are queued
  /// behind it and reach the new observer too.
  pub(crate) fn subscribe_replaying<O>(
    &self,
    observer: O,
    subscription: &Subscription,
    current: Item,
  ) where
    O: Observer<Item, Err> + 'static,
    Item: 'static,
    Err: 'static,
  {
    let Some(registration) = self.register(observer, subscription) else {
      return;
    };
    let nested = std::mem::replace(&mut self.inner.borrow_mut().emitting, true);
    if nested {
      // Already inside a fan-out, whose loop picks up anything queued here.
      if registration.is_live() {
        registration.observer.borrow_mut().next(current);
      }
      return;
    }
    self.drain_queue(|panicked| {
      if registration.is_live() {
        isolated(panicked, || registration.observer.borrow_mut().next(current));
      }
    });
  }
}

impl<Item, Err> Subject<Item, Err>
where
  Item: 'static,
  Err: Clone + 'static,
{
  /// Add `observer` to the set, or hand it the cached terminal
  /// notification and return `None` once the subject is terminated.
  fn register<O>(
    &self,
    mut observer: O,
    subscription: &Subscription,
  ) -> Option<Registration<Item, Err>>
  where
    O: Observer<Item, Err> + 'static,
  {
    let terminal = self.inner.borrow().terminal.clone();
    match terminal {
      Some(Terminal::Completed) => {
        observer.complete();
        None
      }
      Some(Terminal::Errored(err)) => {
        observer.error(err);
        None
      }
      None => {
        let registration = self
          .inner
          .borrow_mut()
          .observers
          .add(Box::new(observer), subscription.clone());
        let id = registration.id;
        tracing::trace!(id, subscription = subscription.id(), "subject registration added");

        let weak = Rc::downgrade(&self.inner);
        subscription.add_teardown(move || {
          let Some(inner) = weak.upgrade() else {
            return;
          };
          let removed = inner.borrow_mut().observers.remove(id);
          if removed.is_some() {
            tracing::trace!(id, "subject registration removed");
          }
        });
        Some(registration)
      }
    }
  }
}

impl<Item, Err> Observable for Subject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<Item, Err> + 'static,
  {
    self.register(observer, subscription);
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Subject<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { Subject::next(self, value) }

  #[inline]
  fn error(&mut self, err: Err) { Subject::error(self, err) }

  #[inline]
  fn complete(&mut self) { Subject::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { self.is_terminated() }
}
