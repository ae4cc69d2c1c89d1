//! Subscription handles and scoped release.
//!
//! A [`Subscription`] is the handle of one active listener registration. It
//! owns a closed flag and an ordered list of teardown entries. Every resource a
//! pipeline stage opens on behalf of a subscriber (subject registrations, inner
//! subscriptions of flattening operators, pending timers) is registered here,
//! so cancelling the handle releases the whole chain.

use std::{
  cell::{Cell, RefCell},
  fmt::{Debug, Formatter},
  rc::Rc,
  sync::atomic::{AtomicUsize, Ordering},
};

use smallvec::SmallVec;

static NEXT_SUBSCRIPTION_ID: AtomicUsize = AtomicUsize::new(0);

/// A single teardown entry.
enum TearDown {
  Callback(Box<dyn FnOnce()>),
  Child(Subscription),
}

impl TearDown {
  fn run(self) {
    match self {
      TearDown::Callback(f) => f(),
      TearDown::Child(child) => child.unsubscribe(),
    }
  }

  fn is_closed(&self) -> bool {
    match self {
      TearDown::Callback(_) => false,
      TearDown::Child(child) => child.is_closed(),
    }
  }
}

struct Inner {
  id: usize,
  closed: Cell<bool>,
  teardown: RefCell<SmallVec<[TearDown; 2]>>,
}

/// Handle to an active subscription.
///
/// Cloning the handle is cheap; all clones refer to the same registration.
/// `unsubscribe` is idempotent: teardown entries run at most once, in reverse
/// registration order, at the moment the handle is first closed.
#[derive(Clone)]
pub struct Subscription(Rc<Inner>);

impl Subscription {
  pub fn new() -> Self {
    let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed);
    tracing::trace!(subscription = id, "subscription created");
    Subscription(Rc::new(Inner {
      id,
      closed: Cell::new(false),
      teardown: RefCell::new(SmallVec::new()),
    }))
  }

  /// A process-wide unique id of this subscription.
  #[inline]
  pub fn id(&self) -> usize { self.0.id }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.closed.get() }

  /// Close the subscription and run its teardown entries.
  ///
  /// Calling it again, or from inside one of its own teardown entries, is a
  /// no-op.
  pub fn unsubscribe(&self) {
    if self.0.closed.replace(true) {
      return;
    }
    tracing::trace!(subscription = self.0.id, "subscription teardown");
    let teardown = std::mem::take(&mut *self.0.teardown.borrow_mut());
    for entry in teardown.into_iter().rev() {
      entry.run();
    }
  }

  /// Alias of [`Subscription::unsubscribe`].
  #[inline]
  pub fn cancel(&self) { self.unsubscribe() }

  /// Register a callback to run when this subscription ends.
  ///
  /// If the subscription is already closed the callback runs immediately.
  pub fn add_teardown<F>(&self, f: F)
  where
    F: FnOnce() + 'static,
  {
    self.push(TearDown::Callback(Box::new(f)));
  }

  /// Register `child` so it is unsubscribed together with this subscription.
  pub fn add(&self, child: Subscription) {
    if Rc::ptr_eq(&self.0, &child.0) {
      return;
    }
    self.push(TearDown::Child(child));
  }

  /// Forget a child registered with [`Subscription::add`] without
  /// unsubscribing it.
  pub fn remove(&self, child: &Subscription) {
    self
      .0
      .teardown
      .borrow_mut()
      .retain(|entry| !matches!(entry, TearDown::Child(c) if Rc::ptr_eq(&c.0, &child.0)));
  }

  /// Number of pending teardown entries.
  pub fn teardown_size(&self) -> usize { self.0.teardown.borrow().len() }

  /// Activates "RAII" behavior for this subscription. That means
  /// `unsubscribe()` will be called automatically as soon as the returned
  /// value goes out of scope.
  ///
  /// **Attention:** If you don't assign the return value to a variable,
  /// `unsubscribe()` is called immediately, which is probably not what you
  /// want!
  pub fn unsubscribe_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(self) }

  fn push(&self, entry: TearDown) {
    if self.is_closed() {
      entry.run();
      return;
    }
    let mut teardown = self.0.teardown.borrow_mut();
    teardown.retain(|v| !v.is_closed());
    teardown.push(entry);
  }
}

impl Default for Subscription {
  fn default() -> Self { Self::new() }
}

impl PartialEq for Subscription {
  fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.0, &other.0) }
}

impl Eq for Subscription {}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("id", &self.0.id)
      .field("closed", &self.is_closed())
      .field("teardown_count", &self.teardown_size())
      .finish()
  }
}

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Subscription);

impl SubscriptionGuard {
  /// Wraps an existing subscription with a guard to enable RAII behavior for
  /// it.
  pub fn new(subscription: Subscription) -> SubscriptionGuard { SubscriptionGuard(subscription) }

  /// The guarded subscription.
  pub fn subscription(&self) -> &Subscription { &self.0 }
}

impl Drop for SubscriptionGuard {
  #[inline]
  fn drop(&mut self) { self.0.unsubscribe() }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;

  #[test]
  fn add_remove() {
    let parent = Subscription::new();
    let l1 = Subscription::new();
    let l2 = Subscription::new();
    let l3 = Subscription::new();
    parent.add(l1.clone());
    assert_eq!(parent.teardown_size(), 1);
    parent.add(l2.clone());
    assert_eq!(parent.teardown_size(), 2);
    parent.add(l3);
    assert_eq!(parent.teardown_size(), 3);

    parent.remove(&l2);
    assert_eq!(parent.teardown_size(), 2);

    parent.unsubscribe();
    assert!(l1.is_closed());
    assert!(!l2.is_closed());
  }

  #[test]
  fn adding_itself_is_ignored() {
    let s = Subscription::new();
    s.add(s.clone());
    assert_eq!(s.teardown_size(), 0);
  }

  #[test]
  fn closed_children_are_pruned_on_add() {
    let parent = Subscription::new();
    let child = Subscription::new();
    parent.add(child.clone());
    child.unsubscribe();
    parent.add(Subscription::new());
    assert_eq!(parent.teardown_size(), 1);
  }

  #[test]
  fn teardown_runs_in_reverse_order_once() {
    let order = Rc::new(RefCell::new(vec![]));
    let s = Subscription::new();
    for i in 0..3 {
      let order = order.clone();
      s.add_teardown(move || order.borrow_mut().push(i));
    }

    s.unsubscribe();
    s.unsubscribe();
    s.cancel();

    assert_eq!(*order.borrow(), vec![2, 1, 0]);
  }

  #[test]
  fn recursive_cancel_does_not_rerun() {
    let count = Rc::new(RefCell::new(0));
    let s = Subscription::new();
    let c_s = s.clone();
    let c_count = count.clone();
    s.add_teardown(move || {
      *c_count.borrow_mut() += 1;
      c_s.unsubscribe();
    });

    s.unsubscribe();
    assert_eq!(*count.borrow(), 1);
  }

  #[test]
  fn teardown_added_after_close_runs_immediately() {
    let ran = Rc::new(RefCell::new(false));
    let s = Subscription::new();
    s.unsubscribe();
    let c_ran = ran.clone();
    s.add_teardown(move || *c_ran.borrow_mut() = true);
    assert!(*ran.borrow());
  }

  #[test]
  fn guard_unsubscribes_on_drop() {
    let s = Subscription::new();
    {
      let _guard = s.clone().unsubscribe_when_dropped();
      assert!(!s.is_closed());
    }
    assert!(s.is_closed());
  }

  #[test]
  fn ids_are_unique() {
    let a = Subscription::new();
    let b = Subscription::new();
    assert_ne!(a.id(), b.id());
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
  }
}
