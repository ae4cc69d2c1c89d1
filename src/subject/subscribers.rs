use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use smallvec::SmallVec;

use crate::{observer::BoxedObserver, subscription::Subscription};

/// An observer registered on a subject, shared so a fan-out can hold it while
/// the set itself changes.
pub(crate) type SharedObserver<Item, Err> = Rc<RefCell<BoxedObserver<Item, Err>>>;

/// One entry of the subscriber set.
pub(crate) struct Registration<Item, Err> {
  pub(crate) id: usize,
  pub(crate) observer: SharedObserver<Item, Err>,
  pub(crate) subscription: Subscription,
  registered: Rc<Cell<bool>>,
}

impl<Item, Err> Clone for Registration<Item, Err> {
  fn clone(&self) -> Self {
    Registration {
      id: self.id,
      observer: self.observer.clone(),
      subscription: self.subscription.clone(),
      registered: self.registered.clone(),
    }
  }
}

impl<Item, Err> Registration<Item, Err> {
  /// Whether a notification may still be delivered to this registration:
  /// its subscription is open and it was not removed from the set. Drained
  /// registrations stay live for the terminal notification.
  #[inline]
  pub(crate) fn is_live(&self) -> bool { self.registered.get() && !self.subscription.is_closed() }
}

/// Subscribers container with ID-based management.
///
/// This struct holds the observers subscribed to a Subject, in subscription
/// order.
///
/// - **SmallVec Optimization**: avoids heap allocation for the common case of
///   0-2 subscribers.
/// - **Snapshots**: fan-out iterates a snapshot taken by [`snapshot`], never
///   the live set, so observers may subscribe or unsubscribe from inside a
///   callback.
///
/// [`snapshot`]: Subscribers::snapshot
pub(crate) struct Subscribers<Item, Err> {
  next_id: usize,
  items: SmallVec<[Registration<Item, Err>; 2]>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// Add an observer under a fresh ID and return its registration.
  pub(crate) fn add(
    &mut self,
    observer: BoxedObserver<Item, Err>,
    subscription: Subscription,
  ) -> Registration<Item, Err> {
    let id = self.next_id;
    self.next_id += 1;
    let registration = Registration {
      id,
      observer: Rc::new(RefCell::new(observer)),
      subscription,
      registered: Rc::new(Cell::new(true)),
    };
    self.items.push(registration.clone());
    registration
  }

  /// Remove an observer by ID. Snapshots still holding it see it as no
  /// longer live.
  pub(crate) fn remove(&mut self, id: usize) -> Option<Registration<Item, Err>> {
    let pos = self.items.iter().position(|r| r.id == id)?;
    let registration = self.items.remove(pos);
    registration.registered.set(false);
    Some(registration)
  }

  #[inline]
  pub(crate) fn contains(&self, id: usize) -> bool { self.items.iter().any(|r| r.id == id) }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.items.len() }

  #[inline]
  pub(crate) fn is_empty(&self) -> bool { self.items.is_empty() }

  /// Copy of the current registrations, in subscription order.
  pub(crate) fn snapshot(&self) -> SmallVec<[Registration<Item, Err>; 2]> { self.items.clone() }

  /// Remove and return every registration, in subscription order.
  pub(crate) fn drain(&mut self) -> SmallVec<[Registration<Item, Err>; 2]> {
    std::mem::take(&mut self.items)
  }
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use super::*;
  use crate::observer::ObserverNext;

  fn observer() -> BoxedObserver<i32, Infallible> { Box::new(ObserverNext::new(|_: i32| {})) }

  #[test]
  fn ids_are_stable_across_removal() {
    let mut subscribers = Subscribers::default();
    let a = subscribers.add(observer(), Subscription::new()).id;
    let b = subscribers.add(observer(), Subscription::new()).id;
    assert!(subscribers.remove(a).is_some());
    assert!(subscribers.remove(a).is_none());
    let c = subscribers.add(observer(), Subscription::new()).id;

    assert_ne!(b, c);
    assert!(subscribers.contains(b));
    assert!(subscribers.contains(c));
    assert_eq!(subscribers.len(), 2);
  }

  #[test]
  fn snapshot_is_detached() {
    let mut subscribers = Subscribers::default();
    let a = subscribers.add(observer(), Subscription::new()).id;
    subscribers.add(observer(), Subscription::new());
    let snapshot = subscribers.snapshot();
    subscribers.remove(a);

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].id, a);
    assert!(!snapshot[0].is_live());
    assert!(snapshot[1].is_live());
    assert_eq!(subscribers.len(), 1);
  }

  #[test]
  fn drain_empties() {
    let mut subscribers = Subscribers::default();
    subscribers.add(observer(), Subscription::new());
    let drained = subscribers.drain();
    assert_eq!(drained.len(), 1);
    assert!(drained[0].is_live());
    assert!(subscribers.is_empty());
  }

  #[test]
  fn closed_registration_is_not_live() {
    let mut subscribers = Subscribers::default();
    let subscription = Subscription::new();
    subscribers.add(observer(), subscription.clone());
    subscription.unsubscribe();
    assert!(!subscribers.snapshot()[0].is_live());
  }
}
