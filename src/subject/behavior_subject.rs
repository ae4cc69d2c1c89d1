use std::{cell::RefCell, rc::Rc};

use crate::{
  error::StateError, observable::Observable, observer::Observer, subject::Subject,
  subscription::Subscription,
};

/// A subject holding a current value.
///
/// Every new subscriber synchronously receives the current value first, then
/// every later push, like a plain [`Subject`]. The current value moves on
/// when a value is delivered, so a push queued during a fan-out is not
/// replayed ahead of its own delivery.
pub struct BehaviorSubject<Item, Err> {
  subject: Subject<Item, Err>,
  value: Rc<RefCell<Item>>,
}

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self {
    BehaviorSubject { subject: self.subject.clone(), value: self.value.clone() }
  }
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  #[inline]
  pub fn new(value: Item) -> Self {
    let value = Rc::new(RefCell::new(value));
    BehaviorSubject { subject: Subject::tracking(value.clone()), value }
  }

  #[inline]
  pub fn subscriber_count(&self) -> usize { self.subject.subscriber_count() }

  #[inline]
  pub fn is_terminated(&self) -> bool { self.subject.is_terminated() }
}

impl<Item: Clone, Err: Clone> BehaviorSubject<Item, Err> {
  /// The latest value pushed, or the initial one.
  pub fn value(&self) -> Item { self.value.borrow().clone() }

  /// Push `value` to every subscriber, making it the current value.
  ///
  /// Fails, without touching the current value, once the subject completed
  /// or errored.
  pub fn next(&self, value: Item) -> Result<(), StateError> {
    self.subject.check_active()?;
    self.subject.next(value);
    Ok(())
  }

  #[inline]
  pub fn error(&self, err: Err) { self.subject.error(err) }

  #[inline]
  pub fn complete(&self) { self.subject.complete() }
}

impl<Item, Err> Observable for BehaviorSubject<Item, Err>
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
    let current = self.value.borrow().clone();
    self.subject.subscribe_replaying(observer, subscription, current)
  }
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for BehaviorSubject<Item, Err> {
  fn next(&mut self, value: Item) {
    if let Err(err) = BehaviorSubject::next(self, value) {
      tracing::debug!(%err, "value dropped");
    }
  }

  #[inline]
  fn error(&mut self, err: Err) { BehaviorSubject::error(self, err) }

  #[inline]
  fn complete(&mut self) { BehaviorSubject::complete(self) }

  #[inline]
  fn is_closed(&self) -> bool { self.is_terminated() }
}
