use crate::{observer::Observer, subscription::Subscription};

/// Gate placed in front of a consumer.
///
/// While the Observer is the public API for consuming the values of an
/// Observable, every consumer is wrapped into a Subscriber in order to tie it
/// to a [`Subscription`]:
///
/// - nothing is forwarded once the subscription is closed, even if the
///   notification was already on its way (e.g. queued by a subject);
/// - at most one terminal notification is forwarded, after which the
///   subscription is unsubscribed so every resource of the chain is released.
pub struct Subscriber<O> {
  observer: Option<O>,
  subscription: Subscription,
}

impl<O> Subscriber<O> {
  pub fn new(observer: O, subscription: Subscription) -> Self {
    Subscriber { observer: Some(observer), subscription }
  }

  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }
}

/// Unsubscribes on drop, so a terminal handler that panics (a next-only
/// observer receiving an error) still releases the chain.
struct ReleaseOnDrop<'a>(&'a Subscription);

impl Drop for ReleaseOnDrop<'_> {
  fn drop(&mut self) { self.0.unsubscribe(); }
}

impl<Item, Err, O> Observer<Item, Err> for Subscriber<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.subscription.is_closed() {
      return;
    }
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if self.subscription.is_closed() {
      return;
    }
    let _release = ReleaseOnDrop(&self.subscription);
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if self.subscription.is_closed() {
      return;
    }
    let _release = ReleaseOnDrop(&self.subscription);
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self.subscription.is_closed() || self.observer.as_ref().map_or(true, |o| o.is_closed())
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use super::*;
  use crate::observer::{BoxedObserver, Notification, NotificationObserver};

  type Events = Rc<RefCell<Vec<Notification<i32, &'static str>>>>;

  fn recording() -> (Events, Subscriber<BoxedObserver<i32, &'static str>>) {
    let events: Events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    let observer: BoxedObserver<i32, &'static str> =
      Box::new(NotificationObserver::new(move |n: Notification<i32, &'static str>| {
        c_events.borrow_mut().push(n)
      }));
    let subscriber = Subscriber::new(observer, Subscription::new());
    (events, subscriber)
  }

  #[test]
  fn next_complete() {
    let (events, mut subscriber) = recording();
    subscriber.next(1);
    subscriber.complete();
    subscriber.next(2);
    subscriber.complete();

    assert_eq!(*events.borrow(), vec![Notification::Next(1), Notification::Complete]);
    assert!(subscriber.subscription().is_closed());
  }

  #[test]
  fn error_is_terminal() {
    let (events, mut subscriber) = recording();
    subscriber.error("boom");
    subscriber.next(1);
    subscriber.error("again");

    assert_eq!(*events.borrow(), vec![Notification::Error("boom")]);
    assert!(subscriber.subscription().is_closed());
  }

  #[test]
  fn panicking_error_handler_still_unsubscribes() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use crate::observer::ObserverNext;

    let subscription = Subscription::new();
    let released = Rc::new(RefCell::new(false));
    let c_released = released.clone();
    subscription.add_teardown(move || *c_released.borrow_mut() = true);
    let mut subscriber = Subscriber::new(ObserverNext::new(|_: i32| {}), subscription.clone());

    let result = catch_unwind(AssertUnwindSafe(|| {
      Observer::<i32, &str>::error(&mut subscriber, "boom")
    }));
    assert!(result.is_err());
    assert!(subscription.is_closed());
    assert!(*released.borrow());
  }

  #[test]
  fn nothing_after_unsubscribe() {
    let (events, mut subscriber) = recording();
    subscriber.next(1);
    subscriber.subscription().unsubscribe();
    subscriber.next(2);
    subscriber.complete();

    assert_eq!(*events.borrow(), vec![Notification::Next(1)]);
  }
}
