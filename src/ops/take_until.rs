//! TakeUntil operator
//!
//! Forwards source values until the notifier emits its first value, then
//! completes and releases both the source and the notifier. A notifier
//! error is forwarded as the stream error; a notifier completing without a
//! value changes nothing.
//!
//! The notifier is subscribed before the source, so a notifier that fires
//! synchronously prevents the source from being subscribed at all.

use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use crate::{
  observable::Observable, observer::Observer, subscriber::Subscriber,
  subscription::Subscription,
};

#[derive(Clone)]
pub struct TakeUntilOp<S, N> {
  source: S,
  notifier: N,
}

impl<S, N> TakeUntilOp<S, N> {
  pub(crate) fn new(source: S, notifier: N) -> Self { TakeUntilOp { source, notifier } }
}

enum Stop<Err> {
  Complete,
  Error(Err),
}

struct TakeUntilShared<O, Err> {
  observer: RefCell<Option<O>>,
  /// A stop requested while the observer was busy delivering a value.
  pending: RefCell<Option<Stop<Err>>>,
  subscription: Subscription,
}

impl<O, Err> TakeUntilShared<O, Err> {
  fn finish<Item>(&self, stop: Stop<Err>)
  where
    O: Observer<Item, Err>,
  {
    let observer = match self.observer.try_borrow_mut() {
      Ok(mut slot) => slot.take(),
      Err(_) => {
        *self.pending.borrow_mut() = Some(stop);
        return;
      }
    };
    if let Some(mut observer) = observer {
      match stop {
        Stop::Complete => observer.complete(),
        Stop::Error(err) => observer.error(err),
      }
    }
    self.subscription.unsubscribe();
  }
}

impl<S, N> Observable for TakeUntilOp<S, N>
where
  S: Observable,
  S::Item: 'static,
  S::Err: 'static,
  N: Observable<Err = S::Err>,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let shared = Rc::new(TakeUntilShared {
      observer: RefCell::new(Some(observer)),
      pending: RefCell::new(None),
      subscription: subscription.clone(),
    });

    let notifier_subscription = Subscription::new();
    subscription.add(notifier_subscription.clone());
    let notifier = NotifierObserver { shared: shared.clone(), _item: PhantomData::<fn(S::Item)> };
    self.notifier.actual_subscribe(
      Subscriber::new(notifier, notifier_subscription.clone()),
      &notifier_subscription,
    );

    if subscription.is_closed() {
      return;
    }
    self
      .source
      .actual_subscribe(TakeUntilObserver { shared }, subscription)
  }
}

pub struct TakeUntilObserver<O, Err> {
  shared: Rc<TakeUntilShared<O, Err>>,
}

impl<O, Item, Err> Observer<Item, Err> for TakeUntilObserver<O, Err>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.shared.observer.borrow_mut().as_mut() {
      observer.next(value);
    }
    let pending = self.shared.pending.borrow_mut().take();
    if let Some(stop) = pending {
      self.shared.finish::<Item>(stop);
    }
  }

  fn error(&mut self, err: Err) {
    let observer = self.shared.observer.borrow_mut().take();
    if let Some(mut observer) = observer {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    let observer = self.shared.observer.borrow_mut().take();
    if let Some(mut observer) = observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool {
    self
      .shared
      .observer
      .try_borrow()
      .map_or(false, |o| o.as_ref().map_or(true, |o| o.is_closed()))
  }
}

pub struct NotifierObserver<O, Err, Item> {
  shared: Rc<TakeUntilShared<O, Err>>,
  _item: PhantomData<fn(Item)>,
}

impl<O, Err, Item, NItem> Observer<NItem, Err> for NotifierObserver<O, Err, Item>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, _: NItem) { self.shared.finish::<Item>(Stop::Complete) }

  fn error(&mut self, err: Err) { self.shared.finish::<Item>(Stop::Error(err)) }

  fn complete(&mut self) {}

  fn is_closed(&self) -> bool { self.shared.observer.try_borrow().map_or(false, |o| o.is_none()) }
}

#[cfg(test)]
mod test {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  type Events = Rc<RefCell<Vec<Notification<i32, &'static str>>>>;

  fn setup() -> (Subject<i32, &'static str>, Subject<(), &'static str>, Events) {
    let source = Subject::new();
    let notifier = Subject::new();
    let events: Events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    source
      .clone()
      .take_until(notifier.clone())
      .subscribe_with(move |n| c_events.borrow_mut().push(n));
    (source, notifier, events)
  }

  #[test]
  fn completes_when_notifier_emits() {
    let (source, notifier, events) = setup();
    source.next(1);
    notifier.next(());
    source.next(2);

    assert_eq!(*events.borrow(), vec![Notification::Next(1), Notification::Complete]);
    assert_eq!(source.subscriber_count(), 0);
    assert_eq!(notifier.subscriber_count(), 0);
  }

  #[test]
  fn notifier_error_is_forwarded() {
    let (source, notifier, events) = setup();
    notifier.error("stop");
    source.next(1);

    assert_eq!(*events.borrow(), vec![Notification::Error("stop")]);
    assert_eq!(source.subscriber_count(), 0);
  }

  #[test]
  fn silent_notifier_completion_changes_nothing() {
    let (source, notifier, events) = setup();
    notifier.complete();
    source.next(1);
    source.complete();

    assert_eq!(*events.borrow(), vec![Notification::Next(1), Notification::Complete]);
  }

  #[test]
  fn source_completion_releases_notifier() {
    let (source, notifier, _) = setup();
    source.complete();
    assert_eq!(notifier.subscriber_count(), 0);
  }

  #[test]
  fn synchronous_notifier_skips_source() {
    let source = Subject::<i32, &'static str>::new();
    let events: Events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    source
      .clone()
      .take_until(of(()))
      .subscribe_with(move |n| c_events.borrow_mut().push(n));

    assert_eq!(*events.borrow(), vec![Notification::Complete]);
    assert_eq!(source.subscriber_count(), 0);
  }

  #[test]
  fn notifier_fired_from_downstream_callback() {
    let source = Subject::<i32, &'static str>::new();
    let notifier = Subject::<(), &'static str>::new();
    let events: Events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    let c_notifier = notifier.clone();
    source
      .clone()
      .take_until(notifier.clone())
      .subscribe_with(move |n| {
        if n == Notification::Next(2) {
          c_notifier.next(());
        }
        c_events.borrow_mut().push(n);
      });

    source.next(1);
    source.next(2);
    source.next(3);
    assert_eq!(
      *events.borrow(),
      vec![Notification::Next(1), Notification::Next(2), Notification::Complete]
    );
  }
}
