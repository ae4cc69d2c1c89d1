use std::{cell::RefCell, marker::PhantomData, rc::Rc};

use crate::{
  observable::Observable,
  observer::{BoxedObserver, Observer},
  subscription::Subscription,
};

/// Creates a cold observable from a production function.
///
/// The function runs once per subscription. It receives an [`Emitter`] to
/// push notifications with, and returns the teardown to run when that
/// subscription ends (`()` when there is nothing to release).
///
/// ```
/// use rxflow::prelude::*;
///
/// let source = create(|mut emitter: Emitter<i32, &'static str>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
/// });
/// source.subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, Item, Err, T>(f: F) -> Create<F, Item, Err>
where
  F: FnOnce(Emitter<Item, Err>) -> T,
  T: Into<Teardown>,
{
  Create { f, _hint: PhantomData }
}

pub struct Create<F, Item, Err> {
  f: F,
  _hint: PhantomData<fn() -> (Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Create { f: self.f.clone(), _hint: PhantomData } }
}

impl<F, Item, Err, T> Observable for Create<F, Item, Err>
where
  F: FnOnce(Emitter<Item, Err>) -> T,
  T: Into<Teardown>,
  Item: 'static,
  Err: 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<Item, Err> + 'static,
  {
    let observer: BoxedObserver<Item, Err> = Box::new(observer);
    let emitter = Emitter {
      observer: Rc::new(RefCell::new(Some(observer))),
      subscription: subscription.clone(),
    };
    let teardown = (self.f)(emitter).into();
    if let Some(teardown) = teardown.0 {
      subscription.add_teardown(teardown);
    }
  }
}

/// Teardown returned by a [`create`] production function.
#[derive(Default)]
pub struct Teardown(Option<Box<dyn FnOnce()>>);

impl Teardown {
  pub fn new<F: FnOnce() + 'static>(f: F) -> Self { Teardown(Some(Box::new(f))) }

  pub fn none() -> Self { Teardown(None) }
}

impl From<()> for Teardown {
  fn from(_: ()) -> Self { Teardown::none() }
}

impl From<Subscription> for Teardown {
  fn from(subscription: Subscription) -> Self { Teardown::new(move || subscription.unsubscribe()) }
}

/// Handle through which a [`create`] production function pushes
/// notifications.
///
/// Cloning yields another handle to the same subscriber, so a value may be
/// pushed later, e.g. from a scheduled task. Notifications pushed after the
/// subscription closed, or after a terminal notification, are dropped.
pub struct Emitter<Item, Err> {
  observer: Rc<RefCell<Option<BoxedObserver<Item, Err>>>>,
  subscription: Subscription,
}

impl<Item, Err> Clone for Emitter<Item, Err> {
  fn clone(&self) -> Self {
    Emitter { observer: self.observer.clone(), subscription: self.subscription.clone() }
  }
}

impl<Item, Err> Emitter<Item, Err> {
  pub fn next(&mut self, value: Item) {
    if self.is_closed() {
      return;
    }
    if let Some(observer) = self.observer.borrow_mut().as_mut() {
      observer.next(value);
    }
  }

  pub fn error(&mut self, err: Err) {
    if self.subscription.is_closed() {
      return;
    }
    let observer = self.observer.borrow_mut().take();
    if let Some(mut observer) = observer {
      observer.error(err);
    }
  }

  pub fn complete(&mut self) {
    if self.subscription.is_closed() {
      return;
    }
    let observer = self.observer.borrow_mut().take();
    if let Some(mut observer) = observer {
      observer.complete();
    }
  }

  /// Whether pushing is pointless because nobody listens anymore.
  pub fn is_closed(&self) -> bool {
    self.subscription.is_closed()
      || self
        .observer
        .borrow()
        .as_ref()
        .map_or(true, |o| o.is_closed())
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn proxy_call() {
    let events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();

    create(|mut emitter: Emitter<i32, &'static str>| {
      emitter.next(1);
      emitter.next(2);
      emitter.next(3);
      emitter.complete();
      emitter.next(3);
      emitter.error("never dispatch error");
    })
    .subscribe_with(move |n| c_events.borrow_mut().push(n));

    assert_eq!(
      *events.borrow(),
      vec![
        Notification::Next(1),
        Notification::Next(2),
        Notification::Next(3),
        Notification::Complete
      ]
    );
  }

  #[test]
  fn production_runs_per_subscription() {
    let runs = Rc::new(RefCell::new(0));
    let c_runs = runs.clone();
    let source = create(move |mut emitter: Emitter<i32, &'static str>| {
      *c_runs.borrow_mut() += 1;
      emitter.next(1);
    });
    source.clone().subscribe(|_| {});
    source.subscribe(|_| {});
    assert_eq!(*runs.borrow(), 2);
  }

  #[test]
  fn teardown_runs_on_unsubscribe() {
    let torn = Rc::new(RefCell::new(false));
    let c_torn = torn.clone();
    let kept: Rc<RefCell<Option<Emitter<i32, &'static str>>>> = Rc::new(RefCell::new(None));
    let c_kept = kept.clone();
    let values = Rc::new(RefCell::new(vec![]));
    let c_values = values.clone();

    let subscription = create(move |emitter: Emitter<i32, &'static str>| {
      *c_kept.borrow_mut() = Some(emitter);
      Teardown::new(move || *c_torn.borrow_mut() = true)
    })
    .subscribe(move |v| c_values.borrow_mut().push(v));

    let mut emitter = kept.borrow_mut().take().unwrap();
    emitter.next(1);
    subscription.unsubscribe();
    emitter.next(2);

    assert!(*torn.borrow());
    assert!(emitter.is_closed());
    assert_eq!(*values.borrow(), vec![1]);
  }
}
