use std::marker::PhantomData;

use crate::{observable::Observable, observer::Observer, subscription::Subscription};

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
///
/// ```
/// use rxflow::prelude::*;
///
/// of::<_, std::convert::Infallible>(123).subscribe(|v| println!("{},", v));
/// ```
pub fn of<Item, Err>(v: Item) -> Of<Item, Err> { Of(v, PhantomData) }

pub struct Of<Item, Err>(Item, PhantomData<fn() -> Err>);

impl<Item: Clone, Err> Clone for Of<Item, Err> {
  fn clone(&self) -> Self { Of(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable for Of<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, mut observer: O, _: &Subscription)
  where
    O: Observer<Item, Err> + 'static,
  {
    observer.next(self.0);
    observer.complete();
  }
}

/// Creates an observable that completes without emitting any value.
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(PhantomData) }

pub struct Empty<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, Err> Observable for Empty<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, mut observer: O, _: &Subscription)
  where
    O: Observer<Item, Err> + 'static,
  {
    observer.complete();
  }
}

/// Creates an observable that never emits and never terminates.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(PhantomData) }

pub struct Never<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<Item, Err> Observable for Never<Item, Err> {
  type Item = Item;
  type Err = Err;

  #[inline]
  fn actual_subscribe<O>(self, _: O, _: &Subscription)
  where
    O: Observer<Item, Err> + 'static,
  {
  }
}

/// Creates an observable that emits no items and terminates with an error.
pub fn throw_err<Item, Err>(err: Err) -> ThrowErr<Item, Err> { ThrowErr(err, PhantomData) }

pub struct ThrowErr<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for ThrowErr<Item, Err> {
  fn clone(&self) -> Self { ThrowErr(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable for ThrowErr<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, mut observer: O, _: &Subscription)
  where
    O: Observer<Item, Err> + 'static,
  {
    observer.error(self.0);
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  fn record<S>(source: S) -> Rc<RefCell<Vec<Notification<i32, &'static str>>>>
  where
    S: Observable<Item = i32, Err = &'static str>,
  {
    let events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    source.subscribe_with(move |n| c_events.borrow_mut().push(n));
    events
  }

  #[test]
  fn of_emits_then_completes() {
    assert_eq!(*record(of(7)).borrow(), vec![Notification::Next(7), Notification::Complete]);
  }

  #[test]
  fn empty_only_completes() {
    assert_eq!(*record(empty()).borrow(), vec![Notification::Complete]);
  }

  #[test]
  fn never_is_silent() {
    assert!(record(never()).borrow().is_empty());
  }

  #[test]
  fn throw_err_only_errors() {
    assert_eq!(*record(throw_err("boom")).borrow(), vec![Notification::Error("boom")]);
  }

  #[test]
  fn of_is_cold() {
    let source = of::<_, Infallible>(1);
    let sum = Rc::new(RefCell::new(0));
    let (c1, c2) = (sum.clone(), sum.clone());
    source.clone().subscribe(move |v| *c1.borrow_mut() += v);
    source.subscribe(move |v| *c2.borrow_mut() += v);
    assert_eq!(*sum.borrow(), 2);
  }
}
