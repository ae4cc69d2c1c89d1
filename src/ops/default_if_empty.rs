use crate::{observable::Observable, observer::Observer, subscription::Subscription};

#[derive(Clone)]
pub struct DefaultIfEmptyOp<S, Item> {
  source: S,
  value: Item,
}

impl<S, Item> DefaultIfEmptyOp<S, Item> {
  pub(crate) fn new(source: S, value: Item) -> Self { DefaultIfEmptyOp { source, value } }
}

impl<S, Item> Observable for DefaultIfEmptyOp<S, Item>
where
  S: Observable<Item = Item>,
  Item: 'static,
{
  type Item = Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<Item, S::Err> + 'static,
  {
    let observer = DefaultIfEmptyObserver { observer, default: Some(self.value) };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct DefaultIfEmptyObserver<O, Item> {
  observer: O,
  /// Cleared by the first upstream value.
  default: Option<Item>,
}

impl<O, Item, Err> Observer<Item, Err> for DefaultIfEmptyObserver<O, Item>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    self.default = None;
    self.observer.next(value);
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  fn complete(&mut self) {
    if let Some(value) = self.default.take() {
      self.observer.next(value);
    }
    self.observer.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn base_function() {
    let events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    empty::<i32, Infallible>()
      .default_if_empty(5)
      .subscribe_with(move |n| c_events.borrow_mut().push(n));

    assert_eq!(*events.borrow(), vec![Notification::Next(5), Notification::Complete]);
  }

  #[test]
  fn non_empty_source_is_untouched() {
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    from_iter::<_, Infallible>(vec![1, 2])
      .default_if_empty(5)
      .subscribe(move |v| c_result.borrow_mut().push(v));

    assert_eq!(*result.borrow(), vec![1, 2]);
  }

  #[test]
  fn error_skips_default() {
    let events = Rc::new(RefCell::new(vec![]));
    let c_events = events.clone();
    throw_err::<i32, _>("boom")
      .default_if_empty(5)
      .subscribe_with(move |n| c_events.borrow_mut().push(n));

    assert_eq!(*events.borrow(), vec![Notification::Error("boom")]);
  }
}
