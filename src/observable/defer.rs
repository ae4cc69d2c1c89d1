use crate::{observable::Observable, observer::Observer, subscription::Subscription};

/// Creates an observable that calls `factory` at subscription time and
/// subscribes to the observable it returns.
///
/// Useful to wrap side effects that must happen per subscriber, e.g. a request
/// performed by an external collaborator.
pub fn defer<F, S>(factory: F) -> Defer<F>
where
  F: FnOnce() -> S,
  S: Observable,
{
  Defer(factory)
}

#[derive(Clone)]
pub struct Defer<F>(F);

impl<F, S> Observable for Defer<F>
where
  F: FnOnce() -> S,
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    (self.0)().actual_subscribe(observer, subscription)
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn factory_runs_per_subscription() {
    let calls = Rc::new(RefCell::new(0));
    let c_calls = calls.clone();
    let source = defer(move || {
      *c_calls.borrow_mut() += 1;
      of::<_, Infallible>(*c_calls.borrow())
    });

    let seen = Rc::new(RefCell::new(vec![]));
    let (c1, c2) = (seen.clone(), seen.clone());
    source.clone().subscribe(move |v| c1.borrow_mut().push(v));
    assert_eq!(*calls.borrow(), 1);
    source.subscribe(move |v| c2.borrow_mut().push(v));

    assert_eq!(*calls.borrow(), 2);
    assert_eq!(*seen.borrow(), vec![1, 2]);
  }
}
