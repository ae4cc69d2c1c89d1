//! Finalize operator
//!
//! Calls a function exactly once when the stream ends, whichever way it
//! ends: completion, error or unsubscribe. On a terminal notification the
//! function runs after the notification was forwarded downstream.

use std::{cell::RefCell, rc::Rc};

use crate::{observable::Observable, observer::Observer, subscription::Subscription};

#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> FinalizeOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { FinalizeOp { source, func } }
}

type SharedFinalizer<F> = Rc<RefCell<Option<F>>>;

fn run_once<F: FnOnce()>(func: &SharedFinalizer<F>) {
  let func = func.borrow_mut().take();
  if let Some(func) = func {
    func();
  }
}

impl<S, F> Observable for FinalizeOp<S, F>
where
  S: Observable,
  F: FnOnce() + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let func: SharedFinalizer<F> = Rc::new(RefCell::new(Some(self.func)));
    let c_func = func.clone();
    subscription.add_teardown(move || run_once(&c_func));
    self
      .source
      .actual_subscribe(FinalizeObserver { observer, func }, subscription)
  }
}

pub struct FinalizeObserver<O, F> {
  observer: O,
  func: SharedFinalizer<F>,
}

impl<O, F, Item, Err> Observer<Item, Err> for FinalizeObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(&mut self, err: Err) {
    self.observer.error(err);
    run_once(&self.func);
  }

  fn complete(&mut self) {
    self.observer.complete();
    run_once(&self.func);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
