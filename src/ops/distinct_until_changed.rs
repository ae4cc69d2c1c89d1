use crate::{observable::Observable, observer::Observer, subscription::Subscription};

/// Equality used by `distinct_until_changed`, `eq(previous, current)`.
pub type EqFn<Item> = fn(&Item, &Item) -> bool;

#[derive(Clone)]
pub struct DistinctUntilChangedOp<S, F> {
  source: S,
  eq: F,
}

impl<S, F> DistinctUntilChangedOp<S, F> {
  pub(crate) fn new(source: S, eq: F) -> Self { DistinctUntilChangedOp { source, eq } }
}

impl<S, F> Observable for DistinctUntilChangedOp<S, F>
where
  S: Observable,
  S::Item: Clone + 'static,
  F: FnMut(&S::Item, &S::Item) -> bool + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, S::Err> + 'static,
  {
    let observer = DistinctUntilChangedObserver { observer, eq: self.eq, last: None };
    self.source.actual_subscribe(observer, subscription)
  }
}

pub struct DistinctUntilChangedObserver<O, F, Item> {
  observer: O,
  eq: F,
  last: Option<Item>,
}

impl<O, F, Item, Err> Observer<Item, Err> for DistinctUntilChangedObserver<O, F, Item>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item, &Item) -> bool,
  Item: Clone,
{
  fn next(&mut self, value: Item) {
    let changed = match &self.last {
      Some(last) => !(self.eq)(last, &value),
      None => true,
    };
    if changed {
      self.last = Some(value.clone());
      self.observer.next(value);
    }
  }

  #[inline]
  fn error(&mut self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(&mut self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
