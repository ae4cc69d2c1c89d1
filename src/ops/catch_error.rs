//! CatchError operator
//!
//! On an upstream error, unsubscribes the upstream and continues with the
//! observable returned by the handler. Only errors raised upstream of the
//! operator are caught; the replacement's own errors reach the downstream
//! observer as they are.

use crate::{observable::Observable, observer::Observer, subscription::Subscription};

#[derive(Clone)]
pub struct CatchErrorOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> CatchErrorOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { CatchErrorOp { source, func } }
}

impl<S, F, R> Observable for CatchErrorOp<S, F>
where
  S: Observable,
  F: FnOnce(S::Err) -> R + 'static,
  R: Observable<Item = S::Item>,
{
  type Item = S::Item;
  type Err = R::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<S::Item, R::Err> + 'static,
  {
    // The upstream lives under its own child so it can be released on its
    // own when the replacement takes over.
    let upstream = Subscription::new();
    subscription.add(upstream.clone());
    let observer = CatchErrorObserver {
      observer: Some(observer),
      func: Some(self.func),
      upstream: upstream.clone(),
      subscription: subscription.clone(),
    };
    self.source.actual_subscribe(observer, &upstream)
  }
}

pub struct CatchErrorObserver<O, F> {
  observer: Option<O>,
  func: Option<F>,
  upstream: Subscription,
  subscription: Subscription,
}

impl<O, F, Item, Err, R> Observer<Item, Err> for CatchErrorObserver<O, F>
where
  O: Observer<Item, R::Err> + 'static,
  F: FnOnce(Err) -> R,
  R: Observable<Item = Item>,
{
  fn next(&mut self, value: Item) {
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    let (Some(observer), Some(func)) = (self.observer.take(), self.func.take()) else {
      return;
    };
    self.subscription.remove(&self.upstream);
    self.upstream.unsubscribe();
    tracing::debug!("upstream error caught, switching to the replacement observable");
    if self.subscription.is_closed() {
      return;
    }
    func(err).actual_subscribe(observer, &self.subscription);
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.as_ref().map_or(true, |o| o.is_closed()) }
}
