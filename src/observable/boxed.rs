//! Type erasure for observables.
//!
//! Every operator returns its own concrete type, which is ideal for static
//! dispatch but makes it impossible to store different pipelines in the same
//! collection or to return different pipelines from branches of an `if`.
//! [`BoxedObservable`] hides the concrete type behind a trait object at the
//! cost of one allocation per subscribe.

use crate::{
  observable::Observable,
  observer::{BoxedObserver, Observer},
  subscription::Subscription,
};

/// Object-safe mirror of [`Observable`].
trait DynObservable<Item, Err> {
  fn dyn_subscribe(self: Box<Self>, observer: BoxedObserver<Item, Err>, subscription: &Subscription);
}

impl<T> DynObservable<T::Item, T::Err> for T
where
  T: Observable,
  T::Item: 'static,
  T::Err: 'static,
{
  fn dyn_subscribe(
    self: Box<Self>,
    observer: BoxedObserver<T::Item, T::Err>,
    subscription: &Subscription,
  ) {
    (*self).actual_subscribe(observer, subscription)
  }
}

/// An observable whose concrete type has been erased.
pub struct BoxedObservable<Item, Err>(Box<dyn DynObservable<Item, Err>>);

impl<Item: 'static, Err: 'static> BoxedObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item, Err = Err> + 'static,
  {
    BoxedObservable(Box::new(source))
  }
}

impl<Item: 'static, Err: 'static> Observable for BoxedObservable<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<Item, Err> + 'static,
  {
    self.0.dyn_subscribe(Box::new(observer), subscription)
  }
}
