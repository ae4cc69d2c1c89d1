use std::marker::PhantomData;

use crate::{observable::Observable, observer::Observer, subscription::Subscription};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error.
/// Emission stops early once the subscription is closed, so an infinite
/// iterator combined with `take` terminates.
///
/// ```
/// use rxflow::prelude::*;
///
/// from_iter::<_, std::convert::Infallible>(vec![0, 1, 2, 3])
///   .subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> FromIter<Iter, Err>
where
  Iter: IntoIterator,
{
  FromIter { iter, _hint: PhantomData }
}

pub struct FromIter<Iter, Err> {
  iter: Iter,
  _hint: PhantomData<fn() -> Err>,
}

impl<Iter: Clone, Err> Clone for FromIter<Iter, Err> {
  fn clone(&self) -> Self { FromIter { iter: self.iter.clone(), _hint: PhantomData } }
}

impl<Iter, Err> Observable for FromIter<Iter, Err>
where
  Iter: IntoIterator,
{
  type Item = Iter::Item;
  type Err = Err;

  fn actual_subscribe<O>(self, mut observer: O, subscription: &Subscription)
  where
    O: Observer<Iter::Item, Err> + 'static,
  {
    for v in self.iter {
      if subscription.is_closed() || observer.is_closed() {
        return;
      }
      observer.next(v);
    }
    if !subscription.is_closed() {
      observer.complete();
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn from_range() {
    let hit_count = Rc::new(RefCell::new(0));
    let completed = Rc::new(RefCell::new(false));
    let (c_hit, c_completed) = (hit_count.clone(), completed.clone());
    from_iter::<_, Infallible>(0..100).subscribe_with(move |n| match n {
      Notification::Next(_) => *c_hit.borrow_mut() += 1,
      Notification::Complete => *c_completed.borrow_mut() = true,
      Notification::Error(e) => match e {},
    });

    assert_eq!(*hit_count.borrow(), 100);
    assert!(*completed.borrow());
  }

  #[test]
  fn infinite_iterator_stops_with_take() {
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    from_iter::<_, Infallible>(0..)
      .take(3)
      .subscribe(move |v| c_result.borrow_mut().push(v));
    assert_eq!(*result.borrow(), vec![0, 1, 2]);
  }

  #[test]
  fn stops_when_unsubscribed_from_inside() {
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    let subscription = Subscription::new();
    let c_subscription = subscription.clone();
    from_iter::<_, Infallible>(0..10).actual_subscribe(
      ObserverNext::new(move |v| {
        c_result.borrow_mut().push(v);
        if v == 2 {
          c_subscription.unsubscribe();
        }
      }),
      &subscription,
    );
    assert_eq!(*result.borrow(), vec![0, 1, 2]);
  }
}
