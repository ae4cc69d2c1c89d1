use crate::{observable::Observable, observer::Observer, subscription::Subscription};

#[derive(Clone)]
pub struct StartWithOp<S, Item> {
  source: S,
  value: Item,
}

impl<S, Item> StartWithOp<S, Item> {
  pub(crate) fn new(source: S, value: Item) -> Self { StartWithOp { source, value } }
}

impl<S, Item> Observable for StartWithOp<S, Item>
where
  S: Observable<Item = Item>,
{
  type Item = Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, mut observer: O, subscription: &Subscription)
  where
    O: Observer<Item, S::Err> + 'static,
  {
    observer.next(self.value);
    if subscription.is_closed() || observer.is_closed() {
      return;
    }
    self.source.actual_subscribe(observer, subscription)
  }
}

#[cfg(test)]
mod test {
  use std::{cell::RefCell, convert::Infallible, rc::Rc};

  use crate::prelude::*;

  #[test]
  fn prepends_value() {
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    from_iter::<_, Infallible>(vec![2, 3])
      .start_with(1)
      .subscribe(move |v| c_result.borrow_mut().push(v));

    assert_eq!(*result.borrow(), vec![1, 2, 3]);
  }

  #[test]
  fn upstream_skipped_when_downstream_is_done() {
    let subject = Subject::<i32, Infallible>::new();
    let result = Rc::new(RefCell::new(vec![]));
    let c_result = result.clone();
    subject
      .clone()
      .start_with(0)
      .take(1)
      .subscribe(move |v| c_result.borrow_mut().push(v));

    assert_eq!(*result.borrow(), vec![0]);
    assert_eq!(subject.subscriber_count(), 0);
  }
}
