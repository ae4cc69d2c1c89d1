//! ForkJoin: wait for every source to complete and emit their last values.
//!
//! Behavior summary:
//! - Emits a single `Vec` holding the last value of each source, in the order
//!   the sources were given, once all of them completed; then completes.
//! - If a source completes without emitting, the result completes without
//!   emitting and the remaining sources are unsubscribed.
//! - The first error unsubscribes the remaining sources and is propagated; no
//!   `Vec` is emitted.
//! - An empty list of sources completes immediately.

use std::{cell::RefCell, rc::Rc};

use crate::{
  observable::Observable, observer::Observer, subscriber::Subscriber, subscription::Subscription,
};

pub fn fork_join<I, S>(sources: I) -> ForkJoin<S>
where
  I: IntoIterator<Item = S>,
  S: Observable,
{
  ForkJoin(sources.into_iter().collect())
}

#[derive(Clone)]
pub struct ForkJoin<S>(Vec<S>);

struct ForkJoinState<Item> {
  values: Vec<Option<Item>>,
  completed: usize,
  children: Vec<Subscription>,
}

struct ForkJoinShared<O, Item> {
  observer: RefCell<Option<O>>,
  state: RefCell<ForkJoinState<Item>>,
}

impl<O, Item> ForkJoinShared<O, Item> {
  fn is_done(&self) -> bool { self.observer.borrow().is_none() }

  fn cancel_sources(&self) {
    let children = std::mem::take(&mut self.state.borrow_mut().children);
    for child in children {
      child.unsubscribe();
    }
  }
}

impl<S> Observable for ForkJoin<S>
where
  S: Observable,
  S::Item: 'static,
  S::Err: 'static,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;

  fn actual_subscribe<O>(self, mut observer: O, subscription: &Subscription)
  where
    O: Observer<Vec<S::Item>, S::Err> + 'static,
  {
    let len = self.0.len();
    if len == 0 {
      observer.complete();
      return;
    }
    let shared = Rc::new(ForkJoinShared {
      observer: RefCell::new(Some(observer)),
      state: RefCell::new(ForkJoinState {
        values: (0..len).map(|_| None).collect(),
        completed: 0,
        children: Vec::with_capacity(len),
      }),
    });

    for (index, source) in self.0.into_iter().enumerate() {
      if shared.is_done() {
        break;
      }
      let child = Subscription::new();
      subscription.add(child.clone());
      shared.state.borrow_mut().children.push(child.clone());
      let observer = ForkJoinObserver { index, shared: shared.clone() };
      source.actual_subscribe(Subscriber::new(observer, child.clone()), &child);
    }
  }
}

pub struct ForkJoinObserver<O, Item> {
  index: usize,
  shared: Rc<ForkJoinShared<O, Item>>,
}

enum Outcome<Item> {
  Pending,
  Empty,
  Done(Vec<Item>),
}

impl<O, Item, Err> Observer<Item, Err> for ForkJoinObserver<O, Item>
where
  O: Observer<Vec<Item>, Err>,
{
  fn next(&mut self, value: Item) {
    if !self.shared.is_done() {
      self.shared.state.borrow_mut().values[self.index] = Some(value);
    }
  }

  fn error(&mut self, err: Err) {
    let observer = self.shared.observer.borrow_mut().take();
    if let Some(mut observer) = observer {
      self.shared.cancel_sources();
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if self.shared.is_done() {
      return;
    }
    let outcome = {
      let mut state = self.shared.state.borrow_mut();
      if state.values[self.index].is_none() {
        Outcome::Empty
      } else {
        state.completed += 1;
        if state.completed == state.values.len() {
          Outcome::Done(state.values.iter_mut().filter_map(Option::take).collect())
        } else {
          Outcome::Pending
        }
      }
    };
    match outcome {
      Outcome::Pending => {}
      Outcome::Empty => {
        let observer = self.shared.observer.borrow_mut().take();
        if let Some(mut observer) = observer {
          self.shared.cancel_sources();
          observer.complete();
        }
      }
      Outcome::Done(values) => {
        let observer = self.shared.observer.borrow_mut().take();
        if let Some(mut observer) = observer {
          observer.next(values);
          observer.complete();
        }
      }
    }
  }

  fn is_closed(&self) -> bool { self.shared.is_done() }
}
