//! MergeMap operator
//!
//! Maps every source value to an inner observable and forwards the values of
//! all inner observables as they arrive.
//!
//! Behavior summary:
//! - At most `concurrent` inner observables are subscribed at a time. Values
//!   arriving while saturated are buffered and mapped, in arrival order, when
//!   an inner observable completes. `concat_map` is the `concurrent == 1`
//!   case.
//! - Completes once the source completed, every inner observable completed
//!   and the buffer is empty.
//! - The first error, from the source or from any inner observable, cancels
//!   every other inner observable before it is forwarded downstream.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use crate::{
  observable::Observable, observer::Observer, subscriber::Subscriber,
  subscription::Subscription,
};

#[derive(Clone)]
pub struct MergeMapOp<S, F> {
  source: S,
  func: F,
  concurrent: usize,
}

impl<S, F> MergeMapOp<S, F> {
  pub(crate) fn new(source: S, func: F, concurrent: usize) -> Self {
    MergeMapOp { source, func, concurrent: concurrent.max(1) }
  }
}

struct MergeMapState<Item> {
  active: usize,
  buffer: VecDeque<Item>,
  inners: Vec<Subscription>,
  outer_completed: bool,
  closed: bool,
  draining: bool,
}

#[doc(hidden)]
pub struct MergeMapShared<O, F, Item> {
  observer: RefCell<O>,
  func: RefCell<F>,
  state: RefCell<MergeMapState<Item>>,
  subscription: Subscription,
  concurrent: usize,
}

impl<O, F, Item, Inner> MergeMapShared<O, F, Item>
where
  O: Observer<Inner::Item, Inner::Err> + 'static,
  F: FnMut(Item) -> Inner + 'static,
  Inner: Observable,
  Item: 'static,
{
  fn is_closed(&self) -> bool { self.state.borrow().closed }

  /// Subscribe buffered values while there is capacity, then complete if
  /// nothing is left to wait for.
  ///
  /// Inner observables completing synchronously re-enter here; the nested
  /// call returns at once and the outer loop picks up their capacity, so the
  /// stack stays flat however long the buffer is.
  fn drain(self: &Rc<Self>) {
    {
      let mut state = self.state.borrow_mut();
      if state.draining {
        return;
      }
      state.draining = true;
    }
    loop {
      let value = {
        let mut state = self.state.borrow_mut();
        if state.closed || state.active >= self.concurrent {
          None
        } else {
          let value = state.buffer.pop_front();
          if value.is_some() {
            state.active += 1;
          }
          value
        }
      };
      match value {
        Some(value) => self.subscribe_inner(value),
        None => break,
      }
    }
    let done = {
      let mut state = self.state.borrow_mut();
      state.draining = false;
      let done =
        !state.closed && state.outer_completed && state.active == 0 && state.buffer.is_empty();
      if done {
        state.closed = true;
      }
      done
    };
    if done {
      self.observer.borrow_mut().complete();
    }
  }

  fn subscribe_inner(self: &Rc<Self>, value: Item) {
    let inner = {
      let mut func = self.func.borrow_mut();
      (*func)(value)
    };
    let child = Subscription::new();
    self.subscription.add(child.clone());
    self.state.borrow_mut().inners.push(child.clone());
    let observer = MergeMapInnerObserver { shared: self.clone(), subscription: child.clone() };
    inner.actual_subscribe(Subscriber::new(observer, child.clone()), &child);
  }

  fn error(&self, err: Inner::Err, origin: Option<&Subscription>) {
    let siblings = {
      let mut state = self.state.borrow_mut();
      if state.closed {
        return;
      }
      state.closed = true;
      state.buffer.clear();
      std::mem::take(&mut state.inners)
    };
    tracing::debug!(cancelled = siblings.len(), "merge_map error, cancelling inner observables");
    for sibling in siblings {
      if Some(&sibling) != origin {
        self.subscription.remove(&sibling);
        sibling.unsubscribe();
      }
    }
    self.observer.borrow_mut().error(err);
  }
}

impl<S, F, Inner> Observable for MergeMapOp<S, F>
where
  S: Observable,
  S::Item: 'static,
  F: FnMut(S::Item) -> Inner + 'static,
  Inner: Observable<Err = S::Err>,
{
  type Item = Inner::Item;
  type Err = S::Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<Inner::Item, S::Err> + 'static,
  {
    let shared = Rc::new(MergeMapShared {
      observer: RefCell::new(observer),
      func: RefCell::new(self.func),
      state: RefCell::new(MergeMapState {
        active: 0,
        buffer: VecDeque::new(),
        inners: Vec::new(),
        outer_completed: false,
        closed: false,
        draining: false,
      }),
      subscription: subscription.clone(),
      concurrent: self.concurrent,
    });
    self
      .source
      .actual_subscribe(MergeMapOuterObserver { shared }, subscription)
  }
}

pub struct MergeMapOuterObserver<O, F, Item> {
  shared: Rc<MergeMapShared<O, F, Item>>,
}

impl<O, F, Item, Inner> Observer<Item, Inner::Err> for MergeMapOuterObserver<O, F, Item>
where
  O: Observer<Inner::Item, Inner::Err> + 'static,
  F: FnMut(Item) -> Inner + 'static,
  Inner: Observable,
  Item: 'static,
{
  fn next(&mut self, value: Item) {
    {
      let mut state = self.shared.state.borrow_mut();
      if state.closed {
        return;
      }
      state.buffer.push_back(value);
    }
    self.shared.drain();
  }

  fn error(&mut self, err: Inner::Err) { self.shared.error(err, None) }

  fn complete(&mut self) {
    {
      let mut state = self.shared.state.borrow_mut();
      if state.closed {
        return;
      }
      state.outer_completed = true;
    }
    self.shared.drain();
  }

  fn is_closed(&self) -> bool { self.shared.is_closed() }
}

pub struct MergeMapInnerObserver<O, F, Item> {
  shared: Rc<MergeMapShared<O, F, Item>>,
  subscription: Subscription,
}

impl<O, F, Item, Inner> Observer<Inner::Item, Inner::Err> for MergeMapInnerObserver<O, F, Item>
where
  O: Observer<Inner::Item, Inner::Err> + 'static,
  F: FnMut(Item) -> Inner + 'static,
  Inner: Observable,
  Item: 'static,
{
  fn next(&mut self, value: Inner::Item) {
    if !self.shared.is_closed() {
      self.shared.observer.borrow_mut().next(value);
    }
  }

  fn error(&mut self, err: Inner::Err) { self.shared.error(err, Some(&self.subscription)) }

  fn complete(&mut self) {
    self.shared.subscription.remove(&self.subscription);
    {
      let mut state = self.shared.state.borrow_mut();
      if state.closed {
        return;
      }
      state.inners.retain(|s| s != &self.subscription);
      state.active -= 1;
    }
    self.shared.drain();
  }

  fn is_closed(&self) -> bool { self.shared.is_closed() || self.subscription.is_closed() }
}
