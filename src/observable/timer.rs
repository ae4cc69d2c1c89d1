use std::{cell::RefCell, marker::PhantomData, rc::Rc, time::Duration};

use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, TaskHandle},
  subscription::Subscription,
};

/// Creates an observable that emits `()` once after `delay`, then completes.
pub fn timer<Err, SD>(delay: Duration, scheduler: SD) -> Timer<Err, SD>
where
  SD: Scheduler,
{
  Timer { delay, scheduler, _hint: PhantomData }
}

pub struct Timer<Err, SD> {
  delay: Duration,
  scheduler: SD,
  _hint: PhantomData<fn() -> Err>,
}

impl<Err, SD: Clone> Clone for Timer<Err, SD> {
  fn clone(&self) -> Self {
    Timer { delay: self.delay, scheduler: self.scheduler.clone(), _hint: PhantomData }
  }
}

impl<Err, SD> Observable for Timer<Err, SD>
where
  SD: Scheduler,
{
  type Item = ();
  type Err = Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<(), Err> + 'static,
  {
    let handle = self.scheduler.schedule(self.delay, move || {
      let mut observer = observer;
      observer.next(());
      observer.complete();
    });
    subscription.add_teardown(move || handle.cancel());
  }
}

/// Creates an observable that emits an increasing counter, starting at `0`,
/// every `period`. It never completes on its own.
pub fn interval<Err, SD>(period: Duration, scheduler: SD) -> Interval<Err, SD>
where
  SD: Scheduler,
{
  Interval { period, scheduler, _hint: PhantomData }
}

pub struct Interval<Err, SD> {
  period: Duration,
  scheduler: SD,
  _hint: PhantomData<fn() -> Err>,
}

impl<Err, SD: Clone> Clone for Interval<Err, SD> {
  fn clone(&self) -> Self {
    Interval { period: self.period, scheduler: self.scheduler.clone(), _hint: PhantomData }
  }
}

impl<Err, SD> Observable for Interval<Err, SD>
where
  SD: Scheduler,
  Err: 'static,
{
  type Item = usize;
  type Err = Err;

  fn actual_subscribe<O>(self, observer: O, subscription: &Subscription)
  where
    O: Observer<usize, Err> + 'static,
  {
    let slot = Rc::new(RefCell::new(TaskHandle::new()));
    tick::<O, Err, SD>(
      self.scheduler,
      self.period,
      0,
      Rc::new(RefCell::new(observer)),
      slot.clone(),
      subscription.clone(),
    );
    subscription.add_teardown(move || slot.borrow().cancel());
  }
}

fn tick<O, Err, SD>(
  scheduler: SD,
  period: Duration,
  count: usize,
  observer: Rc<RefCell<O>>,
  slot: Rc<RefCell<TaskHandle>>,
  subscription: Subscription,
) where
  O: Observer<usize, Err> + 'static,
  SD: Scheduler,
  Err: 'static,
{
  let c_scheduler = scheduler.clone();
  let c_slot = slot.clone();
  let handle = scheduler.schedule(period, move || {
    observer.borrow_mut().next(count);
    if subscription.is_closed() {
      return;
    }
    tick::<O, Err, SD>(c_scheduler, period, count + 1, observer, c_slot, subscription);
  });
  *slot.borrow_mut() = handle;
}
