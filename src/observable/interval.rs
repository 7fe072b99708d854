use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use crate::subscription::{
  SerialSubscription, SharedSubscription, SubscriptionLike,
};
use crate::type_hint::TypeHint;

/// Emits an ascending counter every `period` on the given scheduler,
/// forever (until unsubscribed).
pub fn interval<Err, SD>(period: Duration, scheduler: SD) -> IntervalOp<Err, SD> {
  IntervalOp { period, scheduler, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct IntervalOp<Err, SD> {
  period: Duration,
  scheduler: SD,
  _hint: TypeHint<Err>,
}

impl<Err, SD> Observable for IntervalOp<Err, SD> {
  type Item = usize;
  type Err = Err;
}

impl<Err, SD> CoreObservable for IntervalOp<Err, SD>
where
  SD: Scheduler,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = usize, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let tick_slot = SerialSubscription::new();
    subscription.add(tick_slot.clone());
    schedule_tick(
      self.scheduler,
      self.period,
      Arc::new(Mutex::new(observer)),
      tick_slot,
      subscription.clone(),
      0,
    );
    subscription
  }
}

fn schedule_tick<SD, O>(
  scheduler: SD,
  period: Duration,
  observer: Arc<Mutex<O>>,
  tick_slot: SerialSubscription,
  subscription: SharedSubscription,
  n: usize,
) where
  SD: Scheduler,
  O: Observer<Item = usize> + Send + 'static,
{
  let task = {
    let scheduler = scheduler.clone();
    let tick_slot = tick_slot.clone();
    move |_: SharedSubscription| {
      if subscription.is_closed() {
        return;
      }
      observer.lock().unwrap().next(n);
      schedule_tick(scheduler, period, observer, tick_slot, subscription, n + 1);
    }
  };
  let tick = scheduler.schedule_delayed(task, period);
  tick_slot.set(tick);
}
