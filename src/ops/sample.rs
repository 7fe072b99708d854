use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use crate::subscription::{
  SerialSubscription, SharedSubscription, SubscriptionLike,
};

/// Observable returned by [`Observable::sample`]: on each periodic tick,
/// emits the most recent upstream value if one arrived since the
/// previous tick. The first tick fires one period after subscription;
/// quiet periods emit nothing.
#[derive(Clone)]
pub struct SampleOp<S, SD> {
  pub(crate) source: S,
  pub(crate) period: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for SampleOp<S, SD>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, SD> CoreObservable for SampleOp<S, SD>
where
  S: CoreObservable,
  SD: Scheduler,
  S::Item: Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let tick_slot = SerialSubscription::new();
    subscription.add(tick_slot.clone());
    let latest = Arc::new(Mutex::new(None));
    let observer = Arc::new(Mutex::new(observer));
    schedule_sample_tick(
      self.scheduler,
      self.period,
      latest.clone(),
      observer.clone(),
      tick_slot,
      subscription.clone(),
    );
    let upstream = self.source.actual_subscribe(SampleObserver {
      latest,
      observer,
      subscription: subscription.clone(),
    });
    subscription.add(upstream);
    subscription
  }
}

fn schedule_sample_tick<SD, O, Item>(
  scheduler: SD,
  period: Duration,
  latest: Arc<Mutex<Option<Item>>>,
  observer: Arc<Mutex<O>>,
  tick_slot: SerialSubscription,
  subscription: SharedSubscription,
) where
  SD: Scheduler,
  O: Observer<Item = Item> + Send + 'static,
  Item: Send + 'static,
{
  let task = {
    let scheduler = scheduler.clone();
    let tick_slot = tick_slot.clone();
    move |_: SharedSubscription| {
      if subscription.is_closed() {
        return;
      }
      let pending = latest.lock().unwrap().take();
      if let Some(value) = pending {
        observer.lock().unwrap().next(value);
      }
      schedule_sample_tick(
        scheduler,
        period,
        latest,
        observer,
        tick_slot,
        subscription,
      );
    }
  };
  let tick = scheduler.schedule_delayed(task, period);
  tick_slot.set(tick);
}

pub struct SampleObserver<O, Item> {
  latest: Arc<Mutex<Option<Item>>>,
  observer: Arc<Mutex<O>>,
  subscription: SharedSubscription,
}

impl<O, Item> Observer for SampleObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    *self.latest.lock().unwrap() = Some(value);
  }

  fn error(&mut self, err: Self::Err) {
    self.subscription.unsubscribe();
    self.observer.lock().unwrap().error(err);
  }

  fn complete(&mut self) {
    self.subscription.unsubscribe();
    self.observer.lock().unwrap().complete();
  }

  fn is_stopped(&self) -> bool { self.subscription.is_closed() }
}
