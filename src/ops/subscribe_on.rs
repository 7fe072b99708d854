use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use crate::subscription::{
  SerialSubscription, SharedSubscription, SubscriptionLike,
};

/// Observable returned by [`Observable::subscribe_on`]: the subscription
/// call itself runs as scheduled work, and unsubscribing schedules the
/// upstream teardown on the same scheduler.
#[derive(Clone)]
pub struct SubscribeOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for SubscribeOnOp<S, SD>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, SD> CoreObservable for SubscribeOnOp<S, SD>
where
  S: CoreObservable + Send + 'static,
  SD: Scheduler,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let upstream = SerialSubscription::new();
    let source = self.source;
    let task_upstream = upstream.clone();
    let task = self.scheduler.schedule(move |task_subscription| {
      if !task_subscription.is_closed() {
        task_upstream.set(source.actual_subscribe(observer));
      }
    });
    subscription.add(task);
    subscription.add(ScheduledTeardown {
      scheduler: self.scheduler,
      inner: upstream,
      closed: false,
    });
    subscription
  }
}

/// Defers an inner teardown onto a scheduler.
struct ScheduledTeardown<SD> {
  scheduler: SD,
  inner: SerialSubscription,
  closed: bool,
}

impl<SD> SubscriptionLike for ScheduledTeardown<SD>
where
  SD: Scheduler,
{
  fn unsubscribe(&mut self) {
    if self.closed {
      return;
    }
    self.closed = true;
    let mut inner = self.inner.clone();
    self.scheduler.schedule(move |_| inner.unsubscribe());
  }

  fn is_closed(&self) -> bool { self.closed }
}
