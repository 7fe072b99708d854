use std::thread;
use std::time::Duration;

use super::Scheduler;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// Spawns a dedicated thread for every unit of work.
#[derive(Clone, Copy, Default)]
pub struct NewThreadScheduler;

impl Scheduler for NewThreadScheduler {
  fn schedule<F>(&self, task: F) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    self.schedule_delayed(task, Duration::ZERO)
  }

  fn schedule_delayed<F>(&self, task: F, delay: Duration) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let worker_subscription = subscription.clone();
    thread::Builder::new()
      .name("rx-new-thread".into())
      .spawn(move || {
        if !delay.is_zero() {
          thread::sleep(delay);
        }
        if !worker_subscription.is_closed() {
          task(worker_subscription);
        }
      })
      .expect("failed to spawn rx-new-thread worker");
    subscription
  }
}
