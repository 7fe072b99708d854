use std::thread;
use std::time::Duration;

use super::Scheduler;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// Executes work synchronously on the caller's thread; delayed work sleeps
/// the caller.
#[derive(Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn schedule<F>(&self, task: F) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    task(subscription.clone());
    subscription
  }

  fn schedule_delayed<F>(&self, task: F, delay: Duration) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    if !delay.is_zero() {
      thread::sleep(delay);
    }
    let subscription = SharedSubscription::new();
    if !subscription.is_closed() {
      task(subscription.clone());
    }
    subscription
  }
}
