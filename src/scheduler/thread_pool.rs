use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Sender};

use super::Scheduler;
use crate::subscription::{SharedSubscription, SubscriptionLike};

type Job = Box<dyn FnOnce() + Send>;

/// A fixed-size pool of worker threads sharing one unbounded work queue.
///
/// Cloning the scheduler clones the handle, not the pool.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  queue: Sender<Job>,
}

impl ThreadPoolScheduler {
  pub fn new(workers: usize) -> Self {
    let (queue, jobs) = unbounded::<Job>();
    for n in 0..workers.max(1) {
      let jobs = jobs.clone();
      thread::Builder::new()
        .name(format!("rx-computation-{n}"))
        .spawn(move || {
          while let Ok(job) = jobs.recv() {
            job();
          }
        })
        .expect("failed to spawn rx-computation worker");
    }
    ThreadPoolScheduler { queue }
  }

  fn enqueue<F>(&self, task: F, subscription: SharedSubscription)
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    let job: Job = Box::new(move || {
      if !subscription.is_closed() {
        task(subscription);
      }
    });
    if self.queue.send(job).is_err() {
      log::warn!("computation pool is gone; dropping scheduled work");
    }
  }
}

impl Scheduler for ThreadPoolScheduler {
  fn schedule<F>(&self, task: F) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    self.enqueue(task, subscription.clone());
    subscription
  }

  fn schedule_delayed<F>(&self, task: F, delay: Duration) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    if delay.is_zero() {
      return self.schedule(task);
    }
    let subscription = SharedSubscription::new();
    let timer_subscription = subscription.clone();
    let pool = self.clone();
    thread::Builder::new()
      .name("rx-computation-timer".into())
      .spawn(move || {
        thread::sleep(delay);
        if !timer_subscription.is_closed() {
          pool.enqueue(task, timer_subscription);
        }
      })
      .expect("failed to spawn rx-computation timer");
    subscription
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::mpsc::channel;
  use std::sync::Arc;

  #[test]
  fn executes_every_job() {
    let pool = ThreadPoolScheduler::new(2);
    let hits = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = channel();
    for _ in 0..16 {
      let hits = hits.clone();
      let tx = tx.clone();
      pool.schedule(move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
        tx.send(()).unwrap();
      });
    }
    for _ in 0..16 {
      rx.recv_timeout(Duration::from_secs(2)).unwrap();
    }
    assert_eq!(hits.load(Ordering::SeqCst), 16);
  }
}
