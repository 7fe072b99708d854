use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use super::Scheduler;
use crate::subscription::{SharedSubscription, SubscriptionLike};

const KEEP_ALIVE: Duration = Duration::from_secs(60);

type Job = Box<dyn FnOnce() + Send>;

struct Inner {
  queue: Sender<Job>,
  jobs: Receiver<Job>,
  idle: AtomicUsize,
  spawned: AtomicUsize,
}

/// A cached, unbounded pool: a new worker is spawned whenever no idle one
/// is available, and idle workers exit after a keep-alive period.
#[derive(Clone)]
pub struct IoScheduler {
  inner: Arc<Inner>,
}

impl IoScheduler {
  pub fn new() -> Self {
    let (queue, jobs) = unbounded::<Job>();
    IoScheduler {
      inner: Arc::new(Inner {
        queue,
        jobs,
        idle: AtomicUsize::new(0),
        spawned: AtomicUsize::new(0),
      }),
    }
  }

  fn submit(&self, job: Job) {
    if self.inner.idle.load(Ordering::SeqCst) == 0 {
      self.spawn_worker();
    }
    if self.inner.queue.send(job).is_err() {
      log::warn!("io pool is gone; dropping scheduled work");
    }
  }

  fn spawn_worker(&self) {
    let inner = self.inner.clone();
    let n = inner.spawned.fetch_add(1, Ordering::SeqCst);
    thread::Builder::new()
      .name(format!("rx-io-{n}"))
      .spawn(move || loop {
        inner.idle.fetch_add(1, Ordering::SeqCst);
        let received = inner.jobs.recv_timeout(KEEP_ALIVE);
        inner.idle.fetch_sub(1, Ordering::SeqCst);
        match received {
          Ok(job) => job(),
          Err(RecvTimeoutError::Timeout) => break,
          Err(RecvTimeoutError::Disconnected) => break,
        }
      })
      .expect("failed to spawn rx-io worker");
  }
}

impl Default for IoScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for IoScheduler {
  fn schedule<F>(&self, task: F) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let job_subscription = subscription.clone();
    self.submit(Box::new(move || {
      if !job_subscription.is_closed() {
        task(job_subscription);
      }
    }));
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
      .name("rx-io-timer".into())
      .spawn(move || {
        thread::sleep(delay);
        if timer_subscription.is_closed() {
          return;
        }
        let job_subscription = timer_subscription;
        pool.submit(Box::new(move || {
          if !job_subscription.is_closed() {
            task(job_subscription);
          }
        }));
      })
      .expect("failed to spawn rx-io timer");
    subscription
  }
}
