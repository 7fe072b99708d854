use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::Scheduler;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// A virtual-time scheduler for deterministic tests.
///
/// Nothing runs until the clock is advanced explicitly. Advancing executes
/// every task whose due time falls inside the window, in due-time order
/// (FIFO among equal times); tasks that tasks schedule are picked up in
/// the same pass when they fall inside the window.
#[derive(Clone)]
pub struct TestScheduler {
  inner: Arc<Mutex<TestInner>>,
}

struct TestInner {
  origin: Instant,
  elapsed: Duration,
  queue: BinaryHeap<TestTask>,
  seq: u64,
}

struct TestTask {
  due: Duration,
  seq: u64,
  subscription: SharedSubscription,
  task: Box<dyn FnOnce(SharedSubscription) + Send>,
}

impl PartialEq for TestTask {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.seq == other.seq
  }
}

impl Eq for TestTask {}

impl PartialOrd for TestTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for TestTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earliest due time first, then FIFO by sequence.
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

impl TestScheduler {
  pub fn new() -> Self {
    TestScheduler {
      inner: Arc::new(Mutex::new(TestInner {
        origin: Instant::now(),
        elapsed: Duration::ZERO,
        queue: BinaryHeap::new(),
        seq: 0,
      })),
    }
  }

  /// The virtual time elapsed since the scheduler was created.
  pub fn elapsed(&self) -> Duration { self.inner.lock().unwrap().elapsed }

  /// Moves the clock forward by `delta`, running every task due in the
  /// window.
  pub fn advance_by(&self, delta: Duration) {
    let target = self.inner.lock().unwrap().elapsed + delta;
    self.run_until(target);
  }

  /// Moves the clock to the absolute virtual time `target` (no-op when the
  /// clock is already past it).
  pub fn advance_to(&self, target: Duration) { self.run_until(target); }

  /// Runs every task that is already due without moving the clock.
  pub fn trigger_actions(&self) {
    let target = self.inner.lock().unwrap().elapsed;
    self.run_until(target);
  }

  fn run_until(&self, target: Duration) {
    loop {
      let next = {
        let mut inner = self.inner.lock().unwrap();
        let due_now = inner
          .queue
          .peek()
          .map_or(false, |task| task.due <= target);
        if due_now {
          let task = inner.queue.pop().unwrap();
          if task.due > inner.elapsed {
            inner.elapsed = task.due;
          }
          Some(task)
        } else {
          if target > inner.elapsed {
            inner.elapsed = target;
          }
          None
        }
      };
      match next {
        Some(task) => {
          if !task.subscription.is_closed() {
            (task.task)(task.subscription.clone());
          }
        }
        None => break,
      }
    }
  }
}

impl Default for TestScheduler {
  fn default() -> Self { Self::new() }
}

impl Scheduler for TestScheduler {
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
    let mut inner = self.inner.lock().unwrap();
    inner.seq += 1;
    let seq = inner.seq;
    let due = inner.elapsed + delay;
    inner.queue.push(TestTask {
      due,
      seq,
      subscription: subscription.clone(),
      task: Box::new(task),
    });
    subscription
  }

  fn now(&self) -> Instant {
    let inner = self.inner.lock().unwrap();
    inner.origin + inner.elapsed
  }
}
