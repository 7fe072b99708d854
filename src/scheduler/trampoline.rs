use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::thread;
use std::time::{Duration, Instant};

use super::Scheduler;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// The current-thread scheduler.
///
/// Work scheduled while no work is running executes immediately; work
/// scheduled from inside running work is queued and drained afterwards in
/// due-time order, which avoids unbounded reentrancy on the caller's
/// stack.
#[derive(Clone, Copy, Default)]
pub struct TrampolineScheduler;

struct QueuedTask {
  due: Instant,
  seq: u64,
  subscription: SharedSubscription,
  task: Box<dyn FnOnce(SharedSubscription)>,
}

impl PartialEq for QueuedTask {
  fn eq(&self, other: &Self) -> bool {
    self.due == other.due && self.seq == other.seq
  }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for QueuedTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earliest due time first, then FIFO by sequence.
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

struct TrampolineState {
  queue: BinaryHeap<QueuedTask>,
  seq: u64,
  draining: bool,
}

thread_local! {
  static TRAMPOLINE: RefCell<TrampolineState> =
    RefCell::new(TrampolineState {
      queue: BinaryHeap::new(),
      seq: 0,
      draining: false,
    });
}

impl TrampolineScheduler {
  fn enqueue(
    &self,
    task: Box<dyn FnOnce(SharedSubscription)>,
    delay: Duration,
  ) -> SharedSubscription {
    let subscription = SharedSubscription::new();
    let became_drainer = TRAMPOLINE.with(|state| {
      let mut state = state.borrow_mut();
      state.seq += 1;
      let seq = state.seq;
      state.queue.push(QueuedTask {
        due: Instant::now() + delay,
        seq,
        subscription: subscription.clone(),
        task,
      });
      if state.draining {
        false
      } else {
        state.draining = true;
        true
      }
    });
    if became_drainer {
      loop {
        let next = TRAMPOLINE.with(|state| state.borrow_mut().queue.pop());
        match next {
          Some(queued) => {
            let now = Instant::now();
            if queued.due > now {
              thread::sleep(queued.due - now);
            }
            if !queued.subscription.is_closed() {
              (queued.task)(queued.subscription);
            }
          }
          None => {
            TRAMPOLINE.with(|state| state.borrow_mut().draining = false);
            break;
          }
        }
      }
    }
    subscription
  }
}

impl Scheduler for TrampolineScheduler {
  fn schedule<F>(&self, task: F) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    self.enqueue(Box::new(task), Duration::ZERO)
  }

  fn schedule_delayed<F>(&self, task: F, delay: Duration) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static,
  {
    self.enqueue(Box::new(task), delay)
  }
}
