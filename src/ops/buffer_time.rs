use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use crate::subscription::{
  SerialSubscription, SharedSubscription, SubscriptionLike,
};

/// Observable returned by [`Observable::buffer_time`] and
/// [`Observable::buffer_time_shift`].
///
/// A window opens every `timeshift` (the first immediately) and closes
/// `timespan` later, emitting whatever it gathered — an empty list when
/// the window stayed quiet. Windows overlap when `timeshift < timespan`.
/// On upstream terminal, non-empty partial windows are flushed.
#[derive(Clone)]
pub struct BufferTimeOp<S, SD> {
  pub(crate) source: S,
  pub(crate) timespan: Duration,
  pub(crate) timeshift: Duration,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for BufferTimeOp<S, SD>
where
  S: Observable,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

struct TimedWindows<Item> {
  windows: Vec<(u64, Vec<Item>)>,
  next_id: u64,
  stopped: bool,
}

impl<S, SD> CoreObservable for BufferTimeOp<S, SD>
where
  S: CoreObservable,
  SD: Scheduler,
  S::Item: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let open_slot = SerialSubscription::new();
    subscription.add(open_slot.clone());
    let state = Arc::new(Mutex::new(TimedWindows {
      windows: Vec::new(),
      next_id: 0,
      stopped: false,
    }));
    let observer = Arc::new(Mutex::new(observer));

    open_window(
      self.scheduler,
      self.timespan,
      self.timeshift,
      state.clone(),
      observer.clone(),
      open_slot,
      subscription.clone(),
    );
    let upstream = self.source.actual_subscribe(BufferTimeObserver {
      state,
      observer,
      subscription: subscription.clone(),
    });
    subscription.add(upstream);
    subscription
  }
}

fn close_window<O, Item>(
  state: &Arc<Mutex<TimedWindows<Item>>>,
  observer: &Arc<Mutex<O>>,
  id: u64,
) where
  O: Observer<Item = Vec<Item>>,
{
  let window = {
    let mut state = state.lock().unwrap();
    if state.stopped {
      return;
    }
    state
      .windows
      .iter()
      .position(|(window_id, _)| *window_id == id)
      .map(|index| state.windows.remove(index).1)
  };
  if let Some(window) = window {
    observer.lock().unwrap().next(window);
  }
}

fn open_window<SD, O, Item>(
  scheduler: SD,
  timespan: Duration,
  timeshift: Duration,
  state: Arc<Mutex<TimedWindows<Item>>>,
  observer: Arc<Mutex<O>>,
  open_slot: SerialSubscription,
  subscription: SharedSubscription,
) where
  SD: Scheduler,
  O: Observer<Item = Vec<Item>> + Send + 'static,
  Item: Send + 'static,
{
  if subscription.is_closed() {
    return;
  }
  let id = {
    let mut state = state.lock().unwrap();
    if state.stopped {
      return;
    }
    state.next_id += 1;
    let id = state.next_id;
    state.windows.push((id, Vec::new()));
    id
  };
  // Close this window after `timespan`.
  {
    let state = state.clone();
    let observer = observer.clone();
    let subscription = subscription.clone();
    scheduler.schedule_delayed(
      move |_| {
        if !subscription.is_closed() {
          close_window(&state, &observer, id);
        }
      },
      timespan,
    );
  }
  // Open the next one after `timeshift`.
  let reopen = {
    let scheduler = scheduler.clone();
    let open_slot = open_slot.clone();
    move |_: SharedSubscription| {
      open_window(
        scheduler,
        timespan,
        timeshift,
        state,
        observer,
        open_slot,
        subscription,
      );
    }
  };
  let next_open = scheduler.schedule_delayed(reopen, timeshift);
  open_slot.set(next_open);
}

pub struct BufferTimeObserver<O, Item> {
  state: Arc<Mutex<TimedWindows<Item>>>,
  observer: Arc<Mutex<O>>,
  subscription: SharedSubscription,
}

impl<O, Item> Observer for BufferTimeObserver<O, Item>
where
  O: Observer<Item = Vec<Item>>,
  Item: Clone,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    let mut state = self.state.lock().unwrap();
    if state.stopped {
      return;
    }
    for (_, window) in &mut state.windows {
      window.push(value.clone());
    }
  }

  fn error(&mut self, err: Self::Err) {
    {
      let mut state = self.state.lock().unwrap();
      state.stopped = true;
      state.windows.clear();
    }
    self.subscription.unsubscribe();
    self.observer.lock().unwrap().error(err);
  }

  fn complete(&mut self) {
    let flushed = {
      let mut state = self.state.lock().unwrap();
      state.stopped = true;
      std::mem::take(&mut state.windows)
    };
    self.subscription.unsubscribe();
    let mut observer = self.observer.lock().unwrap();
    for (_, window) in flushed {
      if !window.is_empty() && !observer.is_stopped() {
        observer.next(window);
      }
    }
    if !observer.is_stopped() {
      observer.complete();
    }
  }

  fn is_stopped(&self) -> bool { self.state.lock().unwrap().stopped }
}

/// Observable returned by [`Observable::buffer_time_count`]: one active
/// buffer, emitted when it reaches `count` values or when `timespan`
/// elapses since it opened, whichever happens first.
#[derive(Clone)]
pub struct BufferTimeCountOp<S, SD> {
  pub(crate) source: S,
  pub(crate) timespan: Duration,
  pub(crate) count: usize,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for BufferTimeCountOp<S, SD>
where
  S: Observable,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

struct ChunkState<Item> {
  buffer: Vec<Item>,
  generation: u64,
  stopped: bool,
}

impl<S, SD> CoreObservable for BufferTimeCountOp<S, SD>
where
  S: CoreObservable,
  SD: Scheduler + 'static,
  S::Item: Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(ChunkState {
      buffer: Vec::new(),
      generation: 0,
      stopped: false,
    }));
    let observer = Arc::new(Mutex::new(observer));
    schedule_chunk_close(
      self.scheduler.clone(),
      self.timespan,
      state.clone(),
      observer.clone(),
      subscription.clone(),
      0,
    );
    let upstream = self.source.actual_subscribe(BufferTimeCountObserver {
      state,
      observer,
      subscription: subscription.clone(),
      scheduler: self.scheduler,
      timespan: self.timespan,
      count: self.count.max(1),
    });
    subscription.add(upstream);
    subscription
  }
}

fn schedule_chunk_close<SD, O, Item>(
  scheduler: SD,
  timespan: Duration,
  state: Arc<Mutex<ChunkState<Item>>>,
  observer: Arc<Mutex<O>>,
  subscription: SharedSubscription,
  generation: u64,
) where
  SD: Scheduler,
  O: Observer<Item = Vec<Item>> + Send + 'static,
  Item: Send + 'static,
{
  let task = {
    let scheduler = scheduler.clone();
    move |_: SharedSubscription| {
      if subscription.is_closed() {
        return;
      }
      let flushed = {
        let mut state = state.lock().unwrap();
        if state.stopped || state.generation != generation {
          return;
        }
        state.generation += 1;
        std::mem::take(&mut state.buffer)
      };
      observer.lock().unwrap().next(flushed);
      schedule_chunk_close(
        scheduler,
        timespan,
        state,
        observer,
        subscription,
        generation + 1,
      );
    }
  };
  scheduler.schedule_delayed(task, timespan);
}

pub struct BufferTimeCountObserver<O, SD, Item> {
  state: Arc<Mutex<ChunkState<Item>>>,
  observer: Arc<Mutex<O>>,
  subscription: SharedSubscription,
  scheduler: SD,
  timespan: Duration,
  count: usize,
}

impl<O, SD, Item> Observer for BufferTimeCountObserver<O, SD, Item>
where
  O: Observer<Item = Vec<Item>> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    let flushed = {
      let mut state = self.state.lock().unwrap();
      if state.stopped {
        return;
      }
      state.buffer.push(value);
      if state.buffer.len() >= self.count {
        state.generation += 1;
        let generation = state.generation;
        Some((std::mem::take(&mut state.buffer), generation))
      } else {
        None
      }
    };
    if let Some((chunk, generation)) = flushed {
      self.observer.lock().unwrap().next(chunk);
      schedule_chunk_close(
        self.scheduler.clone(),
        self.timespan,
        self.state.clone(),
        self.observer.clone(),
        self.subscription.clone(),
        generation,
      );
    }
  }

  fn error(&mut self, err: Self::Err) {
    {
      let mut state = self.state.lock().unwrap();
      state.stopped = true;
      state.buffer.clear();
    }
    self.subscription.unsubscribe();
    self.observer.lock().unwrap().error(err);
  }

  fn complete(&mut self) {
    let flushed = {
      let mut state = self.state.lock().unwrap();
      state.stopped = true;
      std::mem::take(&mut state.buffer)
    };
    self.subscription.unsubscribe();
    let mut observer = self.observer.lock().unwrap();
    if !flushed.is_empty() && !observer.is_stopped() {
      observer.next(flushed);
    }
    if !observer.is_stopped() {
      observer.complete();
    }
  }

  fn is_stopped(&self) -> bool { self.state.lock().unwrap().stopped }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;

  #[test]
  fn windows_close_on_schedule() {
    let scheduler = TestScheduler::new();
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut subject = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    subject
      .clone()
      .buffer_time(Duration::from_secs(1), scheduler.clone())
      .subscribe(move |window| c_emitted.lock().unwrap().push(window));

    subject.next(1);
    subject.next(2);
    scheduler.advance_by(Duration::from_secs(1));
    subject.next(3);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1, 2], vec![3]]);
  }

  #[test]
  fn quiet_window_emits_an_empty_list() {
    let scheduler = TestScheduler::new();
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut subject = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    subject
      .clone()
      .buffer_time(Duration::from_secs(1), scheduler.clone())
      .subscribe(move |window| c_emitted.lock().unwrap().push(window));
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(*emitted.lock().unwrap(), vec![Vec::<i32>::new()]);
    subject.complete();
  }

  #[test]
  fn overlapping_windows_share_values() {
    let scheduler = TestScheduler::new();
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut subject = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    subject
      .clone()
      .buffer_time_shift(
        Duration::from_secs(2),
        Duration::from_secs(1),
        scheduler.clone(),
      )
      .subscribe(move |window| c_emitted.lock().unwrap().push(window));

    subject.next(1);
    scheduler.advance_by(Duration::from_secs(1));
    subject.next(2);
    scheduler.advance_by(Duration::from_secs(1));
    // First window saw 1 and 2; the second (opened at t=1) has seen 2.
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1, 2]]);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1, 2], vec![2]]);
  }

  #[test]
  fn count_or_clock_whichever_first() {
    let scheduler = TestScheduler::new();
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut subject = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    subject
      .clone()
      .buffer_time_count(Duration::from_secs(1), 2, scheduler.clone())
      .subscribe(move |chunk| c_emitted.lock().unwrap().push(chunk));

    subject.next(1);
    subject.next(2);
    // Count reached before the clock.
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1, 2]]);
    subject.next(3);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1, 2], vec![3]]);
  }

  #[test]
  fn partial_buffer_flushes_on_completion() {
    let scheduler = TestScheduler::new();
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut subject = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    subject
      .clone()
      .buffer_time(Duration::from_secs(10), scheduler.clone())
      .subscribe(move |window| c_emitted.lock().unwrap().push(window));
    subject.next(1);
    subject.complete();
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1]]);
  }
}
