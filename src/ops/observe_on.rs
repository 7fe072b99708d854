use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::notification::Notification;
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use crate::subscription::{
  SerialSubscription, SharedSubscription, SubscriptionLike,
};

/// Observable returned by [`Observable::observe_on`].
///
/// Upstream events are queued and drained by at most one scheduled worker
/// at a time, so downstream delivery is serialized and keeps upstream
/// order even when the scheduler is a pool. Unsubscribing clears whatever
/// is still queued.
#[derive(Clone)]
pub struct ObserveOnOp<S, SD> {
  pub(crate) source: S,
  pub(crate) scheduler: SD,
}

impl<S, SD> Observable for ObserveOnOp<S, SD>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

struct HandoffQueue<Item, Err> {
  queue: VecDeque<Notification<Item, Err>>,
  draining: bool,
}

impl<S, SD> CoreObservable for ObserveOnOp<S, SD>
where
  S: CoreObservable,
  SD: Scheduler,
  S::Item: Send + 'static,
  S::Err: Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let proxy = SharedSubscription::new();
    let drain_slot = SerialSubscription::new();
    proxy.add(drain_slot.clone());
    let stage = ObserveOnObserver {
      state: Arc::new(Mutex::new(HandoffQueue {
        queue: VecDeque::new(),
        draining: false,
      })),
      observer: Arc::new(Mutex::new(observer)),
      scheduler: self.scheduler,
      proxy: proxy.clone(),
      drain_slot,
    };
    let upstream = self.source.actual_subscribe(stage);
    proxy.add(upstream);
    proxy
  }
}

pub struct ObserveOnObserver<O, SD, Item, Err> {
  state: Arc<Mutex<HandoffQueue<Item, Err>>>,
  observer: Arc<Mutex<O>>,
  scheduler: SD,
  proxy: SharedSubscription,
  drain_slot: SerialSubscription,
}

impl<O, SD, Item, Err> ObserveOnObserver<O, SD, Item, Err>
where
  O: Observer<Item = Item, Err = Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn enqueue(&mut self, event: Notification<Item, Err>) {
    let becomes_drainer = {
      let mut state = self.state.lock().unwrap();
      state.queue.push_back(event);
      if state.draining {
        false
      } else {
        state.draining = true;
        true
      }
    };
    if becomes_drainer {
      let state = self.state.clone();
      let observer = self.observer.clone();
      let proxy = self.proxy.clone();
      let task = self
        .scheduler
        .schedule(move |_| drain(state, observer, proxy));
      self.drain_slot.set(task);
    }
  }
}

fn drain<O, Item, Err>(
  state: Arc<Mutex<HandoffQueue<Item, Err>>>,
  observer: Arc<Mutex<O>>,
  mut proxy: SharedSubscription,
) where
  O: Observer<Item = Item, Err = Err>,
{
  loop {
    if proxy.is_closed() {
      let mut state = state.lock().unwrap();
      state.queue.clear();
      state.draining = false;
      return;
    }
    let event = {
      let mut state = state.lock().unwrap();
      match state.queue.pop_front() {
        Some(event) => event,
        None => {
          state.draining = false;
          return;
        }
      }
    };
    match event {
      Notification::Next(value) => observer.lock().unwrap().next(value),
      Notification::Error(err) => {
        proxy.unsubscribe();
        observer.lock().unwrap().error(err);
        return;
      }
      Notification::Complete => {
        proxy.unsubscribe();
        observer.lock().unwrap().complete();
        return;
      }
    }
  }
}

impl<O, SD, Item, Err> Observer for ObserveOnObserver<O, SD, Item, Err>
where
  O: Observer<Item = Item, Err = Err> + Send + 'static,
  SD: Scheduler,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) {
    self.enqueue(Notification::Next(value));
  }

  fn error(&mut self, err: Err) { self.enqueue(Notification::Error(err)); }

  fn complete(&mut self) { self.enqueue(Notification::Complete); }

  fn is_stopped(&self) -> bool { self.proxy.is_closed() }
}
