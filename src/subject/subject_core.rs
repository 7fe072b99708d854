use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::observer::Observer;
use crate::subject::subject_subscription::SubjectSubscription;
use crate::subscription::{SharedSubscription, SubscriptionLike};

pub(crate) type BoxObserver<Item, Err> =
  Box<dyn Observer<Item = Item, Err = Err> + Send>;

type ObserverSlot<Item, Err> = Arc<Mutex<BoxObserver<Item, Err>>>;

/// How much history a subject hands to a fresh subscriber.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplayPolicy {
  /// Live events only.
  None,
  /// The most recent value (behavior semantics). After a terminal event
  /// only the terminal is handed out.
  Latest,
  Unbounded,
  Count(usize),
  Time(Duration),
}

#[derive(Clone)]
pub(crate) enum Terminal<Err> {
  Error(Err),
  Complete,
}

enum SubjectEvent<Item, Err> {
  Next(u64, Item),
  Terminal(Terminal<Err>),
}

pub(crate) struct Entry<Item, Err> {
  pub(crate) id: u64,
  /// Highest sequence number already covered by replay at registration;
  /// the drain loop skips events at or below it.
  seen: u64,
  observer: ObserverSlot<Item, Err>,
}

pub(crate) struct CoreState<Item, Err> {
  pub(crate) entries: SmallVec<[Entry<Item, Err>; 2]>,
  pending: VecDeque<SubjectEvent<Item, Err>>,
  buffer: VecDeque<(u64, Instant, Item)>,
  policy: ReplayPolicy,
  terminal: Option<Terminal<Err>>,
  broadcasting: bool,
  seq: u64,
  next_id: u64,
}

impl<Item, Err> CoreState<Item, Err> {
  fn buffer_push(&mut self, seq: u64, value: Item)
  where
    Item: Clone,
  {
    match self.policy {
      ReplayPolicy::None => {}
      ReplayPolicy::Latest => {
        self.buffer.clear();
        self.buffer.push_back((seq, Instant::now(), value));
      }
      ReplayPolicy::Unbounded => {
        self.buffer.push_back((seq, Instant::now(), value));
      }
      ReplayPolicy::Count(limit) => {
        self.buffer.push_back((seq, Instant::now(), value));
        while self.buffer.len() > limit {
          self.buffer.pop_front();
        }
      }
      ReplayPolicy::Time(window) => {
        let now = Instant::now();
        self.buffer.push_back((seq, now, value));
        let cutoff = now.checked_sub(window);
        if let Some(cutoff) = cutoff {
          while self
            .buffer
            .front()
            .map_or(false, |(_, at, _)| *at < cutoff)
          {
            self.buffer.pop_front();
          }
        }
      }
    }
  }

  fn replay_snapshot(&self) -> Vec<Item>
  where
    Item: Clone,
  {
    match self.policy {
      ReplayPolicy::None => Vec::new(),
      ReplayPolicy::Latest if self.terminal.is_some() => Vec::new(),
      ReplayPolicy::Time(window) => {
        let cutoff = Instant::now().checked_sub(window);
        self
          .buffer
          .iter()
          .filter(|(_, at, _)| cutoff.map_or(true, |cutoff| *at >= cutoff))
          .map(|(_, _, v)| v.clone())
          .collect()
      }
      _ => self.buffer.iter().map(|(_, _, v)| v.clone()).collect(),
    }
  }
}

/// The shared machinery of every subject: a subscriber registry and a
/// pending-event queue drained by at most one thread at a time.
///
/// Events enqueue under the registry lock, which fixes one global order;
/// the draining thread snapshots the registry and delivers with no lock
/// held, so user callbacks can subscribe, unsubscribe or even emit
/// re-entrantly (re-entrant emissions simply queue behind the current
/// one). Each registered observer sits behind its own mutex, and
/// registration replays history while holding that mutex, so live events
/// queue up behind the replay instead of overtaking it.
pub(crate) struct SubjectCore<Item, Err>(Arc<Mutex<CoreState<Item, Err>>>);

impl<Item, Err> Clone for SubjectCore<Item, Err> {
  fn clone(&self) -> Self { SubjectCore(self.0.clone()) }
}

impl<Item, Err> SubjectCore<Item, Err> {
  pub(crate) fn new(policy: ReplayPolicy) -> Self {
    SubjectCore(Arc::new(Mutex::new(CoreState {
      entries: SmallVec::new(),
      pending: VecDeque::new(),
      buffer: VecDeque::new(),
      policy,
      terminal: None,
      broadcasting: false,
      seq: 0,
      next_id: 0,
    })))
  }

  pub(crate) fn with_seed(policy: ReplayPolicy, seed: Item) -> Self
  where
    Item: Clone,
  {
    let core = Self::new(policy);
    {
      let mut state = core.0.lock().unwrap();
      state.seq = 1;
      state.buffer_push(1, seed);
    }
    core
  }

  pub(crate) fn is_terminated(&self) -> bool {
    self.0.lock().unwrap().terminal.is_some()
  }

  pub(crate) fn subscriber_count(&self) -> usize {
    self.0.lock().unwrap().entries.len()
  }
}

impl<Item, Err> SubjectCore<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub(crate) fn emit_next(&self, value: Item) {
    let mut state = self.0.lock().unwrap();
    if state.terminal.is_some() {
      return;
    }
    state.seq += 1;
    let seq = state.seq;
    state.buffer_push(seq, value.clone());
    state.pending.push_back(SubjectEvent::Next(seq, value));
    self.drain(state);
  }

  pub(crate) fn emit_error(&self, err: Err) {
    self.emit_terminal(Terminal::Error(err));
  }

  pub(crate) fn emit_complete(&self) {
    self.emit_terminal(Terminal::Complete);
  }

  fn emit_terminal(&self, terminal: Terminal<Err>) {
    let mut state = self.0.lock().unwrap();
    if state.terminal.is_some() {
      return;
    }
    state.terminal = Some(terminal.clone());
    state.pending.push_back(SubjectEvent::Terminal(terminal));
    self.drain(state);
  }

  fn drain<'a>(&'a self, mut state: MutexGuard<'a, CoreState<Item, Err>>) {
    if state.broadcasting {
      // The active drainer delivers what we just queued.
      return;
    }
    state.broadcasting = true;
    loop {
      let event = match state.pending.pop_front() {
        Some(event) => event,
        None => {
          state.broadcasting = false;
          return;
        }
      };
      match event {
        SubjectEvent::Next(seq, value) => {
          let targets: SmallVec<[ObserverSlot<Item, Err>; 2]> = state
            .entries
            .iter()
            .filter(|entry| entry.seen < seq)
            .map(|entry| entry.observer.clone())
            .collect();
          drop(state);
          for observer in targets {
            observer.lock().unwrap().next(value.clone());
          }
          state = self.0.lock().unwrap();
        }
        SubjectEvent::Terminal(terminal) => {
          let targets: SmallVec<[ObserverSlot<Item, Err>; 2]> = state
            .entries
            .drain(..)
            .map(|entry| entry.observer)
            .collect();
          drop(state);
          for observer in targets {
            let mut observer = observer.lock().unwrap();
            match &terminal {
              Terminal::Error(err) => observer.error(err.clone()),
              Terminal::Complete => observer.complete(),
            }
          }
          state = self.0.lock().unwrap();
        }
      }
    }
  }

  pub(crate) fn subscribe<O>(&self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Item, Err = Err> + Send + 'static,
  {
    let slot: ObserverSlot<Item, Err> =
      Arc::new(Mutex::new(Box::new(observer)));
    // Lock the slot before it becomes reachable: live events delivered by
    // a concurrent drain wait behind the replay below.
    let mut gate = slot.lock().unwrap();
    let (replay, terminal, registration) = {
      let mut state = self.0.lock().unwrap();
      let replay = state.replay_snapshot();
      match &state.terminal {
        Some(terminal) => (replay, Some(terminal.clone()), None),
        None => {
          state.next_id += 1;
          let id = state.next_id;
          let seen = state.seq;
          state.entries.push(Entry { id, seen, observer: slot.clone() });
          (replay, None, Some(id))
        }
      }
    };
    for value in replay {
      gate.next(value);
    }
    match terminal {
      Some(Terminal::Error(err)) => gate.error(err),
      Some(Terminal::Complete) => gate.complete(),
      None => {}
    }
    drop(gate);

    let mut subscription = SharedSubscription::new();
    match registration {
      Some(id) => {
        subscription.add(SubjectSubscription::new(Arc::downgrade(&self.0), id));
      }
      None => subscription.unsubscribe(),
    }
    subscription
  }
}
