use std::time::Duration;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subject::{ReplayPolicy, SubjectCore};
use crate::subscription::SharedSubscription;

/// A subject that buffers what it receives and replays the (bounded)
/// buffer, in order, to every fresh subscriber before handing it the live
/// stream. The terminal event is buffered too.
pub struct ReplaySubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> ReplaySubject<Item, Err> {
  /// Unbounded replay: every subscriber sees the entire sequence.
  pub fn new() -> Self {
    ReplaySubject { core: SubjectCore::new(ReplayPolicy::Unbounded) }
  }

  /// Replays at most the last `count` values.
  pub fn with_size(count: usize) -> Self {
    ReplaySubject { core: SubjectCore::new(ReplayPolicy::Count(count)) }
  }

  /// Replays the values received within the trailing time `window`.
  pub fn with_time(window: Duration) -> Self {
    ReplaySubject { core: SubjectCore::new(ReplayPolicy::Time(window)) }
  }

  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }
}

impl<Item, Err> Default for ReplaySubject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for ReplaySubject<Item, Err> {
  fn clone(&self) -> Self { ReplaySubject { core: self.core.clone() } }
}

impl<Item, Err> Observer for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) { self.core.emit_next(value) }

  fn error(&mut self, err: Err) { self.core.emit_error(err) }

  fn complete(&mut self) { self.core.emit_complete() }

  fn is_stopped(&self) -> bool { self.core.is_terminated() }
}

impl<Item, Err> Observable for ReplaySubject<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> CoreObservable for ReplaySubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Item, Err = Err> + Send + 'static,
  {
    self.core.subscribe(observer)
  }
}
