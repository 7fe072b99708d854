use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subject::{ReplayPolicy, SubjectCore};
use crate::subscription::SharedSubscription;

/// A subject that forwards live events only: subscribers see what is
/// emitted after they subscribed. A terminal event is latched and handed
/// to late subscribers immediately.
pub struct PublishSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> PublishSubject<Item, Err> {
  pub fn new() -> Self {
    PublishSubject { core: SubjectCore::new(ReplayPolicy::None) }
  }

  /// How many observers are currently subscribed.
  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }
}

impl<Item, Err> Default for PublishSubject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Clone for PublishSubject<Item, Err> {
  fn clone(&self) -> Self { PublishSubject { core: self.core.clone() } }
}

impl<Item, Err> Observer for PublishSubject<Item, Err>
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

impl<Item, Err> Observable for PublishSubject<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> CoreObservable for PublishSubject<Item, Err>
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
