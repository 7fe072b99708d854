use std::time::Instant;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::timestamp`]: each value paired
/// with the instant it passed this stage.
#[derive(Clone)]
pub struct TimestampOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for TimestampOp<S>
where
  S: Observable,
{
  type Item = (Instant, S::Item);
  type Err = S::Err;
}

impl<S> CoreObservable for TimestampOp<S>
where
  S: CoreObservable,
  S::Item: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(TimestampObserver { observer, _hint: TypeHint::new() })
  }
}

pub struct TimestampObserver<O, Item> {
  observer: O,
  _hint: TypeHint<Item>,
}

impl<O, Item> Observer for TimestampObserver<O, Item>
where
  O: Observer<Item = (Instant, Item)>,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    self.observer.next((Instant::now(), value));
  }

  fn error(&mut self, err: Self::Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_stopped(&self) -> bool { self.observer.is_stopped() }
}
