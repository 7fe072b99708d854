use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Creates an observable lazily: the factory runs once per subscriber, so
/// each one observes a fresh execution starting at subscribe time.
pub fn defer<F, S>(factory: F) -> DeferOp<F>
where
  F: Fn() -> S,
{
  DeferOp { factory }
}

#[derive(Clone)]
pub struct DeferOp<F> {
  factory: F,
}

impl<F, S> Observable for DeferOp<F>
where
  F: Fn() -> S,
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<F, S> CoreObservable for DeferOp<F>
where
  F: Fn() -> S,
  S: CoreObservable,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    (self.factory)().actual_subscribe(observer)
  }
}
