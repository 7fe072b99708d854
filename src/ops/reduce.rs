use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::reduce`]: seedless fold, the
/// first value seeds the accumulator. The result is emitted on
/// completion; an empty source completes without a value.
#[derive(Clone)]
pub struct ReduceOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F> Observable for ReduceOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item, S::Item) -> S::Item,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F> CoreObservable for ReduceOp<S, F>
where
  S: CoreObservable,
  S::Item: Send + 'static,
  S::Err: FromCallbackPanic,
  F: FnMut(S::Item, S::Item) -> S::Item + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(ReduceObserver {
      observer: Some(observer),
      func: self.func,
      acc: None,
    })
  }
}

pub struct ReduceObserver<O, F, Item> {
  observer: Option<O>,
  func: F,
  acc: Option<Item>,
}

impl<O, F, Item> Observer for ReduceObserver<O, F, Item>
where
  O: Observer<Item = Item>,
  O::Err: FromCallbackPanic,
  F: FnMut(Item, Item) -> Item,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    let next = match self.acc.take() {
      None => value,
      Some(acc) => match guard_callback(|| (self.func)(acc, value)) {
        Ok(next) => next,
        Err(err) => {
          if let Some(mut observer) = self.observer.take() {
            observer.error(err);
          }
          return;
        }
      },
    };
    self.acc = Some(next);
  }

  fn error(&mut self, err: Self::Err) {
    self.acc = None;
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      if let Some(acc) = self.acc.take() {
        observer.next(acc);
      }
      if !observer.is_stopped() {
        observer.complete();
      }
    }
  }

  fn is_stopped(&self) -> bool {
    self
      .observer
      .as_ref()
      .map_or(true, |observer| observer.is_stopped())
  }
}
