use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::map`].
#[derive(Clone)]
pub struct MapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, B, F> Observable for MapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> B,
{
  type Item = B;
  type Err = S::Err;
}

impl<S, B, F> CoreObservable for MapOp<S, F>
where
  S: CoreObservable,
  S::Item: 'static,
  S::Err: FromCallbackPanic,
  F: FnMut(S::Item) -> B + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(MapObserver {
      observer: Some(observer),
      func: self.func,
      _hint: TypeHint::new(),
    })
  }
}

pub struct MapObserver<O, F, Item> {
  observer: Option<O>,
  func: F,
  _hint: TypeHint<Item>,
}

impl<O, F, Item, B> Observer for MapObserver<O, F, Item>
where
  O: Observer<Item = B>,
  O::Err: FromCallbackPanic,
  F: FnMut(Item) -> B,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match guard_callback(|| (self.func)(value)) {
      Ok(mapped) => {
        if let Some(observer) = self.observer.as_mut() {
          observer.next(mapped);
        }
      }
      Err(err) => {
        if let Some(mut observer) = self.observer.take() {
          observer.error(err);
        }
      }
    }
  }

  fn error(&mut self, err: Self::Err) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    }
  }

  fn is_stopped(&self) -> bool {
    self
      .observer
      .as_ref()
      .map_or(true, |observer| observer.is_stopped())
  }
}
