use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::all`]: one boolean, short-circuits
/// on the first counterexample.
#[derive(Clone)]
pub struct AllOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for AllOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool,
{
  type Item = bool;
  type Err = S::Err;
}

impl<S, F> CoreObservable for AllOp<S, F>
where
  S: CoreObservable,
  S::Item: 'static,
  S::Err: FromCallbackPanic,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = bool, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(AllObserver {
      observer: Some(observer),
      predicate: self.predicate,
      _hint: TypeHint::new(),
    })
  }
}

pub struct AllObserver<O, F, Item> {
  observer: Option<O>,
  predicate: F,
  _hint: TypeHint<Item>,
}

impl<O, F, Item> Observer for AllObserver<O, F, Item>
where
  O: Observer<Item = bool>,
  O::Err: FromCallbackPanic,
  F: FnMut(&Item) -> bool,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match guard_callback(|| (self.predicate)(&value)) {
      Ok(true) => {}
      Ok(false) => {
        if let Some(mut observer) = self.observer.take() {
          observer.next(false);
          if !observer.is_stopped() {
            observer.complete();
          }
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
      observer.next(true);
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
