use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::filter`].
#[derive(Clone)]
pub struct FilterOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for FilterOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F> CoreObservable for FilterOp<S, F>
where
  S: CoreObservable,
  S::Err: FromCallbackPanic,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(FilterObserver {
      observer: Some(observer),
      predicate: self.predicate,
    })
  }
}

pub struct FilterObserver<O, F> {
  observer: Option<O>,
  predicate: F,
}

impl<O, F> Observer for FilterObserver<O, F>
where
  O: Observer,
  O::Err: FromCallbackPanic,
  F: FnMut(&O::Item) -> bool,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if self.observer.is_none() {
      return;
    }
    match guard_callback(|| (self.predicate)(&value)) {
      Ok(true) => {
        if let Some(observer) = self.observer.as_mut() {
          observer.next(value);
        }
      }
      Ok(false) => {}
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
