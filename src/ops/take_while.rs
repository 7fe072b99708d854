use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::take_while`].
#[derive(Clone)]
pub struct TakeWhileOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for TakeWhileOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> bool,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F> CoreObservable for TakeWhileOp<S, F>
where
  S: CoreObservable,
  S::Err: FromCallbackPanic,
  F: FnMut(&S::Item) -> bool + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(TakeWhileObserver {
      observer: Some(observer),
      predicate: self.predicate,
    })
  }
}

/// Observable returned by [`Observable::take_while_with_index`].
#[derive(Clone)]
pub struct TakeWhileWithIndexOp<S, F> {
  pub(crate) source: S,
  pub(crate) predicate: F,
}

impl<S, F> Observable for TakeWhileWithIndexOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item, usize) -> bool,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F> CoreObservable for TakeWhileWithIndexOp<S, F>
where
  S: CoreObservable,
  S::Err: FromCallbackPanic,
  F: FnMut(&S::Item, usize) -> bool + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let mut index = 0usize;
    let mut predicate = self.predicate;
    self.source.actual_subscribe(TakeWhileObserver {
      observer: Some(observer),
      predicate: move |value: &S::Item| {
        let keep = predicate(value, index);
        index += 1;
        keep
      },
    })
  }
}

pub struct TakeWhileObserver<O, F> {
  observer: Option<O>,
  predicate: F,
}

impl<O, F> Observer for TakeWhileObserver<O, F>
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
      Ok(false) => {
        if let Some(mut observer) = self.observer.take() {
          observer.complete();
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
