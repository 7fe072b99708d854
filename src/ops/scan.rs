use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::scan`]: seedless running
/// accumulation; the first value starts the accumulator and is emitted
/// unchanged.
#[derive(Clone)]
pub struct ScanOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F> Observable for ScanOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item, S::Item) -> S::Item,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F> CoreObservable for ScanOp<S, F>
where
  S: CoreObservable,
  S::Item: Clone + Send + 'static,
  S::Err: FromCallbackPanic,
  F: FnMut(S::Item, S::Item) -> S::Item + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(ScanObserver {
      observer: Some(observer),
      func: self.func,
      acc: None,
    })
  }
}

pub struct ScanObserver<O, F, Item> {
  observer: Option<O>,
  func: F,
  acc: Option<Item>,
}

impl<O, F, Item> Observer for ScanObserver<O, F, Item>
where
  O: Observer<Item = Item>,
  O::Err: FromCallbackPanic,
  F: FnMut(Item, Item) -> Item,
  Item: Clone,
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
    self.acc = Some(next.clone());
    if let Some(observer) = self.observer.as_mut() {
      observer.next(next);
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

/// Observable returned by [`Observable::scan_initial`]: running
/// accumulation from an explicit seed; one output per input.
#[derive(Clone)]
pub struct ScanInitialOp<S, F, B> {
  pub(crate) source: S,
  pub(crate) func: F,
  pub(crate) initial: B,
}

impl<S, F, B> Observable for ScanInitialOp<S, F, B>
where
  S: Observable,
  F: FnMut(B, S::Item) -> B,
{
  type Item = B;
  type Err = S::Err;
}

impl<S, F, B> CoreObservable for ScanInitialOp<S, F, B>
where
  S: CoreObservable,
  S::Item: 'static,
  S::Err: FromCallbackPanic,
  F: FnMut(B, S::Item) -> B + Send + 'static,
  B: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(ScanInitialObserver {
      observer: Some(observer),
      func: self.func,
      acc: self.initial,
      _hint: TypeHint::new(),
    })
  }
}

pub struct ScanInitialObserver<O, F, B, Item> {
  observer: Option<O>,
  func: F,
  acc: B,
  _hint: TypeHint<Item>,
}

impl<O, F, B, Item> Observer for ScanInitialObserver<O, F, B, Item>
where
  O: Observer<Item = B>,
  O::Err: FromCallbackPanic,
  F: FnMut(B, Item) -> B,
  B: Clone,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    let acc = self.acc.clone();
    match guard_callback(|| (self.func)(acc, value)) {
      Ok(next) => {
        self.acc = next.clone();
        if let Some(observer) = self.observer.as_mut() {
          observer.next(next);
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
