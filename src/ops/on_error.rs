use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SerialSubscription, SharedSubscription};

/// Observable returned by [`Observable::on_error_return`]: a terminal
/// error becomes one final value plus a completion.
#[derive(Clone)]
pub struct OnErrorReturnOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F> Observable for OnErrorReturnOp<S, F>
where
  S: Observable,
  F: FnMut(S::Err) -> S::Item,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F> CoreObservable for OnErrorReturnOp<S, F>
where
  S: CoreObservable,
  S::Err: FromCallbackPanic,
  F: FnMut(S::Err) -> S::Item + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(OnErrorReturnObserver {
      observer: Some(observer),
      func: self.func,
    })
  }
}

pub struct OnErrorReturnObserver<O, F> {
  observer: Option<O>,
  func: F,
}

impl<O, F> Observer for OnErrorReturnObserver<O, F>
where
  O: Observer,
  O::Err: FromCallbackPanic,
  F: FnMut(O::Err) -> O::Item,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) {
    if let Some(mut observer) = self.observer.take() {
      match guard_callback(|| (self.func)(err)) {
        Ok(value) => {
          observer.next(value);
          if !observer.is_stopped() {
            observer.complete();
          }
        }
        Err(panic_err) => observer.error(panic_err),
      }
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

/// Observable returned by [`Observable::on_error_resume_next`]: a
/// terminal error is replaced by a subscription to the observable derived
/// from it.
#[derive(Clone)]
pub struct OnErrorResumeNextOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, R, F> Observable for OnErrorResumeNextOp<S, F>
where
  S: Observable,
  F: FnMut(S::Err) -> R,
  R: Observable<Item = S::Item, Err = S::Err>,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, R, F> CoreObservable for OnErrorResumeNextOp<S, F>
where
  S: CoreObservable,
  S::Err: FromCallbackPanic,
  F: FnMut(S::Err) -> R + Send + 'static,
  R: CoreObservable<Item = S::Item, Err = S::Err>,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let fallback_slot = SerialSubscription::new();
    subscription.add(fallback_slot.clone());
    let upstream = self.source.actual_subscribe(OnErrorResumeNextObserver {
      observer: Some(observer),
      func: self.func,
      fallback_slot,
    });
    subscription.add(upstream);
    subscription
  }
}

pub struct OnErrorResumeNextObserver<O, F> {
  observer: Option<O>,
  func: F,
  fallback_slot: SerialSubscription,
}

impl<O, R, F> Observer for OnErrorResumeNextObserver<O, F>
where
  O: Observer + Send + 'static,
  O::Err: FromCallbackPanic,
  F: FnMut(O::Err) -> R,
  R: CoreObservable<Item = O::Item, Err = O::Err>,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) {
    let fallback = match guard_callback(|| (self.func)(err)) {
      Ok(fallback) => fallback,
      Err(panic_err) => {
        if let Some(mut observer) = self.observer.take() {
          observer.error(panic_err);
        }
        return;
      }
    };
    if let Some(observer) = self.observer.take() {
      self.fallback_slot.set(fallback.actual_subscribe(observer));
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
