use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::skip`].
#[derive(Clone)]
pub struct SkipOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S> Observable for SkipOp<S>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S> CoreObservable for SkipOp<S>
where
  S: CoreObservable,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(SkipObserver {
      observer,
      remaining: self.count,
    })
  }
}

pub struct SkipObserver<O> {
  observer: O,
  remaining: usize,
}

impl<O> Observer for SkipObserver<O>
where
  O: Observer,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if self.remaining > 0 {
      self.remaining -= 1;
    } else {
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) { self.observer.error(err) }

  fn complete(&mut self) { self.observer.complete() }

  fn is_stopped(&self) -> bool { self.observer.is_stopped() }
}
