use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SerialSubscription, SharedSubscription};

/// Observable returned by [`Observable::concat`]: the second source is
/// subscribed only after the first completes.
#[derive(Clone)]
pub struct ConcatOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for ConcatOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item, Err = A::Err>,
{
  type Item = A::Item;
  type Err = A::Err;
}

impl<A, B> CoreObservable for ConcatOp<A, B>
where
  A: CoreObservable,
  B: CoreObservable<Item = A::Item, Err = A::Err> + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let second = SerialSubscription::new();
    subscription.add(second.clone());
    let first = self.a.actual_subscribe(ConcatObserver {
      observer: Some(observer),
      next_source: Some(self.b),
      current: second,
    });
    subscription.add(first);
    subscription
  }
}

pub struct ConcatObserver<O, B> {
  observer: Option<O>,
  next_source: Option<B>,
  current: SerialSubscription,
}

impl<O, B> Observer for ConcatObserver<O, B>
where
  O: Observer + Send + 'static,
  B: CoreObservable<Item = O::Item, Err = O::Err>,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if let Some(observer) = self.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) {
    self.next_source = None;
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    match (self.next_source.take(), self.observer.take()) {
      (Some(next_source), Some(observer)) => {
        self.current.set(next_source.actual_subscribe(observer));
      }
      (None, Some(mut observer)) => observer.complete(),
      _ => {}
    }
  }

  fn is_stopped(&self) -> bool {
    self
      .observer
      .as_ref()
      .map_or(true, |observer| observer.is_stopped())
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn second_source_follows_the_first() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));
    let c_emitted = emitted.clone();
    let c_completed = completed.clone();
    observable::from_iter::<_, ()>(vec![1, 2])
      .concat(observable::from_iter(vec![3, 4]))
      .subscribe_complete(
        move |v| c_emitted.lock().unwrap().push(v),
        move || c_completed.store(true, Ordering::SeqCst),
      );
    assert_eq!(*emitted.lock().unwrap(), vec![1, 2, 3, 4]);
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn error_in_the_first_skips_the_second() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let errored = Arc::new(AtomicBool::new(false));
    let c_emitted = emitted.clone();
    let c_errored = errored.clone();
    observable::throw::<i32, &str>("boom")
      .concat(observable::from_iter(vec![3, 4]))
      .subscribe_err(
        move |v| c_emitted.lock().unwrap().push(v),
        move |_| c_errored.store(true, Ordering::SeqCst),
      );
    assert!(emitted.lock().unwrap().is_empty());
    assert!(errored.load(Ordering::SeqCst));
  }
}
