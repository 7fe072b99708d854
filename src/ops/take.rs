use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::take`].
#[derive(Clone)]
pub struct TakeOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S> Observable for TakeOp<S>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S> CoreObservable for TakeOp<S>
where
  S: CoreObservable,
{
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    if self.count == 0 {
      observer.complete();
      return SharedSubscription::new();
    }
    self.source.actual_subscribe(TakeObserver {
      observer: Some(observer),
      remaining: self.count,
    })
  }
}

pub struct TakeObserver<O> {
  observer: Option<O>,
  remaining: usize,
}

impl<O> Observer for TakeObserver<O>
where
  O: Observer,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    let finished = match self.observer.as_mut() {
      Some(observer) if self.remaining > 0 => {
        observer.next(value);
        self.remaining -= 1;
        self.remaining == 0
      }
      _ => false,
    };
    if finished {
      if let Some(mut observer) = self.observer.take() {
        observer.complete();
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

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn emits_the_prefix_then_completes() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));
    let c_emitted = emitted.clone();
    let c_completed = completed.clone();
    observable::from_iter::<_, ()>(0..100)
      .take(5)
      .subscribe_complete(
        move |v| c_emitted.lock().unwrap().push(v),
        move || c_completed.store(true, Ordering::SeqCst),
      );
    assert_eq!(*emitted.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn take_zero_completes_without_subscribing_upstream_values() {
    let completed = Arc::new(AtomicBool::new(false));
    let c_completed = completed.clone();
    observable::from_iter::<_, ()>(0..3)
      .take(0)
      .subscribe_complete(|_| {}, move || {
        c_completed.store(true, Ordering::SeqCst)
      });
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn take_more_than_available_mirrors_the_source() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    observable::from_iter::<_, ()>(0..3)
      .take(10)
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    assert_eq!(*emitted.lock().unwrap(), vec![0, 1, 2]);
  }
}
