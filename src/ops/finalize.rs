use std::sync::{Arc, Mutex};

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::finalize`]: runs a callback
/// exactly once, on terminal event or unsubscription, whichever comes
/// first.
#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F> Observable for FinalizeOp<S, F>
where
  S: Observable,
  F: FnOnce(),
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S, F> CoreObservable for FinalizeOp<S, F>
where
  S: CoreObservable,
  F: FnOnce() + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let callback = Arc::new(Mutex::new(Some(self.func)));
    let subscription = SharedSubscription::new();
    let upstream = self.source.actual_subscribe(FinalizeObserver {
      observer,
      callback: callback.clone(),
    });
    subscription.add(upstream);
    subscription.add_action(move || run_once(&callback));
    subscription
  }
}

fn run_once<F: FnOnce()>(callback: &Arc<Mutex<Option<F>>>) {
  let callback = callback.lock().unwrap().take();
  if let Some(callback) = callback {
    callback();
  }
}

pub struct FinalizeObserver<O, F> {
  observer: O,
  callback: Arc<Mutex<Option<F>>>,
}

impl<O, F> Observer for FinalizeObserver<O, F>
where
  O: Observer,
  F: FnOnce(),
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) { self.observer.next(value) }

  fn error(&mut self, err: Self::Err) {
    self.observer.error(err);
    run_once(&self.callback);
  }

  fn complete(&mut self) {
    self.observer.complete();
    run_once(&self.callback);
  }

  fn is_stopped(&self) -> bool { self.observer.is_stopped() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  #[test]
  fn runs_once_on_completion() {
    let runs = Arc::new(AtomicUsize::new(0));
    let c_runs = runs.clone();
    observable::from_iter::<_, ()>(0..3)
      .finalize(move || {
        c_runs.fetch_add(1, Ordering::SeqCst);
      })
      .subscribe(|_| {});
    assert_eq!(runs.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn runs_once_on_error() {
    let runs = Arc::new(AtomicUsize::new(0));
    let c_runs = runs.clone();
    observable::throw::<i32, _>("boom")
      .finalize(move || {
        c_runs.fetch_add(1, Ordering::SeqCst);
      })
      .subscribe_err(|_| {}, |_| {});
    assert_eq!(runs.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn runs_once_on_unsubscribe() {
    let runs = Arc::new(AtomicUsize::new(0));
    let c_runs = runs.clone();
    let mut subject = PublishSubject::<i32, ()>::new();
    let mut subscription = subject
      .clone()
      .finalize(move || {
        c_runs.fetch_add(1, Ordering::SeqCst);
      })
      .subscribe(|_| {});
    subject.next(1);
    assert_eq!(runs.load(Ordering::SeqCst), 0);
    subscription.unsubscribe();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
  }
}
