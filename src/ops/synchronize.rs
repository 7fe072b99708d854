use std::sync::{Arc, Mutex};

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::synchronize`]: delivery to the
/// downstream is serialized behind a mutex, so producers racing on
/// several threads cannot interleave a single observer's events.
#[derive(Clone)]
pub struct SynchronizeOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for SynchronizeOp<S>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S> CoreObservable for SynchronizeOp<S>
where
  S: CoreObservable,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(SynchronizeObserver {
      observer: Arc::new(Mutex::new(observer)),
    })
  }
}

pub struct SynchronizeObserver<O> {
  observer: Arc<Mutex<O>>,
}

impl<O> Observer for SynchronizeObserver<O>
where
  O: Observer,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    self.observer.lock().unwrap().next(value);
  }

  fn error(&mut self, err: Self::Err) {
    self.observer.lock().unwrap().error(err);
  }

  fn complete(&mut self) { self.observer.lock().unwrap().complete(); }

  fn is_stopped(&self) -> bool {
    self.observer.lock().unwrap().is_stopped()
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};
  use std::thread;

  #[test]
  fn racing_producers_cannot_interleave_delivery() {
    // Each producer emits its thread index many times; with serialized
    // delivery the observer's body runs to completion per event, so the
    // two counters it maintains can never disagree at entry.
    let consistent = Arc::new(Mutex::new(true));
    let state = Arc::new(Mutex::new((0usize, 0usize)));
    let c_consistent = consistent.clone();
    let c_state = state.clone();
    let subscription = observable::create(|sink: Subscriber<usize, ()>| {
      let sink = Arc::new(Mutex::new(sink));
      let handles: Vec<_> = (0..4)
        .map(|_| {
          let sink = sink.clone();
          thread::spawn(move || {
            for _ in 0..100 {
              sink.lock().unwrap().next(1);
            }
          })
        })
        .collect();
      for handle in handles {
        handle.join().unwrap();
      }
      sink.lock().unwrap().complete();
    })
    .synchronize()
    .subscribe(move |v| {
      let mut state = c_state.lock().unwrap();
      if state.0 != state.1 {
        *c_consistent.lock().unwrap() = false;
      }
      state.0 += v;
      state.1 += v;
    });
    drop(subscription);
    assert!(*consistent.lock().unwrap());
    assert_eq!(state.lock().unwrap().0, 400);
  }
}
