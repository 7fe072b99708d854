use std::ops::Range;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};
use crate::type_hint::TypeHint;

/// Creates an observable emitting every item of the iterator, then
/// completing. Cancellation is honored between emissions.
pub fn from_iter<I, Err>(iter: I) -> FromIterOp<I, Err>
where
  I: IntoIterator,
{
  FromIterOp { iter, _hint: TypeHint::new() }
}

/// Emits `count` consecutive integers starting at `start`.
pub fn range<Err>(start: i64, count: u64) -> FromIterOp<Range<i64>, Err> {
  from_iter(start..start + count as i64)
}

#[derive(Clone)]
pub struct FromIterOp<I, Err> {
  iter: I,
  _hint: TypeHint<Err>,
}

impl<I, Err> Observable for FromIterOp<I, Err>
where
  I: IntoIterator,
{
  type Item = I::Item;
  type Err = Err;
}

impl<I, Err> CoreObservable for FromIterOp<I, Err>
where
  I: IntoIterator,
{
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    for value in self.iter {
      if observer.is_stopped() || subscription.is_closed() {
        return subscription;
      }
      observer.next(value);
    }
    if !observer.is_stopped() {
      observer.complete();
    }
    subscription
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn emits_in_order_then_completes() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));
    let c_emitted = emitted.clone();
    let c_completed = completed.clone();
    observable::from_iter::<_, ()>(vec![1, 2, 3, 4]).subscribe_complete(
      move |v| c_emitted.lock().unwrap().push(v),
      move || c_completed.store(true, Ordering::SeqCst),
    );
    assert_eq!(*emitted.lock().unwrap(), vec![1, 2, 3, 4]);
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn stops_pulling_once_downstream_stopped() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let c_pulled = pulled.clone();
    let counting = (0..).inspect(move |_| {
      c_pulled.fetch_add(1, Ordering::SeqCst);
    });
    observable::from_iter::<_, ()>(counting)
      .take(3)
      .subscribe(|_| {});
    // The iterator is infinite; `take` must stop the pull loop.
    assert!(pulled.load(Ordering::SeqCst) <= 4);
  }

  #[test]
  fn range_counts_from_start() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    observable::range::<()>(5, 3)
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    assert_eq!(*emitted.lock().unwrap(), vec![5, 6, 7]);
  }
}
