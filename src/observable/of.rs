use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Creates an observable emitting exactly `value`, then completing.
pub fn of<Item, Err>(value: Item) -> OfOp<Item, Err> {
  OfOp { value, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct OfOp<Item, Err> {
  value: Item,
  _hint: TypeHint<Err>,
}

impl<Item, Err> Observable for OfOp<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> CoreObservable for OfOp<Item, Err> {
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    observer.next(self.value);
    if !observer.is_stopped() {
      observer.complete();
    }
    SharedSubscription::new()
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
  use std::sync::Arc;

  #[test]
  fn emits_single_value_then_completes() {
    let sum = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicBool::new(false));
    let c_sum = sum.clone();
    let c_completed = completed.clone();
    observable::of::<_, ()>(100).subscribe_complete(
      move |v: usize| {
        c_sum.fetch_add(v, Ordering::SeqCst);
      },
      move || c_completed.store(true, Ordering::SeqCst),
    );
    assert_eq!(sum.load(Ordering::SeqCst), 100);
    assert!(completed.load(Ordering::SeqCst));
  }
}
