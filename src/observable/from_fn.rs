use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscriber::Subscriber;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Creates an observable from a producer function.
///
/// The producer receives a [`Subscriber`] sink that enforces the emission
/// grammar, exposes cancellation through `is_closed`, and accepts
/// teardowns. The sink may be moved to another thread for asynchronous
/// production.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::create(|mut sink: Subscriber<i32, ()>| {
///   sink.next(1);
///   sink.next(2);
///   sink.complete();
/// })
/// .subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, Item, Err>(producer: F) -> ObservableFromFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>),
{
  ObservableFromFn { func: producer, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct ObservableFromFn<F, Item, Err> {
  func: F,
  _hint: TypeHint<(Item, Err)>,
}

impl<F, Item, Err> Observable for ObservableFromFn<F, Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<F, Item, Err> CoreObservable for ObservableFromFn<F, Item, Err>
where
  F: FnOnce(Subscriber<Item, Err>),
  Item: 'static,
  Err: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let sink = Subscriber::new(Box::new(observer), subscription.clone());
    (self.func)(sink);
    subscription
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};
  use std::thread;
  use std::time::Duration;

  #[test]
  fn producer_emits_through_the_sink() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    observable::create(|mut sink: Subscriber<i32, ()>| {
      sink.next(1);
      sink.next(2);
      sink.next(3);
      sink.complete();
    })
    .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    assert_eq!(*emitted.lock().unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn events_after_terminal_are_dropped() {
    let emitted = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    let completions = Arc::new(AtomicUsize::new(0));
    let c_emitted = emitted.clone();
    let c_errors = errors.clone();
    let c_completions = completions.clone();
    observable::create(|mut sink: Subscriber<i32, &str>| {
      sink.next(1);
      sink.complete();
      // A misbehaving producer keeps going; the sink must swallow it all.
      sink.next(2);
      sink.error("late");
      sink.complete();
    })
    .subscribe_all(
      move |_| {
        c_emitted.fetch_add(1, Ordering::SeqCst);
      },
      move |_| {
        c_errors.fetch_add(1, Ordering::SeqCst);
      },
      move || {
        c_completions.fetch_add(1, Ordering::SeqCst);
      },
    );
    assert_eq!(emitted.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn async_producer_moves_the_sink() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    let subscription = observable::create(|mut sink: Subscriber<i32, ()>| {
      thread::spawn(move || {
        for v in 0..3 {
          sink.next(v);
        }
        sink.complete();
      });
    })
    .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    // Crude but sufficient: the producer thread finishes well within this.
    thread::sleep(Duration::from_millis(200));
    drop(subscription);
    assert_eq!(*emitted.lock().unwrap(), vec![0, 1, 2]);
  }

  #[test]
  fn unsubscribe_stops_a_cooperative_producer() {
    let emitted = Arc::new(AtomicUsize::new(0));
    let c_emitted = emitted.clone();
    let mut subscription =
      observable::create(|mut sink: Subscriber<usize, ()>| {
        thread::spawn(move || {
          let mut n = 0;
          while !sink.is_closed() {
            sink.next(n);
            n += 1;
            thread::sleep(Duration::from_millis(1));
          }
        });
      })
      .subscribe(move |_| {
        c_emitted.fetch_add(1, Ordering::SeqCst);
      });
    thread::sleep(Duration::from_millis(20));
    subscription.unsubscribe();
    let seen = emitted.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    // No emission reaches the observer after unsubscribe returned.
    assert_eq!(emitted.load(Ordering::SeqCst), seen);
  }
}
