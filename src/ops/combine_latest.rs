use std::sync::{Arc, Mutex};

use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// Observable returned by [`Observable::combine_latest`]: once both
/// sources produced a value, every emission on either side produces
/// `f(latest_a, latest_b)`. Completes when both sides completed; errors
/// immediately on the first error.
#[derive(Clone)]
pub struct CombineLatestOp<A, B, F> {
  pub(crate) a: A,
  pub(crate) b: B,
  pub(crate) func: F,
}

impl<A, B, F, Out> Observable for CombineLatestOp<A, B, F>
where
  A: Observable,
  B: Observable<Err = A::Err>,
  F: FnMut(A::Item, B::Item) -> Out,
{
  type Item = Out;
  type Err = A::Err;
}

struct CombineState<O, AItem, BItem, F> {
  observer: Option<O>,
  func: F,
  a: Option<AItem>,
  b: Option<BItem>,
  live: usize,
  subscription: SharedSubscription,
}

impl<O, AItem, BItem, F, Out> CombineState<O, AItem, BItem, F>
where
  O: Observer<Item = Out>,
  O::Err: FromCallbackPanic,
  F: FnMut(AItem, BItem) -> Out,
  AItem: Clone,
  BItem: Clone,
{
  fn emit_if_ready(&mut self) {
    if let (Some(a), Some(b)) = (self.a.clone(), self.b.clone()) {
      // The guard keeps a panicking combiner from unwinding while the
      // state mutex is held, which would poison it for every later event.
      match guard_callback(|| (self.func)(a, b)) {
        Ok(combined) => {
          if let Some(observer) = self.observer.as_mut() {
            observer.next(combined);
          }
        }
        Err(err) => self.side_errored(err),
      }
    }
  }

  fn side_completed(&mut self) {
    self.live = self.live.saturating_sub(1);
    if self.live == 0 {
      if let Some(mut observer) = self.observer.take() {
        observer.complete();
      }
    }
  }

  fn side_errored(&mut self, err: O::Err) {
    if let Some(mut observer) = self.observer.take() {
      self.subscription.unsubscribe();
      observer.error(err);
    }
  }
}

impl<A, B, F, Out> CoreObservable for CombineLatestOp<A, B, F>
where
  A: CoreObservable,
  B: CoreObservable<Err = A::Err>,
  A::Err: FromCallbackPanic,
  A::Item: Clone + Send + 'static,
  B::Item: Clone + Send + 'static,
  F: FnMut(A::Item, B::Item) -> Out + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(CombineState {
      observer: Some(observer),
      func: self.func,
      a: None,
      b: None,
      live: 2,
      subscription: subscription.clone(),
    }));
    subscription
      .add(self.a.actual_subscribe(CombineSideA { state: state.clone() }));
    subscription.add(self.b.actual_subscribe(CombineSideB { state }));
    subscription
  }
}

pub struct CombineSideA<O, AItem, BItem, F> {
  state: Arc<Mutex<CombineState<O, AItem, BItem, F>>>,
}

pub struct CombineSideB<O, AItem, BItem, F> {
  state: Arc<Mutex<CombineState<O, AItem, BItem, F>>>,
}

impl<O, AItem, BItem, F, Out> Observer for CombineSideA<O, AItem, BItem, F>
where
  O: Observer<Item = Out>,
  O::Err: FromCallbackPanic,
  F: FnMut(AItem, BItem) -> Out,
  AItem: Clone,
  BItem: Clone,
{
  type Item = AItem;
  type Err = O::Err;

  fn next(&mut self, value: AItem) {
    let mut state = self.state.lock().unwrap();
    if state.observer.is_none() {
      return;
    }
    state.a = Some(value);
    state.emit_if_ready();
  }

  fn error(&mut self, err: Self::Err) {
    self.state.lock().unwrap().side_errored(err);
  }

  fn complete(&mut self) { self.state.lock().unwrap().side_completed(); }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

impl<O, AItem, BItem, F, Out> Observer for CombineSideB<O, AItem, BItem, F>
where
  O: Observer<Item = Out>,
  O::Err: FromCallbackPanic,
  F: FnMut(AItem, BItem) -> Out,
  AItem: Clone,
  BItem: Clone,
{
  type Item = BItem;
  type Err = O::Err;

  fn next(&mut self, value: BItem) {
    let mut state = self.state.lock().unwrap();
    if state.observer.is_none() {
      return;
    }
    state.b = Some(value);
    state.emit_if_ready();
  }

  fn error(&mut self, err: Self::Err) {
    self.state.lock().unwrap().side_errored(err);
  }

  fn complete(&mut self) { self.state.lock().unwrap().side_completed(); }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

/// Combines the latest values of three sources.
pub fn combine_latest3<A, B, C, F, Out>(
  a: A,
  b: B,
  c: C,
  mut f: F,
) -> impl CoreObservable<Item = Out, Err = A::Err>
where
  A: CoreObservable,
  B: CoreObservable<Err = A::Err>,
  C: CoreObservable<Err = A::Err>,
  A::Err: FromCallbackPanic,
  A::Item: Clone + Send + 'static,
  B::Item: Clone + Send + 'static,
  C::Item: Clone + Send + 'static,
  F: FnMut(A::Item, B::Item, C::Item) -> Out + Send + 'static,
{
  a.combine_latest(b, |a, b| (a, b))
    .combine_latest(c, move |(a, b), c| f(a, b, c))
}

/// Combines the latest values of four sources.
pub fn combine_latest4<A, B, C, D, F, Out>(
  a: A,
  b: B,
  c: C,
  d: D,
  mut f: F,
) -> impl CoreObservable<Item = Out, Err = A::Err>
where
  A: CoreObservable,
  B: CoreObservable<Err = A::Err>,
  C: CoreObservable<Err = A::Err>,
  D: CoreObservable<Err = A::Err>,
  A::Err: FromCallbackPanic,
  A::Item: Clone + Send + 'static,
  B::Item: Clone + Send + 'static,
  C::Item: Clone + Send + 'static,
  D::Item: Clone + Send + 'static,
  F: FnMut(A::Item, B::Item, C::Item, D::Item) -> Out + Send + 'static,
{
  a.combine_latest(b, |a, b| (a, b))
    .combine_latest(c, |(a, b), c| (a, b, c))
    .combine_latest(d, move |(a, b, c), d| f(a, b, c, d))
}

#[cfg(test)]
mod test {
  use super::combine_latest3;
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn emits_only_after_both_sides_produced() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut left = PublishSubject::<i32, ()>::new();
    let mut right = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    left
      .clone()
      .combine_latest(right.clone(), |a, b| a * 10 + b)
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    left.next(1);
    assert!(emitted.lock().unwrap().is_empty());
    right.next(2);
    left.next(3);
    assert_eq!(*emitted.lock().unwrap(), vec![12, 32]);
  }

  #[test]
  fn completes_when_both_sides_complete() {
    let completed = Arc::new(AtomicBool::new(false));
    let mut left = PublishSubject::<i32, ()>::new();
    let mut right = PublishSubject::<i32, ()>::new();
    let c_completed = completed.clone();
    left
      .clone()
      .combine_latest(right.clone(), |a, b| a + b)
      .subscribe_complete(|_| {}, move || {
        c_completed.store(true, Ordering::SeqCst)
      });
    left.complete();
    assert!(!completed.load(Ordering::SeqCst));
    right.complete();
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn panicking_combiner_errors_without_poisoning_the_stage() {
    let error_seen = Arc::new(Mutex::new(None));
    let mut left = PublishSubject::<i32, String>::new();
    let mut right = PublishSubject::<i32, String>::new();
    let c_error = error_seen.clone();
    left
      .clone()
      .combine_latest(right.clone(), |a, b| {
        if b == 0 {
          panic!("combiner blew up");
        }
        a + b
      })
      .subscribe_err(|_| {}, move |e| *c_error.lock().unwrap() = Some(e));
    left.next(1);
    right.next(0);
    assert_eq!(
      *error_seen.lock().unwrap(),
      Some(String::from("combiner blew up"))
    );
    // The shared state mutex survived the fault: further emissions are
    // dropped quietly instead of panicking on a poisoned lock.
    left.next(2);
    right.next(3);
  }

  #[test]
  fn three_way_combination() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut a = PublishSubject::<i32, ()>::new();
    let mut b = PublishSubject::<i32, ()>::new();
    let mut c = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    combine_latest3(a.clone(), b.clone(), c.clone(), |x, y, z| x + y + z)
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    a.next(1);
    b.next(2);
    c.next(3);
    b.next(20);
    assert_eq!(*emitted.lock().unwrap(), vec![6, 24]);
  }
}
