use std::sync::{Arc, Mutex};

use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::flat_map`]: each value is mapped
/// to an inner observable, every inner is subscribed immediately, and
/// their emissions are merged. Completes once the outer and every inner
/// completed; the first error anywhere terminates everything.
#[derive(Clone)]
pub struct FlatMapOp<S, F> {
  pub(crate) source: S,
  pub(crate) func: F,
}

impl<S, F, Inner> Observable for FlatMapOp<S, F>
where
  S: Observable,
  F: FnMut(S::Item) -> Inner,
  Inner: Observable<Err = S::Err>,
{
  type Item = Inner::Item;
  type Err = S::Err;
}

struct FlatMapState<O> {
  observer: Option<O>,
  live: usize,
  subscription: SharedSubscription,
}

impl<O: Observer> FlatMapState<O> {
  fn branch_completed(&mut self) {
    self.live = self.live.saturating_sub(1);
    if self.live == 0 {
      if let Some(mut observer) = self.observer.take() {
        observer.complete();
      }
    }
  }

  fn errored(&mut self, err: O::Err) {
    if let Some(mut observer) = self.observer.take() {
      self.subscription.unsubscribe();
      observer.error(err);
    }
  }
}

impl<S, F, Inner> CoreObservable for FlatMapOp<S, F>
where
  S: CoreObservable,
  S::Item: 'static,
  S::Err: FromCallbackPanic,
  F: FnMut(S::Item) -> Inner + Send + 'static,
  Inner: CoreObservable<Err = S::Err>,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(FlatMapState {
      observer: Some(observer),
      live: 1,
      subscription: subscription.clone(),
    }));
    let upstream = self.source.actual_subscribe(FlatMapOuterObserver {
      state,
      func: self.func,
      subscription: subscription.clone(),
      _hint: TypeHint::new(),
    });
    subscription.add(upstream);
    subscription
  }
}

pub struct FlatMapOuterObserver<O, F, Item> {
  state: Arc<Mutex<FlatMapState<O>>>,
  func: F,
  subscription: SharedSubscription,
  _hint: TypeHint<Item>,
}

impl<O, F, Item, Inner, Err> Observer for FlatMapOuterObserver<O, F, Item>
where
  O: Observer<Item = Inner::Item, Err = Err> + Send + 'static,
  Err: FromCallbackPanic,
  F: FnMut(Item) -> Inner,
  Inner: CoreObservable<Err = Err>,
{
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) {
    let inner = match guard_callback(|| (self.func)(value)) {
      Ok(inner) => inner,
      Err(err) => {
        self.state.lock().unwrap().errored(err);
        return;
      }
    };
    {
      let mut state = self.state.lock().unwrap();
      if state.observer.is_none() {
        return;
      }
      state.live += 1;
    }
    let inner_subscription = inner
      .actual_subscribe(FlatMapInnerObserver { state: self.state.clone() });
    self.subscription.add(inner_subscription);
  }

  fn error(&mut self, err: Self::Err) {
    self.state.lock().unwrap().errored(err);
  }

  fn complete(&mut self) {
    self.state.lock().unwrap().branch_completed();
  }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

pub struct FlatMapInnerObserver<O> {
  state: Arc<Mutex<FlatMapState<O>>>,
}

impl<O> Observer for FlatMapInnerObserver<O>
where
  O: Observer,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    let mut state = self.state.lock().unwrap();
    if let Some(observer) = state.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) {
    self.state.lock().unwrap().errored(err);
  }

  fn complete(&mut self) {
    self.state.lock().unwrap().branch_completed();
  }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn merges_every_inner_sequence() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));
    let c_emitted = emitted.clone();
    let c_completed = completed.clone();
    observable::from_iter::<_, ()>(vec![1, 10])
      .flat_map(|base| observable::from_iter(vec![base, base + 1]))
      .subscribe_complete(
        move |v| c_emitted.lock().unwrap().push(v),
        move || c_completed.store(true, Ordering::SeqCst),
      );
    assert_eq!(*emitted.lock().unwrap(), vec![1, 2, 10, 11]);
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn completion_waits_for_live_inners() {
    let completed = Arc::new(AtomicBool::new(false));
    let mut outer = PublishSubject::<i32, ()>::new();
    let mut inner = PublishSubject::<i32, ()>::new();
    let c_completed = completed.clone();
    let inner_for_map = inner.clone();
    outer
      .clone()
      .flat_map(move |_| inner_for_map.clone())
      .subscribe_complete(|_| {}, move || {
        c_completed.store(true, Ordering::SeqCst)
      });
    outer.next(1);
    outer.complete();
    assert!(!completed.load(Ordering::SeqCst));
    inner.complete();
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn inner_error_terminates_the_whole_stream() {
    let errored = Arc::new(AtomicBool::new(false));
    let c_errored = errored.clone();
    observable::from_iter::<_, &str>(vec![1, 2])
      .flat_map(|v| {
        observable::create(move |mut sink: Subscriber<i32, &str>| {
          if v == 2 {
            sink.error("boom");
          } else {
            sink.next(v);
            sink.complete();
          }
        })
      })
      .subscribe_err(|_| {}, move |_| c_errored.store(true, Ordering::SeqCst));
    assert!(errored.load(Ordering::SeqCst));
  }
}
