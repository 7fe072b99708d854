use std::sync::{Arc, Mutex};

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{
  SerialSubscription, SharedSubscription, SubscriptionLike,
};
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::switch_on_next`]: for a source of
/// observables, always mirrors the most recently emitted inner one; each
/// new inner disposes the previous inner subscription.
#[derive(Clone)]
pub struct SwitchOnNextOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for SwitchOnNextOp<S>
where
  S: Observable,
  S::Item: Observable<Err = S::Err>,
{
  type Item = <S::Item as Observable>::Item;
  type Err = S::Err;
}

struct SwitchState<O> {
  observer: Option<O>,
  generation: u64,
  inner_live: bool,
  outer_done: bool,
  subscription: SharedSubscription,
}

impl<O: Observer> SwitchState<O> {
  fn finish_complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.complete();
    }
  }

  fn finish_error(&mut self, err: O::Err) {
    if let Some(mut observer) = self.observer.take() {
      self.subscription.unsubscribe();
      observer.error(err);
    }
  }
}

impl<S> CoreObservable for SwitchOnNextOp<S>
where
  S: CoreObservable,
  S::Item: CoreObservable<Err = S::Err> + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let inner_slot = SerialSubscription::new();
    subscription.add(inner_slot.clone());
    let state = Arc::new(Mutex::new(SwitchState {
      observer: Some(observer),
      generation: 0,
      inner_live: false,
      outer_done: false,
      subscription: subscription.clone(),
    }));
    let upstream = self.source.actual_subscribe(SwitchOuterObserver {
      state,
      inner_slot,
      _hint: TypeHint::new(),
    });
    subscription.add(upstream);
    subscription
  }
}

pub struct SwitchOuterObserver<O, Inner> {
  state: Arc<Mutex<SwitchState<O>>>,
  inner_slot: SerialSubscription,
  _hint: TypeHint<Inner>,
}

impl<O, Inner, Err> Observer for SwitchOuterObserver<O, Inner>
where
  O: Observer<Item = Inner::Item, Err = Err> + Send + 'static,
  Inner: CoreObservable<Err = Err>,
{
  type Item = Inner;
  type Err = Err;

  fn next(&mut self, inner: Inner) {
    let generation = {
      let mut state = self.state.lock().unwrap();
      if state.observer.is_none() {
        return;
      }
      state.generation += 1;
      state.inner_live = true;
      state.generation
    };
    let inner_subscription = inner.actual_subscribe(SwitchInnerObserver {
      state: self.state.clone(),
      generation,
    });
    self.inner_slot.set(inner_subscription);
  }

  fn error(&mut self, err: Self::Err) {
    self.state.lock().unwrap().finish_error(err);
  }

  fn complete(&mut self) {
    let mut state = self.state.lock().unwrap();
    state.outer_done = true;
    if !state.inner_live {
      state.finish_complete();
    }
  }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

pub struct SwitchInnerObserver<O> {
  state: Arc<Mutex<SwitchState<O>>>,
  generation: u64,
}

impl<O> Observer for SwitchInnerObserver<O>
where
  O: Observer,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    let mut state = self.state.lock().unwrap();
    if state.generation != self.generation {
      return;
    }
    if let Some(observer) = state.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Self::Err) {
    let mut state = self.state.lock().unwrap();
    if state.generation != self.generation {
      return;
    }
    state.finish_error(err);
  }

  fn complete(&mut self) {
    let mut state = self.state.lock().unwrap();
    if state.generation != self.generation {
      return;
    }
    state.inner_live = false;
    if state.outer_done {
      state.finish_complete();
    }
  }

  fn is_stopped(&self) -> bool {
    let state = self.state.lock().unwrap();
    state.observer.is_none() || state.generation != self.generation
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn a_new_inner_displaces_the_previous_one() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut outer = PublishSubject::<PublishSubject<i32, ()>, ()>::new();
    let mut first = PublishSubject::<i32, ()>::new();
    let mut second = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    outer
      .clone()
      .switch_on_next()
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));

    outer.next(first.clone());
    first.next(1);
    outer.next(second.clone());
    first.next(2);
    second.next(3);
    assert_eq!(*emitted.lock().unwrap(), vec![1, 3]);
  }

  #[test]
  fn completes_when_outer_and_current_inner_are_done() {
    let completed = Arc::new(AtomicBool::new(false));
    let mut outer = PublishSubject::<PublishSubject<i32, ()>, ()>::new();
    let mut inner = PublishSubject::<i32, ()>::new();
    let c_completed = completed.clone();
    outer
      .clone()
      .switch_on_next()
      .subscribe_complete(|_| {}, move || {
        c_completed.store(true, Ordering::SeqCst)
      });
    outer.next(inner.clone());
    outer.complete();
    assert!(!completed.load(Ordering::SeqCst));
    inner.complete();
    assert!(completed.load(Ordering::SeqCst));
  }
}
