use std::sync::{Arc, Mutex};

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::take_until`]: mirrors the source
/// until the notifier emits its first value, which completes the stream
/// and disposes both subscriptions. A notifier error is propagated; a
/// notifier that merely completes changes nothing.
#[derive(Clone)]
pub struct TakeUntilOp<S, N> {
  pub(crate) source: S,
  pub(crate) notifier: N,
}

impl<S, N> Observable for TakeUntilOp<S, N>
where
  S: Observable,
  N: Observable<Err = S::Err>,
{
  type Item = S::Item;
  type Err = S::Err;
}

struct TakeUntilState<O> {
  observer: Option<O>,
  subscription: SharedSubscription,
}

impl<S, N> CoreObservable for TakeUntilOp<S, N>
where
  S: CoreObservable,
  N: CoreObservable<Err = S::Err>,
  N::Item: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(TakeUntilState {
      observer: Some(observer),
      subscription: subscription.clone(),
    }));
    subscription.add(self.notifier.actual_subscribe(NotifierObserver {
      state: state.clone(),
      _hint: TypeHint::new(),
    }));
    subscription
      .add(self.source.actual_subscribe(TakeUntilObserver { state }));
    subscription
  }
}

pub struct TakeUntilObserver<O> {
  state: Arc<Mutex<TakeUntilState<O>>>,
}

impl<O> Observer for TakeUntilObserver<O>
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
    let mut state = self.state.lock().unwrap();
    if let Some(mut observer) = state.observer.take() {
      state.subscription.unsubscribe();
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    let mut state = self.state.lock().unwrap();
    if let Some(mut observer) = state.observer.take() {
      state.subscription.unsubscribe();
      observer.complete();
    }
  }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

pub struct NotifierObserver<O, NItem> {
  state: Arc<Mutex<TakeUntilState<O>>>,
  _hint: TypeHint<NItem>,
}

impl<O, NItem> Observer for NotifierObserver<O, NItem>
where
  O: Observer,
{
  type Item = NItem;
  type Err = O::Err;

  fn next(&mut self, _value: NItem) {
    let mut state = self.state.lock().unwrap();
    if let Some(mut observer) = state.observer.take() {
      state.subscription.unsubscribe();
      observer.complete();
    }
  }

  fn error(&mut self, err: Self::Err) {
    let mut state = self.state.lock().unwrap();
    if let Some(mut observer) = state.observer.take() {
      state.subscription.unsubscribe();
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    // A notifier that completes without firing never triggers.
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
  fn notifier_event_completes_the_stream() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));
    let mut source = PublishSubject::<i32, ()>::new();
    let mut stopper = PublishSubject::<&str, ()>::new();
    let c_emitted = emitted.clone();
    let c_completed = completed.clone();
    source
      .clone()
      .take_until(stopper.clone())
      .subscribe_complete(
        move |v| c_emitted.lock().unwrap().push(v),
        move || c_completed.store(true, Ordering::SeqCst),
      );
    source.next(1);
    source.next(2);
    stopper.next("stop");
    source.next(3);
    assert_eq!(*emitted.lock().unwrap(), vec![1, 2]);
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn silent_notifier_completion_changes_nothing() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut source = PublishSubject::<i32, ()>::new();
    let mut stopper = PublishSubject::<&str, ()>::new();
    let c_emitted = emitted.clone();
    source
      .clone()
      .take_until(stopper.clone())
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    stopper.complete();
    source.next(1);
    assert_eq!(*emitted.lock().unwrap(), vec![1]);
  }
}
