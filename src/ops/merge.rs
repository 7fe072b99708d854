use std::sync::{Arc, Mutex};

use crate::hooks;
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// Observable returned by [`Observable::merge`]: both sources are
/// subscribed at once and their events interleave; the first error on
/// either side terminates everything.
#[derive(Clone)]
pub struct MergeOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for MergeOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item, Err = A::Err>,
{
  type Item = A::Item;
  type Err = A::Err;
}

struct MergeState<O> {
  observer: Option<O>,
  live: usize,
  subscription: SharedSubscription,
}

impl<A, B> CoreObservable for MergeOp<A, B>
where
  A: CoreObservable,
  B: CoreObservable<Item = A::Item, Err = A::Err>,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(MergeState {
      observer: Some(observer),
      live: 2,
      subscription: subscription.clone(),
    }));
    subscription.add(self.a.actual_subscribe(MergeObserver { state: state.clone() }));
    subscription.add(self.b.actual_subscribe(MergeObserver { state }));
    subscription
  }
}

pub struct MergeObserver<O> {
  state: Arc<Mutex<MergeState<O>>>,
}

impl<O> Observer for MergeObserver<O>
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
    state.live = state.live.saturating_sub(1);
    if state.live == 0 {
      if let Some(mut observer) = state.observer.take() {
        observer.complete();
      }
    }
  }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

/// Observable returned by [`Observable::merge_delay_error`]: errors are
/// collected instead of terminating, and surfaced only after both sides
/// finished. With more than one collected error, the first terminates the
/// stream and the rest are reported to the process-wide error hook.
#[derive(Clone)]
pub struct MergeDelayErrorOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for MergeDelayErrorOp<A, B>
where
  A: Observable,
  B: Observable<Item = A::Item, Err = A::Err>,
{
  type Item = A::Item;
  type Err = A::Err;
}

struct DelayErrorState<O, Err> {
  observer: Option<O>,
  live: usize,
  errors: Vec<Err>,
}

impl<A, B> CoreObservable for MergeDelayErrorOp<A, B>
where
  A: CoreObservable,
  B: CoreObservable<Item = A::Item, Err = A::Err>,
  A::Err: std::fmt::Debug + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(DelayErrorState {
      observer: Some(observer),
      live: 2,
      errors: Vec::new(),
    }));
    subscription.add(
      self
        .a
        .actual_subscribe(MergeDelayErrorObserver { state: state.clone() }),
    );
    subscription.add(self.b.actual_subscribe(MergeDelayErrorObserver { state }));
    subscription
  }
}

pub struct MergeDelayErrorObserver<O, Err> {
  state: Arc<Mutex<DelayErrorState<O, Err>>>,
}

impl<O, Err> MergeDelayErrorObserver<O, Err>
where
  O: Observer<Err = Err>,
  Err: std::fmt::Debug,
{
  fn side_finished(state: &mut DelayErrorState<O, Err>) {
    state.live = state.live.saturating_sub(1);
    if state.live > 0 {
      return;
    }
    if let Some(mut observer) = state.observer.take() {
      let mut errors = std::mem::take(&mut state.errors);
      if errors.is_empty() {
        observer.complete();
      } else {
        let first = errors.remove(0);
        for extra in &errors {
          hooks::error_handler(extra);
        }
        observer.error(first);
      }
    }
  }
}

impl<O, Err> Observer for MergeDelayErrorObserver<O, Err>
where
  O: Observer<Err = Err>,
  Err: std::fmt::Debug,
{
  type Item = O::Item;
  type Err = Err;

  fn next(&mut self, value: Self::Item) {
    let mut state = self.state.lock().unwrap();
    if let Some(observer) = state.observer.as_mut() {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    let mut state = self.state.lock().unwrap();
    state.errors.push(err);
    Self::side_finished(&mut state);
  }

  fn complete(&mut self) {
    let mut state = self.state.lock().unwrap();
    Self::side_finished(&mut state);
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
  fn interleaves_two_subjects() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut left = PublishSubject::<i32, ()>::new();
    let mut right = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    left
      .clone()
      .merge(right.clone())
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    left.next(1);
    right.next(2);
    left.next(3);
    assert_eq!(*emitted.lock().unwrap(), vec![1, 2, 3]);
  }

  #[test]
  fn completes_only_after_both_sides() {
    let completed = Arc::new(AtomicBool::new(false));
    let mut left = PublishSubject::<i32, ()>::new();
    let mut right = PublishSubject::<i32, ()>::new();
    let c_completed = completed.clone();
    left
      .clone()
      .merge(right.clone())
      .subscribe_complete(|_| {}, move || {
        c_completed.store(true, Ordering::SeqCst)
      });
    left.complete();
    assert!(!completed.load(Ordering::SeqCst));
    right.complete();
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn first_error_terminates_plain_merge() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let errored = Arc::new(AtomicBool::new(false));
    let mut left = PublishSubject::<i32, &str>::new();
    let mut right = PublishSubject::<i32, &str>::new();
    let c_emitted = emitted.clone();
    let c_errored = errored.clone();
    left.clone().merge(right.clone()).subscribe_err(
      move |v| c_emitted.lock().unwrap().push(v),
      move |_| c_errored.store(true, Ordering::SeqCst),
    );
    left.error("boom");
    right.next(5);
    assert!(errored.load(Ordering::SeqCst));
    assert!(emitted.lock().unwrap().is_empty());
  }

  #[test]
  fn delayed_error_arrives_after_the_other_side_finished() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let error_seen = Arc::new(Mutex::new(None));
    let mut left = PublishSubject::<i32, &str>::new();
    let mut right = PublishSubject::<i32, &str>::new();
    let c_emitted = emitted.clone();
    let c_error = error_seen.clone();
    left.clone().merge_delay_error(right.clone()).subscribe_err(
      move |v| c_emitted.lock().unwrap().push(v),
      move |e| *c_error.lock().unwrap() = Some(e),
    );
    left.error("late");
    right.next(5);
    assert!(error_seen.lock().unwrap().is_none());
    right.complete();
    assert_eq!(*emitted.lock().unwrap(), vec![5]);
    assert_eq!(*error_seen.lock().unwrap(), Some("late"));
  }
}
