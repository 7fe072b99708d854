use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// Observable returned by [`Observable::zip`]: strictly positional pairs.
///
/// The stream completes as soon as a completed side has no buffered
/// values left to pair; whatever the other side still buffered is
/// discarded.
#[derive(Clone)]
pub struct ZipOp<A, B> {
  pub(crate) a: A,
  pub(crate) b: B,
}

impl<A, B> Observable for ZipOp<A, B>
where
  A: Observable,
  B: Observable<Err = A::Err>,
{
  type Item = (A::Item, B::Item);
  type Err = A::Err;
}

struct ZipState<O, AItem, BItem> {
  observer: Option<O>,
  a: VecDeque<AItem>,
  b: VecDeque<BItem>,
  done_a: bool,
  done_b: bool,
  subscription: SharedSubscription,
}

impl<O, AItem, BItem> ZipState<O, AItem, BItem>
where
  O: Observer<Item = (AItem, BItem)>,
{
  fn drained(&self) -> bool {
    (self.done_a && self.a.is_empty()) || (self.done_b && self.b.is_empty())
  }

  fn finish_if_drained(&mut self) {
    if self.drained() {
      if let Some(mut observer) = self.observer.take() {
        self.subscription.unsubscribe();
        observer.complete();
      }
    }
  }
}

impl<A, B> CoreObservable for ZipOp<A, B>
where
  A: CoreObservable,
  B: CoreObservable<Err = A::Err>,
  A::Item: Send + 'static,
  B::Item: Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(ZipState {
      observer: Some(observer),
      a: VecDeque::new(),
      b: VecDeque::new(),
      done_a: false,
      done_b: false,
      subscription: subscription.clone(),
    }));
    subscription.add(self.a.actual_subscribe(ZipSideA { state: state.clone() }));
    subscription.add(self.b.actual_subscribe(ZipSideB { state }));
    subscription
  }
}

pub struct ZipSideA<O, AItem, BItem> {
  state: Arc<Mutex<ZipState<O, AItem, BItem>>>,
}

pub struct ZipSideB<O, AItem, BItem> {
  state: Arc<Mutex<ZipState<O, AItem, BItem>>>,
}

fn zip_error<O, AItem, BItem>(
  state: &Arc<Mutex<ZipState<O, AItem, BItem>>>,
  err: O::Err,
) where
  O: Observer<Item = (AItem, BItem)>,
{
  let mut state = state.lock().unwrap();
  if let Some(mut observer) = state.observer.take() {
    state.subscription.unsubscribe();
    observer.error(err);
  }
}

impl<O, AItem, BItem> Observer for ZipSideA<O, AItem, BItem>
where
  O: Observer<Item = (AItem, BItem)>,
{
  type Item = AItem;
  type Err = O::Err;

  fn next(&mut self, value: AItem) {
    let mut state = self.state.lock().unwrap();
    if state.observer.is_none() {
      return;
    }
    match state.b.pop_front() {
      Some(other) => {
        if let Some(observer) = state.observer.as_mut() {
          observer.next((value, other));
        }
      }
      None => state.a.push_back(value),
    }
    state.finish_if_drained();
  }

  fn error(&mut self, err: Self::Err) { zip_error(&self.state, err); }

  fn complete(&mut self) {
    let mut state = self.state.lock().unwrap();
    state.done_a = true;
    state.finish_if_drained();
  }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}

impl<O, AItem, BItem> Observer for ZipSideB<O, AItem, BItem>
where
  O: Observer<Item = (AItem, BItem)>,
{
  type Item = BItem;
  type Err = O::Err;

  fn next(&mut self, value: BItem) {
    let mut state = self.state.lock().unwrap();
    if state.observer.is_none() {
      return;
    }
    match state.a.pop_front() {
      Some(other) => {
        if let Some(observer) = state.observer.as_mut() {
          observer.next((other, value));
        }
      }
      None => state.b.push_back(value),
    }
    state.finish_if_drained();
  }

  fn error(&mut self, err: Self::Err) { zip_error(&self.state, err); }

  fn complete(&mut self) {
    let mut state = self.state.lock().unwrap();
    state.done_b = true;
    state.finish_if_drained();
  }

  fn is_stopped(&self) -> bool {
    self.state.lock().unwrap().observer.is_none()
  }
}
