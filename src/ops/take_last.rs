use std::collections::VecDeque;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::take_last`].
///
/// Nothing is emitted until the source completes; an erroring source
/// emits nothing.
#[derive(Clone)]
pub struct TakeLastOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
}

impl<S> Observable for TakeLastOp<S>
where
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;
}

impl<S> CoreObservable for TakeLastOp<S>
where
  S: CoreObservable,
  S::Item: Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(TakeLastObserver {
      observer,
      count: self.count,
      buffer: VecDeque::new(),
    })
  }
}

pub struct TakeLastObserver<O, Item> {
  observer: O,
  count: usize,
  buffer: VecDeque<Item>,
}

impl<O, Item> Observer for TakeLastObserver<O, Item>
where
  O: Observer<Item = Item>,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    if self.count == 0 {
      return;
    }
    self.buffer.push_back(value);
    if self.buffer.len() > self.count {
      self.buffer.pop_front();
    }
  }

  fn error(&mut self, err: Self::Err) {
    self.buffer.clear();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    while let Some(value) = self.buffer.pop_front() {
      if self.observer.is_stopped() {
        return;
      }
      self.observer.next(value);
    }
    self.observer.complete();
  }

  fn is_stopped(&self) -> bool { self.observer.is_stopped() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn emits_the_suffix_on_completion() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    observable::from_iter::<_, ()>(0..10)
      .take_last(3)
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    assert_eq!(*emitted.lock().unwrap(), vec![7, 8, 9]);
  }

  #[test]
  fn nothing_before_completion() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut subject = PublishSubject::<i32, ()>::new();
    let c_emitted = emitted.clone();
    subject
      .clone()
      .take_last(2)
      .subscribe(move |v| c_emitted.lock().unwrap().push(v));
    subject.next(1);
    subject.next(2);
    subject.next(3);
    assert!(emitted.lock().unwrap().is_empty());
    subject.complete();
    assert_eq!(*emitted.lock().unwrap(), vec![2, 3]);
  }
}
