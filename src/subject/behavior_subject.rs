use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subject::{ReplayPolicy, SubjectCore};
use crate::subscription::SharedSubscription;

/// A subject that remembers only the latest value. Fresh subscribers
/// immediately receive it (the seed before anything was emitted); after a
/// terminal event they receive only the terminal.
pub struct BehaviorSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> BehaviorSubject<Item, Err>
where
  Item: Clone,
{
  pub fn new(seed: Item) -> Self {
    BehaviorSubject {
      core: SubjectCore::with_seed(ReplayPolicy::Latest, seed),
    }
  }
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }
}

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self { BehaviorSubject { core: self.core.clone() } }
}

impl<Item, Err> Observer for BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) { self.core.emit_next(value) }

  fn error(&mut self, err: Err) { self.core.emit_error(err) }

  fn complete(&mut self) { self.core.emit_complete() }

  fn is_stopped(&self) -> bool { self.core.is_terminated() }
}

impl<Item, Err> Observable for BehaviorSubject<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> CoreObservable for BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Item, Err = Err> + Send + 'static,
  {
    self.core.subscribe(observer)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn subscriber_receives_seed_then_live_values() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut subject = BehaviorSubject::<i32, ()>::new(0);
    let c_seen = seen.clone();
    subject
      .clone()
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![0]);

    subject.next(1);
    subject.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
  }

  #[test]
  fn late_subscriber_receives_latest_only() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut subject = BehaviorSubject::<i32, ()>::new(0);
    subject.next(1);
    subject.next(2);
    let c_seen = seen.clone();
    subject
      .clone()
      .subscribe(move |v| c_seen.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![2]);
  }

  #[test]
  fn after_completion_only_the_terminal_is_delivered() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(Mutex::new(false));
    let mut subject = BehaviorSubject::<i32, ()>::new(0);
    subject.next(9);
    subject.complete();

    let c_seen = seen.clone();
    let c_completed = completed.clone();
    subject.clone().subscribe_complete(
      move |v| c_seen.lock().unwrap().push(v),
      move || *c_completed.lock().unwrap() = true,
    );
    assert!(seen.lock().unwrap().is_empty());
    assert!(*completed.lock().unwrap());
  }
}
