use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::to_list`]: the whole sequence as
/// one `Vec`, emitted on completion.
#[derive(Clone)]
pub struct ToListOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for ToListOp<S>
where
  S: Observable,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

impl<S> CoreObservable for ToListOp<S>
where
  S: CoreObservable,
  S::Item: Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(ToListObserver {
      observer,
      buffer: Vec::new(),
    })
  }
}

pub struct ToListObserver<O, Item> {
  observer: O,
  buffer: Vec<Item>,
}

impl<O, Item> Observer for ToListObserver<O, Item>
where
  O: Observer<Item = Vec<Item>>,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) { self.buffer.push(value); }

  fn error(&mut self, err: Self::Err) {
    self.buffer.clear();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let list = std::mem::take(&mut self.buffer);
    self.observer.next(list);
    if !self.observer.is_stopped() {
      self.observer.complete();
    }
  }

  fn is_stopped(&self) -> bool { self.observer.is_stopped() }
}

/// Observable returned by [`Observable::to_sorted_list`].
#[derive(Clone)]
pub struct ToSortedListOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for ToSortedListOp<S>
where
  S: Observable,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

impl<S> CoreObservable for ToSortedListOp<S>
where
  S: CoreObservable,
  S::Item: Ord + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(ToSortedListObserver {
      observer,
      buffer: Vec::new(),
    })
  }
}

pub struct ToSortedListObserver<O, Item> {
  observer: O,
  buffer: Vec<Item>,
}

impl<O, Item> Observer for ToSortedListObserver<O, Item>
where
  O: Observer<Item = Vec<Item>>,
  Item: Ord,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) { self.buffer.push(value); }

  fn error(&mut self, err: Self::Err) {
    self.buffer.clear();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    let mut list = std::mem::take(&mut self.buffer);
    list.sort();
    self.observer.next(list);
    if !self.observer.is_stopped() {
      self.observer.complete();
    }
  }

  fn is_stopped(&self) -> bool { self.observer.is_stopped() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn collects_everything_in_order() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    observable::from_iter::<_, ()>(vec![3, 1, 2])
      .to_list()
      .subscribe(move |list| c_emitted.lock().unwrap().push(list));
    assert_eq!(*emitted.lock().unwrap(), vec![vec![3, 1, 2]]);
  }

  #[test]
  fn sorted_variant_sorts_ascending() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    observable::from_iter::<_, ()>(vec![3, 1, 2])
      .to_sorted_list()
      .subscribe(move |list| c_emitted.lock().unwrap().push(list));
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1, 2, 3]]);
  }
}
