use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subject::PublishSubject;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::group_by`]: a stream of
/// [`GroupedObservable`]s, one per distinct key.
///
/// Groups are hot: values routed to a group before anyone subscribed to
/// it are lost, so subscribe to each group as it arrives.
#[derive(Clone)]
pub struct GroupByOp<S, F> {
  pub(crate) source: S,
  pub(crate) key_fn: F,
}

/// One key's sub-stream, tagged with the key that selected it.
pub struct GroupedObservable<K, Item, Err> {
  key: K,
  subject: PublishSubject<Item, Err>,
}

impl<K, Item, Err> GroupedObservable<K, Item, Err> {
  pub fn key(&self) -> &K { &self.key }
}

impl<K, Item, Err> Clone for GroupedObservable<K, Item, Err>
where
  K: Clone,
{
  fn clone(&self) -> Self {
    GroupedObservable {
      key: self.key.clone(),
      subject: self.subject.clone(),
    }
  }
}

impl<K, Item, Err> Observable for GroupedObservable<K, Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<K, Item, Err> CoreObservable for GroupedObservable<K, Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Item, Err = Err> + Send + 'static,
  {
    self.subject.actual_subscribe(observer)
  }
}

impl<S, F, K> Observable for GroupByOp<S, F>
where
  S: Observable,
  F: FnMut(&S::Item) -> K,
{
  type Item = GroupedObservable<K, S::Item, S::Err>;
  type Err = S::Err;
}

impl<S, F, K> CoreObservable for GroupByOp<S, F>
where
  S: CoreObservable,
  F: FnMut(&S::Item) -> K + Send + 'static,
  K: Clone + Eq + Hash + Send + 'static,
  S::Item: Clone + Send + 'static,
  S::Err: Clone + FromCallbackPanic + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(GroupByObserver {
      observer: Some(observer),
      key_fn: self.key_fn,
      groups: HashMap::new(),
    })
  }
}

pub struct GroupByObserver<O, F, K, Item, Err> {
  observer: Option<O>,
  key_fn: F,
  groups: HashMap<K, PublishSubject<Item, Err>>,
}

impl<O, F, K, Item, Err> Observer for GroupByObserver<O, F, K, Item, Err>
where
  O: Observer<Item = GroupedObservable<K, Item, Err>, Err = Err>,
  F: FnMut(&Item) -> K,
  K: Clone + Eq + Hash,
  Item: Clone + Send + 'static,
  Err: Clone + FromCallbackPanic + Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    let key = match guard_callback(|| (self.key_fn)(&value)) {
      Ok(key) => key,
      Err(err) => {
        self.error(err);
        return;
      }
    };
    if !self.groups.contains_key(&key) {
      let subject = PublishSubject::new();
      self.groups.insert(key.clone(), subject.clone());
      if let Some(observer) = self.observer.as_mut() {
        observer.next(GroupedObservable { key: key.clone(), subject });
      }
    }
    if let Some(subject) = self.groups.get_mut(&key) {
      subject.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(mut observer) = self.observer.take() {
      for subject in self.groups.values_mut() {
        subject.error(err.clone());
      }
      self.groups.clear();
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      for subject in self.groups.values_mut() {
        subject.complete();
      }
      self.groups.clear();
      observer.complete();
    }
  }

  fn is_stopped(&self) -> bool {
    self
      .observer
      .as_ref()
      .map_or(true, |observer| observer.is_stopped())
  }
}
