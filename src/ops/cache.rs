use std::sync::{Arc, Mutex};

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subject::ReplaySubject;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::cache`].
///
/// The first subscriber triggers exactly one upstream subscription that
/// feeds an unbounded replay subject; every subscriber (first included)
/// reads from the subject and therefore sees the identical sequence.
/// There is no way to release the upstream subscription, so this must
/// not be used on infinite sources.
pub struct CacheOp<S, Item, Err> {
  pub(crate) source: Arc<Mutex<Option<S>>>,
  pub(crate) subject: ReplaySubject<Item, Err>,
}

impl<S, Item, Err> Clone for CacheOp<S, Item, Err> {
  fn clone(&self) -> Self {
    CacheOp {
      source: self.source.clone(),
      subject: self.subject.clone(),
    }
  }
}

impl<S, Item, Err> Observable for CacheOp<S, Item, Err>
where
  S: Observable<Item = Item, Err = Err>,
{
  type Item = Item;
  type Err = Err;
}

impl<S, Item, Err> CoreObservable for CacheOp<S, Item, Err>
where
  S: CoreObservable<Item = Item, Err = Err>,
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Item, Err = Err> + Send + 'static,
  {
    // Route the observer into the subject first so a synchronously
    // emitting source cannot race past it.
    let subscription = self.subject.clone().actual_subscribe(observer);
    let pending = self.source.lock().unwrap().take();
    if let Some(source) = pending {
      // The upstream subscription is deliberately dropped: the cache
      // holds the source for its whole lifetime.
      let _ = source.actual_subscribe(self.subject);
    }
    subscription
  }
}
