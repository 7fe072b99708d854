use std::sync::{Arc, Mutex};

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// An observable whose upstream subscription is deferred until
/// [`connect`](ConnectableObservable::connect).
///
/// Subscribing routes the observer into the subject only; `connect`
/// subscribes the subject to the source, starting one shared execution
/// for every routed observer. Unsubscribing the connection handle tears
/// down the upstream and resets the slot, so a later `connect` starts a
/// fresh shared execution.
pub struct ConnectableObservable<Source, Subject> {
  source: Source,
  subject: Subject,
  connection: Arc<Mutex<Option<SharedSubscription>>>,
}

impl<Source, Subject> ConnectableObservable<Source, Subject> {
  pub fn new(source: Source, subject: Subject) -> Self {
    ConnectableObservable {
      source,
      subject,
      connection: Arc::new(Mutex::new(None)),
    }
  }
}

impl<Source, Subject> Clone for ConnectableObservable<Source, Subject>
where
  Source: Clone,
  Subject: Clone,
{
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<Source, Subject> Observable for ConnectableObservable<Source, Subject>
where
  Subject: Observable,
{
  type Item = Subject::Item;
  type Err = Subject::Err;
}

impl<Source, Subject> CoreObservable for ConnectableObservable<Source, Subject>
where
  Subject: CoreObservable,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.subject.actual_subscribe(observer)
  }
}

impl<Source, Subject> ConnectableObservable<Source, Subject>
where
  Source: CoreObservable + Clone,
  Subject: Observer<Item = Source::Item, Err = Source::Err>
    + Clone
    + Send
    + 'static,
{
  /// Subscribes the subject to the source, at most once per connection
  /// cycle. Concurrent calls are serialized; while a connection is live,
  /// further calls return its handle.
  pub fn connect(&self) -> SharedSubscription {
    let mut slot = self.connection.lock().unwrap();
    if let Some(existing) = slot.as_ref() {
      if !existing.is_closed() {
        return existing.clone();
      }
    }
    let connection = SharedSubscription::new();
    let upstream = self.source.clone().actual_subscribe(self.subject.clone());
    connection.add(upstream);
    let connection_slot = self.connection.clone();
    connection.add_action(move || {
      connection_slot.lock().unwrap().take();
    });
    *slot = Some(connection.clone());
    connection
  }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn subscribers_see_nothing_until_connect() {
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let connectable = observable::of::<_, ()>(100).publish();

    let c_first = first.clone();
    connectable.clone().subscribe(move |v| c_first.lock().unwrap().push(v));
    let c_second = second.clone();
    connectable
      .clone()
      .subscribe(move |v| c_second.lock().unwrap().push(v));

    assert!(first.lock().unwrap().is_empty());
    connectable.connect();
    assert_eq!(*first.lock().unwrap(), vec![100]);
    assert_eq!(*second.lock().unwrap(), vec![100]);
  }

  #[test]
  fn connect_while_connected_returns_existing_handle() {
    let subscriptions = Arc::new(AtomicUsize::new(0));
    let c_subscriptions = subscriptions.clone();
    let source = observable::create(move |_sink: Subscriber<i32, ()>| {
      // Never terminates, so the connection stays live.
      c_subscriptions.fetch_add(1, Ordering::SeqCst);
    });
    let connectable = source.publish();
    connectable.clone().subscribe(|_| {});

    let first = connectable.connect();
    let second = connectable.connect();
    assert_eq!(subscriptions.load(Ordering::SeqCst), 1);

    drop(second);
    let mut handle = first;
    handle.unsubscribe();
    // The slot was reset: connecting again starts a fresh execution.
    connectable.connect();
    assert_eq!(subscriptions.load(Ordering::SeqCst), 2);
  }
}
