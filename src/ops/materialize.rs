use crate::notification::Notification;
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::materialize`]: every event is
/// reified into a [`Notification`] value; the notification stream itself
/// always completes normally.
#[derive(Clone)]
pub struct MaterializeOp<S> {
  pub(crate) source: S,
}

impl<S> Observable for MaterializeOp<S>
where
  S: Observable,
{
  type Item = Notification<S::Item, S::Err>;
  type Err = S::Err;
}

impl<S> CoreObservable for MaterializeOp<S>
where
  S: CoreObservable,
  S::Item: 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(MaterializeObserver {
      observer: Some(observer),
      _hint: TypeHint::new(),
    })
  }
}

pub struct MaterializeObserver<O, Item> {
  observer: Option<O>,
  _hint: TypeHint<Item>,
}

impl<O, Item, Err> Observer for MaterializeObserver<O, Item>
where
  O: Observer<Item = Notification<Item, Err>, Err = Err>,
{
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) {
    if let Some(observer) = self.observer.as_mut() {
      observer.next(Notification::Next(value));
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(mut observer) = self.observer.take() {
      observer.next(Notification::Error(err));
      if !observer.is_stopped() {
        observer.complete();
      }
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
      observer.next(Notification::Complete);
      if !observer.is_stopped() {
        observer.complete();
      }
    }
  }

  fn is_stopped(&self) -> bool {
    self
      .observer
      .as_ref()
      .map_or(true, |observer| observer.is_stopped())
  }
}

/// Observable returned by [`Observable::dematerialize`]: the inverse of
/// `materialize`.
#[derive(Clone)]
pub struct DematerializeOp<S> {
  pub(crate) source: S,
}

impl<S, B, Err> Observable for DematerializeOp<S>
where
  S: Observable<Item = Notification<B, Err>, Err = Err>,
{
  type Item = B;
  type Err = Err;
}

impl<S, B, Err> CoreObservable for DematerializeOp<S>
where
  S: CoreObservable<Item = Notification<B, Err>, Err = Err>,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self
      .source
      .actual_subscribe(DematerializeObserver { observer: Some(observer) })
  }
}

pub struct DematerializeObserver<O> {
  observer: Option<O>,
}

impl<O> Observer for DematerializeObserver<O>
where
  O: Observer,
{
  type Item = Notification<O::Item, O::Err>;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    match value {
      Notification::Next(v) => {
        if let Some(observer) = self.observer.as_mut() {
          observer.next(v);
        }
      }
      Notification::Error(err) => {
        if let Some(mut observer) = self.observer.take() {
          observer.error(err);
        }
      }
      Notification::Complete => {
        if let Some(mut observer) = self.observer.take() {
          observer.complete();
        }
      }
    }
  }

  fn error(&mut self, err: Self::Err) {
    if let Some(mut observer) = self.observer.take() {
      observer.error(err);
    }
  }

  fn complete(&mut self) {
    if let Some(mut observer) = self.observer.take() {
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

#[cfg(test)]
mod test {
  use crate::notification::Notification;
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::{Arc, Mutex};

  #[test]
  fn materialize_reifies_all_events() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let c_emitted = emitted.clone();
    observable::from_iter::<_, ()>(vec![1, 2])
      .materialize()
      .subscribe(move |n| c_emitted.lock().unwrap().push(n));
    assert_eq!(
      *emitted.lock().unwrap(),
      vec![
        Notification::Next(1),
        Notification::Next(2),
        Notification::Complete
      ]
    );
  }

  #[test]
  fn materialize_reifies_errors_and_completes() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(AtomicBool::new(false));
    let c_emitted = emitted.clone();
    let c_completed = completed.clone();
    observable::throw::<i32, &str>("boom")
      .materialize()
      .subscribe_complete(
        move |n| c_emitted.lock().unwrap().push(n),
        move || c_completed.store(true, Ordering::SeqCst),
      );
    assert_eq!(*emitted.lock().unwrap(), vec![Notification::Error("boom")]);
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn round_trip_is_identity() {
    let direct = Arc::new(Mutex::new(Vec::new()));
    let round_trip = Arc::new(Mutex::new(Vec::new()));
    let c_direct = direct.clone();
    let c_round_trip = round_trip.clone();
    observable::from_iter::<_, ()>(vec![1, 2, 3])
      .subscribe(move |v| c_direct.lock().unwrap().push(v));
    observable::from_iter::<_, ()>(vec![1, 2, 3])
      .materialize()
      .dematerialize()
      .subscribe(move |v| c_round_trip.lock().unwrap().push(v));
    assert_eq!(*direct.lock().unwrap(), *round_trip.lock().unwrap());
  }
}
