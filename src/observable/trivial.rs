use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Creates an observable that emits no values and terminates with the
/// given error.
pub fn throw<Item, Err>(e: Err) -> ThrowOp<Item, Err> {
  ThrowOp { err: e, _hint: TypeHint::new() }
}

#[derive(Clone)]
pub struct ThrowOp<Item, Err> {
  err: Err,
  _hint: TypeHint<Item>,
}

impl<Item, Err> Observable for ThrowOp<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> CoreObservable for ThrowOp<Item, Err> {
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    observer.error(self.err);
    SharedSubscription::new()
  }
}

/// Creates an observable that produces no values and completes
/// immediately.
pub fn empty<Item, Err>() -> EmptyOp<Item, Err> {
  EmptyOp(TypeHint::new())
}

#[derive(Clone)]
pub struct EmptyOp<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Observable for EmptyOp<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> CoreObservable for EmptyOp<Item, Err> {
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    observer.complete();
    SharedSubscription::new()
  }
}

/// Creates an observable that never emits anything: no value, no error,
/// no completion.
pub fn never<Item, Err>() -> NeverOp<Item, Err> {
  NeverOp(TypeHint::new())
}

#[derive(Clone)]
pub struct NeverOp<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Observable for NeverOp<Item, Err> {
  type Item = Item;
  type Err = Err;
}

impl<Item, Err> CoreObservable for NeverOp<Item, Err> {
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    drop(observer);
    SharedSubscription::new()
  }
}
