use std::fmt::Debug;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

use crate::error::panic_message;
use crate::hooks;
use crate::observer::{CheckedObserver, Observer};
use crate::subscription::{SharedSubscription, SubscriptionLike};

/// The safety wrapper installed around every user observer at the public
/// subscribe boundary.
///
/// It latches the terminal state, drops emissions after termination or
/// unsubscription, disposes the downstream composite before the user's
/// error/complete callback runs, reports every surfaced error to the
/// process-wide error hook, and converts a failing `checked_next` into an
/// error on itself.
pub struct SafeObserver<O> {
  target: O,
  subscription: SharedSubscription,
  stopped: bool,
}

impl<O> SafeObserver<O> {
  pub(crate) fn new(target: O, subscription: SharedSubscription) -> Self {
    SafeObserver {
      target,
      subscription,
      stopped: false,
    }
  }
}

impl<O> Observer for SafeObserver<O>
where
  O: CheckedObserver,
  O::Err: Debug,
{
  type Item = O::Item;
  type Err = O::Err;

  fn next(&mut self, value: Self::Item) {
    if self.stopped || self.subscription.is_closed() {
      return;
    }
    if let Err(err) = self.target.checked_next(value) {
      self.error(err);
    }
  }

  fn error(&mut self, err: Self::Err) {
    if self.stopped {
      // Terminal already delivered: the error has nowhere to go but the
      // process-wide hook.
      hooks::error_handler(&err);
      return;
    }
    self.stopped = true;
    self.subscription.unsubscribe();
    hooks::error_handler(&err);
    let outcome =
      catch_unwind(AssertUnwindSafe(|| self.target.on_error(err)));
    if let Err(payload) = outcome {
      let secondary = panic_message(payload.as_ref());
      hooks::error_handler(&format!(
        "error handler itself failed: {secondary}"
      ));
      resume_unwind(payload);
    }
  }

  fn complete(&mut self) {
    if self.stopped {
      return;
    }
    self.stopped = true;
    self.subscription.unsubscribe();
    let outcome =
      catch_unwind(AssertUnwindSafe(|| self.target.on_complete()));
    if let Err(payload) = outcome {
      let summary = panic_message(payload.as_ref());
      hooks::error_handler(&format!(
        "completion callback failed: {summary}"
      ));
    }
  }

  fn is_stopped(&self) -> bool {
    self.stopped || self.subscription.is_closed()
  }
}

/// The sink handed to a `create` producer.
///
/// It enforces the emission grammar at the producer edge — events after a
/// terminal or after unsubscription are dropped — and lets the producer
/// register teardowns and poll for cancellation. The sink may be moved to
/// another thread for asynchronous production.
pub struct Subscriber<Item, Err> {
  observer: Box<dyn Observer<Item = Item, Err = Err> + Send>,
  subscription: SharedSubscription,
  stopped: bool,
}

impl<Item, Err> Subscriber<Item, Err> {
  pub(crate) fn new(
    observer: Box<dyn Observer<Item = Item, Err = Err> + Send>,
    subscription: SharedSubscription,
  ) -> Self {
    Subscriber {
      observer,
      subscription,
      stopped: false,
    }
  }

  /// True once the downstream went away or a terminal event was emitted.
  /// Long-running producers should poll this between emissions.
  pub fn is_closed(&self) -> bool {
    self.stopped || self.subscription.is_closed() || self.observer.is_stopped()
  }

  /// Registers a resource disposed when the subscriber unsubscribes.
  pub fn add<S>(&self, subscription: S)
  where
    S: SubscriptionLike + Send + 'static,
  {
    self.subscription.add(subscription);
  }

  /// Registers a cleanup closure run when the subscriber unsubscribes.
  pub fn add_action<F>(&self, action: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.subscription.add_action(action);
  }
}

impl<Item, Err> Observer for Subscriber<Item, Err> {
  type Item = Item;
  type Err = Err;

  fn next(&mut self, value: Item) {
    if !self.is_closed() {
      self.observer.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if self.is_closed() {
      return;
    }
    self.stopped = true;
    self.subscription.unsubscribe();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    if self.is_closed() {
      return;
    }
    self.stopped = true;
    self.subscription.unsubscribe();
    self.observer.complete();
  }

  fn is_stopped(&self) -> bool { self.is_closed() }
}
