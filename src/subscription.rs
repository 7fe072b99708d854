use std::mem::replace;
use std::sync::{Arc, Mutex};

/// Handle returned from `Observable.subscribe` to allow deregistering an
/// observer before the stream has finished emitting.
pub trait SubscriptionLike {
  /// Cancels the subscription. Calling it a second time is a no-op.
  fn unsubscribe(&mut self);

  fn is_closed(&self) -> bool;
}

type Teardown = Box<dyn SubscriptionLike + Send>;

enum TeardownSlot {
  None,
  Once(Teardown),
  Multi(Vec<Teardown>),
}

struct Inner {
  closed: bool,
  teardown: TeardownSlot,
}

impl Default for Inner {
  fn default() -> Self {
    Inner {
      closed: false,
      teardown: TeardownSlot::None,
    }
  }
}

/// A clonable composite subscription.
///
/// All clones share one state: unsubscribing any clone disposes every
/// teardown registered through `add`. Adding to an already closed
/// composite disposes the new child immediately.
#[derive(Clone, Default)]
pub struct SharedSubscription(Arc<Mutex<Inner>>);

impl SharedSubscription {
  pub fn new() -> Self { Self::default() }

  pub fn add<S>(&self, subscription: S)
  where
    S: SubscriptionLike + Send + 'static,
  {
    let mut subscription: Teardown = Box::new(subscription);
    {
      let mut inner = self.0.lock().unwrap();
      if !inner.closed {
        let teardown = &mut inner.teardown;
        match teardown {
          TeardownSlot::None => *teardown = TeardownSlot::Once(subscription),
          TeardownSlot::Once(_) => {
            let first = replace(teardown, TeardownSlot::None);
            if let TeardownSlot::Once(first) = first {
              *teardown = TeardownSlot::Multi(vec![first, subscription]);
            }
          }
          TeardownSlot::Multi(vec) => vec.push(subscription),
        }
        return;
      }
    }
    subscription.unsubscribe();
  }

  /// Registers a cleanup closure that runs exactly once when the
  /// composite is unsubscribed.
  pub fn add_action<F>(&self, action: F)
  where
    F: FnOnce() + Send + 'static,
  {
    self.add(ActionSubscription::new(action));
  }
}

impl SubscriptionLike for SharedSubscription {
  fn unsubscribe(&mut self) {
    // Teardowns run outside the lock so a child may touch this
    // composite (or user code) without deadlocking.
    let teardown = {
      let mut inner = self.0.lock().unwrap();
      if inner.closed {
        return;
      }
      inner.closed = true;
      replace(&mut inner.teardown, TeardownSlot::None)
    };
    match teardown {
      TeardownSlot::None => {}
      TeardownSlot::Once(mut s) => s.unsubscribe(),
      TeardownSlot::Multi(mut subscriptions) => {
        subscriptions.iter_mut().for_each(|s| s.unsubscribe())
      }
    }
  }

  fn is_closed(&self) -> bool { self.0.lock().unwrap().closed }
}

/// The cheapest subscription: a boolean flag with nothing to dispose.
#[derive(Default, Clone)]
pub struct SingleSubscription(bool);

impl SubscriptionLike for SingleSubscription {
  #[inline]
  fn unsubscribe(&mut self) { self.0 = true; }
  #[inline]
  fn is_closed(&self) -> bool { self.0 }
}

/// Runs a cleanup closure exactly once on unsubscribe.
pub struct ActionSubscription(Option<Box<dyn FnOnce() + Send>>);

impl ActionSubscription {
  pub fn new<F>(action: F) -> Self
  where
    F: FnOnce() + Send + 'static,
  {
    ActionSubscription(Some(Box::new(action)))
  }
}

impl SubscriptionLike for ActionSubscription {
  fn unsubscribe(&mut self) {
    if let Some(action) = self.0.take() {
      action();
    }
  }

  fn is_closed(&self) -> bool { self.0.is_none() }
}

struct SerialInner {
  closed: bool,
  current: Option<Teardown>,
}

/// Holds at most one inner subscription; setting a new one disposes the
/// previous. Used wherever an upstream is swapped while the downstream
/// subscription stays alive (`switch_on_next`, rescheduled timers,
/// `subscribe_on`).
#[derive(Clone)]
pub struct SerialSubscription(Arc<Mutex<SerialInner>>);

impl Default for SerialSubscription {
  fn default() -> Self {
    SerialSubscription(Arc::new(Mutex::new(SerialInner {
      closed: false,
      current: None,
    })))
  }
}

impl SerialSubscription {
  pub fn new() -> Self { Self::default() }

  pub fn set<S>(&self, subscription: S)
  where
    S: SubscriptionLike + Send + 'static,
  {
    let mut subscription: Teardown = Box::new(subscription);
    let previous = {
      let mut inner = self.0.lock().unwrap();
      if inner.closed {
        drop(inner);
        subscription.unsubscribe();
        return;
      }
      inner.current.replace(subscription)
    };
    if let Some(mut previous) = previous {
      previous.unsubscribe();
    }
  }
}

impl SubscriptionLike for SerialSubscription {
  fn unsubscribe(&mut self) {
    let current = {
      let mut inner = self.0.lock().unwrap();
      if inner.closed {
        return;
      }
      inner.closed = true;
      inner.current.take()
    };
    if let Some(mut current) = current {
      current.unsubscribe();
    }
  }

  fn is_closed(&self) -> bool { self.0.lock().unwrap().closed }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;

  #[test]
  fn composite_disposes_children() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut composite = SharedSubscription::new();
    for _ in 0..3 {
      let hits = hits.clone();
      composite.add_action(move || {
        hits.fetch_add(1, Ordering::SeqCst);
      });
    }
    composite.unsubscribe();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    // idempotent
    composite.unsubscribe();
    assert_eq!(hits.load(Ordering::SeqCst), 3);
  }

  #[test]
  fn add_after_close_disposes_immediately() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut composite = SharedSubscription::new();
    composite.unsubscribe();
    let c_hits = hits.clone();
    composite.add_action(move || {
      c_hits.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn serial_replaces_and_disposes_previous() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let serial = SerialSubscription::new();
    let c_first = first.clone();
    serial.set(ActionSubscription::new(move || {
      c_first.fetch_add(1, Ordering::SeqCst);
    }));
    let c_second = second.clone();
    serial.set(ActionSubscription::new(move || {
      c_second.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 0);

    let mut handle = serial.clone();
    handle.unsubscribe();
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert!(serial.is_closed());
  }
}
