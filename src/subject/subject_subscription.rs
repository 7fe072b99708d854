use std::sync::{Mutex, Weak};

use crate::subject::subject_core::CoreState;
use crate::subscription::SubscriptionLike;

/// Removes one observer from a subject's registry on unsubscribe.
///
/// The back-reference to the registry is weak so a forgotten subscription
/// can never keep the subject (and through it, every other subscriber)
/// alive.
pub(crate) struct SubjectSubscription<Item, Err> {
  core: Weak<Mutex<CoreState<Item, Err>>>,
  id: u64,
  closed: bool,
}

impl<Item, Err> SubjectSubscription<Item, Err> {
  pub(crate) fn new(core: Weak<Mutex<CoreState<Item, Err>>>, id: u64) -> Self {
    SubjectSubscription { core, id, closed: false }
  }
}

impl<Item, Err> SubscriptionLike for SubjectSubscription<Item, Err> {
  fn unsubscribe(&mut self) {
    if self.closed {
      return;
    }
    self.closed = true;
    if let Some(core) = self.core.upgrade() {
      let mut state = core.lock().unwrap();
      if let Some(index) =
        state.entries.iter().position(|entry| entry.id == self.id)
      {
        state.entries.remove(index);
      }
    }
  }

  fn is_closed(&self) -> bool { self.closed }
}
