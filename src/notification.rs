/// A reified stream event, as produced by `materialize` and consumed by
/// `dematerialize`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

impl<Item, Err> Notification<Item, Err> {
  #[inline]
  pub fn is_next(&self) -> bool { matches!(self, Notification::Next(_)) }

  #[inline]
  pub fn is_error(&self) -> bool { matches!(self, Notification::Error(_)) }

  #[inline]
  pub fn is_complete(&self) -> bool { matches!(self, Notification::Complete) }

  /// Borrows the payload of a `Next` notification.
  pub fn value(&self) -> Option<&Item> {
    match self {
      Notification::Next(v) => Some(v),
      _ => None,
    }
  }
}
