use std::fmt::Debug;

use crate::hooks;
use crate::type_hint::TypeHint;

/// An Observer is a consumer of values delivered by an Observable, one
/// method for each kind of notification: `next`, `error` and `complete`.
///
/// `Item` is the type of the elements being emitted, `Err` the type of the
/// error that may propagate. The legal call grammar — any number of `next`
/// followed by at most one of `error`/`complete` — is enforced by the
/// wrappers installed at subscribe time, not by every implementor.
pub trait Observer {
  type Item;
  type Err;

  fn next(&mut self, value: Self::Item);

  fn error(&mut self, err: Self::Err);

  fn complete(&mut self);

  /// True once this observer can no longer accept events, either because
  /// a terminal event was delivered or the subscription was cancelled.
  /// Synchronous producers poll this between emissions.
  fn is_stopped(&self) -> bool;
}

impl<Item, Err> Observer for Box<dyn Observer<Item = Item, Err = Err> + Send> {
  type Item = Item;
  type Err = Err;

  #[inline]
  fn next(&mut self, value: Item) { (**self).next(value) }

  #[inline]
  fn error(&mut self, err: Err) { (**self).error(err) }

  #[inline]
  fn complete(&mut self) { (**self).complete() }

  #[inline]
  fn is_stopped(&self) -> bool { (**self).is_stopped() }
}

/// Observer whose `next` stage may fail with the stream's error type.
///
/// This is how user-callback faults travel without exceptions: the safe
/// wrapper invokes `checked_next` and converts an `Err` return into
/// `error` on itself, after disposing the upstream.
pub trait CheckedObserver {
  type Item;
  type Err;

  fn checked_next(&mut self, value: Self::Item) -> Result<(), Self::Err>;

  fn on_error(&mut self, err: Self::Err);

  fn on_complete(&mut self);
}

/// Adapts a plain [`Observer`] to the checked interface (its `next` never
/// fails).
pub struct ObserverAdapter<O>(pub(crate) O);

impl<O> CheckedObserver for ObserverAdapter<O>
where
  O: Observer,
{
  type Item = O::Item;
  type Err = O::Err;

  #[inline]
  fn checked_next(&mut self, value: Self::Item) -> Result<(), Self::Err> {
    self.0.next(value);
    Ok(())
  }

  #[inline]
  fn on_error(&mut self, err: Self::Err) { self.0.error(err) }

  #[inline]
  fn on_complete(&mut self) { self.0.complete() }
}

/// Observer synthesized from subscribe closures.
///
/// A missing error slot routes terminal errors through the unhandled-error
/// hook and then panics on the emitting thread, so a producer failure is
/// never silently dropped.
pub struct CallbackObserver<N, E, C, Item, Err> {
  pub(crate) next: N,
  pub(crate) error: Option<E>,
  pub(crate) complete: Option<C>,
  pub(crate) _hint: TypeHint<(Item, Err)>,
}

impl<N, E, C, Item, Err> CheckedObserver for CallbackObserver<N, E, C, Item, Err>
where
  N: FnMut(Item),
  E: FnMut(Err),
  C: FnMut(),
  Err: Debug,
{
  type Item = Item;
  type Err = Err;

  fn checked_next(&mut self, value: Item) -> Result<(), Err> {
    (self.next)(value);
    Ok(())
  }

  fn on_error(&mut self, err: Err) {
    match self.error.as_mut() {
      Some(handler) => handler(err),
      None => {
        hooks::unhandled_error(&err);
        panic!("stream error reached a subscriber without an error handler: {err:?}");
      }
    }
  }

  fn on_complete(&mut self) {
    if let Some(complete) = self.complete.as_mut() {
      complete();
    }
  }
}

/// Like [`CallbackObserver`] but with a fallible `next` closure; an `Err`
/// return terminates the stream through the regular error path.
pub struct CheckedCallbackObserver<N, E, Item, Err> {
  pub(crate) next: N,
  pub(crate) error: E,
  pub(crate) _hint: TypeHint<(Item, Err)>,
}

impl<N, E, Item, Err> CheckedObserver for CheckedCallbackObserver<N, E, Item, Err>
where
  N: FnMut(Item) -> Result<(), Err>,
  E: FnMut(Err),
{
  type Item = Item;
  type Err = Err;

  #[inline]
  fn checked_next(&mut self, value: Item) -> Result<(), Err> { (self.next)(value) }

  #[inline]
  fn on_error(&mut self, err: Err) { (self.error)(err) }

  fn on_complete(&mut self) {}
}
