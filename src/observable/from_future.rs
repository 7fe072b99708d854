use std::fmt::{self, Display};
use std::future::Future;
use std::time::Duration;

use futures::executor::block_on;
use futures::future::{select, Either};
use futures_timer::Delay;

use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

/// Creates an observable from a future, emitting its output then
/// completing.
///
/// The future is resolved with a blocking wait on the thread performing
/// the subscription; pair with `subscribe_on` to keep that off the caller.
pub fn from_future<F, Err>(future: F) -> FromFutureOp<F, Err>
where
  F: Future,
{
  FromFutureOp { future, _hint: TypeHint::new() }
}

/// Like [`from_future`], for futures resolving to a `Result`: `Ok` becomes
/// a value + completion, `Err` becomes the stream error.
pub fn from_future_result<F, Item, Err>(future: F) -> FromFutureResultOp<F>
where
  F: Future<Output = Result<Item, Err>>,
{
  FromFutureResultOp { future }
}

/// Like [`from_future`], but gives up after `timeout` with a
/// [`FutureTimeout`] error.
pub fn from_future_timeout<F>(
  future: F,
  timeout: Duration,
) -> FromFutureTimeoutOp<F>
where
  F: Future,
{
  FromFutureTimeoutOp { future, timeout }
}

/// Error emitted when a [`from_future_timeout`] wait elapses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FutureTimeout(pub Duration);

impl Display for FutureTimeout {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "future did not resolve within {:?}", self.0)
  }
}

impl std::error::Error for FutureTimeout {}

#[derive(Clone)]
pub struct FromFutureOp<F, Err> {
  future: F,
  _hint: TypeHint<Err>,
}

impl<F, Err> Observable for FromFutureOp<F, Err>
where
  F: Future,
{
  type Item = F::Output;
  type Err = Err;
}

impl<F, Err> CoreObservable for FromFutureOp<F, Err>
where
  F: Future,
{
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let value = block_on(self.future);
    if !observer.is_stopped() {
      observer.next(value);
    }
    if !observer.is_stopped() {
      observer.complete();
    }
    SharedSubscription::new()
  }
}

#[derive(Clone)]
pub struct FromFutureResultOp<F> {
  future: F,
}

impl<F, Item, Err> Observable for FromFutureResultOp<F>
where
  F: Future<Output = Result<Item, Err>>,
{
  type Item = Item;
  type Err = Err;
}

impl<F, Item, Err> CoreObservable for FromFutureResultOp<F>
where
  F: Future<Output = Result<Item, Err>>,
{
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    match block_on(self.future) {
      Ok(value) => {
        if !observer.is_stopped() {
          observer.next(value);
        }
        if !observer.is_stopped() {
          observer.complete();
        }
      }
      Err(err) => {
        if !observer.is_stopped() {
          observer.error(err);
        }
      }
    }
    SharedSubscription::new()
  }
}

#[derive(Clone)]
pub struct FromFutureTimeoutOp<F> {
  future: F,
  timeout: Duration,
}

impl<F> Observable for FromFutureTimeoutOp<F>
where
  F: Future,
{
  type Item = F::Output;
  type Err = FutureTimeout;
}

impl<F> CoreObservable for FromFutureTimeoutOp<F>
where
  F: Future,
{
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let timeout = self.timeout;
    let outcome = block_on(select(Box::pin(self.future), Delay::new(timeout)));
    match outcome {
      Either::Left((value, _)) => {
        if !observer.is_stopped() {
          observer.next(value);
        }
        if !observer.is_stopped() {
          observer.complete();
        }
      }
      Either::Right(((), _)) => {
        if !observer.is_stopped() {
          observer.error(FutureTimeout(timeout));
        }
      }
    }
    SharedSubscription::new()
  }
}

#[cfg(test)]
mod test {
  use super::FutureTimeout;
  use crate::prelude::*;
  use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[test]
  fn resolves_and_completes() {
    let value = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicBool::new(false));
    let c_value = value.clone();
    let c_completed = completed.clone();
    observable::from_future::<_, ()>(async { 42usize }).subscribe_complete(
      move |v| c_value.store(v, Ordering::SeqCst),
      move || c_completed.store(true, Ordering::SeqCst),
    );
    assert_eq!(value.load(Ordering::SeqCst), 42);
    assert!(completed.load(Ordering::SeqCst));
  }

  #[test]
  fn err_output_becomes_stream_error() {
    let errored = Arc::new(AtomicBool::new(false));
    let c_errored = errored.clone();
    observable::from_future_result(async { Err::<i32, _>("boom") })
      .subscribe_err(
        |_| {},
        move |e| {
          assert_eq!(e, "boom");
          c_errored.store(true, Ordering::SeqCst);
        },
      );
    assert!(errored.load(Ordering::SeqCst));
  }

  #[test]
  fn timeout_elapses_into_an_error() {
    let errored = Arc::new(AtomicBool::new(false));
    let c_errored = errored.clone();
    observable::from_future_timeout(
      futures::future::pending::<i32>(),
      Duration::from_millis(10),
    )
    .subscribe_err(
      |_| {},
      move |e: FutureTimeout| {
        assert_eq!(e, FutureTimeout(Duration::from_millis(10)));
        c_errored.store(true, Ordering::SeqCst);
      },
    );
    assert!(errored.load(Ordering::SeqCst));
  }
}
