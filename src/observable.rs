//! The observable core: the type-level [`Observable`] trait carrying the
//! fluent operator surface, the [`CoreObservable`] subscription capability,
//! and the public subscribe dispatch with its safety wrapper.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::hooks;
use crate::notification::Notification;
use crate::observer::{
  CallbackObserver, CheckedCallbackObserver, CheckedObserver, Observer,
  ObserverAdapter,
};
use crate::ops::all::AllOp;
use crate::ops::buffer::BufferSignalOp;
use crate::ops::buffer_count::BufferCountOp;
use crate::ops::buffer_time::{BufferTimeCountOp, BufferTimeOp};
use crate::ops::cache::CacheOp;
use crate::ops::combine_latest::CombineLatestOp;
use crate::ops::concat::ConcatOp;
use crate::ops::filter::FilterOp;
use crate::ops::finalize::FinalizeOp;
use crate::ops::flat_map::FlatMapOp;
use crate::ops::group_by::GroupByOp;
use crate::ops::map::MapOp;
use crate::ops::materialize::{DematerializeOp, MaterializeOp};
use crate::ops::merge::{MergeDelayErrorOp, MergeOp};
use crate::ops::observe_on::ObserveOnOp;
use crate::ops::on_error::{OnErrorResumeNextOp, OnErrorReturnOp};
use crate::ops::reduce::ReduceOp;
use crate::ops::sample::SampleOp;
use crate::ops::scan::{ScanInitialOp, ScanOp};
use crate::ops::skip::SkipOp;
use crate::ops::start_with::StartWithOp;
use crate::ops::subscribe_on::SubscribeOnOp;
use crate::ops::switch_on_next::SwitchOnNextOp;
use crate::ops::synchronize::SynchronizeOp;
use crate::ops::take::TakeOp;
use crate::ops::take_last::TakeLastOp;
use crate::ops::take_until::TakeUntilOp;
use crate::ops::take_while::{TakeWhileOp, TakeWhileWithIndexOp};
use crate::ops::timestamp::TimestampOp;
use crate::ops::to_list::{ToListOp, ToSortedListOp};
use crate::ops::zip::ZipOp;
use crate::subject::{PublishSubject, ReplaySubject};
use crate::subscriber::SafeObserver;
use crate::subscription::SharedSubscription;
use crate::type_hint::TypeHint;

pub(crate) mod connectable_observable;
pub use connectable_observable::ConnectableObservable;
mod trivial;
pub use trivial::{empty, never, throw, EmptyOp, NeverOp, ThrowOp};
mod of;
pub use of::{of, OfOp};
mod from_iter;
pub use from_iter::{from_iter, range, FromIterOp};
mod from_fn;
pub use from_fn::{create, ObservableFromFn};
mod from_future;
pub use from_future::{
  from_future, from_future_result, from_future_timeout, FromFutureOp,
  FromFutureResultOp, FromFutureTimeoutOp, FutureTimeout,
};
mod defer;
pub use defer::{defer, DeferOp};
mod interval;
pub use interval::{interval, IntervalOp};

/// An inert description of a push-based sequence.
///
/// The trait is purely type-level (`Item`, `Err`) plus the operator
/// surface: every combinator wraps `self` in an operator struct without
/// doing any work. Execution starts when a [`CoreObservable`] is
/// subscribed.
pub trait Observable: Sized {
  type Item;
  type Err;

  /// Transforms every emitted value with `f`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: FnMut(Self::Item) -> B,
  {
    MapOp { source: self, func: f }
  }

  /// Drops values the predicate rejects.
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    FilterOp { source: self, predicate }
  }

  /// Skips the first `count` values.
  fn skip(self, count: usize) -> SkipOp<Self> {
    SkipOp { source: self, count }
  }

  /// Emits only the first `count` values, then completes and lets go of
  /// the upstream.
  fn take(self, count: usize) -> TakeOp<Self> {
    TakeOp { source: self, count }
  }

  /// Forwards values while the predicate holds, then completes.
  fn take_while<F>(self, predicate: F) -> TakeWhileOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    TakeWhileOp { source: self, predicate }
  }

  /// Like `take_while`, with the zero-based element index passed to the
  /// predicate.
  fn take_while_with_index<F>(
    self,
    predicate: F,
  ) -> TakeWhileWithIndexOp<Self, F>
  where
    F: FnMut(&Self::Item, usize) -> bool,
  {
    TakeWhileWithIndexOp { source: self, predicate }
  }

  /// Emits the final `count` values once the source completes.
  fn take_last(self, count: usize) -> TakeLastOp<Self> {
    TakeLastOp { source: self, count }
  }

  /// Forwards the source until `notifier` emits its first value; that
  /// value completes the stream and both subscriptions are dropped.
  fn take_until<N>(self, notifier: N) -> TakeUntilOp<Self, N> {
    TakeUntilOp { source: self, notifier }
  }

  /// Collects every value and emits them as one `Vec` on completion.
  fn to_list(self) -> ToListOp<Self> { ToListOp { source: self } }

  /// Like `to_list`, sorted ascending.
  fn to_sorted_list(self) -> ToSortedListOp<Self> {
    ToSortedListOp { source: self }
  }

  /// Emits the given values before any value from the source.
  fn start_with<I>(self, values: I) -> StartWithOp<Self, Self::Item>
  where
    I: IntoIterator<Item = Self::Item>,
  {
    StartWithOp {
      source: self,
      values: values.into_iter().collect(),
    }
  }

  /// Emits everything from the source, then everything from `other`.
  fn concat<O>(self, other: O) -> ConcatOp<Self, O> {
    ConcatOp { a: self, b: other }
  }

  /// Interleaves the source with `other`; the first error on either side
  /// terminates.
  fn merge<O>(self, other: O) -> MergeOp<Self, O> {
    MergeOp { a: self, b: other }
  }

  /// Like `merge`, but errors are held back until both sides terminated.
  fn merge_delay_error<O>(self, other: O) -> MergeDelayErrorOp<Self, O> {
    MergeDelayErrorOp { a: self, b: other }
  }

  /// Maps each value to an inner observable and merges all inner
  /// emissions. Also known as `map_many`.
  fn flat_map<Inner, F>(self, f: F) -> FlatMapOp<Self, F>
  where
    F: FnMut(Self::Item) -> Inner,
    Inner: Observable<Err = Self::Err>,
  {
    FlatMapOp { source: self, func: f }
  }

  /// For a source of observables: always mirrors the most recent inner
  /// observable, unsubscribing the previous one.
  fn switch_on_next(self) -> SwitchOnNextOp<Self>
  where
    Self::Item: Observable<Err = Self::Err>,
  {
    SwitchOnNextOp { source: self }
  }

  /// Combines the latest value of both sources through `f` whenever
  /// either emits, once both have emitted at least once.
  fn combine_latest<O, B, F>(self, other: O, f: F) -> CombineLatestOp<Self, O, F>
  where
    O: Observable<Err = Self::Err>,
    F: FnMut(Self::Item, O::Item) -> B,
  {
    CombineLatestOp { a: self, b: other, func: f }
  }

  /// Pairs values of both sources strictly positionally.
  fn zip<O>(self, other: O) -> ZipOp<Self, O>
  where
    O: Observable<Err = Self::Err>,
  {
    ZipOp { a: self, b: other }
  }

  /// Emits one boolean per positional pair telling whether the two
  /// sources agree at that position.
  fn sequence_equal<O>(
    self,
    other: O,
  ) -> MapOp<ZipOp<Self, O>, fn((Self::Item, Self::Item)) -> bool>
  where
    O: Observable<Item = Self::Item, Err = Self::Err>,
    Self::Item: PartialEq,
  {
    MapOp {
      source: ZipOp { a: self, b: other },
      func: pair_equal::<Self::Item>,
    }
  }

  /// Emits the running accumulation; the first value seeds the
  /// accumulator and is emitted as-is.
  fn scan<F>(self, f: F) -> ScanOp<Self, F>
  where
    F: FnMut(Self::Item, Self::Item) -> Self::Item,
  {
    ScanOp { source: self, func: f }
  }

  /// Emits the running accumulation starting from `initial`.
  fn scan_initial<B, F>(self, initial: B, f: F) -> ScanInitialOp<Self, F, B>
  where
    F: FnMut(B, Self::Item) -> B,
  {
    ScanInitialOp { source: self, func: f, initial }
  }

  /// Folds the sequence with its first value as the seed and emits the
  /// result on completion; an empty source just completes.
  fn reduce<F>(self, f: F) -> ReduceOp<Self, F>
  where
    F: FnMut(Self::Item, Self::Item) -> Self::Item,
  {
    ReduceOp { source: self, func: f }
  }

  /// Folds the sequence from `initial` and emits the result on
  /// completion. Equivalent to `scan_initial(initial, f).take_last(1)`.
  fn reduce_initial<B, F>(
    self,
    initial: B,
    f: F,
  ) -> TakeLastOp<ScanInitialOp<Self, F, B>>
  where
    F: FnMut(B, Self::Item) -> B,
  {
    self.scan_initial(initial, f).take_last(1)
  }

  /// Emits whether every value satisfies the predicate; short-circuits on
  /// the first counterexample.
  fn all<F>(self, predicate: F) -> AllOp<Self, F>
  where
    F: FnMut(&Self::Item) -> bool,
  {
    AllOp { source: self, predicate }
  }

  /// Splits the source into hot per-key groups.
  fn group_by<K, F>(self, key_fn: F) -> GroupByOp<Self, F>
  where
    F: FnMut(&Self::Item) -> K,
  {
    GroupByOp { source: self, key_fn }
  }

  /// On every scheduler tick, emits the latest value that arrived since
  /// the previous tick (ticks with nothing new emit nothing).
  fn sample<SD>(self, period: Duration, scheduler: SD) -> SampleOp<Self, SD> {
    SampleOp { source: self, period, scheduler }
  }

  /// Groups values into non-overlapping chunks of `count`.
  fn buffer_count(self, count: usize) -> BufferCountOp<Self> {
    BufferCountOp { source: self, count, skip: count }
  }

  /// Opens a new buffer every `skip` values, each holding up to `count`;
  /// buffers overlap when `skip < count`.
  fn buffer_count_skip(self, count: usize, skip: usize) -> BufferCountOp<Self> {
    BufferCountOp { source: self, count, skip }
  }

  /// Emits the values gathered during each `timespan` window.
  fn buffer_time<SD>(
    self,
    timespan: Duration,
    scheduler: SD,
  ) -> BufferTimeOp<Self, SD> {
    BufferTimeOp {
      source: self,
      timespan,
      timeshift: timespan,
      scheduler,
    }
  }

  /// Opens a window every `timeshift`, each collecting for `timespan`.
  fn buffer_time_shift<SD>(
    self,
    timespan: Duration,
    timeshift: Duration,
    scheduler: SD,
  ) -> BufferTimeOp<Self, SD> {
    BufferTimeOp { source: self, timespan, timeshift, scheduler }
  }

  /// Emits a buffer when it reaches `count` values or when `timespan`
  /// elapses, whichever comes first.
  fn buffer_time_count<SD>(
    self,
    timespan: Duration,
    count: usize,
    scheduler: SD,
  ) -> BufferTimeCountOp<Self, SD> {
    BufferTimeCountOp { source: self, timespan, count, scheduler }
  }

  /// Signal-driven buffers: every `openings` value starts a buffer, which
  /// closes on the first event of the observable derived from it.
  fn buffer<OS, C, F>(self, openings: OS, closing: F) -> BufferSignalOp<Self, OS, F>
  where
    OS: Observable<Err = Self::Err>,
    F: FnMut(OS::Item) -> C,
    C: Observable<Err = Self::Err>,
  {
    BufferSignalOp { source: self, openings, closing_fn: closing }
  }

  /// Re-emits everything on the given scheduler, preserving order; at
  /// most one scheduled worker drains the handoff queue at a time.
  fn observe_on<SD>(self, scheduler: SD) -> ObserveOnOp<Self, SD> {
    ObserveOnOp { source: self, scheduler }
  }

  /// Performs the subscription itself (and the matching unsubscription)
  /// on the given scheduler.
  fn subscribe_on<SD>(self, scheduler: SD) -> SubscribeOnOp<Self, SD> {
    SubscribeOnOp { source: self, scheduler }
  }

  /// Serializes delivery behind a mutex so concurrent producers cannot
  /// interleave events.
  fn synchronize(self) -> SynchronizeOp<Self> {
    SynchronizeOp { source: self }
  }

  /// Runs `f` exactly once when the stream terminates or is
  /// unsubscribed.
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce(),
  {
    FinalizeOp { source: self, func: f }
  }

  /// Replaces a terminal error with one final value and a completion.
  fn on_error_return<F>(self, f: F) -> OnErrorReturnOp<Self, F>
  where
    F: FnMut(Self::Err) -> Self::Item,
  {
    OnErrorReturnOp { source: self, func: f }
  }

  /// Continues with the observable derived from a terminal error instead
  /// of propagating it.
  fn on_error_resume_next<R, F>(self, f: F) -> OnErrorResumeNextOp<Self, F>
  where
    F: FnMut(Self::Err) -> R,
    R: Observable<Item = Self::Item, Err = Self::Err>,
  {
    OnErrorResumeNextOp { source: self, func: f }
  }

  /// Reifies every event into a [`Notification`] value.
  fn materialize(self) -> MaterializeOp<Self> {
    MaterializeOp { source: self }
  }

  /// Turns a stream of [`Notification`]s back into the events they
  /// describe.
  fn dematerialize<B>(self) -> DematerializeOp<Self>
  where
    Self: Observable<Item = Notification<B, <Self as Observable>::Err>>,
  {
    DematerializeOp { source: self }
  }

  /// Pairs every value with the instant it passed this stage.
  fn timestamp(self) -> TimestampOp<Self> { TimestampOp { source: self } }

  /// Routes subscribers into `subject` and defers the upstream
  /// subscription until `connect` is called on the result.
  fn multicast<Sub>(self, subject: Sub) -> ConnectableObservable<Self, Sub> {
    ConnectableObservable::new(self, subject)
  }

  /// `multicast` through a [`PublishSubject`]: subscribers share one
  /// upstream subscription and see only events after `connect`.
  fn publish(
    self,
  ) -> ConnectableObservable<Self, PublishSubject<Self::Item, Self::Err>> {
    self.multicast(PublishSubject::new())
  }

  /// `multicast` through an unbounded [`ReplaySubject`]: late subscribers
  /// catch up on everything emitted since `connect`.
  fn replay(
    self,
  ) -> ConnectableObservable<Self, ReplaySubject<Self::Item, Self::Err>> {
    self.multicast(ReplaySubject::new())
  }

  /// Subscribes the source exactly once, on first demand, and replays the
  /// whole sequence to every subscriber. The upstream subscription is
  /// never released, so this must not be applied to infinite sources.
  fn cache(self) -> CacheOp<Self, Self::Item, Self::Err> {
    CacheOp {
      source: Arc::new(Mutex::new(Some(self))),
      subject: ReplaySubject::new(),
    }
  }

  /// Subscribes with a `next` closure only. A terminal error is reported
  /// to the unhandled-error hook and then raised on the emitting thread.
  fn subscribe<N>(self, next: N) -> SharedSubscription
  where
    Self: CoreObservable,
    Self::Item: 'static,
    Self::Err: Debug + 'static,
    N: FnMut(Self::Item) + Send + 'static,
  {
    safe_subscribe(
      self,
      CallbackObserver {
        next,
        error: None::<fn(Self::Err)>,
        complete: None::<fn()>,
        _hint: TypeHint::new(),
      },
    )
  }

  /// Subscribes with `next` and `error` closures.
  fn subscribe_err<N, E>(self, next: N, error: E) -> SharedSubscription
  where
    Self: CoreObservable,
    Self::Item: 'static,
    Self::Err: Debug + 'static,
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(Self::Err) + Send + 'static,
  {
    safe_subscribe(
      self,
      CallbackObserver {
        next,
        error: Some(error),
        complete: None::<fn()>,
        _hint: TypeHint::new(),
      },
    )
  }

  /// Subscribes with `next` and `complete` closures; a terminal error is
  /// raised like in [`Observable::subscribe`].
  fn subscribe_complete<N, C>(self, next: N, complete: C) -> SharedSubscription
  where
    Self: CoreObservable,
    Self::Item: 'static,
    Self::Err: Debug + 'static,
    N: FnMut(Self::Item) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    safe_subscribe(
      self,
      CallbackObserver {
        next,
        error: None::<fn(Self::Err)>,
        complete: Some(complete),
        _hint: TypeHint::new(),
      },
    )
  }

  /// Subscribes with the full closure triple.
  fn subscribe_all<N, E, C>(
    self,
    next: N,
    error: E,
    complete: C,
  ) -> SharedSubscription
  where
    Self: CoreObservable,
    Self::Item: 'static,
    Self::Err: Debug + 'static,
    N: FnMut(Self::Item) + Send + 'static,
    E: FnMut(Self::Err) + Send + 'static,
    C: FnMut() + Send + 'static,
  {
    safe_subscribe(
      self,
      CallbackObserver {
        next,
        error: Some(error),
        complete: Some(complete),
        _hint: TypeHint::new(),
      },
    )
  }

  /// Subscribes with a fallible `next`: an `Err` return terminates the
  /// stream through the regular error path, upstream disposed first.
  fn subscribe_checked<N, E>(self, next: N, error: E) -> SharedSubscription
  where
    Self: CoreObservable,
    Self::Item: 'static,
    Self::Err: Debug + 'static,
    N: FnMut(Self::Item) -> Result<(), Self::Err> + Send + 'static,
    E: FnMut(Self::Err) + Send + 'static,
  {
    safe_subscribe(
      self,
      CheckedCallbackObserver { next, error, _hint: TypeHint::new() },
    )
  }

  /// Subscribes a custom [`Observer`] implementation.
  fn subscribe_with<O>(self, observer: O) -> SharedSubscription
  where
    Self: CoreObservable,
    Self::Err: Debug,
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    safe_subscribe(self, ObserverAdapter(observer))
  }
}

/// The subscription capability: running an execution for one observer.
///
/// Operator stages call this directly on their upstream; the safety
/// wrapper exists only at the public boundary, so chains are never
/// double-wrapped.
pub trait CoreObservable: Observable {
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static;
}

fn pair_equal<T: PartialEq>((a, b): (T, T)) -> bool { a == b }

/// Public subscribe dispatch: hook, composite, safety wrapper, producer,
/// hook, in that order. A synchronously terminated composite disposes the
/// late-arriving upstream subscription on `add`.
pub(crate) fn safe_subscribe<S, T>(source: S, target: T) -> SharedSubscription
where
  S: CoreObservable,
  S::Err: Debug,
  T: CheckedObserver<Item = S::Item, Err = S::Err> + Send + 'static,
{
  hooks::on_subscribe_start();
  let subscription = SharedSubscription::new();
  let safe = SafeObserver::new(target, subscription.clone());
  let upstream = source.actual_subscribe(safe);
  subscription.add(upstream);
  hooks::on_subscribe_return();
  subscription
}
