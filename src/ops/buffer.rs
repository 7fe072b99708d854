use std::sync::{Arc, Mutex};

use crate::error::{guard_callback, FromCallbackPanic};
use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::{SharedSubscription, SubscriptionLike};
use crate::type_hint::TypeHint;

/// Observable returned by [`Observable::buffer`]: signal-driven windows.
///
/// Every value of `openings` starts a buffer; the observable derived
/// from that value closes it with its first event (value or completion),
/// emitting the gathered list. On upstream terminal, non-empty open
/// buffers are flushed.
#[derive(Clone)]
pub struct BufferSignalOp<S, OS, F> {
  pub(crate) source: S,
  pub(crate) openings: OS,
  pub(crate) closing_fn: F,
}

impl<S, OS, F, C> Observable for BufferSignalOp<S, OS, F>
where
  S: Observable,
  OS: Observable<Err = S::Err>,
  F: FnMut(OS::Item) -> C,
  C: Observable<Err = S::Err>,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

struct SignalWindows<Item> {
  windows: Vec<(u64, Vec<Item>)>,
  next_id: u64,
  stopped: bool,
}

impl<S, OS, F, C> CoreObservable for BufferSignalOp<S, OS, F>
where
  S: CoreObservable,
  S::Err: FromCallbackPanic,
  OS: CoreObservable<Err = S::Err>,
  OS::Item: 'static,
  F: FnMut(OS::Item) -> C + Send + 'static,
  C: CoreObservable<Err = S::Err>,
  C::Item: 'static,
  S::Item: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    let subscription = SharedSubscription::new();
    let state = Arc::new(Mutex::new(SignalWindows {
      windows: Vec::new(),
      next_id: 0,
      stopped: false,
    }));
    let observer = Arc::new(Mutex::new(observer));
    let openings_subscription =
      self.openings.actual_subscribe(OpeningObserver {
        state: state.clone(),
        observer: observer.clone(),
        closing_fn: self.closing_fn,
        subscription: subscription.clone(),
        _hint: TypeHint::new(),
      });
    subscription.add(openings_subscription);
    let upstream = self.source.actual_subscribe(BufferSignalObserver {
      state,
      observer,
      subscription: subscription.clone(),
    });
    subscription.add(upstream);
    subscription
  }
}

fn close_signal_window<O, Item>(
  state: &Arc<Mutex<SignalWindows<Item>>>,
  observer: &Arc<Mutex<O>>,
  id: u64,
) where
  O: Observer<Item = Vec<Item>>,
{
  let window = {
    let mut state = state.lock().unwrap();
    if state.stopped {
      return;
    }
    state
      .windows
      .iter()
      .position(|(window_id, _)| *window_id == id)
      .map(|index| state.windows.remove(index).1)
  };
  if let Some(window) = window {
    observer.lock().unwrap().next(window);
  }
}

pub struct OpeningObserver<O, F, Item, OItem> {
  state: Arc<Mutex<SignalWindows<Item>>>,
  observer: Arc<Mutex<O>>,
  closing_fn: F,
  subscription: SharedSubscription,
  _hint: TypeHint<OItem>,
}

impl<O, F, Item, OItem, C> Observer for OpeningObserver<O, F, Item, OItem>
where
  O: Observer<Item = Vec<Item>> + Send + 'static,
  O::Err: FromCallbackPanic,
  F: FnMut(OItem) -> C,
  C: CoreObservable<Err = O::Err>,
  C::Item: 'static,
  Item: Send + 'static,
{
  type Item = OItem;
  type Err = O::Err;

  fn next(&mut self, opening: OItem) {
    let id = {
      let mut state = self.state.lock().unwrap();
      if state.stopped {
        return;
      }
      state.next_id += 1;
      let id = state.next_id;
      state.windows.push((id, Vec::new()));
      id
    };
    let closing = match guard_callback(|| (self.closing_fn)(opening)) {
      Ok(closing) => closing,
      Err(err) => {
        self.error(err);
        return;
      }
    };
    let closing_subscription = closing.actual_subscribe(ClosingObserver {
      state: self.state.clone(),
      observer: self.observer.clone(),
      id,
      fired: false,
      _hint: TypeHint::new(),
    });
    self.subscription.add(closing_subscription);
  }

  fn error(&mut self, err: Self::Err) {
    {
      let mut state = self.state.lock().unwrap();
      if state.stopped {
        return;
      }
      state.stopped = true;
      state.windows.clear();
    }
    self.subscription.unsubscribe();
    self.observer.lock().unwrap().error(err);
  }

  fn complete(&mut self) {
    // No further windows will open; the existing ones keep collecting.
  }

  fn is_stopped(&self) -> bool { self.state.lock().unwrap().stopped }
}

pub struct ClosingObserver<O, Item, CItem> {
  state: Arc<Mutex<SignalWindows<Item>>>,
  observer: Arc<Mutex<O>>,
  id: u64,
  fired: bool,
  _hint: TypeHint<CItem>,
}

impl<O, Item, CItem> Observer for ClosingObserver<O, Item, CItem>
where
  O: Observer<Item = Vec<Item>>,
{
  type Item = CItem;
  type Err = O::Err;

  fn next(&mut self, _value: CItem) {
    if self.fired {
      return;
    }
    self.fired = true;
    close_signal_window(&self.state, &self.observer, self.id);
  }

  fn error(&mut self, err: Self::Err) {
    if self.fired {
      return;
    }
    self.fired = true;
    {
      let mut state = self.state.lock().unwrap();
      if state.stopped {
        return;
      }
      state.stopped = true;
      state.windows.clear();
    }
    self.observer.lock().unwrap().error(err);
  }

  fn complete(&mut self) {
    if self.fired {
      return;
    }
    self.fired = true;
    close_signal_window(&self.state, &self.observer, self.id);
  }

  fn is_stopped(&self) -> bool { self.fired }
}

pub struct BufferSignalObserver<O, Item> {
  state: Arc<Mutex<SignalWindows<Item>>>,
  observer: Arc<Mutex<O>>,
  subscription: SharedSubscription,
}

impl<O, Item> Observer for BufferSignalObserver<O, Item>
where
  O: Observer<Item = Vec<Item>>,
  Item: Clone,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    let mut state = self.state.lock().unwrap();
    if state.stopped {
      return;
    }
    for (_, window) in &mut state.windows {
      window.push(value.clone());
    }
  }

  fn error(&mut self, err: Self::Err) {
    {
      let mut state = self.state.lock().unwrap();
      if state.stopped {
        return;
      }
      state.stopped = true;
      state.windows.clear();
    }
    self.subscription.unsubscribe();
    self.observer.lock().unwrap().error(err);
  }

  fn complete(&mut self) {
    let flushed = {
      let mut state = self.state.lock().unwrap();
      if state.stopped {
        return;
      }
      state.stopped = true;
      std::mem::take(&mut state.windows)
    };
    self.subscription.unsubscribe();
    let mut observer = self.observer.lock().unwrap();
    for (_, window) in flushed {
      if !window.is_empty() && !observer.is_stopped() {
        observer.next(window);
      }
    }
    if !observer.is_stopped() {
      observer.complete();
    }
  }

  fn is_stopped(&self) -> bool { self.state.lock().unwrap().stopped }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn openings_start_windows_and_signals_close_them() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut source = PublishSubject::<i32, ()>::new();
    let mut openings = PublishSubject::<u8, ()>::new();
    let closers = Arc::new(Mutex::new(Vec::new()));
    let c_closers = closers.clone();
    let c_emitted = emitted.clone();
    source
      .clone()
      .buffer(openings.clone(), move |_| {
        let closer = PublishSubject::<u8, ()>::new();
        c_closers.lock().unwrap().push(closer.clone());
        closer
      })
      .subscribe(move |window| c_emitted.lock().unwrap().push(window));

    source.next(1);
    openings.next(0);
    source.next(2);
    source.next(3);
    closers.lock().unwrap()[0].clone().next(0);
    source.next(4);
    assert_eq!(*emitted.lock().unwrap(), vec![vec![2, 3]]);
  }

  #[test]
  fn overlapping_signal_windows() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut source = PublishSubject::<i32, ()>::new();
    let mut openings = PublishSubject::<u8, ()>::new();
    let closers = Arc::new(Mutex::new(Vec::new()));
    let c_closers = closers.clone();
    let c_emitted = emitted.clone();
    source
      .clone()
      .buffer(openings.clone(), move |_| {
        let closer = PublishSubject::<u8, ()>::new();
        c_closers.lock().unwrap().push(closer.clone());
        closer
      })
      .subscribe(move |window| c_emitted.lock().unwrap().push(window));

    openings.next(0);
    source.next(1);
    openings.next(1);
    source.next(2);
    closers.lock().unwrap()[0].clone().next(0);
    source.next(3);
    closers.lock().unwrap()[1].clone().next(0);
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1, 2], vec![2, 3]]);
  }

  #[test]
  fn open_windows_flush_on_source_completion() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let mut source = PublishSubject::<i32, ()>::new();
    let mut openings = PublishSubject::<u8, ()>::new();
    let c_emitted = emitted.clone();
    source
      .clone()
      .buffer(openings.clone(), |_| observable::never::<u8, ()>())
      .subscribe(move |window| c_emitted.lock().unwrap().push(window));
    openings.next(0);
    source.next(1);
    source.complete();
    assert_eq!(*emitted.lock().unwrap(), vec![vec![1]]);
  }
}
