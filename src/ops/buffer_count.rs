use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::buffer_count`] and
/// [`Observable::buffer_count_skip`].
///
/// A new buffer opens every `skip` values (buffers overlap when
/// `skip < count`) and is emitted once it holds `count` values. On
/// upstream terminal, non-empty partial buffers are flushed in opening
/// order.
#[derive(Clone)]
pub struct BufferCountOp<S> {
  pub(crate) source: S,
  pub(crate) count: usize,
  pub(crate) skip: usize,
}

impl<S> Observable for BufferCountOp<S>
where
  S: Observable,
{
  type Item = Vec<S::Item>;
  type Err = S::Err;
}

impl<S> CoreObservable for BufferCountOp<S>
where
  S: CoreObservable,
  S::Item: Clone + Send + 'static,
{
  fn actual_subscribe<O>(self, observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    self.source.actual_subscribe(BufferCountObserver {
      observer,
      count: self.count.max(1),
      skip: self.skip.max(1),
      index: 0,
      buffers: Vec::new(),
    })
  }
}

pub struct BufferCountObserver<O, Item> {
  observer: O,
  count: usize,
  skip: usize,
  index: usize,
  buffers: Vec<Vec<Item>>,
}

impl<O, Item> Observer for BufferCountObserver<O, Item>
where
  O: Observer<Item = Vec<Item>>,
  Item: Clone,
{
  type Item = Item;
  type Err = O::Err;

  fn next(&mut self, value: Item) {
    if self.index % self.skip == 0 {
      self.buffers.push(Vec::with_capacity(self.count));
    }
    self.index += 1;
    for buffer in &mut self.buffers {
      buffer.push(value.clone());
    }
    let mut cursor = 0;
    while cursor < self.buffers.len() {
      if self.buffers[cursor].len() >= self.count {
        let full = self.buffers.remove(cursor);
        self.observer.next(full);
      } else {
        cursor += 1;
      }
    }
  }

  fn error(&mut self, err: Self::Err) {
    self.buffers.clear();
    self.observer.error(err);
  }

  fn complete(&mut self) {
    for buffer in self.buffers.drain(..) {
      if !buffer.is_empty() {
        self.observer.next(buffer);
      }
    }
    if !self.observer.is_stopped() {
      self.observer.complete();
    }
  }

  fn is_stopped(&self) -> bool { self.observer.is_stopped() }
}
