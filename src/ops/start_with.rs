use crate::observable::{CoreObservable, Observable};
use crate::observer::Observer;
use crate::subscription::SharedSubscription;

/// Observable returned by [`Observable::start_with`].
#[derive(Clone)]
pub struct StartWithOp<S, Item> {
  pub(crate) source: S,
  pub(crate) values: Vec<Item>,
}

impl<S, Item> Observable for StartWithOp<S, Item>
where
  S: Observable<Item = Item>,
{
  type Item = Item;
  type Err = S::Err;
}

impl<S, Item> CoreObservable for StartWithOp<S, Item>
where
  S: CoreObservable<Item = Item>,
{
  fn actual_subscribe<O>(self, mut observer: O) -> SharedSubscription
  where
    O: Observer<Item = Self::Item, Err = Self::Err> + Send + 'static,
  {
    for value in self.values {
      if observer.is_stopped() {
        return SharedSubscription::new();
      }
      observer.next(value);
    }
    self.source.actual_subscribe(observer)
  }
}
