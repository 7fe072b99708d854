//! Convenient single import for the whole public surface.

pub use crate::error::{CallbackPanic, FromCallbackPanic};
pub use crate::hooks;
pub use crate::notification::Notification;
pub use crate::observable;
pub use crate::observable::{CoreObservable, Observable};
pub use crate::observer::Observer;
pub use crate::ops::combine_latest::{combine_latest3, combine_latest4};
pub use crate::ops::group_by::GroupedObservable;
pub use crate::scheduler;
pub use crate::scheduler::{
  ImmediateScheduler, IoScheduler, NewThreadScheduler, Scheduler,
  TestScheduler, ThreadPoolScheduler, TrampolineScheduler,
};
pub use crate::subject::{BehaviorSubject, PublishSubject, ReplaySubject};
pub use crate::subscriber::Subscriber;
pub use crate::subscription::{
  SerialSubscription, SharedSubscription, SingleSubscription,
  SubscriptionLike,
};
