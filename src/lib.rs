//! Push-based reactive streams.
//!
//! An [`Observable`](observable::Observable) is an inert description of a
//! sequence of values ending in a completion or an error; subscribing
//! starts one execution of it and yields a
//! [`SharedSubscription`](subscription::SharedSubscription) that cancels
//! it. Operators compose descriptions into new ones; subjects and the
//! multicast operators (`publish`, `replay`, `cache`) share a single
//! execution among many observers; schedulers decide where and when work
//! runs.
//!
//! ```
//! use rxcore::prelude::*;
//!
//! let totals = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
//! let sink = totals.clone();
//! observable::from_iter::<_, ()>(1..=4)
//!   .filter(|v| v % 2 == 0)
//!   .scan(|acc, v| acc + v)
//!   .subscribe(move |v| sink.lock().unwrap().push(v));
//! assert_eq!(*totals.lock().unwrap(), vec![2, 6]);
//! ```

pub mod error;
pub mod hooks;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
mod type_hint;

pub use observable::{CoreObservable, Observable};
pub use observer::Observer;
pub use subscription::{SharedSubscription, SubscriptionLike};
