//! Duplex endpoints: each subject is simultaneously an [`Observer`]
//! (inbound) and an [`Observable`](crate::observable::Observable)
//! (outbound), fanning every inbound event out to all current
//! subscribers.
//!
//! [`Observer`]: crate::observer::Observer

mod subject_core;
pub(crate) use subject_core::{ReplayPolicy, SubjectCore};
mod subject_subscription;
mod publish_subject;
pub use publish_subject::PublishSubject;
mod replay_subject;
pub use replay_subject::ReplaySubject;
mod behavior_subject;
pub use behavior_subject::BehaviorSubject;
