//! Where and when work runs.
//!
//! A [`Scheduler`] orders units of work and hands every unit its own
//! cancellation handle. Time- and concurrency-aware operators
//! (`observe_on`, `subscribe_on`, `sample`, the time-based buffers,
//! `interval`) are generic over this trait, so the same operator runs on a
//! thread pool in production and on [`TestScheduler`] virtual time in
//! tests.

use std::time::Duration;
pub use std::time::Instant;

use crate::subscription::SharedSubscription;

mod immediate;
pub use immediate::ImmediateScheduler;
mod trampoline;
pub use trampoline::TrampolineScheduler;
mod new_thread;
pub use new_thread::NewThreadScheduler;
mod thread_pool;
pub use thread_pool::ThreadPoolScheduler;
mod io;
pub use io::IoScheduler;
mod test_scheduler;
pub use test_scheduler::TestScheduler;

use lazy_static::lazy_static;

/// Schedules units of work, immediately or after a delay.
///
/// Every scheduled unit receives the subscription that was returned for
/// it, so the work can observe its own cancellation; schedulers do not run
/// a unit whose subscription is already closed by the time it comes up.
pub trait Scheduler: Clone + Send + Sync + 'static {
  fn schedule<F>(&self, task: F) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static;

  fn schedule_delayed<F>(&self, task: F, delay: Duration) -> SharedSubscription
  where
    F: FnOnce(SharedSubscription) + Send + 'static;

  /// The scheduler's clock. Virtual-time schedulers override this.
  fn now(&self) -> Instant { Instant::now() }
}

lazy_static! {
  static ref COMPUTATION: ThreadPoolScheduler =
    ThreadPoolScheduler::new(num_cpus::get());
  static ref IO: IoScheduler = IoScheduler::new();
}

/// Runs work synchronously on the calling thread.
pub fn immediate() -> ImmediateScheduler { ImmediateScheduler }

/// Runs work on the calling thread, trampolined: work scheduled from
/// inside scheduled work is queued instead of run reentrantly.
pub fn trampoline() -> TrampolineScheduler { TrampolineScheduler }

/// Spawns a fresh thread per unit of work.
pub fn new_thread() -> NewThreadScheduler { NewThreadScheduler }

/// The shared fixed-size pool, sized by the number of CPUs.
pub fn computation() -> ThreadPoolScheduler { COMPUTATION.clone() }

/// The shared cached pool for I/O-bound work: unbounded, idle workers are
/// kept alive for a while and re-used.
pub fn io() -> IoScheduler { IO.clone() }
