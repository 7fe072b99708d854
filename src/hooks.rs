//! Process-wide interception points.
//!
//! The hook set is configured at most once, before the first subscribe
//! touches it; reconfiguration afterwards fails fast. Hooks observe the
//! subscribe lifecycle and every error the library surfaces to a user
//! observer, for side-band logging and diagnostics.

use std::fmt::{self, Debug, Display};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use lazy_static::lazy_static;

type LifecycleHook = Box<dyn Fn() + Send + Sync>;
type ErrorHook = Box<dyn Fn(&dyn Debug) + Send + Sync>;

/// The configurable hook set. Unset slots fall back to `log`-based
/// defaults.
#[derive(Default)]
pub struct Hooks {
  /// Fired when a public `subscribe` call begins.
  pub on_subscribe_start: Option<LifecycleHook>,
  /// Fired just before a public `subscribe` call returns its
  /// subscription.
  pub on_subscribe_return: Option<LifecycleHook>,
  /// Fired for every error the library delivers to a user observer,
  /// before the observer's own handler runs.
  pub error_handler: Option<ErrorHook>,
  /// Fired when an error reaches a subscriber that supplied no error
  /// handler, just before the failure is raised on the emitting thread.
  pub unhandled_error: Option<ErrorHook>,
}

lazy_static! {
  static ref HOOKS: RwLock<Hooks> = RwLock::new(Hooks::default());
}

static CONFIGURED: AtomicBool = AtomicBool::new(false);
static IN_USE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HooksError {
  /// `configure` was already called in this process.
  AlreadyConfigured,
  /// A subscribe already consulted the hooks; configuration is frozen.
  AlreadyInUse,
}

impl Display for HooksError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HooksError::AlreadyConfigured => {
        write!(f, "stream hooks were already configured")
      }
      HooksError::AlreadyInUse => {
        write!(f, "stream hooks were already used and can no longer be configured")
      }
    }
  }
}

impl std::error::Error for HooksError {}

/// Installs the process-wide hook set. May succeed at most once, and only
/// before any subscribe has consulted the hooks.
pub fn configure(hooks: Hooks) -> Result<(), HooksError> {
  if IN_USE.load(Ordering::SeqCst) {
    return Err(HooksError::AlreadyInUse);
  }
  if CONFIGURED.swap(true, Ordering::SeqCst) {
    return Err(HooksError::AlreadyConfigured);
  }
  *HOOKS.write().unwrap() = hooks;
  Ok(())
}

fn mark_used() { IN_USE.store(true, Ordering::SeqCst); }

pub(crate) fn on_subscribe_start() {
  mark_used();
  if let Some(hook) = &HOOKS.read().unwrap().on_subscribe_start {
    hook();
  }
}

pub(crate) fn on_subscribe_return() {
  mark_used();
  if let Some(hook) = &HOOKS.read().unwrap().on_subscribe_return {
    hook();
  }
}

pub(crate) fn error_handler(err: &dyn Debug) {
  mark_used();
  match &HOOKS.read().unwrap().error_handler {
    Some(hook) => hook(err),
    None => log::debug!("stream terminated with error: {err:?}"),
  }
}

pub(crate) fn unhandled_error(err: &dyn Debug) {
  mark_used();
  match &HOOKS.read().unwrap().unhandled_error {
    Some(hook) => hook(err),
    None => {
      log::error!("stream error reached a subscriber without an error handler: {err:?}")
    }
  }
}
