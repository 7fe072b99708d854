//! End-to-end contract tests: the observer grammar, the safety wrapper,
//! multicast sharing and the algebraic operator identities.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rxcore::prelude::*;

#[test]
fn reduce_folds_a_sequence() {
  let emitted = Arc::new(Mutex::new(Vec::new()));
  let completed = Arc::new(AtomicBool::new(false));
  let c_emitted = emitted.clone();
  let c_completed = completed.clone();
  observable::from_iter::<_, ()>(vec![1, 2, 3, 4])
    .reduce(|a, b| a + b)
    .subscribe_complete(
      move |v| c_emitted.lock().unwrap().push(v),
      move || c_completed.store(true, Ordering::SeqCst),
    );
  assert_eq!(*emitted.lock().unwrap(), vec![10]);
  assert!(completed.load(Ordering::SeqCst));
}

#[test]
fn seeded_reduce_folds_from_the_seed() {
  let emitted = Arc::new(Mutex::new(Vec::new()));
  let c_emitted = emitted.clone();
  observable::from_iter::<_, ()>(vec![1, 2, 3, 4])
    .reduce_initial(50, |a, b| a + b)
    .subscribe(move |v| c_emitted.lock().unwrap().push(v));
  assert_eq!(*emitted.lock().unwrap(), vec![60]);
}

#[test]
fn sequence_equal_compares_pairwise() {
  let emitted = Arc::new(Mutex::new(Vec::new()));
  let completed = Arc::new(AtomicBool::new(false));
  let c_emitted = emitted.clone();
  let c_completed = completed.clone();
  observable::from_iter::<_, ()>(vec![1, 2, 3])
    .sequence_equal(observable::from_iter(vec![1, 2, 4]))
    .subscribe_complete(
      move |v| c_emitted.lock().unwrap().push(v),
      move || c_completed.store(true, Ordering::SeqCst),
    );
  assert_eq!(*emitted.lock().unwrap(), vec![true, true, false]);
  assert!(completed.load(Ordering::SeqCst));
}

#[test]
fn sequence_equal_is_symmetric() {
  let left_right = Arc::new(Mutex::new(Vec::new()));
  let right_left = Arc::new(Mutex::new(Vec::new()));
  let c_left_right = left_right.clone();
  let c_right_left = right_left.clone();
  observable::from_iter::<_, ()>(vec![5, 6])
    .sequence_equal(observable::from_iter(vec![5, 7]))
    .subscribe(move |v| c_left_right.lock().unwrap().push(v));
  observable::from_iter::<_, ()>(vec![5, 7])
    .sequence_equal(observable::from_iter(vec![5, 6]))
    .subscribe(move |v| c_right_left.lock().unwrap().push(v));
  assert_eq!(*left_right.lock().unwrap(), *right_left.lock().unwrap());
}

#[test]
fn producer_error_reaches_the_observer() {
  let nexts = Arc::new(AtomicUsize::new(0));
  let completions = Arc::new(AtomicUsize::new(0));
  let error_seen = Arc::new(Mutex::new(None));
  let c_nexts = nexts.clone();
  let c_completions = completions.clone();
  let c_error = error_seen.clone();
  observable::create(|mut sink: Subscriber<i32, String>| {
    sink.error(String::from("bad"));
  })
  .subscribe_all(
    move |_| {
      c_nexts.fetch_add(1, Ordering::SeqCst);
    },
    move |e| *c_error.lock().unwrap() = Some(e),
    move || {
      c_completions.fetch_add(1, Ordering::SeqCst);
    },
  );
  assert_eq!(nexts.load(Ordering::SeqCst), 0);
  assert_eq!(completions.load(Ordering::SeqCst), 0);
  assert_eq!(*error_seen.lock().unwrap(), Some(String::from("bad")));
}

#[test]
fn failing_observer_is_unsubscribed_through_the_error_path() {
  let attempted = Arc::new(Mutex::new(Vec::new()));
  let parsed = Arc::new(AtomicUsize::new(0));
  let error_seen = Arc::new(Mutex::new(None));
  let (done_tx, done_rx) = channel();

  let c_attempted = attempted.clone();
  let subscription =
    observable::create(move |mut sink: Subscriber<&'static str, String>| {
      let attempted = c_attempted.clone();
      thread::spawn(move || {
        for raw in ["1", "2", "three", "4"] {
          if sink.is_closed() {
            break;
          }
          attempted.lock().unwrap().push(raw);
          sink.next(raw);
          thread::sleep(Duration::from_millis(10));
        }
        sink.complete();
      });
    })
    .subscribe_checked(
      {
        let parsed = parsed.clone();
        move |raw: &str| {
          raw
            .parse::<i32>()
            .map(|_| {
              parsed.fetch_add(1, Ordering::SeqCst);
            })
            .map_err(|e| e.to_string())
        }
      },
      {
        let error_seen = error_seen.clone();
        move |e| {
          *error_seen.lock().unwrap() = Some(e);
          done_tx.send(()).unwrap();
        }
      },
    );

  done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
  assert!(subscription.is_closed());
  thread::sleep(Duration::from_millis(50));
  assert_eq!(parsed.load(Ordering::SeqCst), 2);
  assert!(error_seen.lock().unwrap().as_ref().unwrap().contains("invalid"));
  // The producer observed the cancellation before reaching the last item.
  assert!(!attempted.lock().unwrap().contains(&"4"));
}

#[test]
fn publish_shares_one_upstream_execution() {
  let producer_runs = Arc::new(AtomicUsize::new(0));
  let first = Arc::new(Mutex::new(Vec::new()));
  let second = Arc::new(Mutex::new(Vec::new()));
  let (done_tx, done_rx) = channel();

  let c_runs = producer_runs.clone();
  let connectable =
    observable::create(move |mut sink: Subscriber<&'static str, ()>| {
      c_runs.fetch_add(1, Ordering::SeqCst);
      thread::spawn(move || {
        sink.next("one");
        sink.complete();
      });
    })
    .publish();

  let c_first = first.clone();
  let first_done = done_tx.clone();
  connectable.clone().subscribe_complete(
    move |v| c_first.lock().unwrap().push(v),
    move || first_done.send(()).unwrap(),
  );
  let c_second = second.clone();
  connectable.clone().subscribe_complete(
    move |v| c_second.lock().unwrap().push(v),
    move || done_tx.send(()).unwrap(),
  );

  connectable.connect();
  done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
  done_rx.recv_timeout(Duration::from_secs(5)).unwrap();

  assert_eq!(producer_runs.load(Ordering::SeqCst), 1);
  assert_eq!(*first.lock().unwrap(), vec!["one"]);
  assert_eq!(*second.lock().unwrap(), vec!["one"]);
}

#[test]
fn missing_error_handler_panics_on_the_subscribing_thread() {
  let outcome = catch_unwind(AssertUnwindSafe(|| {
    observable::throw::<i32, _>(String::from("failure")).subscribe(|_| {});
  }));
  let payload = outcome.unwrap_err();
  let message = payload
    .downcast_ref::<String>()
    .cloned()
    .unwrap_or_default();
  assert!(message.contains("failure"));
}

#[test]
fn materialize_dematerialize_round_trip() {
  let emitted = Arc::new(Mutex::new(Vec::new()));
  let completed = Arc::new(AtomicBool::new(false));
  let c_emitted = emitted.clone();
  let c_completed = completed.clone();
  observable::of::<_, ()>(1)
    .materialize()
    .dematerialize()
    .subscribe_complete(
      move |v| c_emitted.lock().unwrap().push(v),
      move || c_completed.store(true, Ordering::SeqCst),
    );
  assert_eq!(*emitted.lock().unwrap(), vec![1]);
  assert!(completed.load(Ordering::SeqCst));
}

#[test]
fn terminal_event_is_unique_even_for_a_hostile_producer() {
  let nexts = Arc::new(AtomicUsize::new(0));
  let errors = Arc::new(AtomicUsize::new(0));
  let completions = Arc::new(AtomicUsize::new(0));
  let c_nexts = nexts.clone();
  let c_errors = errors.clone();
  let c_completions = completions.clone();
  observable::create(|mut sink: Subscriber<i32, String>| {
    sink.next(1);
    sink.complete();
    sink.error(String::from("too late"));
    sink.next(2);
    sink.complete();
  })
  .subscribe_all(
    move |_| {
      c_nexts.fetch_add(1, Ordering::SeqCst);
    },
    move |_| {
      c_errors.fetch_add(1, Ordering::SeqCst);
    },
    move || {
      c_completions.fetch_add(1, Ordering::SeqCst);
    },
  );
  assert_eq!(nexts.load(Ordering::SeqCst), 1);
  assert_eq!(errors.load(Ordering::SeqCst), 0);
  assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[test]
fn no_emission_after_unsubscribe() {
  let emitted = Arc::new(Mutex::new(Vec::new()));
  let mut subject = PublishSubject::<i32, ()>::new();
  let c_emitted = emitted.clone();
  let mut subscription = subject
    .clone()
    .subscribe(move |v| c_emitted.lock().unwrap().push(v));
  subject.next(1);
  subscription.unsubscribe();
  subject.next(2);
  subject.complete();
  assert_eq!(*emitted.lock().unwrap(), vec![1]);
}

#[test]
fn replay_multicast_delivers_the_full_sequence_to_everyone() {
  let early = Arc::new(Mutex::new(Vec::new()));
  let late = Arc::new(Mutex::new(Vec::new()));
  let connectable = observable::from_iter::<_, ()>(vec![1, 2, 3]).replay();

  let c_early = early.clone();
  connectable
    .clone()
    .subscribe(move |v| c_early.lock().unwrap().push(v));
  connectable.connect();
  // This subscriber arrives after the source already finished.
  let c_late = late.clone();
  connectable
    .clone()
    .subscribe(move |v| c_late.lock().unwrap().push(v));

  assert_eq!(*early.lock().unwrap(), vec![1, 2, 3]);
  assert_eq!(*late.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn error_routes_through_the_process_error_hook() {
  // Hooks are process-global: this test only asserts that configuration
  // is frozen once the library used them.
  observable::of::<_, ()>(1).subscribe(|_| {});
  let result = hooks::configure(hooks::Hooks::default());
  assert!(result.is_err());
}

#[test]
fn observe_on_crosses_threads_in_order() {
  let emitted = Arc::new(Mutex::new(Vec::new()));
  let caller = thread::current().id();
  let seen_on = Arc::new(Mutex::new(None));
  let (done_tx, done_rx) = channel();
  let c_emitted = emitted.clone();
  let c_seen = seen_on.clone();
  observable::from_iter::<_, ()>(0..100)
    .observe_on(scheduler::computation())
    .subscribe_complete(
      move |v| {
        *c_seen.lock().unwrap() = Some(thread::current().id());
        c_emitted.lock().unwrap().push(v);
      },
      move || done_tx.send(()).unwrap(),
    );
  done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
  assert_eq!(*emitted.lock().unwrap(), (0..100).collect::<Vec<_>>());
  assert_ne!(seen_on.lock().unwrap().unwrap(), caller);
}
