//! Shutdown coordination for the exporter.
//!
//! [`ExportCoordinator`] owns the two pieces of state that outlive a single
//! send: the shutdown-once flag and the collection of in-flight requests.
//! Every issued transport call is registered through [`ExportCoordinator::track`]
//! and stays in the collection until its [`InFlightGuard`] is dropped, so
//! shutdown and flush can wait for outstanding calls to drain.
//!
//! The coordinator can be shared between several exporters, or kept by the
//! host after the exporter has been moved into a logger provider:
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use otlp_workers_log_exporter::ExportCoordinator;
//!
//! let coordinator = Arc::new(ExportCoordinator::new());
//! assert_eq!(coordinator.in_flight_len(), 0);
//! assert!(!coordinator.is_shutting_down());
//! assert!(coordinator.wait_idle(Duration::from_secs(5)));
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Handle for one outstanding transport call.
#[derive(Debug)]
pub struct InFlightRequest {
    sequence: usize,
    issued_at: Instant,
}

impl InFlightRequest {
    /// Position of this request in issue order, starting at zero.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    /// Time elapsed since the request was issued.
    pub fn elapsed(&self) -> Duration {
        self.issued_at.elapsed()
    }
}

/// Tracks shutdown state and in-flight requests for one or more exporters.
#[derive(Debug, Default)]
pub struct ExportCoordinator {
    shutdown_once: AtomicBool,
    in_flight: Mutex<Vec<Arc<InFlightRequest>>>,
    settled: Condvar,
    issued: AtomicUsize,
}

impl ExportCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether shutdown has started.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_once.load(Ordering::Acquire)
    }

    /// Marks shutdown as started. Returns `true` only for the first caller.
    pub fn begin_shutdown(&self) -> bool {
        !self.shutdown_once.swap(true, Ordering::AcqRel)
    }

    /// Registers a newly issued request. The entry is removed when the
    /// returned guard is dropped.
    pub fn track(&self) -> InFlightGuard<'_> {
        let request = Arc::new(InFlightRequest {
            sequence: self.issued.fetch_add(1, Ordering::Relaxed),
            issued_at: Instant::now(),
        });
        self.lock_in_flight().push(request.clone());

        InFlightGuard {
            coordinator: self,
            request,
        }
    }

    /// Number of requests issued but not yet settled.
    pub fn in_flight_len(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Total number of requests issued through this coordinator.
    pub fn issued_count(&self) -> usize {
        self.issued.load(Ordering::Relaxed)
    }

    /// Blocks until no request is in flight or `timeout` elapses.
    /// Returns `true` when the collection drained.
    ///
    /// This blocks the calling thread, so it must not run on the thread that
    /// drives the in-flight futures.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let in_flight = self.lock_in_flight();
        let (in_flight, _) = self
            .settled
            .wait_timeout_while(in_flight, timeout, |pending| !pending.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.is_empty()
    }

    fn remove(&self, request: &Arc<InFlightRequest>) {
        let mut in_flight = self.lock_in_flight();
        if let Some(index) = in_flight.iter().position(|r| Arc::ptr_eq(r, request)) {
            in_flight.remove(index);
        }
        drop(in_flight);
        self.settled.notify_all();
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Vec<Arc<InFlightRequest>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps one request registered as in flight for as long as it lives.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    coordinator: &'a ExportCoordinator,
    request: Arc<InFlightRequest>,
}

impl InFlightGuard<'_> {
    pub fn request(&self) -> &InFlightRequest {
        &self.request
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.remove(&self.request);
    }
}
