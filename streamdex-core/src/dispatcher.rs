//! Bounded-concurrency dispatcher for upstream calls.
//!
//! Every outbound request runs as a unit on a [`RequestDispatcher`]. A fixed
//! set of workers pulls units from one FIFO queue, so at most `capacity`
//! units are in flight and the rest start in submission order. A unit that
//! fails or panics only resolves its own handle.
//!
//! One dispatcher is built at startup and shared by handle; tests build their
//! own with a small capacity.

use std::{
    fmt,
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use futures::{FutureExt, future::join_all};
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, error, info};

use crate::error::{CatalogError, Result};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[derive(Debug, Default)]
struct DispatchStats {
    in_flight: AtomicUsize,
    queued: AtomicUsize,
}

#[derive(Clone)]
pub struct RequestDispatcher {
    jobs: mpsc::UnboundedSender<Job>,
    capacity: usize,
    stats: Arc<DispatchStats>,
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("capacity", &self.capacity)
            .field("in_flight", &self.in_flight())
            .field("queued", &self.queued())
            .finish()
    }
}

impl RequestDispatcher {
    /// Start `capacity` workers on the current Tokio runtime.
    pub fn new(capacity: usize) -> Result<Self> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CatalogError::Internal(
                "request dispatcher needs a running Tokio runtime".into(),
            ));
        }

        let capacity = capacity.max(1);
        let (jobs, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(DispatchStats::default());

        for worker_id in 0..capacity {
            let rx = Arc::clone(&rx);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(job) = job else {
                        debug!(worker_id, "dispatcher queue closed; worker exiting");
                        break;
                    };
                    stats.queued.fetch_sub(1, Ordering::AcqRel);
                    stats.in_flight.fetch_add(1, Ordering::AcqRel);
                    job.await;
                    stats.in_flight.fetch_sub(1, Ordering::AcqRel);
                }
            });
        }

        info!(capacity, "request dispatcher started");

        Ok(Self {
            jobs,
            capacity,
            stats,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_flight(&self) -> usize {
        self.stats.in_flight.load(Ordering::Acquire)
    }

    pub fn queued(&self) -> usize {
        self.stats.queued.load(Ordering::Acquire)
    }

    /// Queue a unit and return a handle resolving to its output.
    pub fn submit<F, T>(&self, unit: F) -> UnitHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            match AssertUnwindSafe(unit).catch_unwind().await {
                Ok(output) => {
                    let _ = tx.send(Ok(output));
                }
                Err(_) => {
                    error!("dispatched unit panicked");
                    let _ = tx.send(Err(CatalogError::UnitPanicked));
                }
            }
        });

        self.stats.queued.fetch_add(1, Ordering::AcqRel);
        if self.jobs.send(job).is_err() {
            // The rejected job owns the sender, so the handle sees a closed
            // channel.
            self.stats.queued.fetch_sub(1, Ordering::AcqRel);
        }

        UnitHandle { rx }
    }

    /// Run a fallible unit and wait for it.
    pub async fn run<F, T>(&self, unit: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.submit(unit).join().await?
    }

    /// Start a cohort whose units can be awaited together.
    pub fn cohort<T>(&self) -> Cohort<T>
    where
        T: Send + 'static,
    {
        Cohort {
            dispatcher: self.clone(),
            handles: Vec::new(),
        }
    }
}

/// Pending result of one dispatched unit.
#[derive(Debug)]
pub struct UnitHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> UnitHandle<T> {
    pub async fn join(self) -> Result<T> {
        self.rx.await.map_err(|_| CatalogError::DispatcherClosed)?
    }
}

/// Group of units submitted together; [`Cohort::drain`] resolves once every
/// unit has completed, successfully or not.
#[derive(Debug)]
pub struct Cohort<T> {
    dispatcher: RequestDispatcher,
    handles: Vec<UnitHandle<T>>,
}

impl<T> Cohort<T>
where
    T: Send + 'static,
{
    pub fn submit<F>(&mut self, unit: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.handles.push(self.dispatcher.submit(unit));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for the whole cohort. Outputs keep submission order.
    pub async fn drain(self) -> Vec<Result<T>> {
        join_all(self.handles.into_iter().map(UnitHandle::join)).await
    }
}
