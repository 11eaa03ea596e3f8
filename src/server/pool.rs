//! Fixed-size worker pool with a bounded job queue
//!
//! Accepted connections are queued for a fixed set of worker threads. When the
//! queue is full, [`WorkerPool::submit`] blocks, which stalls the accept loop
//! and leaves further clients waiting in the kernel backlog.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Returned by [`WorkerPool::submit`] once the pool is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("worker pool is shut down")]
pub struct PoolClosed;

pub struct WorkerPool {
    sender: Option<SyncSender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers sharing a queue of `queue_depth` pending jobs
    pub fn new(size: usize, queue_depth: usize) -> io::Result<Self> {
        let size = size.max(1);
        let (sender, receiver) = mpsc::sync_channel::<Job>(queue_depth);
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = Arc::clone(&receiver);
            let handle = thread::Builder::new()
                .name(format!("lineseek-worker-{}", id))
                .spawn(move || worker_loop(id, receiver))?;
            workers.push(handle);
        }

        debug!("Started {} workers (queue depth {})", size, queue_depth);
        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job, blocking while the queue is full
    pub fn submit<F>(&self, job: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolClosed)?;
        sender.send(Box::new(job)).map_err(|_| PoolClosed)
    }

    /// Stop accepting jobs, let queued jobs finish, and join every worker
    pub fn shutdown(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        // Closing the channel ends each worker's recv loop
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Worker thread exited abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

fn worker_loop(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) {
    loop {
        let job = {
            let receiver = receiver.lock().unwrap_or_else(PoisonError::into_inner);
            receiver.recv()
        };

        let Ok(job) = job else {
            debug!("Worker {} stopping", id);
            break;
        };

        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("Worker {} recovered from a panicking job", id);
        }
    }
}
