//! Running a search on a worker thread.
//!
//! A [`PathSearchTask`] runs exactly one search on its own thread so the
//! caller's loop is not blocked. Cancellation is cooperative: the search
//! polls a [`CancelToken`] once per expanded node and returns `CANCELLED`
//! when it is set. Joining waits for the worker to exit, and dropping an
//! unfinished task cancels and joins it.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use hexnav_core::Vec3;

use crate::traits::{GridAddressing, GroundQuery, MovementValidator};
use crate::{PathFinder, PathResult, PathStatus};

/// Shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle to a path search running on a worker thread.
pub struct PathSearchTask {
    handle: Option<JoinHandle<PathResult>>,
    cancel: CancelToken,
}

impl PathSearchTask {
    /// Spawn a search for `object` from `src` to `dst` with the finder's
    /// configured iteration limit.
    pub fn spawn<G, Q, V>(
        finder: Arc<PathFinder<G, Q, V>>,
        object: V::Object,
        src: Vec3,
        dst: Vec3,
    ) -> io::Result<Self>
    where
        G: GridAddressing + Send + Sync + 'static,
        Q: GroundQuery + Send + Sync + 'static,
        V: MovementValidator + Send + Sync + 'static,
        V::Object: Send + 'static,
    {
        Self::spawn_with_token(finder, object, src, dst, CancelToken::new())
    }

    /// Like [`spawn`](Self::spawn), observing an existing token.
    pub fn spawn_with_token<G, Q, V>(
        finder: Arc<PathFinder<G, Q, V>>,
        object: V::Object,
        src: Vec3,
        dst: Vec3,
        cancel: CancelToken,
    ) -> io::Result<Self>
    where
        G: GridAddressing + Send + Sync + 'static,
        Q: GroundQuery + Send + Sync + 'static,
        V: MovementValidator + Send + Sync + 'static,
        V::Object: Send + 'static,
    {
        let token = cancel.clone();
        let handle = thread::Builder::new()
            .name("hexnav-search".into())
            .spawn(move || {
                let limit = finder.config().iteration_limit;
                finder.find_path_cancellable(&object, src, dst, limit, &token)
            })?;
        Ok(Self {
            handle: Some(handle),
            cancel,
        })
    }

    /// Token observed by the worker.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Ask the worker to stop. Does not wait.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the worker has returned.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Take the result if the worker has returned, without blocking.
    ///
    /// Returns `None` while the search runs and after the result was taken.
    pub fn try_take(&mut self) -> Option<PathResult> {
        if !self.handle.as_ref()?.is_finished() {
            return None;
        }
        self.handle.take().map(collect)
    }

    /// Wait for the worker and return its result.
    pub fn join(mut self) -> PathResult {
        match self.handle.take() {
            Some(handle) => collect(handle),
            None => PathResult::failed(PathStatus::NOT_AVAILABLE, 0),
        }
    }

    /// Cancel, then wait for the worker to observe it and exit.
    pub fn cancel_and_join(self) -> PathResult {
        self.cancel();
        self.join()
    }
}

impl Drop for PathSearchTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.cancel();
            let _ = handle.join();
        }
    }
}

fn collect(handle: JoinHandle<PathResult>) -> PathResult {
    handle.join().unwrap_or_else(|_| {
        log::error!("path search worker panicked");
        PathResult::failed(PathStatus::NOT_AVAILABLE, 0)
    })
}
