//! Where texture load tasks run.

/// A unit of blocking work handed to a [`TaskLauncher`].
pub type LoadTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs load tasks concurrently with the caller.
///
/// Tasks do blocking I/O and CPU-heavy decoding, so implementations should
/// run them off any async executor's worker threads.
pub trait TaskLauncher: Send + Sync {
    fn launch(&self, task: LoadTask);
}

impl<T: TaskLauncher + ?Sized> TaskLauncher for std::sync::Arc<T> {
    fn launch(&self, task: LoadTask) {
        (**self).launch(task);
    }
}

/// Launches onto tokio's blocking thread pool.
impl TaskLauncher for tokio::runtime::Handle {
    fn launch(&self, task: LoadTask) {
        // The JoinHandle is not needed, completion is signalled by the task itself.
        drop(self.spawn_blocking(task));
    }
}

/// Launches every task on a fresh OS thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadLauncher;

impl TaskLauncher for ThreadLauncher {
    fn launch(&self, task: LoadTask) {
        let spawned = std::thread::Builder::new()
            .name("texture-load".to_string())
            .spawn(task);
        if let Err(e) = spawned {
            // The closure was consumed by the failed spawn and dropped, which
            // completes the texture as aborted.
            log::error!("could not spawn texture load thread: {}", e);
        }
    }
}
