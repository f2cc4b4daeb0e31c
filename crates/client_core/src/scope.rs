use std::{future::Future, sync::Mutex};

use tokio::task::JoinHandle;

/// Ties background request tasks to the lifetime of the view that issued
/// them. Dropping the scope aborts everything still in flight, so a torn
/// down view can no longer receive completions.
#[derive(Default)]
pub struct RequestScope {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut tasks = self.tasks.lock().expect("request scope poisoned");
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    pub fn cancel_all(&self) {
        let drained: Vec<JoinHandle<()>> = {
            let mut tasks = self.tasks.lock().expect("request scope poisoned");
            tasks.drain(..).collect()
        };
        for task in drained {
            task.abort();
        }
    }

    pub fn in_flight(&self) -> usize {
        let mut tasks = self.tasks.lock().expect("request scope poisoned");
        tasks.retain(|task| !task.is_finished());
        tasks.len()
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
