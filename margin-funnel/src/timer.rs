use std::time::Duration;

use tokio::task::JoinHandle;

/// A single cancellable delayed callback.
///
/// Arming again aborts the previous callback, so at most one is ever
/// pending. Dropping the timer cancels it.
#[derive(Debug, Default)]
pub struct ResultTimer {
    handle: Option<JoinHandle<()>>,
}

impl ResultTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `on_fire` after `delay`, replacing any pending callback.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(
        &mut self,
        delay: Duration,
        on_fire: F,
    ) where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ResultTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
