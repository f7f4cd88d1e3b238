//! Read-aloud support for reviewing translated content by ear.
//!
//! Speaking a whole resource takes long enough that the user must be able
//! to interrupt it. Cancellation is cooperative: the flag is checked
//! between chunks, an in-flight chunk always finishes, and [`ReadAloudController::stop`]
//! waits until the reader has actually wound down before returning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::resource::PropertyMap;

/// Text-to-speech collaborator. One call per value chunk.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn speak(&self, locale_code: &str, text: &str) -> Result<()>;
}

/// How a read-aloud run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Every chunk was spoken.
    Completed,
    /// The run was interrupted between chunks.
    Interrupted,
}

struct Shared {
    cancel: AtomicBool,
    reading: AtomicBool,
    finished: Notify,
}

/// A read-aloud run over one resource's values.
pub struct ReadAloud {
    shared: Arc<Shared>,
}

/// Cloneable handle for interrupting a run from another task.
#[derive(Clone)]
pub struct ReadAloudController {
    shared: Arc<Shared>,
}

impl ReadAloud {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cancel: AtomicBool::new(false),
                reading: AtomicBool::new(false),
                finished: Notify::new(),
            }),
        }
    }

    pub fn controller(&self) -> ReadAloudController {
        ReadAloudController {
            shared: self.shared.clone(),
        }
    }

    /// Speak every value in entry order, checking for interruption between
    /// chunks. Flags are cleared and waiters woken on every exit path.
    pub async fn run(
        &self,
        service: &dyn SpeechService,
        locale_code: &str,
        content: &PropertyMap,
    ) -> Result<ReadOutcome> {
        self.shared.cancel.store(false, Ordering::SeqCst);
        self.shared.reading.store(true, Ordering::SeqCst);

        let mut outcome = ReadOutcome::Completed;
        for (key, text) in content.iter() {
            if self.shared.cancel.load(Ordering::SeqCst) {
                info!("read-aloud interrupted before key {key:?}");
                outcome = ReadOutcome::Interrupted;
                break;
            }
            debug!("speaking {key:?} in {locale_code}");
            if let Err(e) = service.speak(locale_code, text).await {
                self.finish();
                return Err(e);
            }
        }

        self.finish();
        Ok(outcome)
    }

    fn finish(&self) {
        self.shared.reading.store(false, Ordering::SeqCst);
        self.shared.cancel.store(false, Ordering::SeqCst);
        self.shared.finished.notify_waiters();
    }
}

impl Default for ReadAloud {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadAloudController {
    pub fn is_reading(&self) -> bool {
        self.shared.reading.load(Ordering::SeqCst)
    }

    /// Request interruption without waiting for it to take effect.
    pub fn interrupt(&self) {
        if self.is_reading() {
            self.shared.cancel.store(true, Ordering::SeqCst);
        }
    }

    /// Request interruption and wait until the reader has wound down. A
    /// no-op when nothing is being read.
    pub async fn stop(&self) {
        if !self.is_reading() {
            return;
        }
        self.shared.cancel.store(true, Ordering::SeqCst);

        while self.is_reading() {
            let notified = self.shared.finished.notified();
            tokio::pin!(notified);
            // Register before re-checking the flag so a wakeup between the
            // check and the await is not lost.
            notified.as_mut().enable();
            if !self.is_reading() {
                break;
            }
            notified.await;
        }
    }
}
