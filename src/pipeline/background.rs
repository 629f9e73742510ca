// Background runs: keep the caller's thread free while a run executes

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::capture::CapturedImage;
use crate::error::ScanPdfError;
use crate::pipeline::governor::{GovernedDocument, SizeGovernor};

/// Handle to a run executing on its own thread.
///
/// There is no cancellation: a started run always finishes.
pub struct RunHandle {
    rx: Receiver<crate::error::Result<GovernedDocument>>,
    thread: Option<JoinHandle<()>>,
    delivered: bool,
}

/// Start a run on a dedicated thread and return immediately.
pub fn spawn_run(
    governor: Arc<SizeGovernor>,
    images: Vec<CapturedImage>,
    title: Option<String>,
) -> crate::error::Result<RunHandle> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let thread = std::thread::Builder::new()
        .name("scan-pdf-run".into())
        .spawn(move || {
            let result = governor.run_titled(&images, title.as_deref());
            // 受信側が破棄されていれば結果は捨てる
            let _ = tx.send(result);
        })?;

    Ok(RunHandle {
        rx,
        thread: Some(thread),
        delivered: false,
    })
}

impl RunHandle {
    /// Block until the run finishes.
    pub fn wait(mut self) -> crate::error::Result<GovernedDocument> {
        if self.delivered {
            return Err(ScanPdfError::aborted("result already taken"));
        }
        let result = self
            .rx
            .recv()
            .unwrap_or_else(|_| Err(ScanPdfError::aborted("run thread exited without a result")));
        self.delivered = true;
        self.join();
        result
    }

    /// Poll without blocking. Yields the result at most once.
    pub fn try_wait(&mut self) -> Option<crate::error::Result<GovernedDocument>> {
        if self.delivered {
            return None;
        }
        let result = match self.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(ScanPdfError::aborted("run thread exited without a result"))
            }
        };
        self.delivered = true;
        self.join();
        Some(result)
    }

    pub fn is_finished(&self) -> bool {
        self.delivered
            || self
                .thread
                .as_ref()
                .is_none_or(|handle| handle.is_finished())
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
