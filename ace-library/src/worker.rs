//! Background import worker
//!
//! Runs `DecodeRequest`s on a dedicated thread so the interactive loop
//! never blocks on decoding. Outcomes are polled back with `try_recv`.

use crate::scratch::{DecodeOutcome, DecodeRequest};
use crate::store::ContentSource;
use crossbeam_channel::{self, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

pub struct ImportWorker {
    jobs: Option<Sender<DecodeRequest>>,
    outcomes: Receiver<DecodeOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl ImportWorker {
    /// Spawn the worker thread
    pub fn spawn(source: Arc<dyn ContentSource>) -> std::io::Result<Self> {
        Self::spawn_with_flag(source, None)
    }

    /// Spawn the worker thread, raising `busy` while a request is running
    pub fn spawn_with_flag(
        source: Arc<dyn ContentSource>,
        busy: Option<Arc<AtomicBool>>,
    ) -> std::io::Result<Self> {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<DecodeRequest>();
        let (out_tx, out_rx) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name("ace-import".into())
            .spawn(move || {
                for request in job_rx {
                    if let Some(flag) = &busy {
                        flag.store(true, Ordering::Relaxed);
                    }
                    debug!(label = %request.ticket.label, path = %request.path.display(), "decoding");
                    let outcome = request.run(source.as_ref());
                    if let Some(flag) = &busy {
                        flag.store(false, Ordering::Relaxed);
                    }
                    if out_tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!("import worker stopped");
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            outcomes: out_rx,
            handle: Some(handle),
        })
    }

    /// Queue a request. Returns false if the worker has shut down.
    pub fn submit(&self, request: DecodeRequest) -> bool {
        match &self.jobs {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        }
    }

    /// Next finished outcome, if any
    pub fn try_recv(&self) -> Option<DecodeOutcome> {
        match self.outcomes.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("import worker disconnected");
                None
            }
        }
    }

    /// All outcomes finished so far
    pub fn drain(&self) -> Vec<DecodeOutcome> {
        self.outcomes.try_iter().collect()
    }

    /// Block until the next outcome arrives
    pub fn recv(&self) -> Option<DecodeOutcome> {
        self.outcomes.recv().ok()
    }
}

impl Drop for ImportWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("import worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryAssetDatabase;
    use crate::scratch::ScratchCopyManager;
    use crate::store::AssetDatabase;
    use ace_analysis::{CopyLabel, PcmClip};
    use std::path::Path;

    #[test]
    fn test_worker_round_trip() {
        let mut db = MemoryAssetDatabase::new();
        db.insert_clip("tone.wav", PcmClip::silence(0.25, 8000, 2));
        let source = db.describe(Path::new("tone.wav")).unwrap();

        let mut manager = ScratchCopyManager::default();
        let requests = manager.initialize(&mut db, &source).unwrap();

        let worker = ImportWorker::spawn(Arc::new(db.clone())).unwrap();
        for request in requests {
            assert!(worker.submit(request));
        }
        for _ in 0..2 {
            let outcome = worker.recv().unwrap();
            assert!(outcome.result.is_ok());
            manager.accept(outcome).unwrap();
        }
        for label in CopyLabel::ALL {
            assert!(manager.copy(label).unwrap().waveform().is_some());
        }
    }

    #[test]
    fn test_busy_flag_clears() {
        let db = MemoryAssetDatabase::new();
        db.insert_clip("tone.wav", PcmClip::silence(0.1, 8000, 1));
        let flag = Arc::new(AtomicBool::new(false));
        let worker =
            ImportWorker::spawn_with_flag(Arc::new(db.clone()), Some(Arc::clone(&flag))).unwrap();
        let mut writer = db.clone();
        let source = writer.describe(Path::new("tone.wav")).unwrap();
        let mut manager = ScratchCopyManager::default();
        let [a, _] = manager.initialize(&mut writer, &source).unwrap();
        worker.submit(a);
        worker.recv().unwrap();
        assert!(!flag.load(Ordering::Relaxed));
    }
}
