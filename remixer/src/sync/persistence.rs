use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use log::{debug, error, warn};
use parking_lot::Mutex;

use crate::error::Result;
use crate::serialization::Snapshot;

/// Where a canonical snapshot lives between runs
pub trait SnapshotStore: Send + 'static {
    fn load(&self) -> Result<Option<Snapshot>>;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Keeps the last saved snapshot in memory. Clones share storage, so a test
/// or host can keep one clone and hand another to a mechanism.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<Option<Snapshot>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::default();
        *store.snapshot.lock() = Some(snapshot);
        store
    }

    pub fn current(&self) -> Option<Snapshot> {
        self.snapshot.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.current())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.snapshot.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}

enum StoreCommand {
    Save(Snapshot),
    Flush(Sender<()>),
}

/// Writes snapshots on a dedicated thread so value changes never wait on
/// I/O. Saves are fire-and-forget: failures are logged, never returned.
pub struct PersistenceWorker {
    sender: Option<Sender<StoreCommand>>,
    thread: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    pub fn spawn<S: SnapshotStore>(store: S) -> Self {
        let (sender, receiver) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("remixer-persistence".to_string())
            .spawn(move || run(store, receiver));

        let thread = match thread {
            Ok(thread) => Some(thread),
            Err(e) => {
                error!("Unable to start persistence thread: {}", e);
                None
            }
        };

        Self {
            sender: thread.as_ref().map(|_| sender),
            thread,
        }
    }

    pub fn save(&self, snapshot: Snapshot) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(StoreCommand::Save(snapshot)).is_err() {
            warn!("Persistence thread is gone; snapshot not saved");
        }
    }

    /// Blocks until every save queued before this call has been written
    pub fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (ack_sender, ack_receiver) = mpsc::channel();
        if sender.send(StoreCommand::Flush(ack_sender)).is_ok() {
            let _ = ack_receiver.recv();
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Persistence thread panicked");
            }
        }
    }
}

fn run<S: SnapshotStore>(store: S, receiver: Receiver<StoreCommand>) {
    while let Ok(command) = receiver.recv() {
        match command {
            StoreCommand::Save(snapshot) => match store.save(&snapshot) {
                Ok(()) => debug!("Saved snapshot ({} records)", snapshot.len()),
                Err(e) => error!("Unable to save snapshot: {}", e),
            },
            StoreCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
