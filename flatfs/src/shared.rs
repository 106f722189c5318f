use std::sync::Arc;

use parking_lot::Mutex;

use crate::alloc::BlockId;
use crate::error::Result;
use crate::fs::{Usage, Volume};

/// A cloneable handle to one volume for callers on several threads.
///
/// A single lock covers both the directory and the block pool since create and
/// delete change them together. Results are copied out so nothing borrowed from
/// the volume outlives the lock.
#[derive(Debug, Clone)]
pub struct SharedVolume {
    inner: Arc<Mutex<Volume>>,
}

impl From<Volume> for SharedVolume {
    fn from(volume: Volume) -> Self {
        Self {
            inner: Arc::new(Mutex::new(volume)),
        }
    }
}

impl SharedVolume {
    pub fn create(&self, name: &str, size: u64) -> Result<Vec<BlockId>> {
        self.inner.lock().create(name, size).map(<[BlockId]>::to_vec)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.inner.lock().delete(name)
    }

    pub fn read(&self, name: &str) -> Result<Vec<BlockId>> {
        self.inner.lock().read(name).map(<[BlockId]>::to_vec)
    }

    pub fn write(&self, name: &str, data: &str) -> Result<Vec<BlockId>> {
        self.inner.lock().write(name, data).map(<[BlockId]>::to_vec)
    }

    pub fn view_content(&self, name: &str) -> Result<Vec<(BlockId, &'static str)>> {
        self.inner.lock().view_content(name)
    }

    pub fn usage(&self) -> Usage {
        self.inner.lock().usage()
    }

    /// Runs `f` with the lock held, for inspections that need a consistent view
    /// across several calls.
    pub fn with<R>(&self, f: impl FnOnce(&Volume) -> R) -> R {
        let guard = self.inner.lock();
        f(&*guard)
    }
}
