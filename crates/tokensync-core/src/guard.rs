use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SyncError;

/// Allows at most one sync in flight. The trigger stays disabled until the
/// returned permit is dropped.
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    busy: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct SyncPermit {
    busy: Arc<AtomicBool>,
}

impl SyncGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self) -> Result<SyncPermit, SyncError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SyncError::SyncInProgress)?;
        Ok(SyncPermit {
            busy: Arc::clone(&self.busy),
        })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
