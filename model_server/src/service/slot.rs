use std::sync::Arc;

use parking_lot::Mutex;

use crate::training::{JobId, TrainingJob};

/// Holds the training job in flight, there's at most one.
#[derive(Debug, Default, Clone)]
pub(super) struct TrainingSlot(Arc<Mutex<Option<TrainingJob>>>);

impl TrainingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<TrainingJob> {
        self.0.lock().clone()
    }

    /// Takes the slot for a new job.
    ///
    /// # Returns
    /// The guard of the new job, or `None` if another job holds the slot.
    pub fn acquire(&self) -> Option<SlotGuard> {
        let mut slot = self.0.lock();

        if slot.is_some() {
            return None;
        }

        let job = TrainingJob::new(JobId::next());
        *slot = Some(job.clone());

        Some(SlotGuard {
            slot: self.clone(),
            job,
        })
    }
}

/// Ownership of the training slot, the slot is released when this is dropped.
#[derive(Debug)]
pub(super) struct SlotGuard {
    slot: TrainingSlot,
    job: TrainingJob,
}

impl SlotGuard {
    pub fn job(&self) -> &TrainingJob {
        &self.job
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut slot = self.slot.0.lock();

        if slot.as_ref().is_some_and(|job| job.id == self.job.id) {
            *slot = None;
        }
    }
}
