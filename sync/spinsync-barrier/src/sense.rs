//!
//! Sense-Reversing Barrier
//!
//! Shared state is an arrival count, initialised to N and decremented on
//! every arrival, and a sense flag. The last arrival of a phase restores the
//! count to N and publishes the new sense with a release store. Everyone else
//! polls the sense with acquire loads, sleeping through the backoff between
//! polls, until it differs from the sense they arrived with.
//!
//! Everything a participant did before `wait` in phase k is visible to every
//! participant after its `wait` of phase k returns.
//!

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;
use spinsync_core::{Backoff, SyncError};
use tracing::{debug, trace};

/// Phase parity a participant expects next. All participants start from the
/// same value, which matches the barrier's initial sense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSense(bool);

impl LocalSense {
    pub const fn new() -> Self {
        Self(true)
    }

    pub fn get(&self) -> bool {
        self.0
    }
}

impl Default for LocalSense {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SenseBarrier {
    count: CachePadded<AtomicUsize>,
    sense: CachePadded<AtomicBool>,
    parties: usize,
    backoff: Backoff,
}

impl SenseBarrier {
    pub fn new(parties: usize) -> Result<Self, SyncError> {
        Self::with_backoff(parties, Backoff::DEFAULT)
    }

    pub fn with_backoff(parties: usize, backoff: Backoff) -> Result<Self, SyncError> {
        if parties == 0 {
            return Err(SyncError::InvalidParticipants { parties });
        }

        debug!(parties, start = ?backoff.start(), cap = ?backoff.cap(), "sense barrier created");
        Ok(Self {
            count: CachePadded::new(AtomicUsize::new(parties)),
            sense: CachePadded::new(AtomicBool::new(true)),
            parties,
            backoff,
        })
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Arrives at the barrier and blocks until all parties have arrived in
    /// this phase. Flips `local` for the next phase before returning.
    ///
    /// Returns `true` for exactly one participant per phase: the last
    /// arrival, which released the others.
    pub fn wait(&self, local: &mut LocalSense) -> bool {
        let local_sense = local.0;

        let last = self.count.fetch_sub(1, Ordering::AcqRel) == 1;
        if last {
            // Ordered before the release store below.
            self.count.store(self.parties, Ordering::Relaxed);
            self.sense.store(!local_sense, Ordering::Release);
            trace!(parties = self.parties, sense = !local_sense, "barrier phase complete");
        } else {
            let mut attempt = 0;
            while self.sense.load(Ordering::Acquire) == local_sense {
                self.backoff.snooze(&mut attempt);
            }
        }

        local.0 = !local_sense;
        last
    }

    pub fn participant(&self) -> Participant<'_> {
        Participant {
            barrier: self,
            sense: LocalSense::new(),
        }
    }
}

/// One worker's handle on a barrier. Keep it for the worker's lifetime; a
/// fresh handle mid-run starts from the wrong parity.
#[derive(Debug)]
pub struct Participant<'a> {
    barrier: &'a SenseBarrier,
    sense: LocalSense,
}

impl Participant<'_> {
    pub fn wait(&mut self) -> bool {
        self.barrier.wait(&mut self.sense)
    }

    pub fn sense(&self) -> &LocalSense {
        &self.sense
    }
}
