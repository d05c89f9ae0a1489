//!
//! MCS Queue Lock
//!
//! Mellor-Crummey and Scott's queue lock. The lock itself is one atomic
//! pointer to the most recently queued node. Every acquisition swaps its own
//! node in as the new tail, links itself behind the previous tail and then
//! spins on its own `locked` flag until the predecessor hands over.
//!
//! Service order is FIFO among acquirers that have completed the tail swap,
//! and each waiter's flag is written by exactly one other thread.
//!
//! ## Node lifetime
//!
//! A node becomes reachable by other threads from the tail swap until the
//! matching release returns. During that window it must neither move nor be
//! dropped nor be handed to a second acquisition. The raw `acquire` and
//! `release` leave this to the caller and are `unsafe`.
//!
//! `McsLock::with_node` is the safe form. It borrows the node mutably and runs
//! the critical section as a closure, releasing before it returns, also when
//! the closure unwinds. Nothing the caller owns can outlive the call and keep
//! the node published, so the node is free again as soon as `with_node`
//! returns. Handing the same node to a nested acquisition does not compile:
//!
//! ```compile_fail
//! use spinsync_locks::{McsLock, McsNode};
//!
//! let lock = McsLock::new();
//! let mut node = McsNode::new();
//! lock.with_node(&mut node, || {
//!     lock.with_node(&mut node, || ());
//! });
//! ```
//!
//! A worker keeps one node as its per-acquisition context:
//!
//! ```
//! use spinsync_locks::{McsLock, McsNode};
//!
//! let lock = McsLock::new();
//! let mut node = McsNode::new();
//! let mut total = 0;
//! for i in 0..3 {
//!     total += lock.with_node(&mut node, || i);
//! }
//! assert_eq!(total, 3);
//! assert!(!lock.is_locked());
//! ```
//!

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::thread;

use crossbeam_utils::CachePadded;
use spinsync_core::{RawLock, RawTryLock};
use tracing::trace;

#[derive(Debug)]
struct Slot {
    next: AtomicPtr<McsNode>,
    locked: AtomicBool,
}

/// Queue node for one in-flight acquisition, padded to its own cache line.
#[derive(Debug)]
pub struct McsNode {
    slot: CachePadded<Slot>,
}

impl McsNode {
    pub const fn new() -> Self {
        Self {
            slot: CachePadded::new(Slot {
                next: AtomicPtr::new(ptr::null_mut()),
                locked: AtomicBool::new(false),
            }),
        }
    }

    fn as_ptr(&self) -> *mut McsNode {
        self as *const McsNode as *mut McsNode
    }

    /// Clears the successor link and arms the wait flag. Runs before the
    /// node is published, so relaxed stores suffice.
    fn reset(&self) {
        self.slot.next.store(ptr::null_mut(), Ordering::Relaxed);
        self.slot.locked.store(true, Ordering::Relaxed);
    }
}

impl Default for McsNode {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct McsLock {
    tail: CachePadded<AtomicPtr<McsNode>>,
}

impl McsLock {
    pub const fn new() -> Self {
        Self {
            tail: CachePadded::new(AtomicPtr::new(ptr::null_mut())),
        }
    }

    /// Enqueues `node` and blocks until it reaches the head of the queue.
    ///
    /// # Safety
    ///
    /// `node` must not be linked into any queue, and it must stay at the same
    /// address and alive until `release` has been called with it and has
    /// returned.
    pub unsafe fn acquire(&self, node: &McsNode) {
        node.reset();

        let predecessor = self.tail.swap(node.as_ptr(), Ordering::AcqRel);
        if predecessor.is_null() {
            return;
        }

        // SAFETY: a published predecessor stays alive until its release
        // returns, and that release cannot return before it sees this link.
        unsafe { &*predecessor }
            .slot
            .next
            .store(node.as_ptr(), Ordering::Release);

        while node.slot.locked.load(Ordering::Acquire) {
            thread::yield_now();
        }
    }

    /// Takes the lock only if the queue is empty.
    ///
    /// # Safety
    ///
    /// Same contract as `acquire` when this returns `true`. When it returns
    /// `false` the node was never published and is free again.
    pub unsafe fn try_acquire(&self, node: &McsNode) -> bool {
        node.reset();
        self.tail
            .compare_exchange(
                ptr::null_mut(),
                node.as_ptr(),
                Ordering::AcqRel,
                Ordering::Relaxed,
            )
            .is_ok()
    }

    /// Hands the lock to the successor of `node`, or empties the queue.
    ///
    /// # Safety
    ///
    /// `node` must be the node whose `acquire` (or successful `try_acquire`)
    /// on this lock produced the critical section being released.
    pub unsafe fn release(&self, node: &McsNode) {
        let mut next = node.slot.next.load(Ordering::Acquire);

        if next.is_null() {
            if self
                .tail
                .compare_exchange(
                    node.as_ptr(),
                    ptr::null_mut(),
                    Ordering::Release,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                return;
            }

            // A successor swapped itself in as tail but has not linked yet.
            trace!("mcs release waiting for successor link");
            loop {
                thread::yield_now();
                next = node.slot.next.load(Ordering::Acquire);
                if !next.is_null() {
                    break;
                }
            }
        }

        // SAFETY: the successor spins on its own node until this store, so it
        // is alive here. It may be freed right after; it is not touched again.
        unsafe { &*next }.slot.locked.store(false, Ordering::Release);
    }

    /// Runs `critical` while holding the lock, queued behind `node`.
    ///
    /// The lock is released before this returns, including when `critical`
    /// panics.
    pub fn with_node<R>(&self, node: &mut McsNode, critical: impl FnOnce() -> R) -> R {
        let node = &*node;
        // SAFETY: `node` is exclusively borrowed for this whole call and the
        // release below runs before the borrow ends.
        unsafe { self.acquire(node) };
        let _release = Release { lock: self, node };
        critical()
    }

    /// Like `with_node`, but only if the queue is empty. Returns `None`
    /// without running `critical` otherwise.
    pub fn try_with_node<R>(
        &self,
        node: &mut McsNode,
        critical: impl FnOnce() -> R,
    ) -> Option<R> {
        let node = &*node;
        // SAFETY: as in `with_node`. A failed attempt never published the
        // node, so there is nothing to release.
        if !unsafe { self.try_acquire(node) } {
            return None;
        }
        let _release = Release { lock: self, node };
        Some(critical())
    }

    pub fn is_locked(&self) -> bool {
        !self.tail.load(Ordering::Relaxed).is_null()
    }
}

/// Releases an acquisition made inside `with_node` when dropped. Never
/// leaves the function that created it.
struct Release<'a> {
    lock: &'a McsLock,
    node: &'a McsNode,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        // SAFETY: created right after `node` acquired `lock`.
        unsafe { self.lock.release(self.node) };
    }
}

/// Boxed nodes keep their address when the token moves between
/// `lock` and `unlock`.
impl RawLock for McsLock {
    type Token = Box<McsNode>;

    fn lock(&self) -> Box<McsNode> {
        let node = Box::new(McsNode::new());
        // SAFETY: the heap allocation is owned by the token until `unlock`.
        unsafe { self.acquire(&node) };
        node
    }

    unsafe fn unlock(&self, token: Box<McsNode>) {
        unsafe { self.release(&token) };
    }
}

impl RawTryLock for McsLock {
    fn try_lock(&self) -> Option<Box<McsNode>> {
        let node = Box::new(McsNode::new());
        // SAFETY: as in `lock`; a failed attempt never published the node.
        unsafe { self.try_acquire(&node) }.then_some(node)
    }
}
