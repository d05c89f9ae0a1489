///
/// # Phase Tests for spinsync-barrier
///
/// Exercises the barrier across many phases: ordering of work before and
/// after each phase, arrival counts per phase, randomized arrival jitter, and
/// the permanent stall when a participant is missing.
///

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use rand::Rng;
use spinsync_barrier::{LocalSense, SenseBarrier, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Before(usize),
    After(usize),
}

#[test]
fn test_phase_separation_log() {
    const PARTIES: usize = 4;
    const PHASES: usize = 1_000;
    let barrier = SenseBarrier::new(PARTIES).unwrap();
    let log = Mutex::new(Vec::with_capacity(PARTIES * PHASES * 2));

    thread::scope(|s| {
        for _ in 0..PARTIES {
            s.spawn(|| {
                let mut local = LocalSense::new();
                for phase in 0..PHASES {
                    log.lock().unwrap().push(Mark::Before(phase));
                    barrier.wait(&mut local);
                    log.lock().unwrap().push(Mark::After(phase));
                }
            });
        }
    });

    let log = log.into_inner().unwrap();
    assert_eq!(log.len(), PARTIES * PHASES * 2);

    let mut last_before = vec![0usize; PHASES];
    let mut first_after = vec![usize::MAX; PHASES];
    for (index, mark) in log.iter().enumerate() {
        match *mark {
            Mark::Before(phase) => last_before[phase] = last_before[phase].max(index),
            Mark::After(phase) => first_after[phase] = first_after[phase].min(index),
        }
    }

    for phase in 0..PHASES {
        assert!(
            last_before[phase] < first_after[phase],
            "phase {} released before every participant arrived",
            phase
        );
    }
}

#[test]
fn test_reusable_across_phases() {
    const PARTIES: usize = 8;
    const PHASES: usize = 1_000;
    let barrier = SenseBarrier::new(PARTIES).unwrap();
    let arrivals: Vec<AtomicUsize> = (0..PHASES).map(|_| AtomicUsize::new(0)).collect();

    thread::scope(|s| {
        for _ in 0..PARTIES {
            s.spawn(|| {
                let mut me = barrier.participant();
                for (phase, arrived) in arrivals.iter().enumerate() {
                    arrived.fetch_add(1, Ordering::Relaxed);
                    me.wait();
                    // Every arrival of this phase happened before our wait returned.
                    assert_eq!(arrived.load(Ordering::Relaxed), PARTIES, "phase {}", phase);
                }
            });
        }
    });

    assert!(arrivals.iter().all(|a| a.load(Ordering::Relaxed) == PARTIES));
}

#[test]
fn test_no_missed_wakeup_under_jitter() {
    const PARTIES: usize = 6;
    const PHASES: usize = 300;
    let barrier = SenseBarrier::new(PARTIES).unwrap();
    let returns: Vec<AtomicUsize> = (0..PHASES).map(|_| AtomicUsize::new(0)).collect();

    thread::scope(|s| {
        for _ in 0..PARTIES {
            s.spawn(|| {
                let mut rng = rand::thread_rng();
                let mut me = barrier.participant();
                for returned in &returns {
                    let jitter = rng.gen_range(0..200u64);
                    if jitter > 0 {
                        thread::sleep(Duration::from_micros(jitter));
                    }
                    me.wait();
                    returned.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    for (phase, returned) in returns.iter().enumerate() {
        assert_eq!(returned.load(Ordering::Relaxed), PARTIES, "phase {}", phase);
    }
}

#[test]
fn test_plain_counter_visible_after_phase() {
    const PARTIES: usize = 4;
    const PHASES: usize = 500;
    let barrier = SenseBarrier::new(PARTIES).unwrap();
    let slots: Vec<AtomicUsize> = (0..PARTIES).map(|_| AtomicUsize::new(0)).collect();

    thread::scope(|s| {
        for id in 0..PARTIES {
            let barrier = &barrier;
            let slots = &slots;
            s.spawn(move || {
                let mut local = LocalSense::new();
                for phase in 1..=PHASES {
                    slots[id].store(phase, Ordering::Relaxed);
                    barrier.wait(&mut local);
                    for slot in slots {
                        assert!(slot.load(Ordering::Relaxed) >= phase);
                    }
                    barrier.wait(&mut local);
                }
            });
        }
    });
}

#[test]
fn test_missing_participant_stalls_phase() {
    let barrier = SenseBarrier::new(3).unwrap();
    let released = AtomicBool::new(false);

    thread::scope(|s| {
        let early: Vec<_> = (0..2)
            .map(|_| {
                s.spawn(|| {
                    let mut me = barrier.participant();
                    me.wait();
                    released.store(true, Ordering::SeqCst);
                })
            })
            .collect();

        thread::sleep(Duration::from_millis(50));
        assert!(!released.load(Ordering::SeqCst), "phase completed with a participant missing");

        let mut late = barrier.participant();
        assert!(late.wait());
        for handle in early {
            handle.join().unwrap();
        }
    });

    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn test_invalid_construction() {
    assert!(matches!(
        SenseBarrier::new(0),
        Err(SyncError::InvalidParticipants { parties: 0 })
    ));
    assert_eq!(SenseBarrier::new(5).unwrap().parties(), 5);
}
