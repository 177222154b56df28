// ⏱️ Caller-side coordination: debounced recompute and auto-save
//
// The engine and codec are synchronous; the only concurrency that
// matters is when they get invoked. Two pieces:
//
//   Debouncer       - single-slot pending timer. A new trigger cancels
//                     and replaces the old one; only the latest trigger
//                     in a burst fires, exactly once, after the quiet
//                     period. cancel() makes any stale timer a no-op.
//   SaveCoordinator - the auto-save protocol as a pure state machine:
//                     at most one save in flight, follow-up (not
//                     concurrent) save when an edit lands mid-flight,
//                     hard halt on version conflict until the human
//                     reloads.
//
// The coordinator owns no timers and does no I/O, so the protocol is
// directly unit-testable; the Debouncer owns all timing.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Quiet period before a settlement recompute runs.
pub const SETTLEMENT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Quiet period before an auto-save fires. Shorter than the settlement
/// window and independent of it.
pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

// ============================================================================
// DEBOUNCER
// ============================================================================

/// Coalesces a burst of triggers into one execution after a quiet period.
///
/// Implementation: a generation counter. Every schedule (and cancel)
/// bumps the generation; a sleeper thread only runs its callback if the
/// generation it captured is still current when it wakes. Superseded and
/// cancelled timers wake, see a newer generation, and do nothing.
pub struct Debouncer {
    delay: Duration,
    generation: Arc<Mutex<u64>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    /// Schedule `f` to run after the quiet period, replacing any pending
    /// execution. The callback should capture whatever it needs to read
    /// the LATEST state at fire time, not a snapshot from schedule time.
    pub fn schedule<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let current = {
            let mut generation = self.generation.lock().unwrap();
            *generation += 1;
            *generation
        };

        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        thread::spawn(move || {
            thread::sleep(delay);
            let still_current = *generation.lock().unwrap() == current;
            if still_current {
                f();
            }
        });
    }

    /// Invalidate any pending execution. A timer that already started
    /// sleeping wakes up, notices, and does nothing.
    pub fn cancel(&self) {
        *self.generation.lock().unwrap() += 1;
    }
}

// ============================================================================
// SAVE COORDINATOR
// ============================================================================

/// Why a save cannot start right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePhase {
    /// No save running; a dirty state may begin one.
    Idle,
    /// One save is in flight; edits queue a follow-up, never a second
    /// concurrent write.
    InFlight,
    /// A version conflict happened. Auto-save stays off until reload -
    /// retrying with the server's version would silently discard the
    /// user's unsaved edit.
    Halted,
}

/// The version-conflict details kept for display after a halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictInfo {
    pub expected: i64,
    pub actual: i64,
}

/// Auto-save protocol state machine. Drive it from the debounced save
/// callback: `begin_save` hands out the expected version to send, and
/// exactly one of `complete_save` / `fail_conflict` / `fail_transport`
/// must follow.
#[derive(Debug)]
pub struct SaveCoordinator {
    version: i64,
    dirty: bool,
    phase: SavePhase,
    conflict: Option<ConflictInfo>,
}

impl SaveCoordinator {
    /// Start tracking a persisted list at its last fetched version.
    pub fn new(version: i64) -> Self {
        SaveCoordinator {
            version,
            dirty: false,
            phase: SavePhase::Idle,
            conflict: None,
        }
    }

    /// An edit landed. Safe to call at any time, including mid-flight
    /// (the completion path will notice and request a follow-up save).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// True when a save should be scheduled now.
    pub fn needs_save(&self) -> bool {
        self.dirty && self.phase == SavePhase::Idle
    }

    /// Try to start a save. Returns the expected version to send with
    /// the update, or None when there is nothing to save, a save is
    /// already in flight, or the coordinator is halted.
    pub fn begin_save(&mut self) -> Option<i64> {
        if !self.needs_save() {
            return None;
        }
        self.phase = SavePhase::InFlight;
        self.dirty = false;
        Some(self.version)
    }

    /// The in-flight save succeeded with the store's new version.
    /// If edits arrived mid-flight, `needs_save()` turns true again and
    /// the caller schedules the follow-up.
    pub fn complete_save(&mut self, new_version: i64) {
        self.version = new_version;
        self.phase = SavePhase::Idle;
    }

    /// The in-flight save hit a version conflict. Auto-save halts; only
    /// `reload` resumes it.
    pub fn fail_conflict(&mut self, actual: i64) {
        self.conflict = Some(ConflictInfo {
            expected: self.version,
            actual,
        });
        self.phase = SavePhase::Halted;
    }

    /// The in-flight save failed for a retryable reason (network,
    /// storage). The local edit is still unsaved, so the state goes back
    /// to dirty and a later save retries.
    pub fn fail_transport(&mut self) {
        self.dirty = true;
        self.phase = SavePhase::Idle;
    }

    /// The human re-fetched the list after a conflict; resume from the
    /// fresh version with a clean slate.
    pub fn reload(&mut self, version: i64) {
        self.version = version;
        self.dirty = false;
        self.phase = SavePhase::Idle;
        self.conflict = None;
    }

    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    pub fn is_halted(&self) -> bool {
        self.phase == SavePhase::Halted
    }

    pub fn conflict(&self) -> Option<ConflictInfo> {
        self.conflict
    }

    pub fn last_known_version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_burst_fires_only_latest() {
        let debouncer = Debouncer::new(Duration::from_millis(40));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let fired = Arc::clone(&fired);
            debouncer.schedule(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(5));
        }

        thread::sleep(Duration::from_millis(120));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        println!("✅ Debounce burst test passed");
    }

    #[test]
    fn test_cancel_makes_pending_timer_a_noop() {
        let debouncer = Debouncer::new(Duration::from_millis(30));
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        debouncer.cancel();

        thread::sleep(Duration::from_millis(100));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_schedule_after_cancel_still_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let fired = Arc::new(AtomicUsize::new(0));

        debouncer.cancel();
        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        thread::sleep(Duration::from_millis(80));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_save_protocol_happy_path_with_follow_up() {
        let mut coord = SaveCoordinator::new(1);
        assert!(!coord.needs_save());
        assert_eq!(coord.begin_save(), None);

        coord.mark_dirty();
        assert_eq!(coord.begin_save(), Some(1));

        // Edit lands while the save is in flight: no second write starts
        coord.mark_dirty();
        assert_eq!(coord.begin_save(), None);
        assert_eq!(coord.phase(), SavePhase::InFlight);

        // Completion picks up the follow-up
        coord.complete_save(2);
        assert!(coord.needs_save());
        assert_eq!(coord.begin_save(), Some(2));

        coord.complete_save(3);
        assert!(!coord.needs_save());
        assert_eq!(coord.last_known_version(), 3);

        println!("✅ Save protocol happy path passed");
    }

    #[test]
    fn test_conflict_halts_until_reload() {
        let mut coord = SaveCoordinator::new(4);
        coord.mark_dirty();
        assert_eq!(coord.begin_save(), Some(4));

        coord.fail_conflict(7);
        assert!(coord.is_halted());
        assert_eq!(
            coord.conflict(),
            Some(ConflictInfo {
                expected: 4,
                actual: 7
            })
        );

        // Edits while halted never trigger a save
        coord.mark_dirty();
        assert_eq!(coord.begin_save(), None);

        // Reload resumes from the fresh version, conflict cleared
        coord.reload(7);
        assert!(!coord.is_halted());
        assert_eq!(coord.conflict(), None);
        assert_eq!(coord.begin_save(), None); // reload wiped the dirty flag

        coord.mark_dirty();
        assert_eq!(coord.begin_save(), Some(7));
    }

    #[test]
    fn test_transport_failure_is_retryable() {
        let mut coord = SaveCoordinator::new(2);
        coord.mark_dirty();
        assert_eq!(coord.begin_save(), Some(2));

        coord.fail_transport();
        assert!(coord.needs_save());
        assert_eq!(coord.begin_save(), Some(2)); // same version, retried
    }
}
