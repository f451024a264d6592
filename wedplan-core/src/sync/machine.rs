//! Sync state machine.
//!
//! ```text
//! UNINITIALIZED --first snapshot--> SYNCED --local edit--> DIRTY
//!       DIRTY --debounce elapsed--> SAVING --save done--> SYNCED
//!                                   SAVING --save done, edits meanwhile--> DIRTY
//! ```
//!
//! Echo suppression: every save is stamped with a strictly increasing
//! `updated_at`. An inbound snapshot carrying one of the versions this
//! machine wrote is its own write coming back and is dropped.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::WeddingResult;
use crate::model::WeddingDocument;
use crate::mutation::Mutation;
use crate::store::Snapshot;

/// How many of our own write versions to remember for echo detection.
const OWN_WRITE_HISTORY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for the first snapshot; local edits are not saved.
    Uninitialized,
    Synced,
    /// Local edits waiting for the debounce window to close.
    Dirty,
    Saving,
}

/// What an inbound snapshot did to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// First snapshot; `created` when the remote had no document and the
    /// local one will be saved to create it.
    Initialized { created: bool },
    /// A genuine external change replaced the local document.
    Applied,
    /// Our own write echoed back.
    EchoSkipped,
    /// Identical to what we already have.
    Unchanged,
    /// The remote document disappeared after initialization; local state kept.
    Ignored,
}

#[derive(Debug)]
pub struct SyncMachine {
    document: WeddingDocument,
    state: SyncState,
    debounce: Duration,
    deadline: Option<Instant>,
    /// Local edits arrived while a save was in flight.
    trailing: bool,
    own_writes: VecDeque<i64>,
}

impl SyncMachine {
    pub fn new(document: WeddingDocument, debounce: Duration) -> Self {
        SyncMachine {
            document,
            state: SyncState::Uninitialized,
            debounce,
            deadline: None,
            trailing: false,
            own_writes: VecDeque::new(),
        }
    }

    pub fn document(&self) -> &WeddingDocument {
        &self.document
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// When the pending save is due, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_saving(&self) -> bool {
        self.state == SyncState::Saving
    }

    /// Apply an edit locally and (re)arm the debounce timer.
    pub fn apply_local(&mut self, mutation: Mutation, now: Instant) -> WeddingResult<()> {
        self.document.apply(mutation)?;

        match self.state {
            SyncState::Uninitialized => {}
            SyncState::Synced | SyncState::Dirty => {
                self.state = SyncState::Dirty;
                self.deadline = Some(now + self.debounce);
            }
            SyncState::Saving => {
                self.trailing = true;
                self.deadline = Some(now + self.debounce);
            }
        }
        Ok(())
    }

    /// Handle a snapshot from the store subscription.
    pub fn apply_remote(&mut self, snapshot: Snapshot, now: Instant) -> RemoteOutcome {
        if self.state == SyncState::Uninitialized {
            return match snapshot {
                Some(remote) => {
                    self.document = remote.normalized();
                    self.state = SyncState::Synced;
                    RemoteOutcome::Initialized { created: false }
                }
                None => {
                    self.state = SyncState::Dirty;
                    self.deadline = Some(now + self.debounce);
                    RemoteOutcome::Initialized { created: true }
                }
            };
        }

        let Some(remote) = snapshot else {
            return RemoteOutcome::Ignored;
        };

        if self.own_writes.contains(&remote.updated_at) {
            return RemoteOutcome::EchoSkipped;
        }

        let remote = remote.normalized();
        if remote == self.document {
            return RemoteOutcome::Unchanged;
        }

        // Last remote write wins; pending local edits are dropped.
        self.document = remote;
        self.deadline = None;
        self.trailing = false;
        if self.state == SyncState::Dirty {
            self.state = SyncState::Synced;
        }
        RemoteOutcome::Applied
    }

    /// Start a save if the debounce window has closed. Returns the stamped
    /// document to hand to the store.
    pub fn begin_save(&mut self, now: Instant, wall_clock_ms: i64) -> Option<WeddingDocument> {
        match self.deadline {
            Some(deadline) if self.state == SyncState::Dirty && deadline <= now => {
                Some(self.start_save(wall_clock_ms))
            }
            _ => None,
        }
    }

    /// Start a save right away if there is anything unsaved.
    pub fn begin_save_now(&mut self, wall_clock_ms: i64) -> Option<WeddingDocument> {
        (self.state == SyncState::Dirty).then(|| self.start_save(wall_clock_ms))
    }

    fn start_save(&mut self, wall_clock_ms: i64) -> WeddingDocument {
        let version = self.next_version(wall_clock_ms);
        self.document.updated_at = version;

        self.own_writes.push_back(version);
        while self.own_writes.len() > OWN_WRITE_HISTORY {
            self.own_writes.pop_front();
        }

        self.state = SyncState::Saving;
        self.deadline = None;
        self.document.clone()
    }

    /// Strictly greater than anything seen locally, even if the clock stalls.
    fn next_version(&self, wall_clock_ms: i64) -> i64 {
        let floor = self
            .own_writes
            .back()
            .copied()
            .unwrap_or(i64::MIN)
            .max(self.document.updated_at);
        wall_clock_ms.max(floor.saturating_add(1))
    }

    /// Record the outcome of the in-flight save. Local state is never rolled
    /// back on failure; the next edit schedules another attempt.
    pub fn finish_save(&mut self, now: Instant) {
        if self.state != SyncState::Saving {
            return;
        }

        if self.trailing {
            self.trailing = false;
            self.state = SyncState::Dirty;
            if self.deadline.is_none() {
                self.deadline = Some(now);
            }
        } else {
            self.state = SyncState::Synced;
        }
    }

    /// Drop any scheduled save.
    pub fn cancel_pending(&mut self) {
        self.deadline = None;
        self.trailing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;

    const DEBOUNCE: Duration = Duration::from_millis(1000);

    fn synced_machine(now: Instant) -> SyncMachine {
        let mut machine = SyncMachine::new(WeddingDocument::default(), DEBOUNCE);
        let outcome = machine.apply_remote(Some(WeddingDocument::default()), now);
        assert_eq!(outcome, RemoteOutcome::Initialized { created: false });
        machine
    }

    fn theme(t: &str) -> Mutation {
        Mutation::SetWeddingTheme(t.to_string())
    }

    #[test]
    fn test_edits_before_first_snapshot_are_not_saved() {
        let now = Instant::now();
        let mut machine = SyncMachine::new(WeddingDocument::default(), DEBOUNCE);
        machine.apply_local(theme("Local"), now).unwrap();

        assert_eq!(machine.state(), SyncState::Uninitialized);
        assert_eq!(machine.deadline(), None);
        assert!(machine.begin_save_now(0).is_none());

        let remote = WeddingDocument {
            wedding_theme: "Remoto".into(),
            updated_at: 10,
            ..WeddingDocument::default()
        };
        machine.apply_remote(Some(remote), now);
        assert_eq!(machine.document().wedding_theme, "Remoto");
        assert_eq!(machine.state(), SyncState::Synced);
    }

    #[test]
    fn test_absent_remote_schedules_creation() {
        let now = Instant::now();
        let mut machine = SyncMachine::new(WeddingDocument::default(), DEBOUNCE);
        let outcome = machine.apply_remote(None, now);

        assert_eq!(outcome, RemoteOutcome::Initialized { created: true });
        assert_eq!(machine.state(), SyncState::Dirty);
        assert!(machine.begin_save(now + DEBOUNCE, 1).is_some());
    }

    #[test]
    fn test_edits_restart_the_debounce_window() {
        let t0 = Instant::now();
        let mut machine = synced_machine(t0);

        machine.apply_local(theme("a"), t0).unwrap();
        machine
            .apply_local(theme("b"), t0 + Duration::from_millis(600))
            .unwrap();

        assert!(machine.begin_save(t0 + DEBOUNCE, 1).is_none());
        let saved = machine
            .begin_save(t0 + Duration::from_millis(1600), 1)
            .unwrap();
        assert_eq!(saved.wedding_theme, "b");
        assert_eq!(machine.state(), SyncState::Saving);
    }

    #[test]
    fn test_own_echo_is_skipped_even_when_duplicated() {
        let t0 = Instant::now();
        let mut machine = synced_machine(t0);
        machine.apply_local(theme("Boho"), t0).unwrap();
        let saved = machine.begin_save(t0 + DEBOUNCE, 5_000).unwrap();

        // A newer edit lands while the save is in flight.
        machine
            .apply_local(theme("Boho chic"), t0 + DEBOUNCE)
            .unwrap();

        assert_eq!(
            machine.apply_remote(Some(saved.clone()), t0 + DEBOUNCE),
            RemoteOutcome::EchoSkipped
        );
        assert_eq!(
            machine.apply_remote(Some(saved), t0 + DEBOUNCE),
            RemoteOutcome::EchoSkipped
        );
        assert_eq!(machine.document().wedding_theme, "Boho chic");
    }

    #[test]
    fn test_versions_strictly_increase_with_a_stuck_clock() {
        let t0 = Instant::now();
        let mut machine = synced_machine(t0);

        machine.apply_local(theme("a"), t0).unwrap();
        let first = machine.begin_save_now(1_000).unwrap();
        machine.finish_save(t0);
        machine.apply_local(theme("b"), t0).unwrap();
        let second = machine.begin_save_now(1_000).unwrap();

        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn test_external_change_overwrites_pending_edits() {
        let t0 = Instant::now();
        let mut machine = synced_machine(t0);
        machine.apply_local(theme("local"), t0).unwrap();

        let external = WeddingDocument {
            wedding_theme: "from phone".into(),
            updated_at: 99,
            ..WeddingDocument::default()
        };
        assert_eq!(
            machine.apply_remote(Some(external.clone()), t0),
            RemoteOutcome::Applied
        );
        assert_eq!(machine.document(), &external);
        assert_eq!(machine.state(), SyncState::Synced);
        assert_eq!(machine.deadline(), None);

        assert_eq!(
            machine.apply_remote(Some(external), t0),
            RemoteOutcome::Unchanged
        );
    }

    #[test]
    fn test_trailing_edit_during_save_schedules_one_follow_up() {
        let t0 = Instant::now();
        let mut machine = synced_machine(t0);
        machine
            .apply_local(Mutation::AddTask(Task::titled("DJ")), t0)
            .unwrap();
        machine.begin_save(t0 + DEBOUNCE, 1).unwrap();

        machine.apply_local(theme("x"), t0 + DEBOUNCE).unwrap();
        assert!(machine.begin_save(t0 + DEBOUNCE * 3, 2).is_none());

        machine.finish_save(t0 + DEBOUNCE * 3);
        assert_eq!(machine.state(), SyncState::Dirty);
        let follow_up = machine.begin_save(t0 + DEBOUNCE * 3, 3).unwrap();
        assert_eq!(follow_up.wedding_theme, "x");

        machine.finish_save(t0 + DEBOUNCE * 4);
        assert_eq!(machine.state(), SyncState::Synced);
        assert!(machine.begin_save_now(4).is_none());
    }

    #[test]
    fn test_rejected_edit_does_not_dirty() {
        let t0 = Instant::now();
        let mut machine = synced_machine(t0);
        assert!(machine.apply_local(Mutation::AddTask(Task::draft()), t0).is_err());
        assert_eq!(machine.state(), SyncState::Synced);
    }
}
