//! Deferred effects
//!
//! Timed side effects are queued against the session clock and fired from
//! inside the tick, so clearing the queue cancels them all at once.

/// A deferred action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Bonus spawn requested by the difficulty controller
    ExtraSpawn,
    /// Undo one near-miss slowdown layer on the projectiles it slowed
    /// (sorted ids), only within the given session
    EndSlowdown { generation: u32, ids: Vec<u32> },
    EndInvulnerability,
    HideAlert,
    HideLastHit,
}

#[derive(Debug, Clone)]
struct Entry {
    due: f32,
    seq: u64,
    action: Deferred,
}

/// Deadline queue ordered by due time, then by insertion order
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Schedule {
    /// Queue `action` to fire once the session clock reaches `due` seconds
    pub fn push(&mut self, due: f32, action: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self
            .entries
            .partition_point(|e| e.due < due || (e.due == due && e.seq < seq));
        self.entries.insert(at, Entry { due, seq, action });
    }

    /// Remove and return every action due at or before `now`, in order
    pub fn drain_due(&mut self, now: f32) -> Vec<Deferred> {
        let split = self.entries.partition_point(|e| e.due <= now);
        self.entries.drain(..split).map(|e| e.action).collect()
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
