//! Per-session dashboard state: the current outcome plus an ordered history.
//!
//! Session state is a rendering convenience and vanishes with the session;
//! the durable copy of every record lives in [`crate::store::DiagnosisLog`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::diagnosis::record::{Diagnosis, DiagnosisRecord};

/// How long a session survives without being touched.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Cap on one session's in-memory history. Older records fall off the front;
/// the durable log keeps the unbounded copy.
pub const DEFAULT_MAX_HISTORY: usize = 256;

/// State of one session. Starts empty: no current outcome, no history.
#[derive(Debug, Default, Clone)]
struct SessionState {
    current: Option<Diagnosis>,
    history: VecDeque<DiagnosisRecord>,
}

impl SessionState {
    fn push(&mut self, record: DiagnosisRecord, max_history: usize) {
        if self.history.len() >= max_history {
            self.history.pop_front();
        }
        self.current = Some(record.outcome.clone());
        self.history.push_back(record);
    }
}

/// Point-in-time copy of one session's state, in submission order.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Outcome of the most recent submission, if there has been one.
    pub current: Option<Diagnosis>,
    /// Past records, oldest first. Bounded by the registry's history cap.
    pub history: Vec<DiagnosisRecord>,
}

struct SessionEntry {
    state: SessionState,
    last_seen: Instant,
}

impl SessionEntry {
    fn expired(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() >= ttl
    }
}

impl Default for SessionEntry {
    fn default() -> Self {
        Self {
            state: SessionState::default(),
            last_seen: Instant::now(),
        }
    }
}

/// All live sessions, keyed by id.
///
/// Entries expire after sitting idle past the TTL. Expiry is enforced lazily:
/// reads treat stale entries as absent and [`SessionRegistry::ensure`] sweeps
/// them out, so no background task is needed.
pub struct SessionRegistry {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
    max_history: usize,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, max_history: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            // A cap of zero would evict every record as it lands; floor at one.
            max_history: max_history.max(1),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_SESSION_TTL, DEFAULT_MAX_HISTORY)
    }

    /// Resolve a session id for a request: reuse the presented id, minting a
    /// fresh one when none was given. A presented id that is unknown or has
    /// expired gets a brand-new empty session, which is what a first page
    /// load looks like.
    pub fn ensure(&self, id: Option<&str>) -> String {
        self.cleanup_expired();

        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let mut entry = self.sessions.entry(id.clone()).or_default();
        if entry.expired(self.ttl) {
            entry.state = SessionState::default();
        }
        entry.last_seen = Instant::now();
        drop(entry);

        id
    }

    /// Stamp a record for a submission, append it to the session, make its
    /// outcome current, and return it. The timestamp is taken while the
    /// session entry is held, so racing submissions to one id land in the
    /// history in timestamp order. An id the registry has never seen gets a
    /// fresh session; one idle past the TTL starts over, the same reset
    /// [`SessionRegistry::ensure`] applies.
    pub fn record(
        &self,
        id: &str,
        input: impl Into<String>,
        outcome: Diagnosis,
    ) -> DiagnosisRecord {
        let mut entry = self.sessions.entry(id.to_string()).or_default();
        if entry.expired(self.ttl) {
            entry.state = SessionState::default();
        }
        let record = DiagnosisRecord::new(input, outcome);
        entry.state.push(record.clone(), self.max_history);
        entry.last_seen = Instant::now();
        record
    }

    /// Ordered copy of a session's state, or `None` for an id that is
    /// unknown or has expired.
    pub fn snapshot(&self, id: &str) -> Option<SessionSnapshot> {
        let entry = self.sessions.get(id)?;
        if entry.expired(self.ttl) {
            return None;
        }
        Some(SessionSnapshot {
            current: entry.state.current.clone(),
            history: entry.state.history.iter().cloned().collect(),
        })
    }

    /// Drop every session idle past the TTL. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| !entry.expired(self.ttl));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_empty() {
        let registry = SessionRegistry::with_defaults();
        let id = registry.ensure(None);

        let snapshot = registry.snapshot(&id).unwrap();
        assert!(snapshot.current.is_none());
        assert!(snapshot.history.is_empty());
    }

    #[test]
    fn test_minted_ids_are_unique() {
        let registry = SessionRegistry::with_defaults();
        let a = registry.ensure(None);
        let b = registry.ensure(None);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_history_preserves_submission_order() {
        let registry = SessionRegistry::with_defaults();
        let id = registry.ensure(Some("dash"));

        registry.record(&id, "first", Diagnosis::suggestion());
        registry.record(&id, "second", Diagnosis::suggestion());
        registry.record(&id, "third", Diagnosis::suggestion());

        let snapshot = registry.snapshot(&id).unwrap();
        let inputs: Vec<&str> = snapshot.history.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, ["first", "second", "third"]);
        assert_eq!(snapshot.current, Some(snapshot.history[2].outcome.clone()));
        for pair in snapshot.history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn test_sessions_are_isolated() {
        let registry = SessionRegistry::with_defaults();
        let a = registry.ensure(Some("a"));
        let b = registry.ensure(Some("b"));

        registry.record(&a, "only in a", Diagnosis::suggestion());

        assert_eq!(registry.snapshot(&a).unwrap().history.len(), 1);
        assert!(registry.snapshot(&b).unwrap().history.is_empty());
    }

    #[test]
    fn test_history_is_bounded_oldest_first() {
        let registry = SessionRegistry::new(DEFAULT_SESSION_TTL, 2);
        let id = registry.ensure(Some("bounded"));

        registry.record(&id, "one", Diagnosis::suggestion());
        registry.record(&id, "two", Diagnosis::suggestion());
        registry.record(&id, "three", Diagnosis::suggestion());

        let snapshot = registry.snapshot(&id).unwrap();
        let inputs: Vec<&str> = snapshot.history.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, ["two", "three"]);
    }

    #[test]
    fn test_expired_sessions_read_as_absent_and_get_swept() {
        let registry = SessionRegistry::new(Duration::ZERO, DEFAULT_MAX_HISTORY);
        let id = registry.ensure(Some("gone"));
        registry.record(&id, "lost", Diagnosis::suggestion());

        // TTL of zero expires entries immediately.
        assert!(registry.snapshot(&id).is_none());
        assert!(registry.cleanup_expired() >= 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reusing_an_expired_id_starts_fresh() {
        let registry = SessionRegistry::new(Duration::ZERO, DEFAULT_MAX_HISTORY);
        let id = registry.ensure(Some("reborn"));
        registry.record(&id, "old life", Diagnosis::suggestion());

        let same = registry.ensure(Some("reborn"));
        assert_eq!(same, id);
        // ensure() sweeps first, so this is the empty state of a new session
        // even before the zero TTL hides it again.
        let entry = registry.sessions.get(&id).unwrap();
        assert!(entry.state.history.is_empty());
        assert!(entry.state.current.is_none());
    }

    #[test]
    fn test_recording_into_an_expired_session_starts_it_over() {
        let registry = SessionRegistry::new(Duration::ZERO, DEFAULT_MAX_HISTORY);
        let id = registry.ensure(Some("stale"));
        registry.record(&id, "before the cutoff", Diagnosis::suggestion());

        // Zero TTL: the entry is already expired by the next call. The new
        // record must not land on top of the stale history.
        let record = registry.record(&id, "after the cutoff", Diagnosis::suggestion());

        let entry = registry.sessions.get(&id).unwrap();
        assert_eq!(entry.state.history.len(), 1);
        assert_eq!(entry.state.history[0].input, "after the cutoff");
        assert_eq!(entry.state.current, Some(record.outcome));
    }

    #[test]
    fn test_racing_submissions_keep_history_in_timestamp_order() {
        use std::sync::Barrier;

        let registry = SessionRegistry::with_defaults();
        let barrier = Barrier::new(2);

        // Two writers hammering one id. Stamping happens under the session
        // entry, so the history must come out in timestamp order no matter
        // how the writers interleave.
        for round in 0..500 {
            let id = format!("race-{}", round);
            registry.ensure(Some(&id));

            std::thread::scope(|scope| {
                for worker in 0..2 {
                    let registry = &registry;
                    let barrier = &barrier;
                    let id = id.as_str();
                    scope.spawn(move || {
                        barrier.wait();
                        for n in 0..25 {
                            registry.record(
                                id,
                                format!("worker {} submission {}", worker, n),
                                Diagnosis::suggestion(),
                            );
                        }
                    });
                }
            });

            let snapshot = registry.snapshot(&id).unwrap();
            assert_eq!(snapshot.history.len(), 50);
            for pair in snapshot.history.windows(2) {
                assert!(
                    pair[0].timestamp <= pair[1].timestamp,
                    "out-of-order history in round {}",
                    round
                );
            }
        }
    }
}
