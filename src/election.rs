use crate::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One electable candidate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
}

/// The election record the casting core consumes from its caller.
///
/// The keypair is generated once per election and the public half embedded
/// here; the candidate list and schedule are immutable once voting starts.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Election {
    pub id: Uuid,
    pub public_key: PaillierPublicKey,
    pub candidates: Vec<Candidate>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub active: bool,
}

/// Where an election sits in its lifecycle, as observed at one instant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ElectionPhase {
    /// Before `start_time`.
    Pending,
    /// Open for voting.
    Open,
    /// Past `end_time`.
    Closed,
    /// Explicitly deactivated by the election authority.
    Deactivated,
}

impl std::fmt::Display for ElectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            ElectionPhase::Pending => "has not yet started",
            ElectionPhase::Open => "is open",
            ElectionPhase::Closed => "has already ended",
            ElectionPhase::Deactivated => "has been deactivated",
        };
        write!(f, "{}", msg)
    }
}

impl Election {
    /// Create a new active election with a fresh id.
    pub fn new(
        public_key: PaillierPublicKey,
        candidates: Vec<Candidate>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Election {
            id: Uuid::new_v4(),
            public_key,
            candidates,
            start_time,
            end_time,
            active: true,
        }
    }

    /// Classify the election's phase at `now`. Deactivation wins over the
    /// schedule, so a pulled election never reports itself merely pending.
    pub fn phase_at(&self, now: DateTime<Utc>) -> ElectionPhase {
        if !self.active {
            ElectionPhase::Deactivated
        } else if now < self.start_time {
            ElectionPhase::Pending
        } else if now > self.end_time {
            ElectionPhase::Closed
        } else {
            ElectionPhase::Open
        }
    }

    /// Reject unless the election is open at `now`. The phase rides in the
    /// error payload so callers can show "not yet started", "already ended"
    /// and "deactivated" as distinct messages.
    pub fn check_open(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        match self.phase_at(now) {
            ElectionPhase::Open => Ok(()),
            phase => Err(ValidationError::ElectionNotOpen(phase)),
        }
    }

    pub fn check_candidate(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.candidates.len() {
            return Err(ValidationError::InvalidCandidate {
                index,
                count: self.candidates.len(),
            });
        }
        Ok(())
    }
}
