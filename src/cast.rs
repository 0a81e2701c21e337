//! The vote-casting pipeline: validate, encrypt, sign, commit.

use crate::*;

use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use num_bigint::BigUint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use uuid::Uuid;

/// The shared mutable state of one election: the ballot list and the
/// current published root, plus the tally accumulators that must move in
/// lockstep with them.
#[derive(Debug)]
struct BallotBoxState {
    ballots: Vec<Ballot>,
    tree: Option<MerkleTree>,
    current_root: Option<NodeHash>,
    tally: ElectionTallyState,
}

/// Per-election aggregate: the election record plus its mutable state
/// behind a single lock.
///
/// Everything from the duplicate check through publishing the new root runs
/// under that one lock, so a cast commits as one unit and two concurrent
/// casts by the same voter can never both pass the duplicate check. Boxes
/// for different elections share nothing and never contend.
#[derive(Debug)]
pub struct BallotBox {
    election: Election,
    state: Mutex<BallotBoxState>,
}

impl BallotBox {
    /// Open a ballot box for `election`, seeding one zero-ciphertext tally
    /// accumulator per candidate.
    pub fn new(election: Election) -> Result<BallotBox, CryptoError> {
        let tally = ElectionTallyState::new(&election)?;
        Ok(BallotBox {
            election,
            state: Mutex::new(BallotBoxState {
                ballots: Vec::new(),
                tree: None,
                current_root: None,
                tally,
            }),
        })
    }

    pub fn election(&self) -> &Election {
        &self.election
    }

    // State is only ever mutated after all fallible work has succeeded, so
    // the data behind a poisoned lock is still consistent.
    fn state(&self) -> MutexGuard<'_, BallotBoxState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cast a vote, returning the voter's receipt.
    pub fn cast_vote(
        &self,
        voter_id: &str,
        candidate_index: usize,
        signing_key: &SigningKey,
    ) -> Result<VoteReceipt, Error> {
        self.cast_vote_at(voter_id, candidate_index, signing_key, Utc::now())
    }

    /// `cast_vote` with an explicit clock, for callers that impose their own
    /// notion of now and for deterministic tests. A caller-side timeout maps
    /// to not calling at all, which is always a clean pre-commit rejection.
    pub fn cast_vote_at(
        &self,
        voter_id: &str,
        candidate_index: usize,
        signing_key: &SigningKey,
        now: DateTime<Utc>,
    ) -> Result<VoteReceipt, Error> {
        let mut state = self.state();

        // Validating: all three checks come before any cryptographic work
        if state.ballots.iter().any(|b| b.voter_id == voter_id) {
            return Err(ValidationError::DuplicateVote(voter_id.to_string()).into());
        }
        self.election.check_candidate(candidate_index)?;
        self.election.check_open(now)?;

        // Encrypting: the +1 offset reserves plaintext 0 for the tally
        // accumulators' encryption of zero, so a vote for candidate 0 can
        // never be mistaken for "no vote"
        let plaintext = BigUint::from(candidate_index as u64 + 1);
        let encrypted = encrypt(&plaintext, &self.election.public_key)?;

        // Signing
        let ballot = Ballot::new(
            self.election.id,
            voter_id.to_string(),
            encrypted.clone(),
            signing_key,
            now,
        );

        // Commit: rebuild the tree over the grown ballot set and extract
        // this ballot's proof before touching the state, so any failure
        // rejects with nothing applied
        let mut leaves: Vec<Vec<u8>> = state
            .ballots
            .iter()
            .map(|b| b.encrypted_choice.to_bytes())
            .collect();
        leaves.push(ballot.encrypted_choice.to_bytes());
        let tree = MerkleTree::build(&leaves)?;
        let proof = tree.proof(leaves.len() - 1)?;

        state
            .tally
            .record(candidate_index, &encrypted, &self.election.public_key)?;
        state.current_root = Some(tree.root());
        state.tree = Some(tree);
        let receipt = VoteReceipt {
            ballot_id: ballot.id,
            proof,
            signature: ballot.signature,
        };
        state.ballots.push(ballot);

        Ok(receipt)
    }

    /// Number of committed ballots.
    pub fn ballot_count(&self) -> usize {
        self.state().ballots.len()
    }

    /// Snapshot of the committed ballots, in cast order.
    pub fn ballots(&self) -> Vec<Ballot> {
        self.state().ballots.clone()
    }

    /// The currently published root, or `None` before the first ballot.
    pub fn current_root(&self) -> Option<NodeHash> {
        self.state().current_root
    }

    /// Re-derive a receipt for an existing ballot against the current tree.
    ///
    /// Receipts issued at cast time go stale as later ballots move the
    /// root; this re-issues one that verifies against the root the election
    /// currently publishes.
    pub fn receipt_for(&self, ballot_id: Uuid) -> Option<VoteReceipt> {
        let state = self.state();
        let index = state.ballots.iter().position(|b| b.id == ballot_id)?;
        let proof = state.tree.as_ref()?.proof(index).ok()?;
        Some(VoteReceipt {
            ballot_id,
            proof,
            signature: state.ballots[index].signature,
        })
    }

    /// Tally the election: one combined ciphertext per candidate, decrypted
    /// once with the authority's private key.
    pub fn tally(&self, private: &PaillierPrivateKey) -> Result<Vec<CandidateCount>, CryptoError> {
        self.state().tally.counts(private)
    }
}

/// Arena of ballot boxes keyed by election id.
///
/// Each box owns its own lock; the registry's lock only guards the map, so
/// casts into different elections proceed in parallel.
#[derive(Default)]
pub struct ElectionRegistry {
    boxes: RwLock<HashMap<Uuid, Arc<BallotBox>>>,
}

impl ElectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a ballot box for `election` and register it.
    pub fn open(&self, election: Election) -> Result<Arc<BallotBox>, CryptoError> {
        let ballot_box = Arc::new(BallotBox::new(election)?);
        self.boxes
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(ballot_box.election().id, ballot_box.clone());
        Ok(ballot_box)
    }

    pub fn get(&self, election_id: Uuid) -> Option<Arc<BallotBox>> {
        self.boxes
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&election_id)
            .cloned()
    }
}
