//! Homomorphic tallying: one combined ciphertext per candidate, decrypted
//! once. Individual ballots are never decrypted.

use crate::*;

use indexmap::IndexMap;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// Per-candidate homomorphic accumulators.
///
/// Each accumulator starts as a fresh encryption of zero; every committed
/// ballot for candidate `k` multiplies in its ciphertext of `k + 1`. The
/// zero seed is distinguishable from any real vote precisely because of
/// that offset.
#[derive(Debug, Clone)]
pub struct ElectionTallyState {
    entries: Vec<TallyEntry>,
}

#[derive(Debug, Clone)]
struct TallyEntry {
    candidate_id: String,
    combined: Ciphertext,
}

/// Final decrypted count for one candidate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CandidateCount {
    pub candidate_id: String,
    pub count: u64,
}

impl ElectionTallyState {
    /// Seed one Enc(0) accumulator per candidate.
    pub fn new(election: &Election) -> Result<ElectionTallyState, CryptoError> {
        let mut entries = Vec::with_capacity(election.candidates.len());
        for candidate in &election.candidates {
            entries.push(TallyEntry {
                candidate_id: candidate.id.clone(),
                combined: encrypt(&BigUint::zero(), &election.public_key)?,
            });
        }
        Ok(ElectionTallyState { entries })
    }

    /// Fold one committed ballot's ciphertext into its candidate's
    /// accumulator. The index has already been validated by the caster.
    pub(crate) fn record(
        &mut self,
        candidate_index: usize,
        ciphertext: &Ciphertext,
        public: &PaillierPublicKey,
    ) -> Result<(), CryptoError> {
        let entry = &mut self.entries[candidate_index];
        entry.combined = combine(&[entry.combined.clone(), ciphertext.clone()], public)?;
        Ok(())
    }

    /// Decrypt each accumulator once and recover the counts.
    ///
    /// Every ballot for candidate `k` contributed a plaintext of `k + 1`, so
    /// the accumulator decrypts to `(k + 1) * votes`; the offset is divided
    /// back out, and a non-exact division means the accumulator no longer
    /// matches the ballots it was built from.
    pub fn counts(&self, private: &PaillierPrivateKey) -> Result<Vec<CandidateCount>, CryptoError> {
        let mut counts = Vec::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            let total = decrypt(&entry.combined, private)?;
            let offset = BigUint::from(index as u64 + 1);
            if !(&total % &offset).is_zero() {
                return Err(CryptoError::TallyInconsistent(entry.candidate_id.clone()));
            }
            let count = (total / offset)
                .to_u64()
                .ok_or_else(|| CryptoError::TallyInconsistent(entry.candidate_id.clone()))?;
            counts.push(CandidateCount {
                candidate_id: entry.candidate_id.clone(),
                count,
            });
        }
        Ok(counts)
    }

    /// The raw combined ciphertexts in candidate order, for publication
    /// alongside the decrypted results.
    pub fn combined_ciphertexts(&self) -> Vec<Ciphertext> {
        self.entries.iter().map(|e| e.combined.clone()).collect()
    }
}

/// Totals keyed by candidate id, in candidate-list order.
///
/// An `IndexMap` rather than a hash map: unstable ordering would make the
/// serialized results non-deterministic.
pub fn totals(counts: &[CandidateCount]) -> IndexMap<String, u64> {
    counts
        .iter()
        .map(|c| (c.candidate_id.clone(), c.count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn test_election() -> (PaillierKeypair, Election) {
        let keypair = generate_keypair(128).unwrap();
        let election = Election::new(
            keypair.public.clone(),
            vec![Candidate { id: "A".into() }, Candidate { id: "B".into() }],
            Utc::now() - Duration::hours(1),
            Utc::now() + Duration::hours(1),
        );
        (keypair, election)
    }

    #[test]
    fn zero_votes_tally_to_zero() {
        let (keypair, election) = test_election();
        let state = ElectionTallyState::new(&election).unwrap();

        let counts = state.counts(&keypair.private).unwrap();
        assert_eq!(
            counts,
            vec![
                CandidateCount { candidate_id: "A".into(), count: 0 },
                CandidateCount { candidate_id: "B".into(), count: 0 },
            ]
        );
    }

    #[test]
    fn recorded_votes_tally_with_offset_removed() {
        let (keypair, election) = test_election();
        let mut state = ElectionTallyState::new(&election).unwrap();

        // two votes for A (plaintext 1), one for B (plaintext 2)
        for _ in 0..2 {
            let ct = encrypt(&BigUint::from(1u8), &election.public_key).unwrap();
            state.record(0, &ct, &election.public_key).unwrap();
        }
        let ct = encrypt(&BigUint::from(2u8), &election.public_key).unwrap();
        state.record(1, &ct, &election.public_key).unwrap();

        let counts = state.counts(&keypair.private).unwrap();
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].count, 1);

        let map = totals(&counts);
        assert_eq!(map["A"], 2);
        assert_eq!(map["B"], 1);
    }

    #[test]
    fn corrupted_accumulator_is_flagged() {
        let (keypair, election) = test_election();
        let mut state = ElectionTallyState::new(&election).unwrap();

        // a stray plaintext of 1 in candidate B's accumulator cannot be a
        // whole number of offset-2 votes
        let ct = encrypt(&BigUint::from(1u8), &election.public_key).unwrap();
        state.record(1, &ct, &election.public_key).unwrap();

        assert!(matches!(
            state.counts(&keypair.private),
            Err(CryptoError::TallyInconsistent(ref id)) if id == "B"
        ));
    }
}
