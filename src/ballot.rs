use crate::*;

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use uuid::Uuid;

/// A committed ballot. Immutable once cast, never edited or deleted, and
/// referenced forever by its `id` for verification.
///
/// The signature is over the ciphertext bytes: it binds the ballot to its
/// encrypted payload without revealing the selection.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Ballot {
    pub id: Uuid,
    pub election_id: Uuid,
    pub voter_id: String,

    pub encrypted_choice: Ciphertext,

    #[serde(with = "EdPublicKeyHex")]
    pub public_key: VerifyingKey,

    #[serde(with = "EdSignatureHex")]
    pub signature: Signature,

    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    /// Ballots are only ever created by the casting pipeline, which is what
    /// keeps the one-ballot-per-voter invariant enforceable.
    pub(crate) fn new(
        election_id: Uuid,
        voter_id: String,
        encrypted_choice: Ciphertext,
        signing_key: &SigningKey,
        cast_at: DateTime<Utc>,
    ) -> Self {
        let signature = signing_key.sign(&encrypted_choice.to_bytes());
        Ballot {
            id: Uuid::new_v4(),
            election_id,
            voter_id,
            encrypted_choice,
            public_key: signing_key.verifying_key(),
            signature,
            cast_at,
        }
    }

    /// Check that the recorded signature binds this ballot's ciphertext to
    /// the key recorded on it.
    pub fn verify_signature(&self) -> Result<(), ValidationError> {
        self.public_key
            .verify(&self.encrypted_choice.to_bytes(), &self.signature)?;
        Ok(())
    }
}
