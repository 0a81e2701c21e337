use crate::*;

use thiserror::Error;

/// Any failure the casting core can produce.
///
/// Receipt and proof verification never appear here: an invalid or stale
/// receipt is an expected outcome and is reported as a value
/// ([`ReceiptStatus`]), not through the error channel.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Proof(#[from] ProofError),
}

/// Caller-fixable rejections, always raised before any cryptographic work.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("veritally validation: voter {0} has already cast a ballot in this election")]
    DuplicateVote(String),

    #[error("veritally validation: candidate index {index} out of range ({count} candidates)")]
    InvalidCandidate { index: usize, count: usize },

    #[error("veritally validation: election is not open for voting: it {0}")]
    ElectionNotOpen(ElectionPhase),

    #[error("veritally validation: ballot signature does not match its ciphertext: {0}")]
    BallotSignature(#[from] ed25519_dalek::SignatureError),
}

/// Cryptosystem failures. These should never occur in normal operation and
/// are fatal to the operation, never to the process.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("veritally: key generation failed: {0}")]
    KeyGeneration(String),

    #[error("veritally: plaintext out of range (must satisfy 0 <= m < n)")]
    InvalidPlaintext,

    #[error("veritally: cannot combine an empty list of ciphertexts")]
    EmptyCombine,

    #[error("veritally: failed to decrypt ciphertext")]
    DecryptionFailed,

    #[error("veritally: tally accumulator for candidate {0} decrypted to an inconsistent total")]
    TallyInconsistent(String),
}

/// Accumulator misuse. These are programmer errors, not voter-facing ones.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("veritally: leaf index {index} out of range for a tree of {leaf_count} leaves")]
    IndexOutOfRange { index: usize, leaf_count: usize },

    #[error("veritally: cannot build a merkle tree over zero leaves")]
    EmptyTree,
}
