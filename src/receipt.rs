use crate::*;

use ed25519_dalek::Signature;
use uuid::Uuid;

/// What a voter retains after casting: enough to independently confirm
/// their ballot is in the published set, and nothing that reveals the
/// selection.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VoteReceipt {
    pub ballot_id: Uuid,
    pub proof: MerkleProof,

    #[serde(with = "EdSignatureHex")]
    pub signature: Signature,
}

/// Outcome of receipt verification. Deliberately a value rather than an
/// error: untrusted receipts are expected to sometimes be forged or stale.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    Valid,
    Invalid,
}

/// Re-derive the proof's root and require it to match the root the election
/// currently publishes.
///
/// Both checks matter: a proof can be internally self-consistent (it folds
/// to *some* root) and still be invalid because that root is stale.
pub fn verify_receipt(receipt: &VoteReceipt, published_root: &NodeHash) -> ReceiptStatus {
    if verify(&receipt.proof) && receipt.proof.root == *published_root {
        ReceiptStatus::Valid
    } else {
        ReceiptStatus::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_over(leaves: &[&str], index: usize) -> VoteReceipt {
        let leaves: Vec<Vec<u8>> = leaves.iter().map(|s| s.as_bytes().to_vec()).collect();
        let tree = MerkleTree::build(&leaves).unwrap();
        let (signing_key, _) = generate_signing_keypair();
        VoteReceipt {
            ballot_id: Uuid::new_v4(),
            proof: tree.proof(index).unwrap(),
            signature: ed25519_dalek::Signer::sign(&signing_key, b"ciphertext"),
        }
    }

    #[test]
    fn matching_root_is_valid() {
        let receipt = receipt_over(&["a", "b", "c"], 1);
        let root = receipt.proof.root;
        assert_eq!(verify_receipt(&receipt, &root), ReceiptStatus::Valid);
    }

    #[test]
    fn self_consistent_proof_against_other_root_is_invalid() {
        let receipt = receipt_over(&["a", "b", "c"], 1);
        assert!(verify(&receipt.proof));

        let other = MerkleTree::build(&[b"x".to_vec()]).unwrap().root();
        assert_eq!(verify_receipt(&receipt, &other), ReceiptStatus::Invalid);
    }

    #[test]
    fn corrupted_proof_is_invalid() {
        let mut receipt = receipt_over(&["a", "b", "c"], 1);
        let root = receipt.proof.root;
        receipt.proof.siblings[0][0] ^= 0x01;
        assert_eq!(verify_receipt(&receipt, &root), ReceiptStatus::Invalid);
    }
}
