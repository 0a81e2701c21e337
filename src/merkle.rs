//! Merkle accumulator over the ordered ballot ciphertexts of one election.
//!
//! The current root is the election's published integrity anchor; each
//! ballot's inclusion proof is the voter's receipt.

use crate::*;

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 node hash.
pub type NodeHash = [u8; 32];

/// Binary hash tree over an ordered leaf set. Every level is retained so
/// proof extraction is a lookup rather than a rebuild.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<NodeHash>>,
}

/// Inclusion proof: the sibling path from the leaf level upward. Left/right
/// placement at each level is decided by the corresponding bit of `index`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    #[serde(with = "hash_hex")]
    pub root: NodeHash,

    #[serde(with = "hash_hex")]
    pub leaf: NodeHash,

    pub index: usize,

    #[serde(with = "hash_vec_hex")]
    pub siblings: Vec<NodeHash>,
}

/// `leaf = H(data)`.
pub fn leaf_hash(data: &[u8]) -> NodeHash {
    Sha256::digest(data).into()
}

fn node_hash(left: &NodeHash, right: &NodeHash) -> NodeHash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

impl MerkleTree {
    /// Build a tree over the ordered leaf byte-strings.
    ///
    /// An unpaired node at any level is hashed with itself rather than
    /// promoted. That tie-break is part of the reproducibility contract:
    /// anyone re-deriving the tree from the same leaf sequence must reach
    /// the same root.
    ///
    /// Zero leaves is an error; there is no meaningful tree over an empty
    /// ballot set, and the caller reports "no votes cast" instead.
    pub fn build(leaves: &[Vec<u8>]) -> Result<MerkleTree, ProofError> {
        if leaves.is_empty() {
            return Err(ProofError::EmptyTree);
        }

        let mut current: Vec<NodeHash> = leaves.iter().map(|leaf| leaf_hash(leaf)).collect();
        let mut levels = vec![current.clone()];
        while current.len() > 1 {
            let mut next = Vec::with_capacity((current.len() + 1) / 2);
            for pair in current.chunks(2) {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                next.push(node_hash(left, right));
            }
            levels.push(next.clone());
            current = next;
        }

        Ok(MerkleTree { levels })
    }

    /// The root hash. For a single-leaf tree this equals the leaf's hash.
    pub fn root(&self) -> NodeHash {
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Extract the inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, ProofError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(ProofError::IndexOutOfRange { index, leaf_count });
        }

        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = position ^ 1;
            // an unpaired rightmost node is its own sibling
            let sibling = if sibling < level.len() { sibling } else { position };
            siblings.push(level[sibling]);
            position /= 2;
        }

        Ok(MerkleProof {
            root: self.root(),
            leaf: self.levels[0][index],
            index,
            siblings,
        })
    }
}

/// Recompute the root from `leaf`, `index` and the sibling path, and compare
/// it against the proof's own root.
///
/// Pure; needs no tree access. A mismatch is an ordinary negative result,
/// never an error: forged and stale receipts are expected inputs here.
pub fn verify(proof: &MerkleProof) -> bool {
    let mut current = proof.leaf;
    let mut position = proof.index;
    for sibling in &proof.siblings {
        current = if position % 2 == 0 {
            node_hash(&current, sibling)
        } else {
            node_hash(sibling, &current)
        };
        position /= 2;
    }
    current == proof.root
}
