//! Merkle tree over a batch of record hashes.
//!
//! Leaves are the `record_hash` values of one sealed batch, in ledger order.
//! Levels are built bottom-up, pairing adjacent nodes left to right; a level
//! with odd arity pairs its final node with a duplicate of itself. Every
//! combine step is `sha256(concat(left_hex, right_hex))` over the hex
//! strings. The full level structure is retained so proofs can be generated
//! for any leaf after sealing.

use auditseal_canonical::combine_hex;
use serde::{Deserialize, Serialize};

/// Which side of the current node a proof sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofSide {
    Left,
    Right,
}

/// An inclusion proof: the sibling hashes along the path from a leaf to the
/// sealed root.
///
/// Each entry is `(sibling_hash, side)` where `side` is the sibling's
/// position relative to the path node at that level. Verification replays
/// the combine steps and compares the result to `root_hash`; no access to
/// the original tree is needed, which is what makes proofs portable to
/// offline auditors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub leaf_hash: String,
    pub root_hash: String,
    pub proof_hashes: Vec<(String, ProofSide)>,
}

impl MerkleProof {
    /// Replays the proof path and checks the recomputed root.
    pub fn verify(&self) -> bool {
        let mut current = self.leaf_hash.clone();
        for (sibling, side) in &self.proof_hashes {
            current = match side {
                ProofSide::Left => combine_hex(sibling, &current),
                ProofSide::Right => combine_hex(&current, sibling),
            };
        }
        current == self.root_hash
    }

    /// Number of levels in the proof path.
    pub fn len(&self) -> usize {
        self.proof_hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proof_hashes.is_empty()
    }
}

/// A sealed Merkle tree over an ordered list of leaf hashes.
///
/// Immutable once built. A single-leaf tree's root is the leaf itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` is the leaves; the last level holds only the root.
    levels: Vec<Vec<String>>,
}

impl MerkleTree {
    /// Builds the tree bottom-up from leaf hashes in batch order.
    pub fn new(leaves: Vec<String>) -> Self {
        let mut levels = vec![leaves];
        while levels
            .last()
            .map(|level| level.len() > 1)
            .unwrap_or(false)
        {
            let current = levels.last().expect("levels is never empty");
            let mut next = Vec::with_capacity((current.len() + 1) / 2);
            for pair in current.chunks(2) {
                let left = &pair[0];
                // Odd arity: the final node pairs with itself.
                let right = pair.get(1).unwrap_or(left);
                next.push(combine_hex(left, right));
            }
            levels.push(next);
        }
        Self { levels }
    }

    /// The root hash; empty string for a tree over zero leaves.
    pub fn root(&self) -> &str {
        self.levels
            .last()
            .and_then(|level| level.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(Vec::len).unwrap_or(0)
    }

    /// Generates an inclusion proof for the leaf at `index`.
    ///
    /// At each level of size `s`, the sibling of index `k` is `k xor 1`
    /// clamped to `s - 1`; when the clamp fires the node was duplicated at
    /// build time, and the proof carries the node itself as its sibling.
    /// `side` is `Right` when the path node is a left child (even `k`).
    ///
    /// Returns `None` when `index` is out of range.
    pub fn proof_for_index(&self, index: usize) -> Option<MerkleProof> {
        let leaves = self.levels.first()?;
        if index >= leaves.len() {
            return None;
        }

        let mut proof_hashes = Vec::new();
        let mut k = index;
        for level in &self.levels {
            if level.len() <= 1 {
                break;
            }
            let sibling = std::cmp::min(k ^ 1, level.len() - 1);
            let side = if k % 2 == 0 {
                ProofSide::Right
            } else {
                ProofSide::Left
            };
            proof_hashes.push((level[sibling].clone(), side));
            k /= 2;
        }

        Some(MerkleProof {
            leaf_hash: leaves[index].clone(),
            root_hash: self.root().to_string(),
            proof_hashes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditseal_canonical::sha256_hex;

    fn leaves(n: usize) -> Vec<String> {
        (0..n).map(|i| sha256_hex(format!("leaf-{i}").as_bytes())).collect()
    }

    #[test]
    fn empty_tree_has_empty_root() {
        let tree = MerkleTree::new(Vec::new());
        assert_eq!(tree.root(), "");
        assert_eq!(tree.leaf_count(), 0);
        assert!(tree.proof_for_index(0).is_none());
    }

    #[test]
    fn single_leaf_root_is_the_leaf() {
        let leaf = sha256_hex(b"only");
        let tree = MerkleTree::new(vec![leaf.clone()]);
        assert_eq!(tree.root(), leaf);

        let proof = tree.proof_for_index(0).unwrap();
        assert!(proof.is_empty());
        assert!(proof.verify());
    }

    #[test]
    fn two_leaf_root_is_combined_pair() {
        let l = leaves(2);
        let tree = MerkleTree::new(l.clone());
        assert_eq!(tree.root(), combine_hex(&l[0], &l[1]));
    }

    #[test]
    fn odd_leaf_count_duplicates_the_tail() {
        let l = leaves(3);
        let tree = MerkleTree::new(l.clone());

        let left = combine_hex(&l[0], &l[1]);
        let right = combine_hex(&l[2], &l[2]);
        assert_eq!(tree.root(), combine_hex(&left, &right));
    }

    #[test]
    fn all_proofs_verify_for_every_size() {
        for n in 1..=17 {
            let tree = MerkleTree::new(leaves(n));
            for i in 0..n {
                let proof = tree.proof_for_index(i).unwrap();
                assert!(proof.verify(), "proof failed for leaf {i} of {n}");
                assert_eq!(proof.root_hash, tree.root());
            }
        }
    }

    #[test]
    fn duplicated_node_proves_against_itself() {
        let l = leaves(3);
        let tree = MerkleTree::new(l.clone());

        let proof = tree.proof_for_index(2).unwrap();
        assert_eq!(proof.len(), 2);
        // First entry is the node itself, on the right.
        assert_eq!(proof.proof_hashes[0], (l[2].clone(), ProofSide::Right));
        assert!(proof.verify());
    }

    #[test]
    fn proof_length_is_logarithmic() {
        let tree = MerkleTree::new(leaves(4));
        let proof = tree.proof_for_index(2).unwrap();
        assert_eq!(proof.len(), 2);
    }

    #[test]
    fn tampered_sibling_fails_verification() {
        let tree = MerkleTree::new(leaves(8));
        let mut proof = tree.proof_for_index(3).unwrap();
        assert!(proof.verify());

        let (sibling, _) = &mut proof.proof_hashes[1];
        let flipped = if sibling.as_bytes()[0] == b'0' { "1" } else { "0" };
        sibling.replace_range(0..1, flipped);
        assert!(!proof.verify());
    }

    #[test]
    fn wrong_root_fails_verification() {
        let tree = MerkleTree::new(leaves(5));
        let mut proof = tree.proof_for_index(4).unwrap();
        proof.root_hash = "0".repeat(64);
        assert!(!proof.verify());
    }

    #[test]
    fn proof_wire_format() {
        let tree = MerkleTree::new(leaves(2));
        let proof = tree.proof_for_index(0).unwrap();
        let json = serde_json::to_value(&proof).unwrap();

        assert!(json.get("leaf_hash").unwrap().is_string());
        assert!(json.get("root_hash").unwrap().is_string());
        let entries = json.get("proof_hashes").unwrap().as_array().unwrap();
        assert_eq!(entries[0][1], serde_json::json!("right"));

        let back: MerkleProof = serde_json::from_value(json).unwrap();
        assert!(back.verify());
    }
}
