//! The append-only ledger: hash chain, position index, sealed batches.

use crate::error::{LedgerError, Result};
use crate::merkle::{MerkleProof, MerkleTree};
use crate::record::AuditRecord;
use auditseal_canonical::GENESIS_HASH;
use std::collections::HashMap;
use tracing::{debug, info};

/// Number of appends between Merkle seals unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Append-only, hash-chained audit ledger with periodic Merkle aggregation.
///
/// Position assignment is total and immutable: no deletion, no reordering.
/// Tree `j` covers positions `[j * B, (j + 1) * B)` for batch size `B`, and
/// once sealed its root never changes.
///
/// `append` is atomic with respect to observers holding the lock that guards
/// this value: the duplicate-id check happens before any mutation, and
/// chaining, insertion and sealing all complete under the same `&mut self`
/// borrow, so no partially appended record is ever visible.
#[derive(Debug, Default)]
pub struct AuditLedger {
    records: Vec<AuditRecord>,
    /// record_id to ledger position.
    index: HashMap<String, usize>,
    trees: Vec<MerkleTree>,
    batch_size: usize,
}

impl AuditLedger {
    /// Creates a ledger sealing every [`DEFAULT_BATCH_SIZE`] appends.
    pub fn new() -> Self {
        Self::with_batch_size(DEFAULT_BATCH_SIZE)
    }

    /// Creates a ledger with an explicit batch size.
    ///
    /// # Panics
    ///
    /// Panics when `batch_size` is zero; that is a configuration bug, not an
    /// input condition.
    pub fn with_batch_size(batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch size must be at least 1");
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            trees: Vec::new(),
            batch_size,
        }
    }

    /// Appends a record: chains it to the predecessor, computes its hash,
    /// assigns its position, and seals a Merkle tree when the batch fills.
    ///
    /// Returns the record's hash.
    ///
    /// # Errors
    ///
    /// [`LedgerError::DuplicateRecord`] when the id was appended before. The
    /// ledger is unchanged in that case.
    pub fn append(&mut self, mut record: AuditRecord) -> Result<String> {
        if self.index.contains_key(&record.record_id) {
            return Err(LedgerError::DuplicateRecord(record.record_id));
        }

        let previous = match self.records.last() {
            Some(prev) => prev
                .record_hash
                .clone()
                .expect("appended records always carry a record hash"),
            None => GENESIS_HASH.to_string(),
        };
        record.previous_hash = Some(previous);

        let record_hash = record.compute_hash();
        record.record_hash = Some(record_hash.clone());

        let position = self.records.len();
        self.index.insert(record.record_id.clone(), position);
        debug!(record_id = %record.record_id, position, "appended record");
        self.records.push(record);

        if (position + 1) % self.batch_size == 0 {
            self.seal_batch();
        }

        Ok(record_hash)
    }

    /// Seals the just-completed batch under a Merkle root.
    fn seal_batch(&mut self) {
        let start = self.trees.len() * self.batch_size;
        let end = start + self.batch_size;
        let leaves: Vec<String> = self.records[start..end]
            .iter()
            .map(|record| {
                record
                    .record_hash
                    .clone()
                    .expect("appended records always carry a record hash")
            })
            .collect();

        let tree = MerkleTree::new(leaves);
        info!(
            batch = self.trees.len(),
            start,
            end,
            root = %tree.root(),
            "sealed merkle batch"
        );
        self.trees.push(tree);
    }

    /// O(1) lookup by record id.
    pub fn get_record(&self, record_id: &str) -> Option<&AuditRecord> {
        self.index
            .get(record_id)
            .map(|&position| &self.records[position])
    }

    /// Ledger position of a record id.
    pub fn position_of(&self, record_id: &str) -> Option<usize> {
        self.index.get(record_id).copied()
    }

    /// The most recently appended record, if any.
    pub fn latest_record(&self) -> Option<&AuditRecord> {
        self.records.last()
    }

    /// All records in ledger order.
    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn sealed_tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Roots of the sealed trees, in batch order.
    pub fn sealed_roots(&self) -> Vec<String> {
        self.trees.iter().map(|tree| tree.root().to_string()).collect()
    }

    /// Recomputes every record hash and rechecks every chain link.
    ///
    /// Returns `false` on the first mismatch: a stored `record_hash` that no
    /// longer matches the record's fields, a `previous_hash` that does not
    /// equal the predecessor's hash, or a first record not anchored at the
    /// genesis constant. An empty ledger is trivially intact.
    pub fn verify_chain_integrity(&self) -> bool {
        for (i, record) in self.records.iter().enumerate() {
            let expected = record.compute_hash();
            if record.record_hash.as_deref() != Some(expected.as_str()) {
                return false;
            }

            if i == 0 {
                if record.previous_hash.as_deref() != Some(GENESIS_HASH) {
                    return false;
                }
            } else if record.previous_hash != self.records[i - 1].record_hash {
                return false;
            }
        }
        true
    }

    /// Generates a Merkle inclusion proof for a record in a sealed batch.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::RecordNotFound`] when the id is unknown.
    /// - [`LedgerError::NotSealed`] when the record sits in the open batch.
    pub fn generate_inclusion_proof(&self, record_id: &str) -> Result<MerkleProof> {
        let position = *self
            .index
            .get(record_id)
            .ok_or_else(|| LedgerError::RecordNotFound(record_id.to_string()))?;

        let tree_index = position / self.batch_size;
        if tree_index >= self.trees.len() {
            return Err(LedgerError::NotSealed {
                record_id: record_id.to_string(),
                position,
            });
        }

        let leaf_index = position % self.batch_size;
        Ok(self.trees[tree_index]
            .proof_for_index(leaf_index)
            .expect("sealed trees cover every position in their batch"))
    }

    /// Test-only escape hatch for tamper scenarios. Real records are never
    /// mutated after append.
    #[cfg(test)]
    fn record_mut(&mut self, position: usize) -> Option<&mut AuditRecord> {
        self.records.get_mut(position)
    }
}
