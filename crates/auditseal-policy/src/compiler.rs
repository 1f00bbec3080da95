//! Policy compilation and the commitment store.

use crate::error::{PolicyError, Result};
use crate::model::Policy;
use auditseal_canonical::{canonicalize, sha256_hex, ts_millis};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// An immutable canonicalized policy: the unique byte sequence chosen as the
/// hash pre-image, and the commitment digest over it.
///
/// `canonical_form` is the only representation used for binding. Callers
/// holding a record address the policy by `commitment_hash`, never by
/// "whatever is current in the store".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalPolicy {
    pub policy_id: String,
    pub version: String,
    pub canonical_form: String,
    pub commitment_hash: String,
    #[serde(with = "ts_millis")]
    pub created_at: DateTime<Utc>,
}

/// Compiles policies into canonical form and tracks commitments per policy
/// identity.
///
/// Compilation is deterministic and idempotent: compiling the same
/// `(policy_id, version)` twice produces the identical commitment, and the
/// version history records each version once in insertion order.
///
/// # Thread Safety
///
/// Not internally synchronized; wrap in a reader-writer lock when shared.
#[derive(Debug, Default)]
pub struct PolicyCompiler {
    /// Most recently compiled canonical form per policy id.
    compiled: HashMap<String, CanonicalPolicy>,
    /// Version strings per policy id, insertion order, deduplicated.
    versions: HashMap<String, Vec<String>>,
}

impl PolicyCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a policy into canonical form and records the commitment.
    ///
    /// Steps: validate statement ids, sort the set-valued fields, sort
    /// statements by `Sid`, canonically encode the resulting tree, digest it,
    /// and append the version to the policy's history.
    ///
    /// Recompiling a policy id overwrites the "current" entry; previously
    /// issued commitments stay valid because records address by digest.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Malformed`] when two statements share a `sid`.
    pub fn compile(&mut self, policy: &Policy) -> Result<CanonicalPolicy> {
        let mut seen_sids = HashSet::new();
        for statement in &policy.statements {
            if !seen_sids.insert(statement.sid.as_str()) {
                return Err(PolicyError::Malformed(format!(
                    "duplicate statement sid: {}",
                    statement.sid
                )));
            }
        }

        let normalized = normalize(policy);
        let canonical_form = canonicalize(&normalized);
        let commitment_hash = sha256_hex(canonical_form.as_bytes());

        let canonical = CanonicalPolicy {
            policy_id: policy.policy_id.clone(),
            version: policy.version.clone(),
            canonical_form,
            commitment_hash,
            created_at: Utc::now(),
        };

        debug!(
            policy_id = %policy.policy_id,
            version = %policy.version,
            commitment = %canonical.commitment_hash,
            "compiled policy"
        );

        self.compiled
            .insert(policy.policy_id.clone(), canonical.clone());

        let history = self.versions.entry(policy.policy_id.clone()).or_default();
        if !history.contains(&policy.version) {
            history.push(policy.version.clone());
        }

        Ok(canonical)
    }

    /// Returns the most recently compiled canonical form for a policy id.
    pub fn get(&self, policy_id: &str) -> Option<&CanonicalPolicy> {
        self.compiled.get(policy_id)
    }

    /// Strict accessor: errors with [`PolicyError::UnknownPolicy`] instead of
    /// returning `None`.
    pub fn canonical(&self, policy_id: &str) -> Result<&CanonicalPolicy> {
        self.compiled
            .get(policy_id)
            .ok_or_else(|| PolicyError::UnknownPolicy(policy_id.to_string()))
    }

    /// Version strings for a policy id, in insertion order.
    pub fn versions(&self, policy_id: &str) -> &[String] {
        self.versions
            .get(policy_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Checks a claimed commitment against the stored one.
    ///
    /// Fails safe: an id the store has never compiled verifies as `false`.
    pub fn verify_commitment(&self, policy_id: &str, claimed_hash: &str) -> bool {
        match self.compiled.get(policy_id) {
            Some(canonical) => canonical.commitment_hash == claimed_hash,
            None => false,
        }
    }

    /// Number of distinct policy identities with a compiled form.
    pub fn policy_count(&self) -> usize {
        self.compiled.len()
    }
}

/// Builds the normalized tree that gets canonically encoded.
///
/// Set-valued fields are sorted here so that authoring order cannot leak
/// into the commitment. `Principals` and `Conditions` appear only when
/// present and non-empty; policy metadata is not committed at all.
fn normalize(policy: &Policy) -> serde_json::Value {
    let mut statements: Vec<serde_json::Value> = policy
        .statements
        .iter()
        .map(|statement| {
            let mut actions: Vec<&str> = statement.actions.iter().map(|a| a.as_str()).collect();
            actions.sort_unstable();
            actions.dedup();

            let mut resources: Vec<&str> =
                statement.resources.iter().map(String::as_str).collect();
            resources.sort_unstable();
            resources.dedup();

            let mut normalized = json!({
                "Sid": statement.sid,
                "Effect": statement.effect.as_str(),
                "Actions": actions,
                "Resources": resources,
            });

            if let Some(principals) = &statement.principals {
                if !principals.is_empty() {
                    let mut sorted: Vec<&str> = principals.iter().map(String::as_str).collect();
                    sorted.sort_unstable();
                    sorted.dedup();
                    normalized["Principals"] = json!(sorted);
                }
            }

            if !statement.conditions.is_empty() {
                normalized["Conditions"] = json!(statement.conditions);
            }

            normalized
        })
        .collect();

    statements.sort_by(|a, b| {
        let sid_a = a["Sid"].as_str().unwrap_or_default();
        let sid_b = b["Sid"].as_str().unwrap_or_default();
        sid_a.cmp(sid_b)
    });

    json!({
        "PolicyId": policy.policy_id,
        "Version": policy.version,
        "Name": policy.name,
        "Statements": statements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PolicyAction, PolicyEffect, PolicyStatement};

    fn sample_policy() -> Policy {
        Policy::new("pol-1", "1.0", "object-retention").with_statement(PolicyStatement::new(
            "stmt-1",
            PolicyEffect::Allow,
            vec![PolicyAction::Write, PolicyAction::Read],
            vec!["b/b".to_string(), "b/a".to_string()],
        ))
    }

    #[test]
    fn compile_produces_well_formed_commitment() {
        let mut compiler = PolicyCompiler::new();
        let canonical = compiler.compile(&sample_policy()).unwrap();

        assert_eq!(canonical.policy_id, "pol-1");
        assert_eq!(canonical.version, "1.0");
        assert!(auditseal_canonical::is_hex_digest(&canonical.commitment_hash));
    }

    #[test]
    fn canonical_form_sorts_sets() {
        let mut compiler = PolicyCompiler::new();
        let canonical = compiler.compile(&sample_policy()).unwrap();

        let actions_pos = canonical.canonical_form.find("s3:GetObject").unwrap();
        let write_pos = canonical.canonical_form.find("s3:PutObject").unwrap();
        assert!(actions_pos < write_pos);

        let a_pos = canonical.canonical_form.find("b/a").unwrap();
        let b_pos = canonical.canonical_form.find("b/b").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn statements_sorted_by_sid() {
        let policy = Policy::new("pol-2", "1.0", "n")
            .with_statement(PolicyStatement::new(
                "zz",
                PolicyEffect::Deny,
                vec![PolicyAction::Delete],
                vec!["r".to_string()],
            ))
            .with_statement(PolicyStatement::new(
                "aa",
                PolicyEffect::Allow,
                vec![PolicyAction::Read],
                vec!["r".to_string()],
            ));

        let mut compiler = PolicyCompiler::new();
        let canonical = compiler.compile(&policy).unwrap();

        let aa = canonical.canonical_form.find(r#""Sid":"aa""#).unwrap();
        let zz = canonical.canonical_form.find(r#""Sid":"zz""#).unwrap();
        assert!(aa < zz);
    }

    #[test]
    fn recompile_is_idempotent_and_dedups_history() {
        let mut compiler = PolicyCompiler::new();
        let first = compiler.compile(&sample_policy()).unwrap();
        let second = compiler.compile(&sample_policy()).unwrap();

        assert_eq!(first.commitment_hash, second.commitment_hash);
        assert_eq!(first.canonical_form, second.canonical_form);
        assert_eq!(compiler.versions("pol-1"), ["1.0"]);
    }

    #[test]
    fn versions_keep_insertion_order() {
        let mut compiler = PolicyCompiler::new();
        let mut policy = sample_policy();
        compiler.compile(&policy).unwrap();

        policy.version = "2.0".to_string();
        compiler.compile(&policy).unwrap();
        policy.version = "1.5".to_string();
        compiler.compile(&policy).unwrap();

        assert_eq!(compiler.versions("pol-1"), ["1.0", "2.0", "1.5"]);
    }

    #[test]
    fn duplicate_sid_is_malformed() {
        let policy = Policy::new("pol-3", "1.0", "n")
            .with_statement(PolicyStatement::new(
                "dup",
                PolicyEffect::Allow,
                vec![PolicyAction::Read],
                vec!["r".to_string()],
            ))
            .with_statement(PolicyStatement::new(
                "dup",
                PolicyEffect::Deny,
                vec![PolicyAction::Write],
                vec!["r".to_string()],
            ));

        let mut compiler = PolicyCompiler::new();
        let err = compiler.compile(&policy).unwrap_err();
        assert!(matches!(err, PolicyError::Malformed(_)));
        assert!(compiler.get("pol-3").is_none());
    }

    #[test]
    fn verify_commitment_fails_safe_on_unknown_policy() {
        let compiler = PolicyCompiler::new();
        assert!(!compiler.verify_commitment("ghost", &"0".repeat(64)));
    }

    #[test]
    fn verify_commitment_rejects_wrong_digest() {
        let mut compiler = PolicyCompiler::new();
        let canonical = compiler.compile(&sample_policy()).unwrap();

        assert!(compiler.verify_commitment("pol-1", &canonical.commitment_hash));
        assert!(!compiler.verify_commitment("pol-1", &"f".repeat(64)));
    }

    #[test]
    fn strict_accessor_reports_unknown_policy() {
        let compiler = PolicyCompiler::new();
        let err = compiler.canonical("ghost").unwrap_err();
        assert!(matches!(err, PolicyError::UnknownPolicy(_)));
    }

    #[test]
    fn metadata_is_not_committed() {
        let mut compiler = PolicyCompiler::new();
        let plain = compiler.compile(&sample_policy()).unwrap();

        let annotated = sample_policy().with_metadata("owner", serde_json::json!("team-a"));
        let mut compiler2 = PolicyCompiler::new();
        let committed = compiler2.compile(&annotated).unwrap();

        assert_eq!(plain.commitment_hash, committed.commitment_hash);
    }

    #[test]
    fn empty_principals_treated_as_absent() {
        let with_empty = Policy::new("p", "1", "n").with_statement(
            PolicyStatement::new(
                "s",
                PolicyEffect::Allow,
                vec![PolicyAction::Read],
                vec!["r".to_string()],
            )
            .with_principals(vec![]),
        );
        let without = Policy::new("p", "1", "n").with_statement(PolicyStatement::new(
            "s",
            PolicyEffect::Allow,
            vec![PolicyAction::Read],
            vec!["r".to_string()],
        ));

        let mut c1 = PolicyCompiler::new();
        let mut c2 = PolicyCompiler::new();
        assert_eq!(
            c1.compile(&with_empty).unwrap().commitment_hash,
            c2.compile(&without).unwrap().commitment_hash
        );
    }
}
