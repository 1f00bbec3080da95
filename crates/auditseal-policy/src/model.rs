//! Policy data model.
//!
//! A policy identity owns an ordered history of versions; each version
//! carries a name, free-form metadata and a list of statements. Action,
//! resource and principal collections are sets at the semantic level: their
//! authoring order is irrelevant and the compiler sorts them before
//! committing.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Whether a statement grants or denies its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyEffect {
    Allow,
    Deny,
}

impl PolicyEffect {
    /// The wire value committed into the canonical form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyEffect::Allow => "Allow",
            PolicyEffect::Deny => "Deny",
        }
    }
}

impl fmt::Display for PolicyEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyEffect {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(PolicyEffect::Allow),
            "Deny" => Ok(PolicyEffect::Deny),
            other => Err(PolicyError::Malformed(format!(
                "unrecognized effect value: {other}"
            ))),
        }
    }
}

/// Object-storage actions a statement can cover.
///
/// The wire values follow the S3-style action namespace used by the storage
/// control plane that emits the events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyAction {
    #[serde(rename = "s3:GetObject")]
    Read,
    #[serde(rename = "s3:PutObject")]
    Write,
    #[serde(rename = "s3:DeleteObject")]
    Delete,
    #[serde(rename = "s3:ListBucket")]
    List,
    #[serde(rename = "s3:*")]
    All,
}

impl PolicyAction {
    /// The wire value committed into the canonical form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Read => "s3:GetObject",
            PolicyAction::Write => "s3:PutObject",
            PolicyAction::Delete => "s3:DeleteObject",
            PolicyAction::List => "s3:ListBucket",
            PolicyAction::All => "s3:*",
        }
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyAction {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s3:GetObject" => Ok(PolicyAction::Read),
            "s3:PutObject" => Ok(PolicyAction::Write),
            "s3:DeleteObject" => Ok(PolicyAction::Delete),
            "s3:ListBucket" => Ok(PolicyAction::List),
            "s3:*" => Ok(PolicyAction::All),
            other => Err(PolicyError::Malformed(format!(
                "unrecognized action value: {other}"
            ))),
        }
    }
}

/// A single policy statement.
///
/// `actions`, `resources` and `principals` are unordered at the semantic
/// level; `conditions` is keyed by condition operator. `sid` must be unique
/// within its policy, which the compiler enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: PolicyEffect,
    pub actions: Vec<PolicyAction>,
    pub resources: Vec<String>,
    pub principals: Option<Vec<String>>,
    #[serde(default)]
    pub conditions: BTreeMap<String, serde_json::Value>,
}

impl PolicyStatement {
    pub fn new(
        sid: impl Into<String>,
        effect: PolicyEffect,
        actions: Vec<PolicyAction>,
        resources: Vec<String>,
    ) -> Self {
        Self {
            sid: sid.into(),
            effect,
            actions,
            resources,
            principals: None,
            conditions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_principals(mut self, principals: Vec<String>) -> Self {
        self.principals = Some(principals);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.conditions.insert(key.into(), value);
        self
    }
}

/// A compliance policy at a specific version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub policy_id: String,
    pub version: String,
    pub name: String,
    pub statements: Vec<PolicyStatement>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Policy {
    pub fn new(
        policy_id: impl Into<String>,
        version: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            policy_id: policy_id.into(),
            version: version.into(),
            name: name.into(),
            statements: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_statement(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
