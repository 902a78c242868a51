//! IAM-style policy statements and documents.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::TemplateError;
use crate::traits::References;

use super::logical_id::LogicalId;
use super::reference::Reference;
use super::value::Value;

/// Policy language version stamped on every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The service principal the delivery stream assumes roles as.
pub const DELIVERY_STREAM_SERVICE: &str = "firehose.amazonaws.com";

static ACTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\*|[a-z0-9-]+:[A-Za-z0-9*]+)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Effect {
    Allow,
    Deny,
}

/// Who a statement applies to; only meaningful in trust (assume-role) policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Principal {
    #[serde(rename = "Service")]
    Service(Vec<String>),
    #[serde(rename = "AWS")]
    Account(Value),
    #[serde(rename = "*")]
    Everyone,
}

impl Principal {
    pub fn service(name: impl Into<String>) -> Self {
        Principal::Service(vec![name.into()])
    }

    pub fn delivery_stream_service() -> Self {
        Principal::service(DELIVERY_STREAM_SERVICE)
    }
}

/// Condition block: operator (e.g. `StringEquals`) to condition key to expected value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Conditions(BTreeMap<String, BTreeMap<String, Value>>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(operator, key, value);
        self
    }

    pub fn insert(
        &mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        self.0
            .entry(operator.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn get(&self, operator: &str, key: &str) -> Option<&Value> {
        self.0.get(operator).and_then(|keys| keys.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `other` into `self`; entries in `other` win on conflict.
    pub fn extend(&mut self, other: Conditions) {
        for (operator, keys) in other.0 {
            self.0.entry(operator).or_default().extend(keys);
        }
    }
}

impl References for Conditions {
    fn references(&self) -> Vec<&Reference> {
        self.0
            .values()
            .flat_map(|keys| keys.values())
            .flat_map(|v| v.references())
            .collect()
    }
}

/// A single allow/deny statement.
///
/// Only [`StatementBuilder::build`] creates these, so every statement has at least one
/// action, and at least one resource unless it names a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,
    #[serde(rename = "Action")]
    actions: BTreeSet<String>,
    #[serde(rename = "Resource", skip_serializing_if = "Vec::is_empty")]
    resources: Vec<Value>,
    #[serde(rename = "Condition", skip_serializing_if = "Conditions::is_empty")]
    conditions: Conditions,
}

impl PolicyStatement {
    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn actions(&self) -> &BTreeSet<String> {
        &self.actions
    }

    pub fn resources(&self) -> &[Value] {
        &self.resources
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }
}

impl References for PolicyStatement {
    fn references(&self) -> Vec<&Reference> {
        let mut refs: Vec<&Reference> = Vec::new();
        if let Some(Principal::Account(value)) = &self.principal {
            refs.extend(value.references());
        }
        refs.extend(self.resources.iter().flat_map(|r| r.references()));
        refs.extend(self.conditions.references());
        refs
    }
}

/// Fluent construction of a [`PolicyStatement`].
///
/// ```rust
/// use stackweave_core::{LogicalId, StatementBuilder};
///
/// let bucket = LogicalId::new("BucketA").unwrap();
/// let statement = StatementBuilder::allow(["s3:GetObject"])
///     .for_bucket(&bucket)
///     .build()
///     .unwrap();
/// assert_eq!(statement.resources().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct StatementBuilder {
    effect: Effect,
    actions: Vec<String>,
    resources: Vec<Value>,
    principal: Option<Principal>,
    conditions: Conditions,
}

impl StatementBuilder {
    pub fn new<I, S>(effect: Effect, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StatementBuilder {
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: Vec::new(),
            principal: None,
            conditions: Conditions::new(),
        }
    }

    pub fn allow<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StatementBuilder::new(Effect::Allow, actions)
    }

    pub fn deny<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StatementBuilder::new(Effect::Deny, actions)
    }

    pub fn for_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn for_resource(mut self, resource: impl Into<Value>) -> Self {
        self.resources.push(resource.into());
        self
    }

    /// Scope to the bucket itself and to every key in it.
    ///
    /// Both patterns are always added; object actions need the key pattern and bucket
    /// actions the bucket pattern, and a single wildcard would cover far more.
    pub fn for_bucket(self, bucket: &LogicalId) -> Self {
        self.for_resource(Value::bucket_arn(bucket))
            .for_resource(Value::bucket_all_keys_arn(bucket))
    }

    /// Scope to an output attribute of another resource, e.g. a function's `Arn`.
    pub fn for_attribute(self, target: &LogicalId, attribute: impl Into<String>) -> Self {
        self.for_resource(Reference::attribute(target, attribute))
    }

    pub fn with_condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.insert(operator, key, value);
        self
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn build(self) -> Result<PolicyStatement, TemplateError> {
        if self.actions.is_empty() {
            return Err(TemplateError::invalid(
                "policy statement",
                "at least one action is required",
            ));
        }
        if let Some(bad) = self.actions.iter().find(|a| !ACTION_PATTERN.is_match(a)) {
            return Err(TemplateError::invalid(
                "policy statement",
                format!("action '{bad}' is not of the form 'service:Action'"),
            ));
        }
        if self.resources.is_empty() && self.principal.is_none() {
            return Err(TemplateError::invalid(
                "policy statement",
                "a statement without a principal must name at least one resource",
            ));
        }

        Ok(PolicyStatement {
            effect: self.effect,
            principal: self.principal,
            actions: self.actions.into_iter().collect(),
            resources: self.resources.into_iter().unique().collect(),
            conditions: self.conditions,
        })
    }
}

/// A versioned list of statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    version: &'static str,
    #[serde(rename = "Statement")]
    statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    pub fn new(statements: Vec<PolicyStatement>) -> Result<Self, TemplateError> {
        if statements.is_empty() {
            return Err(TemplateError::invalid(
                "policy document",
                "at least one statement is required",
            ));
        }
        Ok(PolicyDocument {
            version: POLICY_VERSION,
            statements,
        })
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }
}

impl References for PolicyDocument {
    fn references(&self) -> Vec<&Reference> {
        self.statements.iter().flat_map(|s| s.references()).collect()
    }
}
