//! Access-control role definitions.

use itertools::Itertools;
use serde::Serialize;

use crate::error::TemplateError;
use crate::traits::References;

use super::policy::PolicyDocument;
use super::reference::Reference;

const MAX_POLICY_NAME_LEN: usize = 128;

/// A named identity policy embedded in a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlinePolicy {
    policy_name: String,
    policy_document: PolicyDocument,
}

impl InlinePolicy {
    pub fn new(name: impl Into<String>, document: PolicyDocument) -> Result<Self, TemplateError> {
        let name = name.into();
        if name.trim().is_empty() || name.len() > MAX_POLICY_NAME_LEN {
            return Err(TemplateError::invalid(
                "inline policy",
                format!("name '{name}' must be 1-{MAX_POLICY_NAME_LEN} characters"),
            ));
        }
        if let Some(statement) = document.statements().iter().find(|s| s.principal().is_some()) {
            return Err(TemplateError::invalid(
                format!("inline policy '{name}'"),
                format!(
                    "identity policies cannot name a principal (statement grants {})",
                    statement.actions().iter().join(", ")
                ),
            ));
        }
        Ok(InlinePolicy {
            policy_name: name,
            policy_document: document,
        })
    }

    pub fn name(&self) -> &str {
        &self.policy_name
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.policy_document
    }
}

/// A role some principal may assume, together with what it may then do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccessRole {
    assume_role_policy_document: PolicyDocument,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    policies: Vec<InlinePolicy>,
}

impl AccessRole {
    pub fn new(
        assume_role_policy: PolicyDocument,
        policies: Vec<InlinePolicy>,
    ) -> Result<Self, TemplateError> {
        if assume_role_policy
            .statements()
            .iter()
            .any(|s| s.principal().is_none())
        {
            return Err(TemplateError::invalid(
                "assume role policy",
                "every trust statement must name a principal",
            ));
        }

        if let Some(dup) = policies.iter().map(InlinePolicy::name).duplicates().next() {
            return Err(TemplateError::invalid(
                "access role",
                format!("inline policy '{dup}' is defined more than once"),
            ));
        }

        Ok(AccessRole {
            assume_role_policy_document: assume_role_policy,
            policies,
        })
    }

    pub fn assume_role_policy(&self) -> &PolicyDocument {
        &self.assume_role_policy_document
    }

    pub fn policies(&self) -> &[InlinePolicy] {
        &self.policies
    }
}

impl References for AccessRole {
    fn references(&self) -> Vec<&Reference> {
        let mut refs = self.assume_role_policy_document.references();
        for policy in &self.policies {
            refs.extend(policy.policy_document.references());
        }
        refs
    }
}
