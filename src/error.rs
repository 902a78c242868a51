use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::LogicalId;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TemplateError {
    #[error("invalid configuration for {subject}: {reason}")]
    InvalidConfiguration { subject: String, reason: String },

    #[error("logical id collision on {id}: already issued to {existing}, requested by {requested}")]
    Collision {
        id: LogicalId,
        existing: String,
        requested: String,
    },

    #[error("resource {from} references {reference}, which does not resolve in this template")]
    UnresolvedReference { from: LogicalId, reference: String },

    #[error("explicit dependency {from} -> {to} names {missing}, which is not in this template")]
    UnknownDependency {
        from: LogicalId,
        to: LogicalId,
        missing: LogicalId,
    },

    #[error("cyclic dependency among resources: {}", render_ids(.cycle))]
    CyclicDependency { cycle: Vec<LogicalId> },

    #[error("emission failed: {0}")]
    Emission(String),
}

impl TemplateError {
    pub(crate) fn invalid(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        TemplateError::InvalidConfiguration {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

fn render_ids(ids: &[LogicalId]) -> String {
    ids.iter().join(", ")
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::invalid("configuration document", err.to_string())
    }
}
