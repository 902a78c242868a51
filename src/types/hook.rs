//! Externally defined compute hooks.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::TemplateError;

use super::logical_id::LogicalId;
use super::reference::Reference;
use super::value::Value;

/// Output attribute used to invoke a hook.
pub const INVOCATION_ATTRIBUTE: &str = "Arn";

/// A processing function defined outside this crate, e.g. a record transformer.
///
/// Only its identity, handler and execution budget are known here. Policies and
/// processors should point at it through [`ComputeHook::invocation_arn`], never a
/// literal ARN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputeHook {
    #[serde(skip)]
    id: LogicalId,
    handler: String,
    #[serde(serialize_with = "serialize_secs")]
    timeout: Duration,
}

impl ComputeHook {
    pub fn new(
        id: LogicalId,
        handler: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TemplateError> {
        let handler = handler.into();
        if handler.trim().is_empty() {
            return Err(TemplateError::invalid(
                format!("compute hook {id}"),
                "handler must not be empty",
            ));
        }
        Ok(ComputeHook {
            id,
            handler,
            timeout,
        })
    }

    pub fn id(&self) -> &LogicalId {
        &self.id
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Symbolic reference to the attribute used to invoke this hook.
    pub fn invocation_reference(&self) -> Reference {
        Reference::attribute(&self.id, INVOCATION_ATTRIBUTE)
    }

    pub fn invocation_arn(&self) -> Value {
        self.invocation_reference().into()
    }
}

fn serialize_secs<S>(timeout: &Duration, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_u64(timeout.as_secs())
}
