//! Storage bucket definitions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::TemplateError;

/// S3 bucket naming rules, minus the IP-address and prefix exclusions.
static BUCKET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").unwrap());

/// What happens to a resource when the stack is torn down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum DeletionPolicy {
    #[default]
    Delete,
    Retain,
    Snapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum VersioningStatus {
    Enabled,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersioningConfiguration {
    status: VersioningStatus,
}

/// An object storage bucket.
///
/// The teardown decision is a constructor argument; buckets have no implicit default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageBucket {
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    versioning_configuration: Option<VersioningConfiguration>,
    #[serde(skip)]
    retention: DeletionPolicy,
}

impl StorageBucket {
    pub fn new(retention: DeletionPolicy) -> Self {
        StorageBucket {
            bucket_name: None,
            versioning_configuration: None,
            retention,
        }
    }

    pub fn with_versioning(mut self, status: VersioningStatus) -> Self {
        self.versioning_configuration = Some(VersioningConfiguration { status });
        self
    }

    /// Pin the physical bucket name. Left unset, the name is generated at deploy time.
    pub fn with_bucket_name(mut self, name: impl Into<String>) -> Result<Self, TemplateError> {
        let name = name.into();
        if !BUCKET_NAME.is_match(&name) || name.contains("..") {
            return Err(TemplateError::invalid(
                format!("bucket name '{name}'"),
                "must be 3-63 lowercase letters, digits, '.' or '-', starting and ending with a letter or digit",
            ));
        }
        self.bucket_name = Some(name);
        Ok(self)
    }

    pub fn retention(&self) -> DeletionPolicy {
        self.retention
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    pub fn versioning(&self) -> Option<VersioningStatus> {
        self.versioning_configuration.as_ref().map(|v| v.status)
    }
}
