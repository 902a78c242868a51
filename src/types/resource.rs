//! The resource union and its kinds.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumString};

use crate::traits::References;

use super::bucket::{DeletionPolicy, StorageBucket};
use super::hook::ComputeHook;
use super::reference::Reference;
use super::role::AccessRole;
use super::stream::DeliveryStream;

/// One deployable unit in a template.
///
/// Serializes to the CloudFormation `Properties` block of the resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, EnumDiscriminants)]
#[serde(untagged)]
#[strum_discriminants(
    name(ResourceKind),
    derive(EnumString, Display, Hash, PartialOrd, Ord, Serialize, Deserialize)
)]
pub enum Resource {
    StorageBucket(StorageBucket),
    AccessRole(AccessRole),
    DeliveryStream(DeliveryStream),
    ComputeHookRef(ComputeHook),
}

impl ResourceKind {
    /// The CloudFormation resource type.
    pub fn cfn_type(&self) -> &'static str {
        match self {
            ResourceKind::StorageBucket => "AWS::S3::Bucket",
            ResourceKind::AccessRole => "AWS::IAM::Role",
            ResourceKind::DeliveryStream => "AWS::KinesisFirehose::DeliveryStream",
            ResourceKind::ComputeHookRef => "AWS::Lambda::Function",
        }
    }

    /// Output attributes a `GetAtt` on this kind may name.
    pub fn attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::StorageBucket => {
                &["Arn", "DomainName", "RegionalDomainName", "WebsiteURL"]
            }
            ResourceKind::AccessRole => &["Arn", "RoleId"],
            ResourceKind::DeliveryStream => &["Arn"],
            ResourceKind::ComputeHookRef => &["Arn"],
        }
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes().contains(&attribute)
    }

    /// Defined outside this template; referenced and ordered against, never emitted.
    pub fn is_external(&self) -> bool {
        matches!(self, ResourceKind::ComputeHookRef)
    }
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from(self)
    }

    /// Teardown behaviour when the caller does not choose one.
    pub fn deletion_policy(&self) -> DeletionPolicy {
        match self {
            Resource::StorageBucket(bucket) => bucket.retention(),
            _ => DeletionPolicy::Delete,
        }
    }
}

/// Dispatch the References trait to the wrapped definition.
impl References for Resource {
    fn references(&self) -> Vec<&Reference> {
        match self {
            Resource::StorageBucket(_) | Resource::ComputeHookRef(_) => Vec::new(),
            Resource::AccessRole(role) => role.references(),
            Resource::DeliveryStream(stream) => stream.references(),
        }
    }
}

impl From<StorageBucket> for Resource {
    fn from(bucket: StorageBucket) -> Self {
        Resource::StorageBucket(bucket)
    }
}

impl From<AccessRole> for Resource {
    fn from(role: AccessRole) -> Self {
        Resource::AccessRole(role)
    }
}

impl From<DeliveryStream> for Resource {
    fn from(stream: DeliveryStream) -> Self {
        Resource::DeliveryStream(stream)
    }
}

impl From<ComputeHook> for Resource {
    fn from(hook: ComputeHook) -> Self {
        Resource::ComputeHookRef(hook)
    }
}
