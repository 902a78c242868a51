//! Data model for template graphs.
//!
//! Canonical string forms:
//! - LogicalId: alphanumeric, e.g. `BucketA` or `FirehoseBucket3f9c02a1d4e5b6c7`
//! - Reference: `${BucketA}` for the identity, `${Xformer.Arn}` for an attribute
//! - Value: literals verbatim, references as above, joins concatenated, e.g.
//!   `arn:aws:s3:::${BucketA}/*`
//!
//! Serialized forms follow CloudFormation: `Ref`, `Fn::GetAtt` and `Fn::Join`.

mod bucket;
mod hook;
mod logical_id;
mod policy;
mod reference;
mod resource;
mod role;
mod stream;
mod template;
mod value;

pub use bucket::{DeletionPolicy, StorageBucket, VersioningStatus};
pub use hook::{ComputeHook, INVOCATION_ATTRIBUTE};
pub use logical_id::LogicalId;
pub use policy::{
    Conditions, DELIVERY_STREAM_SERVICE, Effect, POLICY_VERSION, PolicyDocument, PolicyStatement,
    Principal, StatementBuilder,
};
pub use reference::{Reference, reference};
pub use resource::{Resource, ResourceKind};
pub use role::{AccessRole, InlinePolicy};
pub use stream::{
    BufferingHints, CompressionFormat, DeliveryStream, LAMBDA_ARN_PARAMETER,
    MAX_BUFFERING_INTERVAL_SECS, MAX_BUFFERING_SIZE_MB, Processor, ProcessorType, StreamSettings,
};
pub use template::{DependencyEdge, EdgeOrigin, ResourceEntry, TEMPLATE_FORMAT_VERSION, Template};
pub use value::{PseudoParameter, Value};
