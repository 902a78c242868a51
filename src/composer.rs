//! Ready-made statements for the common trust and capability grants.
//!
//! Everything here is expressed through references, so a statement keeps pointing at
//! the right resource whatever id it ends up with.

use crate::error::TemplateError;
use crate::types::{
    ComputeHook, Conditions, LogicalId, PolicyStatement, Principal, PseudoParameter,
    StatementBuilder,
};

/// Object and bucket actions a delivery stream needs on its destination.
pub const DELIVERY_BUCKET_ACTIONS: [&str; 6] = [
    "s3:AbortMultipartUpload",
    "s3:GetBucketLocation",
    "s3:GetObject",
    "s3:ListBucket",
    "s3:ListBucketMultipartUploads",
    "s3:PutObject",
];

/// Actions needed to call a hook as a record processor.
pub const INVOKE_ACTIONS: [&str; 2] = ["lambda:InvokeFunction", "lambda:GetFunctionConfiguration"];

/// Let `principal` assume the role, subject to `conditions`.
pub fn assume_role_statement(
    principal: Principal,
    conditions: Conditions,
) -> Result<PolicyStatement, TemplateError> {
    StatementBuilder::allow(["sts:AssumeRole"])
        .for_principal(principal)
        .with_conditions(conditions)
        .build()
}

/// Only callers presenting this stack's account id as external id may assume the role.
pub fn external_id_condition() -> Conditions {
    Conditions::new().with("StringEquals", "sts:ExternalId", PseudoParameter::AccountId)
}

/// Grant `actions` on the bucket and on every key in it.
pub fn bucket_access_statement<I, S>(
    actions: I,
    bucket: &LogicalId,
) -> Result<PolicyStatement, TemplateError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    StatementBuilder::allow(actions).for_bucket(bucket).build()
}

/// Grant invocation of `hook`, scoped to its invocation attribute.
pub fn invoke_statement(hook: &ComputeHook) -> Result<PolicyStatement, TemplateError> {
    StatementBuilder::allow(INVOKE_ACTIONS)
        .for_resource(hook.invocation_arn())
        .build()
}
