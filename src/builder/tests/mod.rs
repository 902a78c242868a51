use std::time::Duration;

use super::*;
use crate::types::{
    DeletionPolicy, InlinePolicy, PolicyDocument, Principal, StatementBuilder, StreamSettings,
    Value,
};


fn id(name: &str) -> LogicalId {
    LogicalId::new(name).unwrap()
}

fn bucket() -> StorageBucket {
    StorageBucket::new(DeletionPolicy::Retain)
}

fn hook(name: &str) -> ComputeHook {
    ComputeHook::new(id(name), "index.handler", Duration::from_secs(60)).unwrap()
}

/// A role that may write into `bucket`.
fn writer_role(bucket: &LogicalId) -> AccessRole {
    let trust = StatementBuilder::allow(["sts:AssumeRole"])
        .for_principal(Principal::delivery_stream_service())
        .build()
        .unwrap();
    let write = StatementBuilder::allow(["s3:PutObject"])
        .for_bucket(bucket)
        .build()
        .unwrap();
    AccessRole::new(
        PolicyDocument::new(vec![trust]).unwrap(),
        vec![InlinePolicy::new("Write", PolicyDocument::new(vec![write]).unwrap()).unwrap()],
    )
    .unwrap()
}

fn stream(bucket: &LogicalId, role: &LogicalId) -> DeliveryStream {
    DeliveryStream::new(
        Value::bucket_arn(bucket),
        Reference::arn_of(role),
        &StreamSettings::default(),
    )
    .unwrap()
}

fn position(template: &Template, id: &LogicalId) -> usize {
    template.position(id).unwrap()
}

#[test]
fn test_add_resource_collides_on_reuse() {
    let mut builder = TemplateBuilder::new(TemplateOptions::default());
    let bucket_id = builder.add_bucket("Logs", bucket()).unwrap();

    let err = builder.add_resource(bucket_id.clone(), bucket()).unwrap_err();
    assert!(matches!(err, TemplateError::Collision { ref id, .. } if *id == bucket_id));
    assert_eq!(builder.len(), 1);
}

#[test]
fn test_add_resource_rejects_kind_mismatch() {
    let mut builder = TemplateBuilder::new(TemplateOptions::default());
    let allocated = builder.allocate("Logs", ResourceKind::AccessRole).unwrap();

    let err = builder.add_resource(allocated, bucket()).unwrap_err();
    assert!(matches!(err, TemplateError::Collision { .. }));
    assert!(builder.is_empty());
}

#[test]
fn test_seed_reuse_through_helper_collides() {
    let mut builder = TemplateBuilder::new(TemplateOptions::default());
    builder.add_bucket("Logs", bucket()).unwrap();
    assert!(matches!(
        builder.add_bucket("Logs", bucket()),
        Err(TemplateError::Collision { .. })
    ));
}

#[test]
fn test_same_seed_for_different_kinds_is_fine() {
    let mut builder = TemplateBuilder::new(TemplateOptions::default());
    let bucket_id = builder.add_bucket("Logs", bucket()).unwrap();
    let role_id = builder.add_role("Logs", writer_role(&bucket_id)).unwrap();
    assert_ne!(bucket_id, role_id);
}

#[test]
fn test_declared_hook_keeps_its_id() {
    let mut builder = TemplateBuilder::new(TemplateOptions::default());
    let declared = builder.declare_compute_hook(&hook("Xformer")).unwrap();
    assert_eq!(declared, id("Xformer"));
    assert!(builder.contains(&declared));

    assert!(matches!(
        builder.declare_compute_hook(&hook("Xformer")),
        Err(TemplateError::Collision { .. })
    ));
}

#[test]
fn test_options_are_exposed() {
    let builder = TemplateBuilder::new(TemplateOptions {
        description: Some("logs".to_string()),
        dry_run: true,
    });
    assert!(builder.is_dry_run());
    assert_eq!(builder.options().description.as_deref(), Some("logs"));
}
