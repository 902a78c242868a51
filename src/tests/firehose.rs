use serde_json::json;
use yare::parameterized;

use super::*;
use crate::{
    FIREHOSE_BUCKET_SEED, FIREHOSE_ROLE_SEED, FIREHOSE_STREAM_SEED, FirehoseDecorator,
    ResourceKind, ServiceDecorator, Template, TemplateError, TemplateOptions, build_template,
    parse_decorator_config,
};

struct Ids {
    hook: LogicalId,
    bucket: LogicalId,
    role: LogicalId,
    stream: LogicalId,
}

fn ids(hook: &ComputeHook) -> Ids {
    Ids {
        hook: hook.id().clone(),
        bucket: LogicalId::stable(FIREHOSE_BUCKET_SEED, ResourceKind::StorageBucket),
        role: LogicalId::stable(FIREHOSE_ROLE_SEED, ResourceKind::AccessRole),
        stream: LogicalId::stable(FIREHOSE_STREAM_SEED, ResourceKind::DeliveryStream),
    }
}

fn build(dry_run: bool, hook: &ComputeHook) -> Template {
    let config = parse_decorator_config(FIREHOSE_CONFIG).unwrap();
    let decorator = config.decorator().unwrap();
    let options = TemplateOptions {
        dry_run,
        ..config.template
    };
    build_template(options, hook, &[&decorator]).unwrap()
}

#[test]
fn test_firehose_emission_order() {
    let hook = xformer();
    let ids = ids(&hook);
    let template = build(false, &hook);

    assert_eq!(template.len(), 4);
    let pos = |id: &LogicalId| template.position(id).unwrap();
    assert!(pos(&ids.bucket) < pos(&ids.role));
    assert!(pos(&ids.role) < pos(&ids.stream));
    assert!(pos(&ids.hook) < pos(&ids.role));
    assert_eq!(template.explicit_dependencies().count(), 0);
    for edge in template.edges() {
        assert!(pos(&edge.to) < pos(&edge.from));
    }
}

#[test]
fn test_firehose_resources_serialize() {
    let hook = xformer();
    let ids = ids(&hook);
    let template = build(false, &hook);
    let json = template.to_json().unwrap();

    assert_eq!(json["AWSTemplateFormatVersion"], json!("2010-09-09"));
    assert_eq!(
        json["Description"],
        json!("Firehose delivery through a transforming hook")
    );

    let bucket_ref = json!({"Ref": ids.bucket.as_str()});
    let bucket_arn = json!({"Fn::Join": ["", ["arn:aws:s3:::", bucket_ref.clone()]]});
    let bucket_keys = json!({"Fn::Join": ["", ["arn:aws:s3:::", bucket_ref, "/*"]]});
    let hook_arn = json!({"Fn::GetAtt": [ids.hook.as_str(), "Arn"]});

    let resources = &json["Resources"];
    assert!(resources.get(ids.hook.as_str()).is_none());
    assert_eq!(resources.as_object().unwrap().len(), 3);
    assert_eq!(
        resources[ids.bucket.as_str()],
        json!({
            "Type": "AWS::S3::Bucket",
            "DeletionPolicy": "Retain",
            "Properties": {"VersioningConfiguration": {"Status": "Enabled"}}
        })
    );
    assert_eq!(
        resources[ids.role.as_str()],
        json!({
            "Type": "AWS::IAM::Role",
            "DeletionPolicy": "Delete",
            "Properties": {
                "AssumeRolePolicyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": {"Service": ["firehose.amazonaws.com"]},
                        "Action": ["sts:AssumeRole"],
                        "Condition": {
                            "StringEquals": {"sts:ExternalId": {"Ref": "AWS::AccountId"}}
                        }
                    }]
                },
                "Policies": [{
                    "PolicyName": "FirehoseDeliveryPolicy",
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [
                            {
                                "Effect": "Allow",
                                "Action": [
                                    "s3:AbortMultipartUpload",
                                    "s3:GetBucketLocation",
                                    "s3:GetObject",
                                    "s3:ListBucket",
                                    "s3:ListBucketMultipartUploads",
                                    "s3:PutObject"
                                ],
                                "Resource": [bucket_arn.clone(), bucket_keys]
                            },
                            {
                                "Effect": "Allow",
                                "Action": [
                                    "lambda:GetFunctionConfiguration",
                                    "lambda:InvokeFunction"
                                ],
                                "Resource": [hook_arn.clone()]
                            }
                        ]
                    }
                }]
            }
        })
    );
    assert_eq!(
        resources[ids.stream.as_str()],
        json!({
            "Type": "AWS::KinesisFirehose::DeliveryStream",
            "DeletionPolicy": "Delete",
            "Properties": {
                "DeliveryStreamType": "DirectPut",
                "ExtendedS3DestinationConfiguration": {
                    "BucketARN": bucket_arn,
                    "BufferingHints": {"IntervalInSeconds": 60, "SizeInMBs": 50},
                    "CompressionFormat": "UNCOMPRESSED",
                    "Prefix": "firehose/",
                    "RoleARN": {"Fn::GetAtt": [ids.role.as_str(), "Arn"]},
                    "ProcessingConfiguration": {
                        "Enabled": true,
                        "Processors": [{
                            "Type": "Lambda",
                            "Parameters": [{
                                "ParameterName": "LambdaArn",
                                "ParameterValue": hook_arn
                            }]
                        }]
                    }
                }
            }
        })
    );
}

#[test]
fn test_serialized_resources_follow_emission_order() {
    let hook = xformer();
    let template = build(false, &hook);
    let text = serde_json::to_string(&template).unwrap();
    let offsets: Vec<usize> = template
        .defined()
        .map(|(id, _)| text.find(&format!("\"{id}\":{{")).unwrap())
        .collect();
    assert_eq!(offsets.len(), 3);
    assert!(offsets.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_json_resources_keep_emission_order() {
    let hook = xformer();
    let ids = ids(&hook);
    let template = build(false, &hook);
    let json = template.to_json().unwrap();

    let keys: Vec<&str> = json["Resources"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    let expected: Vec<&str> = template
        .emission_order()
        .iter()
        .filter(|id| **id != ids.hook)
        .map(LogicalId::as_str)
        .collect();
    assert_eq!(keys, expected);
    assert_eq!(
        keys,
        vec![ids.bucket.as_str(), ids.role.as_str(), ids.stream.as_str()]
    );
}

#[parameterized(
    live = { false },
    dry_run = { true },
)]
fn test_dry_run_content_is_identical(dry_run: bool) {
    let hook = xformer();
    let template = build(dry_run, &hook);
    let live = build(false, &hook);

    assert_eq!(template.is_dry_run(), dry_run);
    assert_eq!(template.emission_order(), live.emission_order());
    assert_eq!(template.edges(), live.edges());
    assert_eq!(template.to_json().unwrap(), live.to_json().unwrap());
}

#[test]
fn test_builds_are_deterministic() {
    let hook = xformer();
    let first = build(false, &hook);
    let second = build(false, &hook);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_renamed_hook_changes_invoke_grant() {
    let original = build(false, &xformer());
    let renamed_hook = hook_named("Enricher");
    let renamed = build(false, &renamed_hook);

    let role = LogicalId::stable(FIREHOSE_ROLE_SEED, ResourceKind::AccessRole);
    let grant = |t: &Template| {
        t.to_json().unwrap()["Resources"][role.as_str()]["Properties"]["Policies"][0]
            ["PolicyDocument"]["Statement"][1]["Resource"]
            .clone()
    };
    assert_eq!(grant(&original), json!([{"Fn::GetAtt": ["Xformer", "Arn"]}]));
    assert_eq!(grant(&renamed), json!([{"Fn::GetAtt": ["Enricher", "Arn"]}]));
}

#[test]
fn test_hook_id_clashing_with_decorator_id_collides() {
    let bucket_id = LogicalId::stable(FIREHOSE_BUCKET_SEED, ResourceKind::StorageBucket);
    let hook = hook_named(bucket_id.as_str());
    let decorator = FirehoseDecorator::default();
    let decorators: [&dyn ServiceDecorator; 1] = [&decorator];

    match build_template(TemplateOptions::default(), &hook, &decorators) {
        Err(TemplateError::Collision { id, .. }) => assert_eq!(id, bucket_id),
        other => panic!("expected a collision, got {other:?}"),
    }
}
