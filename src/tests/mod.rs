use std::time::Duration;

use crate::{ComputeHook, LogicalId};

mod firehose;

const FIREHOSE_CONFIG: &str = include_str!("../../testdata/firehose.json");

fn xformer() -> ComputeHook {
    hook_named("Xformer")
}

fn hook_named(name: &str) -> ComputeHook {
    ComputeHook::new(
        LogicalId::new(name).unwrap(),
        "transform.handler",
        Duration::from_secs(300),
    )
    .unwrap()
}
