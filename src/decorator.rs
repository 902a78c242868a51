//! Service decorators and the build pipeline around them.

use tracing::{debug, info};

use crate::builder::{TemplateBuilder, TemplateOptions};
use crate::composer::{
    DELIVERY_BUCKET_ACTIONS, assume_role_statement, bucket_access_statement,
    external_id_condition, invoke_statement,
};
use crate::error::TemplateError;
use crate::traits::{ServiceDecorator, TemplateEmitter};
use crate::types::{
    AccessRole, ComputeHook, DeletionPolicy, DeliveryStream, InlinePolicy, PolicyDocument,
    Principal, Processor, Reference, StorageBucket, StreamSettings, Template, Value,
    VersioningStatus,
};

pub const FIREHOSE_BUCKET_SEED: &str = "FirehoseBucket";
pub const FIREHOSE_ROLE_SEED: &str = "FirehoseRole";
pub const FIREHOSE_STREAM_SEED: &str = "FirehoseStream";
pub const FIREHOSE_POLICY_NAME: &str = "FirehoseDeliveryPolicy";

/// Routes records through the hook into a retained, versioned bucket.
///
/// Adds three resources:
/// - the destination bucket (`Retain`, versioning enabled)
/// - a role the stream service may assume when the external id is this account,
///   allowed to write the bucket and call the hook
/// - a direct-put delivery stream using the hook as its Lambda processor
///
/// Ordering follows from the references alone; no explicit edges are recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirehoseDecorator {
    settings: StreamSettings,
}

impl FirehoseDecorator {
    pub fn new(settings: StreamSettings) -> Result<Self, TemplateError> {
        settings.validate()?;
        Ok(FirehoseDecorator { settings })
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }
}

impl ServiceDecorator for FirehoseDecorator {
    fn decorate(&self, ctx: &mut TemplateBuilder, hook: &ComputeHook) -> Result<(), TemplateError> {
        debug!(event = "Decorate", phase = "Firehose", hook = hook.id().as_str());

        let bucket = StorageBucket::new(DeletionPolicy::Retain)
            .with_versioning(VersioningStatus::Enabled);
        let bucket_id = ctx.add_bucket(FIREHOSE_BUCKET_SEED, bucket)?;

        let trust = PolicyDocument::new(vec![assume_role_statement(
            Principal::delivery_stream_service(),
            external_id_condition(),
        )?])?;
        let delivery = PolicyDocument::new(vec![
            bucket_access_statement(DELIVERY_BUCKET_ACTIONS, &bucket_id)?,
            invoke_statement(hook)?,
        ])?;
        let policy = InlinePolicy::new(FIREHOSE_POLICY_NAME, delivery)?;
        let role = AccessRole::new(trust, vec![policy])?;
        let role_id = ctx.add_role(FIREHOSE_ROLE_SEED, role)?;

        let stream = DeliveryStream::new(
            Value::bucket_arn(&bucket_id),
            Reference::arn_of(&role_id),
            &self.settings,
        )?
        .with_processor(Processor::lambda(hook.invocation_arn()))?;
        ctx.add_delivery_stream(FIREHOSE_STREAM_SEED, stream)?;

        Ok(())
    }
}

/// Declare `hook`, run every decorator against it in order, and finalize.
pub fn build_template(
    options: TemplateOptions,
    hook: &ComputeHook,
    decorators: &[&dyn ServiceDecorator],
) -> Result<Template, TemplateError> {
    let mut builder = TemplateBuilder::new(options);
    builder.declare_compute_hook(hook)?;
    for decorator in decorators {
        decorator.decorate(&mut builder, hook)?;
    }
    builder.finalize()
}

/// Hand a finalized template to an emitter. Emitter failures are passed through opaquely.
pub fn emit_template<E: TemplateEmitter>(
    emitter: &E,
    template: &Template,
) -> Result<(), TemplateError> {
    if template.is_dry_run() {
        info!(event = "Emit", phase = "DryRun", resources = template.len());
    }
    emitter
        .emit(template)
        .map_err(|e| TemplateError::Emission(e.to_string()))
}
