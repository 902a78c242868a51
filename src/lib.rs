// src/lib.rs
pub use allocator::IdAllocator;
pub use builder::{TemplateBuilder, TemplateOptions};
pub use composer::{
    DELIVERY_BUCKET_ACTIONS, INVOKE_ACTIONS, assume_role_statement, bucket_access_statement,
    external_id_condition, invoke_statement,
};
pub use decorator::{
    FIREHOSE_BUCKET_SEED, FIREHOSE_POLICY_NAME, FIREHOSE_ROLE_SEED, FIREHOSE_STREAM_SEED,
    FirehoseDecorator, build_template, emit_template,
};
pub use error::TemplateError;
pub use loader::{DecoratorConfig, parse_decorator_config, parse_stream_settings};
pub use traits::{References, ServiceDecorator, TemplateEmitter};
pub use types::*;

mod allocator;
mod builder;
mod composer;
mod decorator;
mod error;
mod graph;
mod loader;
mod traits;
mod types;

#[cfg(test)]
mod tests;
