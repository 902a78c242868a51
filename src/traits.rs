use crate::builder::TemplateBuilder;
use crate::error::TemplateError;
use crate::types::{ComputeHook, Reference, Template};

/// Anything that can point at other resources in the template, e.g. a policy
/// statement naming a bucket, or a stream naming its role.
pub trait References {
    /// Every reference carried by this value, in field order. Duplicates are kept.
    fn references(&self) -> Vec<&Reference>;

    /// Whether any reference targets `id`.
    fn refers_to(&self, id: &str) -> bool {
        self.references().iter().any(|r| r.target().as_str() == id)
    }
}

/// A component that contributes resources for one compute hook.
///
/// Decorators write into the builder they are handed and may allocate ids, add
/// resources and record explicit dependencies. Any error aborts the build.
pub trait ServiceDecorator {
    fn decorate(&self, ctx: &mut TemplateBuilder, hook: &ComputeHook) -> Result<(), TemplateError>;
}

/// The boundary to whatever turns a finalized template into a deployment artifact.
///
/// Implementations must honour [`Template::is_dry_run`] by skipping side effects.
pub trait TemplateEmitter {
    type Error: std::error::Error;

    fn emit(&self, template: &Template) -> Result<(), Self::Error>;
}
