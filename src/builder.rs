use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::allocator::IdAllocator;
use crate::error::TemplateError;
use crate::graph::DependencyGraph;
use crate::traits::References;
use crate::types::{
    AccessRole, ComputeHook, DeliveryStream, EdgeOrigin, LogicalId, Reference, Resource,
    ResourceEntry, ResourceKind, StorageBucket, Template,
};

/// Caller-supplied options for one template build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateOptions {
    pub description: Option<String>,
    /// Validate and build everything, but ask the emitter to skip side effects.
    pub dry_run: bool,
}

/// Mutable construction context for one template.
///
/// Resources are inserted under allocated ids, may reference each other in any
/// order, and are checked as a whole by [`TemplateBuilder::finalize`], which consumes
/// the builder.
#[derive(Debug)]
pub struct TemplateBuilder {
    options: TemplateOptions,
    allocator: IdAllocator,
    resources: HashMap<LogicalId, Resource>,
    order: Vec<LogicalId>,
    explicit: BTreeSet<(LogicalId, LogicalId)>,
}

impl TemplateBuilder {
    pub fn new(options: TemplateOptions) -> Self {
        TemplateBuilder {
            options,
            allocator: IdAllocator::new(),
            resources: HashMap::new(),
            order: Vec::new(),
            explicit: BTreeSet::new(),
        }
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    /// Allocate a stable id without inserting anything under it yet.
    pub fn allocate(&mut self, seed: &str, kind: ResourceKind) -> Result<LogicalId, TemplateError> {
        self.allocator.allocate(seed, kind)
    }

    /// Insert a resource under an id.
    ///
    /// The id is either one this builder allocated for the same kind, or an external
    /// id that is claimed here. Inserting twice under one id is a collision.
    pub fn add_resource(
        &mut self,
        id: LogicalId,
        resource: impl Into<Resource>,
    ) -> Result<LogicalId, TemplateError> {
        let resource = resource.into();
        let kind = resource.kind();

        if let Some(existing) = self.resources.get(&id) {
            return Err(TemplateError::Collision {
                id,
                existing: format!("{}(resource)", existing.kind()),
                requested: format!("{kind}(resource)"),
            });
        }

        match self.allocator.kind_of(&id) {
            Some(issued) if issued != kind => {
                return Err(TemplateError::Collision {
                    id,
                    existing: format!("{issued}(allocated)"),
                    requested: format!("{kind}(resource)"),
                });
            }
            Some(_) => {}
            None => self.allocator.reserve(&id, kind)?,
        }

        debug!(event = "Insert", id = id.as_str(), kind = kind.to_string());
        self.resources.insert(id.clone(), resource);
        self.order.push(id.clone());
        Ok(id)
    }

    pub fn add_bucket(
        &mut self,
        seed: &str,
        bucket: StorageBucket,
    ) -> Result<LogicalId, TemplateError> {
        let id = self.allocate(seed, ResourceKind::StorageBucket)?;
        self.add_resource(id, bucket)
    }

    pub fn add_role(&mut self, seed: &str, role: AccessRole) -> Result<LogicalId, TemplateError> {
        let id = self.allocate(seed, ResourceKind::AccessRole)?;
        self.add_resource(id, role)
    }

    pub fn add_delivery_stream(
        &mut self,
        seed: &str,
        stream: DeliveryStream,
    ) -> Result<LogicalId, TemplateError> {
        let id = self.allocate(seed, ResourceKind::DeliveryStream)?;
        self.add_resource(id, stream)
    }

    /// Make an externally defined hook referenceable under its own id.
    pub fn declare_compute_hook(&mut self, hook: &ComputeHook) -> Result<LogicalId, TemplateError> {
        self.add_resource(hook.id().clone(), hook.clone())
    }

    /// Require `from` to be realized after `to`. Endpoints are checked at finalize.
    pub fn add_explicit_dependency(
        &mut self,
        from: &LogicalId,
        to: &LogicalId,
    ) -> Result<(), TemplateError> {
        if from == to {
            return Err(TemplateError::CyclicDependency {
                cycle: vec![from.clone()],
            });
        }
        debug!(event = "DependsOn", from = from.as_str(), to = to.as_str());
        self.explicit.insert((from.clone(), to.clone()));
        Ok(())
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.resources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve references, order the resources and produce the template.
    pub fn finalize(self) -> Result<Template, TemplateError> {
        let result = self.assemble();
        match &result {
            Ok(template) => info!(
                event = "Finalize",
                phase = "Result",
                resources = template.len(),
                edges = template.edges().len(),
                dry_run = template.is_dry_run()
            ),
            Err(err) => warn!(event = "Finalize", phase = "Rejected", error = err.to_string()),
        }
        result
    }

    fn assemble(self) -> Result<Template, TemplateError> {
        let mut graph = DependencyGraph::new(&self.order);

        debug!(event = "Finalize", phase = "Resolve", resources = self.order.len());
        for id in &self.order {
            let Some(resource) = self.resources.get(id) else {
                continue;
            };
            for reference in resource.references() {
                self.check_reference(id, reference)?;
                graph.add_edge(id, reference.target(), EdgeOrigin::Reference);
            }
        }

        debug!(event = "Finalize", phase = "Explicit", edges = self.explicit.len());
        for (from, to) in &self.explicit {
            if let Some(missing) = [from, to].into_iter().find(|id| !graph.contains(id)) {
                return Err(TemplateError::UnknownDependency {
                    from: from.clone(),
                    to: to.clone(),
                    missing: missing.clone(),
                });
            }
            graph.add_edge(from, to, EdgeOrigin::Explicit);
        }

        debug!(event = "Finalize", phase = "Sort");
        let order = graph
            .sort()
            .map_err(|cycle| TemplateError::CyclicDependency { cycle })?;

        let TemplateBuilder {
            options,
            mut resources,
            explicit,
            ..
        } = self;

        let entries = order
            .iter()
            .filter_map(|id| resources.remove_entry(id))
            .map(|(id, resource)| {
                let depends_on = explicit
                    .iter()
                    .filter(|(from, _)| *from == id)
                    .map(|(_, to)| to.clone())
                    .collect();
                let entry = ResourceEntry {
                    deletion_policy: resource.deletion_policy(),
                    resource,
                    depends_on,
                };
                (id, entry)
            })
            .collect();

        if options.dry_run {
            info!(event = "Finalize", phase = "DryRun", resources = order.len());
        }

        Ok(Template {
            description: options.description,
            resources: entries,
            order,
            edges: graph.edges(),
            dry_run: options.dry_run,
        })
    }

    fn check_reference(
        &self,
        from: &LogicalId,
        reference: &Reference,
    ) -> Result<(), TemplateError> {
        let unresolved = || TemplateError::UnresolvedReference {
            from: from.clone(),
            reference: reference.to_string(),
        };
        let target = self.resources.get(reference.target()).ok_or_else(unresolved)?;
        if let Some(attribute) = reference.attribute_name()
            && !target.kind().has_attribute(attribute)
        {
            return Err(unresolved());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
