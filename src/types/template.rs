//! The finalized, ordered template handed to an emitter.

use std::collections::{BTreeSet, HashMap};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{Display, EnumString};

use super::bucket::DeletionPolicy;
use super::logical_id::LogicalId;
use super::resource::{Resource, ResourceKind};

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Where a dependency edge came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum EdgeOrigin {
    /// Inferred from a reference carried in a resource field.
    Reference,
    /// Recorded with `add_explicit_dependency`.
    Explicit,
}

/// `from` must be realized after `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: LogicalId,
    pub to: LogicalId,
    pub origin: EdgeOrigin,
}

/// A resource as stored in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub(crate) resource: Resource,
    pub(crate) deletion_policy: DeletionPolicy,
    pub(crate) depends_on: BTreeSet<LogicalId>,
}

impl ResourceEntry {
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }

    pub fn deletion_policy(&self) -> DeletionPolicy {
        self.deletion_policy
    }

    /// Explicit dependencies only; reference-induced ones are in [`Template::edges`].
    pub fn depends_on(&self) -> &BTreeSet<LogicalId> {
        &self.depends_on
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EmittedResource<'a> {
    #[serde(rename = "Type")]
    kind: &'static str,
    deletion_policy: DeletionPolicy,
    #[serde(skip_serializing_if = "no_dependencies")]
    depends_on: &'a BTreeSet<LogicalId>,
    properties: &'a Resource,
}

fn no_dependencies(deps: &&BTreeSet<LogicalId>) -> bool {
    deps.is_empty()
}

/// A finalized template: every reference resolves and the emission order is a valid
/// topological order of all edges.
///
/// Serializes to a CloudFormation template with resources in emission order. Hooks
/// are defined elsewhere, so they take part in ordering but are not serialized. The
/// dry-run flag is not part of the serialized content.
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) description: Option<String>,
    pub(crate) resources: HashMap<LogicalId, ResourceEntry>,
    pub(crate) order: Vec<LogicalId>,
    pub(crate) edges: Vec<DependencyEdge>,
    pub(crate) dry_run: bool,
}

impl Template {
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn emission_order(&self) -> &[LogicalId] {
        &self.order
    }

    /// Zero-based position of `id` in the emission order.
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    pub fn get(&self, id: &LogicalId) -> Option<&ResourceEntry> {
        self.resources.get(id)
    }

    /// Resources in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&LogicalId, &ResourceEntry)> {
        self.order
            .iter()
            .filter_map(|id| self.resources.get(id).map(|entry| (id, entry)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Resources this template defines itself, in emission order.
    pub fn defined(&self) -> impl Iterator<Item = (&LogicalId, &ResourceEntry)> {
        self.iter().filter(|(_, entry)| !entry.kind().is_external())
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every resolved edge, reference-induced and explicit, sorted by `(from, to)`.
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn explicit_dependencies(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter().filter(|e| e.origin == EdgeOrigin::Explicit)
    }

    /// Whether the emitter should skip side effects.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

struct OrderedResources<'a>(&'a Template);

impl Serialize for OrderedResources<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = ser.serialize_map(None)?;
        for (id, entry) in self.0.defined() {
            map.serialize_entry(
                id,
                &EmittedResource {
                    kind: entry.kind().cfn_type(),
                    deletion_policy: entry.deletion_policy,
                    depends_on: &entry.depends_on,
                    properties: &entry.resource,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for Template {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.description.is_some() { 3 } else { 2 };
        let mut map = ser.serialize_map(Some(len))?;
        map.serialize_entry("AWSTemplateFormatVersion", TEMPLATE_FORMAT_VERSION)?;
        if let Some(description) = &self.description {
            map.serialize_entry("Description", description)?;
        }
        map.serialize_entry("Resources", &OrderedResources(self))?;
        map.end()
    }
}
