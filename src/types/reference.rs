//! Symbolic references between template resources.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::logical_id::LogicalId;

/// A pointer at another resource, resolved only when the template is finalized.
///
/// `Resource` is the resource's identity (CloudFormation `Ref`), `Attribute` one of
/// its output attributes (`Fn::GetAtt`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    Resource(LogicalId),
    Attribute { target: LogicalId, attribute: String },
}

/// Build a reference to `target`, or to one of its attributes.
pub fn reference(target: &LogicalId, attribute: Option<&str>) -> Reference {
    match attribute {
        Some(attribute) => Reference::attribute(target, attribute),
        None => Reference::to(target),
    }
}

impl Reference {
    pub fn to(target: &LogicalId) -> Self {
        Reference::Resource(target.clone())
    }

    pub fn attribute(target: &LogicalId, attribute: impl Into<String>) -> Self {
        Reference::Attribute {
            target: target.clone(),
            attribute: attribute.into(),
        }
    }

    /// `GetAtt(target, Arn)`, the most common attribute reference.
    pub fn arn_of(target: &LogicalId) -> Self {
        Reference::attribute(target, "Arn")
    }

    pub fn target(&self) -> &LogicalId {
        match self {
            Reference::Resource(target) => target,
            Reference::Attribute { target, .. } => target,
        }
    }

    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Reference::Resource(_) => None,
            Reference::Attribute { attribute, .. } => Some(attribute),
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Reference::Resource(target) => write!(f, "${{{target}}}"),
            Reference::Attribute { target, attribute } => write!(f, "${{{target}.{attribute}}}"),
        }
    }
}

impl Serialize for Reference {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = ser.serialize_map(Some(1))?;
        match self {
            Reference::Resource(target) => map.serialize_entry("Ref", target)?,
            Reference::Attribute { target, attribute } => {
                map.serialize_entry("Fn::GetAtt", &(target, attribute))?
            }
        }
        map.end()
    }
}
