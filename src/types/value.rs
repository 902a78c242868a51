//! Field values that may be literal or deferred to another resource.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{Display, EnumString};

use crate::traits::References;

use super::logical_id::LogicalId;
use super::reference::Reference;

const S3_ARN_PREFIX: &str = "arn:aws:s3:::";

/// Values CloudFormation supplies per stack rather than per resource.
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
pub enum PseudoParameter {
    #[strum(serialize = "AWS::AccountId")]
    #[serde(rename = "AWS::AccountId")]
    AccountId,
    #[strum(serialize = "AWS::Region")]
    #[serde(rename = "AWS::Region")]
    Region,
    #[strum(serialize = "AWS::Partition")]
    #[serde(rename = "AWS::Partition")]
    Partition,
    #[strum(serialize = "AWS::StackName")]
    #[serde(rename = "AWS::StackName")]
    StackName,
}

/// A configuration value: either known now, or resolved when the template is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Literal(String),
    Ref(Reference),
    Pseudo(PseudoParameter),
    /// Concatenation of the parts, with no separator.
    Join(Vec<Value>),
}

impl Value {
    pub fn literal(s: impl Into<String>) -> Self {
        Value::Literal(s.into())
    }

    /// Concatenate `parts`, flattening nested joins and merging adjacent literals.
    pub fn join(parts: impl IntoIterator<Item = Value>) -> Self {
        let mut flat: Vec<Value> = Vec::new();
        for part in parts {
            let pieces = match part {
                Value::Join(inner) => inner,
                other => vec![other],
            };
            for piece in pieces {
                if let (Some(Value::Literal(prev)), Value::Literal(next)) =
                    (flat.last_mut(), &piece)
                {
                    prev.push_str(next);
                    continue;
                }
                flat.push(piece);
            }
        }
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Value::Join(flat)
    }

    /// The bucket-level ARN pattern, `arn:aws:s3:::<bucket name>`.
    pub fn bucket_arn(bucket: &LogicalId) -> Self {
        Value::join([Value::literal(S3_ARN_PREFIX), Reference::to(bucket).into()])
    }

    /// The pattern covering every key in the bucket, `arn:aws:s3:::<bucket name>/*`.
    pub fn bucket_all_keys_arn(bucket: &LogicalId) -> Self {
        Value::join([Value::bucket_arn(bucket), Value::literal("/*")])
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Value::Literal(s) => Some(s),
            _ => None,
        }
    }
}

impl References for Value {
    fn references(&self) -> Vec<&Reference> {
        match self {
            Value::Literal(_) | Value::Pseudo(_) => Vec::new(),
            Value::Ref(reference) => vec![reference],
            Value::Join(parts) => parts.iter().flat_map(|p| p.references()).collect(),
        }
    }
}

impl From<Reference> for Value {
    fn from(reference: Reference) -> Self {
        Value::Ref(reference)
    }
}

impl From<PseudoParameter> for Value {
    fn from(p: PseudoParameter) -> Self {
        Value::Pseudo(p)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Literal(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Literal(s)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Literal(s) => write!(f, "{s}"),
            Value::Ref(reference) => write!(f, "{reference}"),
            Value::Pseudo(p) => write!(f, "${{{p}}}"),
            Value::Join(parts) => parts.iter().try_for_each(|p| write!(f, "{p}")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Literal(s) => ser.serialize_str(s),
            Value::Ref(reference) => reference.serialize(ser),
            Value::Pseudo(p) => {
                let mut map = ser.serialize_map(Some(1))?;
                map.serialize_entry("Ref", p)?;
                map.end()
            }
            Value::Join(parts) => {
                let mut map = ser.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &("", parts))?;
                map.end()
            }
        }
    }
}
