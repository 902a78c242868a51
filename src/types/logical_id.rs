//! Logical identifiers for template resources.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::TemplateError;

use super::resource::ResourceKind;

/// Anything CloudFormation would reject in a logical id.
static NON_ALPHANUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

const MAX_LOGICAL_ID_LEN: usize = 255;
const MAX_SEED_PREFIX_LEN: usize = 64;
const HASH_SUFFIX_LEN: usize = 16;

/// A template-unique, alphanumeric resource identifier (e.g. `FirehoseBucket3f9c02a1d4e5b6c7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogicalId(String);

impl LogicalId {
    /// Accept an externally chosen id, such as the id of a hook defined elsewhere.
    pub fn new(id: impl Into<String>) -> Result<Self, TemplateError> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_LOGICAL_ID_LEN {
            return Err(TemplateError::invalid(
                format!("logical id '{id}'"),
                format!("length must be between 1 and {MAX_LOGICAL_ID_LEN}"),
            ));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TemplateError::invalid(
                format!("logical id '{id}'"),
                "only ASCII letters and digits are allowed",
            ));
        }
        Ok(LogicalId(id))
    }

    /// Derive the id for a `(seed, kind)` pair.
    ///
    /// The result is a pure function of its inputs: the sanitized seed as a readable
    /// prefix, followed by a truncated SHA-256 over the seed and the kind tag.
    pub fn stable(seed: &str, kind: ResourceKind) -> Self {
        let sanitized = NON_ALPHANUMERIC.replace_all(seed, "");
        let prefix: String = if sanitized.is_empty() {
            kind.to_string()
        } else {
            sanitized.chars().take(MAX_SEED_PREFIX_LEN).collect()
        };

        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        hasher.update([0u8]);
        hasher.update(kind.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        LogicalId(format!("{prefix}{}", &digest[..HASH_SUFFIX_LEN]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LogicalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogicalId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogicalId::new(s)
    }
}

impl TryFrom<String> for LogicalId {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LogicalId::new(value)
    }
}

impl From<LogicalId> for String {
    fn from(id: LogicalId) -> Self {
        id.0
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[test]
    fn test_stable_is_deterministic() {
        let a = LogicalId::stable("FirehoseBucket", ResourceKind::StorageBucket);
        let b = LogicalId::stable("FirehoseBucket", ResourceKind::StorageBucket);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("FirehoseBucket"));
        assert_eq!(a.as_str().len(), "FirehoseBucket".len() + HASH_SUFFIX_LEN);
    }

    #[test]
    fn test_stable_depends_on_kind() {
        let bucket = LogicalId::stable("Firehose", ResourceKind::StorageBucket);
        let role = LogicalId::stable("Firehose", ResourceKind::AccessRole);
        assert_ne!(bucket, role);
    }

    #[test]
    fn test_stable_sanitizes_seed() {
        let id = LogicalId::stable("my firehose-bucket!", ResourceKind::StorageBucket);
        assert!(id.as_str().starts_with("myfirehosebucket"));
        assert!(LogicalId::new(id.as_str()).is_ok());
    }

    #[test]
    fn test_stable_falls_back_to_kind_prefix() {
        let id = LogicalId::stable("---", ResourceKind::DeliveryStream);
        assert!(id.as_str().starts_with("DeliveryStream"));
    }

    #[test]
    fn test_stable_truncates_long_seeds() {
        let seed = "A".repeat(400);
        let id = LogicalId::stable(&seed, ResourceKind::AccessRole);
        assert_eq!(id.as_str().len(), MAX_SEED_PREFIX_LEN + HASH_SUFFIX_LEN);
    }

    #[parameterized(
        plain = { "BucketA" },
        digits = { "Xformer2" },
        single_char = { "X" },
    )]
    fn test_new_accepts(id: &str) {
        assert_eq!(LogicalId::new(id).unwrap().as_str(), id);
    }

    #[parameterized(
        empty = { "" },
        dash = { "bucket-a" },
        space = { "Bucket A" },
        unicode = { "Bücket" },
    )]
    fn test_new_rejects(id: &str) {
        assert!(matches!(
            LogicalId::new(id),
            Err(TemplateError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_serde_validates() {
        let ok: LogicalId = serde_json::from_str(r#""BucketA""#).unwrap();
        assert_eq!(ok.as_str(), "BucketA");
        assert!(serde_json::from_str::<LogicalId>(r#""not valid""#).is_err());
    }
}
