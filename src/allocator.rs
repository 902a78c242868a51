use std::collections::HashMap;

use tracing::debug;

use crate::error::TemplateError;
use crate::types::{LogicalId, ResourceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Issued {
    seed: Option<String>,
    kind: ResourceKind,
}

impl Issued {
    fn describe(&self) -> String {
        match &self.seed {
            Some(seed) => format!("{}(seed '{seed}')", self.kind),
            None => format!("{}(external id)", self.kind),
        }
    }
}

/// Hands out logical ids for one template build and remembers who got each one.
#[derive(Debug, Default)]
pub struct IdAllocator {
    issued: HashMap<LogicalId, Issued>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and claim the id for `(seed, kind)`.
    ///
    /// The id is [`LogicalId::stable`], so it is the same in every build. Claiming it
    /// a second time within this allocator is a collision: callers must use distinct
    /// seeds for distinct resources.
    pub fn allocate(&mut self, seed: &str, kind: ResourceKind) -> Result<LogicalId, TemplateError> {
        if seed.trim().is_empty() {
            return Err(TemplateError::invalid(
                format!("{kind} seed"),
                "seed must not be empty",
            ));
        }
        let id = LogicalId::stable(seed, kind);
        self.claim(
            &id,
            Issued {
                seed: Some(seed.to_string()),
                kind,
            },
        )?;
        debug!(event = "Allocate", seed = seed, kind = kind.to_string(), id = id.as_str());
        Ok(id)
    }

    /// Claim an id chosen outside the allocator, such as an existing hook's id.
    pub fn reserve(&mut self, id: &LogicalId, kind: ResourceKind) -> Result<(), TemplateError> {
        self.claim(id, Issued { seed: None, kind })?;
        debug!(event = "Reserve", kind = kind.to_string(), id = id.as_str());
        Ok(())
    }

    /// The kind an id was issued for, if it was issued here.
    pub fn kind_of(&self, id: &LogicalId) -> Option<ResourceKind> {
        self.issued.get(id).map(|issued| issued.kind)
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.issued.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    fn claim(&mut self, id: &LogicalId, issued: Issued) -> Result<(), TemplateError> {
        if let Some(existing) = self.issued.get(id) {
            return Err(TemplateError::Collision {
                id: id.clone(),
                existing: existing.describe(),
                requested: issued.describe(),
            });
        }
        self.issued.insert(id.clone(), issued);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;
    use yare::parameterized;

    const KINDS: [ResourceKind; 4] = [
        ResourceKind::StorageBucket,
        ResourceKind::AccessRole,
        ResourceKind::DeliveryStream,
        ResourceKind::ComputeHookRef,
    ];

    #[test]
    fn test_distinct_pairs_get_distinct_ids() {
        let mut allocator = IdAllocator::new();
        let seeds = ["FirehoseBucket", "FirehoseRole", "FirehoseStream", "Firehose"];
        let ids: Vec<LogicalId> = seeds
            .iter()
            .cartesian_product(KINDS.iter())
            .map(|(seed, kind)| allocator.allocate(seed, *kind).unwrap())
            .collect();

        assert_eq!(ids.len(), seeds.len() * KINDS.len());
        assert_eq!(ids.iter().unique().count(), ids.len());
        assert_eq!(allocator.len(), ids.len());
    }

    #[parameterized(
        bucket = { ResourceKind::StorageBucket },
        role = { ResourceKind::AccessRole },
        stream = { ResourceKind::DeliveryStream },
        hook = { ResourceKind::ComputeHookRef },
    )]
    fn test_reusing_a_pair_collides(kind: ResourceKind) {
        let mut allocator = IdAllocator::new();
        let first = allocator.allocate("Firehose", kind).unwrap();
        match allocator.allocate("Firehose", kind) {
            Err(TemplateError::Collision { id, .. }) => assert_eq!(id, first),
            other => panic!("expected a collision, got {other:?}"),
        }
    }

    #[test]
    fn test_same_pair_is_stable_across_allocators() {
        let a = IdAllocator::new()
            .allocate("FirehoseRole", ResourceKind::AccessRole)
            .unwrap();
        let b = IdAllocator::new()
            .allocate("FirehoseRole", ResourceKind::AccessRole)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reserved_external_id_collides_with_reservation() {
        let mut allocator = IdAllocator::new();
        let hook = LogicalId::new("Xformer").unwrap();
        allocator.reserve(&hook, ResourceKind::ComputeHookRef).unwrap();
        assert_eq!(allocator.kind_of(&hook), Some(ResourceKind::ComputeHookRef));

        let err = allocator
            .reserve(&hook, ResourceKind::StorageBucket)
            .unwrap_err();
        insta::assert_snapshot!(err, @"logical id collision on Xformer: already issued to ComputeHookRef(external id), requested by StorageBucket(external id)");
    }

    #[parameterized(
        empty = { "" },
        whitespace = { "   " },
    )]
    fn test_blank_seed_is_rejected(seed: &str) {
        let mut allocator = IdAllocator::new();
        assert!(matches!(
            allocator.allocate(seed, ResourceKind::StorageBucket),
            Err(TemplateError::InvalidConfiguration { .. })
        ));
        assert!(allocator.is_empty());
    }
}
