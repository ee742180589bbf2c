use crate::models::{Permission, PermissionSet};
use ahash::AHashMap;

/// Specificity weight of a rule: the depth of the resource node that
/// declared it. Deeper (more specific) rules outrank shallower ones.
pub type Weight = u32;

/// Effective status of one permission name after resolving grant/revoke
/// weight conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Revoked,
    Undefined,
}

/// Accumulator mapping permission names to the highest weight at which they
/// were seen granted and, independently, revoked.
///
/// Mutable while a traversal feeds it, read-only afterwards. Each traversal
/// owns its own instance; nothing is shared between queries.
#[derive(Debug, Default)]
pub struct WeightedPermissions {
    granted: AHashMap<Permission, Weight>,
    revoked: AHashMap<Permission, Weight>,
}

impl WeightedPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the permissions as granted at `weight`; an existing entry is
    /// only ever raised, never lowered
    pub fn add_granted<'a, I>(&mut self, permissions: I, weight: Weight)
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        for permission in permissions {
            Self::raise(&mut self.granted, permission, weight);
        }
    }

    /// Record the permissions as revoked at `weight`
    pub fn add_revoked<'a, I>(&mut self, permissions: I, weight: Weight)
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        for permission in permissions {
            Self::raise(&mut self.revoked, permission, weight);
        }
    }

    fn raise(map: &mut AHashMap<Permission, Weight>, permission: &Permission, weight: Weight) {
        map.entry(permission.clone())
            .and_modify(|w| *w = (*w).max(weight))
            .or_insert(weight);
    }

    /// The subset of `names` with a recorded grant, each with its max weight
    pub fn highest_granted(&self, names: &PermissionSet) -> AHashMap<Permission, Weight> {
        Self::highest(&self.granted, names)
    }

    /// The subset of `names` with a recorded revoke, each with its max weight
    pub fn highest_revoked(&self, names: &PermissionSet) -> AHashMap<Permission, Weight> {
        Self::highest(&self.revoked, names)
    }

    fn highest(
        map: &AHashMap<Permission, Weight>,
        names: &PermissionSet,
    ) -> AHashMap<Permission, Weight> {
        names
            .iter()
            .filter_map(|name| map.get(name).map(|weight| (name.clone(), *weight)))
            .collect()
    }

    /// Resolve one permission name per the tie-break rule: a revoke at a
    /// weight greater than or equal to the highest grant wins; a grant wins
    /// only by strictly outweighing every revoke.
    pub fn resolve(&self, name: &Permission) -> PermissionStatus {
        match (self.granted.get(name), self.revoked.get(name)) {
            (None, None) => PermissionStatus::Undefined,
            (None, Some(_)) => PermissionStatus::Revoked,
            (Some(_), None) => PermissionStatus::Granted,
            (Some(grant), Some(revoke)) => {
                if revoke >= grant {
                    PermissionStatus::Revoked
                } else {
                    PermissionStatus::Granted
                }
            }
        }
    }

    /// True iff every name resolves to [`PermissionStatus::Granted`]
    pub fn all_granted(&self, names: &PermissionSet) -> bool {
        names
            .iter()
            .all(|name| self.resolve(name) == PermissionStatus::Granted)
    }

    /// True iff every name resolves to [`PermissionStatus::Revoked`]
    pub fn all_revoked(&self, names: &PermissionSet) -> bool {
        names
            .iter()
            .all(|name| self.resolve(name) == PermissionStatus::Revoked)
    }
}
