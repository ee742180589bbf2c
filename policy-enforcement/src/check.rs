use crate::{
    error::{EnforcementError, Result},
    models::{AuthorizationContext, PermissionSet, ResourcePath},
    path::PathLocation,
    tree::{EnforcementTree, PolicyTreeNode, ResourceNode},
    weight::WeightedPermissions,
};
use tracing::debug;

/// Which rules feed the grant side of the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GrantScope {
    /// Only rules at or above the target (`Above`/`Same`)
    AncestorsOnly,
    /// Additionally count grants declared on descendants (`Below`); revokes
    /// are still taken from ancestors only
    IncludeDescendants,
}

/// One traversal's accumulation of the rules relevant to a target path.
///
/// Created per query, used once, discarded. Not shared between callers.
pub(crate) struct ResourceEvaluation<'a> {
    target: &'a ResourcePath,
    grant_scope: GrantScope,
    weighted: WeightedPermissions,
}

impl<'a> ResourceEvaluation<'a> {
    pub(crate) fn new(target: &'a ResourcePath, grant_scope: GrantScope) -> Self {
        Self {
            target,
            grant_scope,
            weighted: WeightedPermissions::new(),
        }
    }

    pub(crate) fn visit(&mut self, node: &PolicyTreeNode) {
        match node {
            PolicyTreeNode::Subject(subject) => self.visit_resource(&subject.root),
            PolicyTreeNode::Resource(resource) => self.visit_resource(resource),
        }
    }

    fn visit_resource(&mut self, node: &ResourceNode) {
        match node.path.locate(self.target) {
            PathLocation::Above | PathLocation::Same => {
                self.weighted
                    .add_granted(node.effected.granted.iter(), node.level);
                self.weighted
                    .add_revoked(node.effected.revoked.iter(), node.level);
            }
            PathLocation::Below => {
                if self.grant_scope == GrantScope::IncludeDescendants {
                    self.weighted
                        .add_granted(node.effected.granted.iter(), node.level);
                }
            }
            // A diverged branch cannot contain ancestors or descendants of
            // the target, so the whole subtree is irrelevant.
            PathLocation::Different => return,
        }
        for child in node.children.values() {
            self.visit(child);
        }
    }

    pub(crate) fn into_weighted(self) -> WeightedPermissions {
        self.weighted
    }
}

fn check_preconditions(
    auth_subject_ids: &AuthorizationContext,
    expected: &PermissionSet,
) -> Result<()> {
    if auth_subject_ids.is_empty() {
        return Err(EnforcementError::EmptySubjectIds);
    }
    require_permissions(expected)
}

pub(crate) fn require_permissions(expected: &PermissionSet) -> Result<()> {
    if expected.is_empty() {
        return Err(EnforcementError::EmptyPermissions);
    }
    Ok(())
}

fn evaluate(
    tree: &EnforcementTree,
    target: &ResourcePath,
    auth_subject_ids: &AuthorizationContext,
    expected: &PermissionSet,
    grant_scope: GrantScope,
) -> Result<bool> {
    check_preconditions(auth_subject_ids, expected)?;

    // One shared accumulator across all of the caller's subjects: any of
    // them granting a permission counts, the deepest revoke still wins.
    let mut evaluation = ResourceEvaluation::new(target, grant_scope);
    for subject in auth_subject_ids.iter() {
        if let Some(root) = tree.subject_root(subject) {
            evaluation.visit(root);
        }
    }
    let weighted = evaluation.into_weighted();
    let granted = weighted.all_granted(expected);
    debug!(resource = %target, granted, "permission check evaluated");
    Ok(granted)
}

/// Check whether the given subjects hold every expected permission on the
/// target resource, considering only rules at or above it.
///
/// # Errors
///
/// Returns [`EnforcementError::EmptySubjectIds`] or
/// [`EnforcementError::EmptyPermissions`] on empty inputs; an empty question
/// is a caller bug, never a deny.
pub fn has_unrestricted_permissions(
    tree: &EnforcementTree,
    target: &ResourcePath,
    auth_subject_ids: &AuthorizationContext,
    expected: &PermissionSet,
) -> Result<bool> {
    evaluate(
        tree,
        target,
        auth_subject_ids,
        expected,
        GrantScope::AncestorsOnly,
    )
}

/// Like [`has_unrestricted_permissions`], but grants declared on resources
/// nested inside the target also count. Used to decide whether a coarser
/// container resource should still be exposed when only a sub-resource
/// carries a direct grant.
///
/// # Errors
///
/// Same preconditions as [`has_unrestricted_permissions`].
pub fn has_partial_permissions(
    tree: &EnforcementTree,
    target: &ResourcePath,
    auth_subject_ids: &AuthorizationContext,
    expected: &PermissionSet,
) -> Result<bool> {
    evaluate(
        tree,
        target,
        auth_subject_ids,
        expected,
        GrantScope::IncludeDescendants,
    )
}
