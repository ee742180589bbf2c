use crate::{
    check, collect,
    collect::EffectedSubjects,
    error::Result,
    models::{AuthorizationContext, PermissionSet, Policy, ResourcePath, SubjectId},
    tree::EnforcementTree,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Enforcer facade over one policy revision's enforcement tree.
///
/// Built once per policy revision and shared read-only; when the policy
/// changes the caller builds a fresh enforcer instead of mutating this one.
/// Individual queries are synchronous, CPU-bound, and safe to run from any
/// number of threads concurrently.
pub struct PolicyEnforcer {
    tree: Arc<EnforcementTree>,
    revision: Option<u64>,
}

impl PolicyEnforcer {
    /// Build an enforcer from a policy snapshot.
    ///
    /// # Errors
    ///
    /// Propagates tree construction failures; see [`EnforcementTree::build`].
    pub fn new(policy: &Policy) -> Result<Self> {
        let tree = EnforcementTree::build(policy)?;
        info!(
            revision = ?policy.revision,
            subjects = tree.subject_count(),
            "policy enforcer built"
        );
        Ok(Self {
            tree: Arc::new(tree),
            revision: policy.revision,
        })
    }

    /// The policy revision this enforcer was built from
    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Shared handle to the underlying tree
    pub fn tree(&self) -> Arc<EnforcementTree> {
        Arc::clone(&self.tree)
    }

    // =============================================================================
    // Decision Operations
    // =============================================================================

    /// Full check: do the caller's subjects hold every expected permission on
    /// the target, considering only rules at or above it?
    ///
    /// # Errors
    ///
    /// Rejects empty subject or permission sets; see
    /// [`check::has_unrestricted_permissions`].
    pub fn has_unrestricted_permissions(
        &self,
        target: &ResourcePath,
        auth_subject_ids: &AuthorizationContext,
        expected: &PermissionSet,
    ) -> Result<bool> {
        check::has_unrestricted_permissions(&self.tree, target, auth_subject_ids, expected)
    }

    /// Partial check: like the full check, but grants on sub-resources of the
    /// target count too.
    ///
    /// # Errors
    ///
    /// Rejects empty subject or permission sets; see
    /// [`check::has_partial_permissions`].
    pub fn has_partial_permissions(
        &self,
        target: &ResourcePath,
        auth_subject_ids: &AuthorizationContext,
        expected: &PermissionSet,
    ) -> Result<bool> {
        check::has_partial_permissions(&self.tree, target, auth_subject_ids, expected)
    }

    /// Partition all subjects of the policy into effectively granted and
    /// effectively revoked for the expected permissions at the target.
    ///
    /// # Errors
    ///
    /// Rejects an empty permission set; see [`collect::effective_subjects`].
    pub fn effective_subjects(
        &self,
        target: &ResourcePath,
        expected: &PermissionSet,
    ) -> Result<EffectedSubjects> {
        collect::effective_subjects(&self.tree, target, expected)
    }

    /// Subjects holding the expected permissions at the target at least
    /// partially (via grants on nested resources).
    ///
    /// # Errors
    ///
    /// Rejects an empty permission set; see
    /// [`collect::partially_granted_subjects`].
    pub fn partially_granted_subjects(
        &self,
        target: &ResourcePath,
        expected: &PermissionSet,
    ) -> Result<BTreeSet<SubjectId>> {
        collect::partially_granted_subjects(&self.tree, target, expected)
    }
}
