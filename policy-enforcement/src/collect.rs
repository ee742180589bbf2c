use crate::{
    check::{require_permissions, GrantScope, ResourceEvaluation},
    error::Result,
    models::{PermissionSet, ResourcePath, SubjectId},
    tree::{EnforcementTree, PolicyTreeNode},
    weight::WeightedPermissions,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Partition of subject ids by the effective status of a permission set at
/// one resource. `granted` and `revoked` are disjoint by construction;
/// subjects with a mixed or undefined outcome appear in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectedSubjects {
    pub granted: BTreeSet<SubjectId>,
    pub revoked: BTreeSet<SubjectId>,
}

fn evaluate_subject(
    root: &PolicyTreeNode,
    target: &ResourcePath,
    grant_scope: GrantScope,
) -> WeightedPermissions {
    // One accumulator per subject; subtrees never bleed into each other.
    let mut evaluation = ResourceEvaluation::new(target, grant_scope);
    evaluation.visit(root);
    evaluation.into_weighted()
}

/// Collect, over the entire tree, which subjects effectively hold and which
/// effectively lack every expected permission at the target resource.
///
/// A subject lands in `granted` iff every name resolves granted, in
/// `revoked` iff every name resolves revoked, and in neither set when the
/// names disagree or are undefined.
///
/// # Errors
///
/// Returns [`crate::EnforcementError::EmptyPermissions`] if `expected` is
/// empty.
pub fn effective_subjects(
    tree: &EnforcementTree,
    target: &ResourcePath,
    expected: &PermissionSet,
) -> Result<EffectedSubjects> {
    require_permissions(expected)?;

    let mut subjects = EffectedSubjects::default();
    for (subject, root) in tree.roots() {
        let weighted = evaluate_subject(root, target, GrantScope::AncestorsOnly);
        if weighted.all_granted(expected) {
            subjects.granted.insert(subject.clone());
        } else if weighted.all_revoked(expected) {
            subjects.revoked.insert(subject.clone());
        }
    }
    debug!(
        resource = %target,
        granted = subjects.granted.len(),
        revoked = subjects.revoked.len(),
        "effective subjects collected"
    );
    Ok(subjects)
}

/// Collect the subjects holding every expected permission at the target at
/// least partially: grants declared on resources nested inside the target
/// count too, while revokes are still taken from ancestors only.
///
/// Used to compute visibility of a resource for subjects whose rights cover
/// only something inside it.
///
/// # Errors
///
/// Returns [`crate::EnforcementError::EmptyPermissions`] if `expected` is
/// empty.
pub fn partially_granted_subjects(
    tree: &EnforcementTree,
    target: &ResourcePath,
    expected: &PermissionSet,
) -> Result<BTreeSet<SubjectId>> {
    require_permissions(expected)?;

    let mut granted = BTreeSet::new();
    for (subject, root) in tree.roots() {
        let weighted = evaluate_subject(root, target, GrantScope::IncludeDescendants);
        if weighted.all_granted(expected) {
            granted.insert(subject.clone());
        }
    }
    debug!(
        resource = %target,
        granted = granted.len(),
        "partially granted subjects collected"
    );
    Ok(granted)
}
