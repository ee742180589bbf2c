use crate::{
    error::{EnforcementError, Result},
    models::{EffectedPermissions, Policy, ResourcePath, SubjectId},
    weight::Weight,
};
use ahash::AHashMap;
use tracing::debug;

/// A node of the enforcement tree: exactly two kinds, matched exhaustively
/// by every traversal
#[derive(Debug, Clone)]
pub enum PolicyTreeNode {
    Subject(SubjectNode),
    Resource(ResourceNode),
}

impl PolicyTreeNode {
    pub fn as_resource(&self) -> Option<&ResourceNode> {
        match self {
            PolicyTreeNode::Resource(node) => Some(node),
            PolicyTreeNode::Subject(_) => None,
        }
    }
}

/// Root of one subject's subtree. Carries no permissions of its own; all
/// rules hang off its root resource node.
#[derive(Debug, Clone)]
pub struct SubjectNode {
    pub subject: SubjectId,
    /// Resource node covering the whole document (`/`); every deeper
    /// resource node nests beneath it
    pub root: ResourceNode,
}

impl SubjectNode {
    fn new(subject: SubjectId) -> Self {
        Self {
            subject,
            root: ResourceNode::bare(String::new(), ResourcePath::root(), 0),
        }
    }
}

/// One resource node: a path segment with the permissions effected at its
/// absolute path. `level` is the depth below the subject root; the root
/// resource node sits at level 0, its children at 1, and so on. Level doubles
/// as the rule's specificity weight.
#[derive(Debug, Clone)]
pub struct ResourceNode {
    pub segment: String,
    pub path: ResourcePath,
    pub level: Weight,
    pub effected: EffectedPermissions,
    pub children: AHashMap<String, PolicyTreeNode>,
}

impl ResourceNode {
    fn bare(segment: String, path: ResourcePath, level: Weight) -> Self {
        Self {
            segment,
            path,
            level,
            effected: EffectedPermissions::default(),
            children: AHashMap::new(),
        }
    }
}

/// Immutable forest built once per policy revision: one subject-rooted tree
/// per subject referenced by the policy.
///
/// Read concurrently by any number of traversals without locking; it is
/// rebuilt, never mutated, when the policy changes.
#[derive(Debug, Clone)]
pub struct EnforcementTree {
    roots: AHashMap<SubjectId, PolicyTreeNode>,
}

impl EnforcementTree {
    /// Build the tree from a policy's entries.
    ///
    /// For every entry, for every subject, for every declared resource: the
    /// subject root is ensured, resource nodes are walked or created along
    /// the path segments (intermediates get empty effected permissions), and
    /// the entry's effects are unioned into the terminal node.
    ///
    /// # Errors
    ///
    /// Returns [`EnforcementError::CorruptTree`] if a structural invariant is
    /// violated; this cannot happen for trees built exclusively through this
    /// function.
    pub fn build(policy: &Policy) -> Result<Self> {
        let mut roots = AHashMap::new();
        for entry in &policy.entries {
            for subject in &entry.subjects {
                for (path, effected) in &entry.resources {
                    Self::graft(&mut roots, subject, path, effected)?;
                }
            }
        }
        debug!(
            subjects = roots.len(),
            revision = ?policy.revision,
            "enforcement tree built"
        );
        Ok(Self { roots })
    }

    fn graft(
        roots: &mut AHashMap<SubjectId, PolicyTreeNode>,
        subject: &SubjectId,
        path: &ResourcePath,
        effected: &EffectedPermissions,
    ) -> Result<()> {
        let root = roots
            .entry(subject.clone())
            .or_insert_with(|| PolicyTreeNode::Subject(SubjectNode::new(subject.clone())));
        let subject_node = match root {
            PolicyTreeNode::Subject(node) => node,
            PolicyTreeNode::Resource(_) => {
                return Err(EnforcementError::CorruptTree("resource node at tree root"))
            }
        };

        let mut node = &mut subject_node.root;
        for (depth, segment) in path.segments().iter().enumerate() {
            let level = depth as Weight + 1;
            let child = node.children.entry(segment.clone()).or_insert_with(|| {
                PolicyTreeNode::Resource(ResourceNode::bare(
                    segment.clone(),
                    path.truncated(depth + 1),
                    level,
                ))
            });
            node = match child {
                PolicyTreeNode::Resource(resource) => resource,
                PolicyTreeNode::Subject(_) => {
                    return Err(EnforcementError::CorruptTree(
                        "subject node nested below a subject root",
                    ))
                }
            };
        }
        node.effected.union_with(effected);
        Ok(())
    }

    pub fn subject_count(&self) -> usize {
        self.roots.len()
    }

    /// Root node of one subject's subtree, if the policy references it
    pub fn subject_root(&self, subject: &SubjectId) -> Option<&PolicyTreeNode> {
        self.roots.get(subject)
    }

    /// All subject-rooted subtrees
    pub fn roots(&self) -> impl Iterator<Item = (&SubjectId, &PolicyTreeNode)> {
        self.roots.iter()
    }
}
