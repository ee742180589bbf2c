//! Hierarchical policy enforcement engine for TwinGrid Engine
//!
//! This crate implements the decision engine that gates every read/write
//! command against a twin's policy:
//! - Grants and revokes declared at different levels of the resource
//!   hierarchy, resolved by specificity (deeper rules win, revokes win ties)
//! - An immutable enforcement tree built once per policy revision and shared
//!   lock-free across concurrent queries
//! - Boolean checks (full and partial) and subject-set collection queries
//!
//! # Core Concepts
//!
//! - **Subject**: an authorization principal identified by an opaque string
//! - **Resource path**: a slash-delimited pointer into the twin's JSON
//!   document, the addressing scheme for grants and revokes
//! - **Effected permissions**: the (granted, revoked) pair declared for one
//!   subject at one resource path
//! - **Weight**: the depth of the rule's resource node, used to rank
//!   conflicting rules by specificity
//!
//! # Example
//!
//! ```rust
//! use policy_enforcement::{
//!     AuthorizationContext, Permission, PermissionSet, Policy, PolicyEnforcer, ResourcePath,
//! };
//!
//! fn main() -> Result<(), policy_enforcement::EnforcementError> {
//!     let policy = Policy::from_json(
//!         r#"{
//!             "entries": [
//!                 {
//!                     "label": "owner",
//!                     "subjects": ["google:alice"],
//!                     "resources": {
//!                         "/": { "grant": ["READ", "WRITE"] },
//!                         "/features": { "revoke": ["WRITE"] }
//!                     }
//!                 }
//!             ]
//!         }"#,
//!     )?;
//!
//!     let enforcer = PolicyEnforcer::new(&policy)?;
//!     let alice = AuthorizationContext::new(["google:alice"]);
//!     let target = ResourcePath::from_pointer("/features/temp")?;
//!     let read: PermissionSet = [Permission::new("READ")].into_iter().collect();
//!     let write: PermissionSet = [Permission::new("WRITE")].into_iter().collect();
//!
//!     // The root grant reaches down to /features/temp...
//!     assert!(enforcer.has_unrestricted_permissions(&target, &alice, &read)?);
//!     // ...but the deeper revoke overrides the root grant for WRITE.
//!     assert!(!enforcer.has_unrestricted_permissions(&target, &alice, &write)?);
//!     Ok(())
//! }
//! ```

pub mod check;
pub mod collect;
pub mod engine;
pub mod error;
pub mod models;
pub mod path;
pub mod tree;
pub mod weight;

pub use check::{has_partial_permissions, has_unrestricted_permissions};
pub use collect::{effective_subjects, partially_granted_subjects, EffectedSubjects};
pub use engine::PolicyEnforcer;
pub use error::{EnforcementError, Result};
pub use models::{
    AuthorizationContext, EffectedPermissions, Permission, PermissionSet, Policy, PolicyEntry,
    ResourcePath, SubjectId,
};
pub use path::PathLocation;
pub use tree::{EnforcementTree, PolicyTreeNode, ResourceNode, SubjectNode};
pub use weight::{PermissionStatus, Weight, WeightedPermissions};
