use crate::error::{EnforcementError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque identifier of an authorization principal (e.g. `"google:alice"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named permission token (`READ`, `WRITE`, ...); the engine assigns no
/// meaning to any particular name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of permission names
pub type PermissionSet = BTreeSet<Permission>;

/// Hierarchical pointer into a twin's JSON document, e.g. `/features/temp`.
///
/// Parsed from a slash-delimited string; `""` and `"/"` both denote the
/// root. Leading and trailing slashes are ignored, interior empty segments
/// are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourcePath {
    segments: SmallVec<[String; 4]>,
}

impl ResourcePath {
    /// The root path, addressing the whole document
    pub fn root() -> Self {
        Self {
            segments: SmallVec::new(),
        }
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a slash-delimited resource pointer.
    ///
    /// # Errors
    ///
    /// Returns [`EnforcementError::EmptyPathSegment`] if the pointer contains
    /// an interior empty segment (e.g. `"/a//b"`).
    pub fn from_pointer(pointer: &str) -> Result<Self> {
        let trimmed = pointer.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = SmallVec::new();
        for segment in trimmed.split('/') {
            if segment.is_empty() {
                return Err(EnforcementError::EmptyPathSegment {
                    pointer: pointer.to_string(),
                });
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The prefix path consisting of the first `len` segments
    pub fn truncated(&self, len: usize) -> Self {
        Self {
            segments: self.segments.iter().take(len).cloned().collect(),
        }
    }

    pub fn as_pointer(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            let mut pointer = String::new();
            for segment in &self.segments {
                pointer.push('/');
                pointer.push_str(segment);
            }
            pointer
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_pointer())
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = EnforcementError;

    fn try_from(pointer: String) -> Result<Self> {
        Self::from_pointer(&pointer)
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> Self {
        path.as_pointer()
    }
}

/// The (granted, revoked) permission pair declared for one subject at one
/// resource path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectedPermissions {
    #[serde(rename = "grant", default)]
    pub granted: PermissionSet,
    #[serde(rename = "revoke", default)]
    pub revoked: PermissionSet,
}

impl EffectedPermissions {
    pub fn new<G, R>(granted: G, revoked: R) -> Self
    where
        G: IntoIterator,
        G::Item: Into<Permission>,
        R: IntoIterator,
        R::Item: Into<Permission>,
    {
        Self {
            granted: granted.into_iter().map(Into::into).collect(),
            revoked: revoked.into_iter().map(Into::into).collect(),
        }
    }

    /// Grants only, no revokes
    pub fn granted<G>(granted: G) -> Self
    where
        G: IntoIterator,
        G::Item: Into<Permission>,
    {
        Self::new(granted, std::iter::empty::<&str>())
    }

    /// Revokes only, no grants
    pub fn revoked<R>(revoked: R) -> Self
    where
        R: IntoIterator,
        R::Item: Into<Permission>,
    {
        Self::new(std::iter::empty::<&str>(), revoked)
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }

    /// Union another declaration into this one. Multiple policy entries
    /// declaring the identical subject and path accumulate additively,
    /// they never overwrite each other.
    pub fn union_with(&mut self, other: &EffectedPermissions) {
        self.granted.extend(other.granted.iter().cloned());
        self.revoked.extend(other.revoked.iter().cloned());
    }
}

/// One labelled policy entry: a set of subjects and the permissions they are
/// granted or revoked per resource path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub label: String,
    pub subjects: BTreeSet<SubjectId>,
    pub resources: BTreeMap<ResourcePath, EffectedPermissions>,
}

impl PolicyEntry {
    pub fn new<I, S>(
        label: impl Into<String>,
        subjects: I,
        resources: BTreeMap<ResourcePath, EffectedPermissions>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectId>,
    {
        Self {
            label: label.into(),
            subjects: subjects.into_iter().map(Into::into).collect(),
            resources,
        }
    }
}

/// A policy snapshot as handed over by the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub entries: Vec<PolicyEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
}

impl Policy {
    pub fn new(entries: Vec<PolicyEntry>) -> Self {
        Self {
            entries,
            revision: None,
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Parse a policy from its JSON document form.
    ///
    /// # Errors
    ///
    /// Returns [`EnforcementError::MalformedPolicy`] if the document does not
    /// deserialize into a policy.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EnforcementError::MalformedPolicy(e.to_string()))
    }
}

/// The set of authorization subject ids a caller acts under
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorizationContext {
    subject_ids: BTreeSet<SubjectId>,
}

impl AuthorizationContext {
    pub fn new<I, S>(subject_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubjectId>,
    {
        Self {
            subject_ids: subject_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subject_ids.len()
    }

    pub fn contains(&self, subject_id: &SubjectId) -> bool {
        self.subject_ids.contains(subject_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubjectId> {
        self.subject_ids.iter()
    }
}
