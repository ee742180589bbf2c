use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnforcementError {
    #[error("authorization subject ids must not be empty")]
    EmptySubjectIds,

    #[error("expected permissions must not be empty")]
    EmptyPermissions,

    #[error("empty segment in resource pointer: {pointer}")]
    EmptyPathSegment { pointer: String },

    #[error("malformed policy: {0}")]
    MalformedPolicy(String),

    #[error("corrupt enforcement tree: {0}")]
    CorruptTree(&'static str),
}

pub type Result<T> = std::result::Result<T, EnforcementError>;
