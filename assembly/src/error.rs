//! Assembly errors
//!
//! Every failure aborts the whole assembly call; no partially assembled
//! content is ever returned.

/// Discriminant of an [`AssemblyError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseReference,
    AccessorBounds,
    UnsupportedTopology,
    JointResolution,
    CycleDetected,
    AnimationTarget,
    Cancelled,
}

/// Error raised while assembling content
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    /// A `#id` reference does not resolve within the document
    #[error("unresolved reference '{reference}' in {context}")]
    ParseReference { reference: String, context: String },

    /// An accessor or index reads outside its backing array
    #[error("out of bounds in {context}: needs {required}, only {available} available")]
    AccessorBounds {
        context: String,
        required: usize,
        available: usize,
    },

    /// Primitive type or arity cannot become a renderable mesh
    #[error("unsupported topology in {context}: {reason}")]
    UnsupportedTopology { context: String, reason: String },

    /// A skin joint has no matching scene node
    #[error("joint '{joint}' of skin '{skin}' matches no scene node")]
    JointResolution { skin: String, joint: String },

    /// A node chain instances one of its own ancestors
    #[error("node cycle detected: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// Malformed SID path or invalid keyframe data
    #[error("invalid animation target in {context}: {reason}")]
    AnimationTarget { context: String, reason: String },

    /// The caller's cancellation flag was raised between units of work
    #[error("assembly cancelled")]
    Cancelled,
}

impl AssemblyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssemblyError::ParseReference { .. } => ErrorKind::ParseReference,
            AssemblyError::AccessorBounds { .. } => ErrorKind::AccessorBounds,
            AssemblyError::UnsupportedTopology { .. } => ErrorKind::UnsupportedTopology,
            AssemblyError::JointResolution { .. } => ErrorKind::JointResolution,
            AssemblyError::CycleDetected { .. } => ErrorKind::CycleDetected,
            AssemblyError::AnimationTarget { .. } => ErrorKind::AnimationTarget,
            AssemblyError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn reference(reference: &str, context: impl Into<String>) -> Self {
        AssemblyError::ParseReference {
            reference: reference.to_string(),
            context: context.into(),
        }
    }

    pub(crate) fn bounds(context: impl Into<String>, required: usize, available: usize) -> Self {
        AssemblyError::AccessorBounds {
            context: context.into(),
            required,
            available,
        }
    }

    pub(crate) fn topology(context: impl Into<String>, reason: impl Into<String>) -> Self {
        AssemblyError::UnsupportedTopology {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn target(context: impl Into<String>, reason: impl Into<String>) -> Self {
        AssemblyError::AnimationTarget {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
