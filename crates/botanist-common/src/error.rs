//! Error types for botanist
//!
//! Errors carry structured fields (resource kind, namespace, component name)
//! so that a failed health check or deploy can be traced to the object that
//! caused it. Missing or unhealthy workloads are never errors; they are
//! reported as conditions. Only infrastructure failures end up here.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for botanist operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// A lister could not produce its objects
    #[error("failed to list {kind} in {namespace}: {message}")]
    ListFailed {
        /// Kind being listed (Deployment, Node, ...)
        kind: String,
        /// Namespace that was listed, or "cluster" for cluster-scoped kinds
        namespace: String,
        /// Description of what failed
        message: String,
    },

    /// Validation error for shoot specs or check inputs
    #[error("validation error for {shoot}: {message}")]
    Validation {
        /// Name of the shoot with invalid input
        shoot: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "status.gardener.version")
        field: Option<String>,
    },

    /// Configuration file or flag error
    #[error("configuration error: {message}")]
    Config {
        /// Description of what failed
        message: String,
        /// Path of the offending config file, if any
        path: Option<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// A component deployer failed
    #[error("component {component} failed to {operation}: {message}")]
    Component {
        /// Component name (etcd-main, kube-apiserver, ...)
        component: String,
        /// Operation that failed (deploy, destroy, migrate, wait)
        operation: String,
        /// Description of what failed
        message: String,
    },

    /// Several independent operations failed
    #[error("{} operations failed: {}", .errors.len(), join_errors(.errors))]
    Aggregate {
        /// Every collected failure, in the order they occurred
        errors: Vec<Error>,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "care", "shoot-client")
        context: String,
    },
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a list failure for a namespaced or cluster-scoped kind
    pub fn list_failed(
        kind: impl Into<String>,
        namespace: Option<&str>,
        msg: impl Into<String>,
    ) -> Self {
        Self::ListFailed {
            kind: kind.into(),
            namespace: namespace.unwrap_or("cluster").to_string(),
            message: msg.into(),
        }
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            shoot: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with shoot context
    pub fn validation_for(shoot: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            shoot: shoot.into(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with shoot context and field path
    pub fn validation_for_field(
        shoot: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            shoot: shoot.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            path: None,
        }
    }

    /// Create a configuration error pointing at a file
    pub fn config_in(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            path: Some(path.into()),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a component error
    pub fn component(
        component: impl Into<String>,
        operation: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Component {
            component: component.into(),
            operation: operation.into(),
            message: msg.into(),
        }
    }

    /// Combine collected failures
    ///
    /// Returns `Ok(())` when nothing failed, the single error unchanged when
    /// exactly one failed, and `Aggregate` otherwise.
    pub fn aggregate(mut errors: Vec<Error>) -> Result<(), Self> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Aggregate { errors }),
        }
    }

    /// Create an internal error with the given message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: UNKNOWN_CONTEXT.to_string(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Check if this error is a Kubernetes NotFound
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Kube {
                source: kube::Error::Api(ae),
            } => ae.code == 404,
            Error::Aggregate { errors } => !errors.is_empty() && errors.iter().all(|e| e.is_not_found()),
            _ => false,
        }
    }

    /// Check if this error is retryable
    ///
    /// Validation, config and serialization errors need a fix, not a retry.
    /// Kubernetes 4xx errors are not retried either.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Kube { source } => !matches!(
                source,
                kube::Error::Api(ae) if (400..500).contains(&ae.code)
            ),
            Error::ListFailed { .. } => true,
            Error::Validation { .. } => false,
            Error::Config { .. } => false,
            Error::Serialization { .. } => false,
            Error::Component { .. } => true,
            Error::Aggregate { errors } => errors.iter().any(|e| e.is_retryable()),
            Error::Internal { .. } => true,
        }
    }

    /// Get the shoot name if this error is associated with a specific shoot
    pub fn shoot(&self) -> Option<&str> {
        match self {
            Error::Validation { shoot, .. } => Some(shoot),
            _ => None,
        }
    }

    /// Get the context if this error has one
    pub fn context(&self) -> Option<&str> {
        match self {
            Error::Internal { context, .. } => Some(context),
            _ => None,
        }
    }
}
