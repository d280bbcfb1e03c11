use std::fmt;

use thiserror::Error;

/// Result type for eager invocation.
pub type Result<T> = std::result::Result<T, InvokeError>;

/// Operator a failed call was about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpIdent {
    pub op: String,
    pub domain: String,
    pub version: i32,
}

impl OpIdent {
    pub fn new(op: impl Into<String>, domain: impl Into<String>, version: i32) -> Self {
        Self {
            op: op.into(),
            domain: domain.into(),
            version,
        }
    }
}

impl fmt::Display for OpIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name:{}, domain:{}, version:{}",
            self.op, self.domain, self.version
        )
    }
}

/// Failure of one eager call. Every variant is fatal for that call.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Graph validation failed for {ident}: {message}")]
    GraphValidation { ident: OpIdent, message: String },

    #[error("Could not find kernel {ident}, provider:{provider}: {message}")]
    KernelNotFound {
        ident: OpIdent,
        provider: String,
        message: String,
    },

    #[error("Kernel construction failed for {ident}: {message}")]
    KernelConstruction { ident: OpIdent, message: String },

    #[error("Kernel {}'s input {index} doesn't support non-contiguous tensor", .ident.op)]
    UnsupportedLayout { ident: OpIdent, index: usize },

    #[error("Kernel execution failed for {ident}: {message}")]
    KernelExecution { ident: OpIdent, message: String },
}

impl InvokeError {
    pub fn ident(&self) -> &OpIdent {
        match self {
            InvokeError::GraphValidation { ident, .. }
            | InvokeError::KernelNotFound { ident, .. }
            | InvokeError::KernelConstruction { ident, .. }
            | InvokeError::UnsupportedLayout { ident, .. }
            | InvokeError::KernelExecution { ident, .. } => ident,
        }
    }

    /// Pipeline stage the call failed in.
    pub fn stage(&self) -> &'static str {
        match self {
            InvokeError::GraphValidation { .. } => "graph_validation",
            InvokeError::KernelNotFound { .. } => "kernel_lookup",
            InvokeError::KernelConstruction { .. } => "kernel_construction",
            InvokeError::UnsupportedLayout { .. } => "layout_validation",
            InvokeError::KernelExecution { .. } => "kernel_execution",
        }
    }
}
