//! Eager single-operator execution.
//!
//! [`KernelInvoker`] runs one operator on caller-owned tensors without a
//! model: it synthesizes a one-node graph, resolves a kernel on an
//! [`ExecutionProvider`], checks input layouts and runs the kernel once.
//! [`kernel::hash`] keeps persisted kernel identities resolvable across
//! registry edits.
pub mod backend;
pub mod config;
pub mod eager;
pub mod error;
pub mod graph;
pub mod kernel;
pub mod logging;
mod ops;
pub mod schema;
mod tensor;

pub use backend::{CpuExecutionProvider, ExecutionProvider, CPU_EXECUTION_PROVIDER};
pub use config::{InvokerConfig, VersionSource};
pub use eager::{KernelInvoker, KernelLookup};
pub use error::{InvokeError, OpIdent};
pub use graph::{AttrValue, NodeAttributes};
pub use kernel::{KernelDef, KernelRegistry, OpKernel, OpKernelContext, OpKernelInfo};
pub use logging::Logger;
pub use tensor::{
    compute_strides, is_contiguous, numel, DType, Tensor, TensorElement, TensorOptions,
    TensorValue,
};
