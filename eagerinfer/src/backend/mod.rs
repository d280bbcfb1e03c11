use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::kernel::{KernelCreateInfo, KernelRegistry, OpKernel, OpKernelInfo};
use crate::tensor::{DType, TensorValue};

mod cpu;

pub use cpu::{CpuExecutionProvider, CPU_EXECUTION_PROVIDER};

/// A device backend as seen by the invoker.
///
/// Providers are shared across threads. One with mutable device state (pools,
/// streams) must synchronize that state itself.
pub trait ExecutionProvider: Send + Sync + fmt::Debug {
    /// Identifier kernels are registered under.
    fn provider_type(&self) -> &str;

    /// Kernels this provider implements.
    fn kernel_registry(&self) -> Arc<KernelRegistry>;

    /// Allocate a zeroed output buffer.
    fn alloc(&self, dtype: DType, shape: &[usize]) -> Result<TensorValue>;

    /// Build a kernel instance for a node.
    fn create_kernel(
        &self,
        create_info: &KernelCreateInfo,
        info: &OpKernelInfo<'_>,
    ) -> Result<Box<dyn OpKernel>> {
        (create_info.factory)(info)
    }
}
