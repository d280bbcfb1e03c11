use std::sync::Arc;

use anyhow::Result;

use crate::kernel::KernelRegistry;
use crate::ops::cpu::registry::register_cpu_kernels;
use crate::tensor::{DType, TensorValue};

use super::ExecutionProvider;

pub const CPU_EXECUTION_PROVIDER: &str = "CPUExecutionProvider";

/// Host memory provider backed by the built-in kernel library.
#[derive(Debug, Clone)]
pub struct CpuExecutionProvider {
    registry: Arc<KernelRegistry>,
}

impl CpuExecutionProvider {
    pub fn new() -> Result<Self> {
        let mut registry = KernelRegistry::new();
        register_cpu_kernels(&mut registry, CPU_EXECUTION_PROVIDER)?;
        Ok(Self {
            registry: Arc::new(registry),
        })
    }
}

impl ExecutionProvider for CpuExecutionProvider {
    fn provider_type(&self) -> &str {
        CPU_EXECUTION_PROVIDER
    }

    fn kernel_registry(&self) -> Arc<KernelRegistry> {
        Arc::clone(&self.registry)
    }

    fn alloc(&self, dtype: DType, shape: &[usize]) -> Result<TensorValue> {
        TensorValue::zeros(dtype, shape)
    }
}
