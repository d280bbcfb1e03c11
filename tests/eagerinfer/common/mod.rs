#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{anyhow, Result};
use eagerinfer::{
    CpuExecutionProvider, InvokerConfig, KernelInvoker, Tensor, TensorElement, TensorValue,
};

pub fn cpu_provider() -> Result<Arc<CpuExecutionProvider>> {
    Ok(Arc::new(CpuExecutionProvider::new()?))
}

pub fn cpu_invoker() -> Result<KernelInvoker> {
    Ok(KernelInvoker::new(cpu_provider()?))
}

pub fn cpu_invoker_with(config: InvokerConfig) -> Result<KernelInvoker> {
    Ok(KernelInvoker::with_config(cpu_provider()?, config))
}

pub fn tensor<T: TensorElement>(data: Vec<T>, shape: &[usize]) -> Result<TensorValue> {
    Ok(T::into_value(Tensor::with_shape(data, shape)?))
}

/// Logical contents of output `index`, failing if it is missing or mistyped.
pub fn output_vec<T: TensorElement>(outputs: &[Option<TensorValue>], index: usize) -> Result<Vec<T>> {
    let value = outputs
        .get(index)
        .and_then(Option::as_ref)
        .ok_or_else(|| anyhow!("output {} was not produced", index))?;
    Ok(value.as_tensor::<T>()?.to_vec())
}

pub fn output_shape(outputs: &[Option<TensorValue>], index: usize) -> Result<Vec<usize>> {
    let value = outputs
        .get(index)
        .and_then(Option::as_ref)
        .ok_or_else(|| anyhow!("output {} was not produced", index))?;
    Ok(value.shape().to_vec())
}

pub fn assert_close(actual: &[f32], expected: &[f32], tol: f32) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= tol,
            "element {} differs: actual {} expected {}",
            i,
            a,
            e
        );
    }
}
