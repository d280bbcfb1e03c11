use anyhow::{anyhow, Result};

use crate::eager::ExecutionFrame;
use crate::graph::Node;
use crate::logging::Logger;
use crate::tensor::{DType, Tensor, TensorElement, TensorValue};

use super::KernelDef;

/// View of the execution frame handed to [`super::OpKernel::compute`].
///
/// Inputs are the caller's tensors and stay borrowed for the whole call, so a
/// kernel may hold them while it writes outputs.
pub struct OpKernelContext<'c, 'a> {
    frame: &'c mut ExecutionFrame<'a>,
    node: &'c Node,
    kernel_def: &'c KernelDef,
    logger: &'c Logger,
}

impl<'c, 'a> OpKernelContext<'c, 'a> {
    pub fn new(
        frame: &'c mut ExecutionFrame<'a>,
        node: &'c Node,
        kernel_def: &'c KernelDef,
        logger: &'c Logger,
    ) -> Self {
        Self {
            frame,
            node,
            kernel_def,
            logger,
        }
    }

    pub fn node(&self) -> &Node {
        self.node
    }

    pub fn kernel_def(&self) -> &KernelDef {
        self.kernel_def
    }

    pub fn logger(&self) -> &Logger {
        self.logger
    }

    pub fn input_count(&self) -> usize {
        self.frame.input_count()
    }

    pub fn output_count(&self) -> usize {
        self.frame.output_count()
    }

    pub fn input(&self, index: usize) -> Result<&'a TensorValue> {
        self.frame
            .input(index)
            .ok_or_else(|| anyhow!("{} has no input {}", self.node, index))
    }

    /// Input `index` if the caller supplied it.
    pub fn optional_input(&self, index: usize) -> Option<&'a TensorValue> {
        self.frame.input(index)
    }

    pub fn input_as<T: TensorElement>(&self, index: usize) -> Result<&'a Tensor<T>> {
        self.input(index)?.as_tensor::<T>()
    }

    /// Output buffer `index` with the given dtype and shape.
    ///
    /// A pre-allocated output is reused when it matches and rejected when it
    /// does not; otherwise a zeroed buffer is allocated by the provider.
    pub fn output(&mut self, index: usize, dtype: DType, shape: &[usize]) -> Result<&mut TensorValue> {
        self.frame.output_buffer(index, dtype, shape)
    }

    pub fn output_as<T: TensorElement>(&mut self, index: usize, shape: &[usize]) -> Result<&mut Tensor<T>> {
        let value = self.output(index, T::DTYPE, shape)?;
        T::from_value_mut(value).ok_or_else(|| anyhow!("output {} is not {}", index, T::DTYPE))
    }

    /// Store a finished value as output `index`.
    pub fn set_output(&mut self, index: usize, value: TensorValue) -> Result<()> {
        self.frame.set_output(index, value)
    }
}
