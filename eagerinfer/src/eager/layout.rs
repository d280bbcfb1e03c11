use crate::kernel::KernelDef;
use crate::tensor::TensorValue;

/// Check every input against the kernel's layout contract.
///
/// Returns the position of the first non-contiguous input the kernel does not
/// accept.
pub fn validate_input_layouts(inputs: &[TensorValue], kernel_def: &KernelDef) -> Result<(), usize> {
    match inputs
        .iter()
        .enumerate()
        .find(|(index, value)| !value.is_contiguous() && !kernel_def.allows_strided_input(*index))
    {
        Some((index, _)) => Err(index),
        None => Ok(()),
    }
}
