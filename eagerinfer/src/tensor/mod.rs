mod shape;
#[allow(clippy::module_inception)]
mod tensor;
mod value;

pub use shape::{compute_strides, is_contiguous, numel};
pub use tensor::{Tensor, TensorOptions};
pub use value::{DType, TensorElement, TensorValue};
