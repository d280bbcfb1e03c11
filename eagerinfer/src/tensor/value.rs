use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::{numel, Tensor};

/// Supported element dtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    I8,
    U8,
    I32,
    I64,
    F32,
    F64,
    Bool,
}

impl DType {
    pub const ALL: &'static [DType] = &[
        DType::I8,
        DType::U8,
        DType::I32,
        DType::I64,
        DType::F32,
        DType::F64,
        DType::Bool,
    ];

    /// Parse a dtype from its identifier string.
    pub fn from_ident(ident: &str) -> Result<Self> {
        match ident {
            "i8" => Ok(DType::I8),
            "u8" => Ok(DType::U8),
            "i32" => Ok(DType::I32),
            "i64" => Ok(DType::I64),
            "f32" => Ok(DType::F32),
            "f64" => Ok(DType::F64),
            "bool" => Ok(DType::Bool),
            _ => Err(anyhow!("unsupported dtype: {}", ident)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DType::I8 => "i8",
            DType::U8 => "u8",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::Bool => "bool",
        }
    }

    /// True if the dtype is a floating-point type.
    pub fn is_float(self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    /// True if the dtype is a signed integer type.
    pub fn is_signed_int(self) -> bool {
        matches!(self, DType::I8 | DType::I32 | DType::I64)
    }

    /// Size of a single element in bytes.
    pub fn size_in_bytes(self) -> usize {
        match self {
            DType::I8 | DType::U8 | DType::Bool => 1,
            DType::I32 | DType::F32 => 4,
            DType::I64 | DType::F64 => 8,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element type that can be converted to/from `TensorValue`.
pub trait TensorElement: Sized + Clone + Default + Send + Sync + 'static {
    const DTYPE: DType;
    /// Borrow the typed tensor held by a generic value.
    fn from_value(value: &TensorValue) -> Option<&Tensor<Self>>;
    /// Mutably borrow the typed tensor held by a generic value.
    fn from_value_mut(value: &mut TensorValue) -> Option<&mut Tensor<Self>>;
    /// Wrap a typed tensor into a generic value.
    fn into_value(tensor: Tensor<Self>) -> TensorValue;
}

macro_rules! impl_tensor_element {
    ($ty:ty, $variant:ident) => {
        impl TensorElement for $ty {
            const DTYPE: DType = DType::$variant;

            fn from_value(value: &TensorValue) -> Option<&Tensor<Self>> {
                match value {
                    TensorValue::$variant(tensor) => Some(tensor),
                    _ => None,
                }
            }

            fn from_value_mut(value: &mut TensorValue) -> Option<&mut Tensor<Self>> {
                match value {
                    TensorValue::$variant(tensor) => Some(tensor),
                    _ => None,
                }
            }

            fn into_value(tensor: Tensor<Self>) -> TensorValue {
                TensorValue::$variant(tensor)
            }
        }

        impl From<Tensor<$ty>> for TensorValue {
            fn from(value: Tensor<$ty>) -> Self {
                TensorValue::$variant(value)
            }
        }
    };
}

impl_tensor_element!(i8, I8);
impl_tensor_element!(u8, U8);
impl_tensor_element!(i32, I32);
impl_tensor_element!(i64, I64);
impl_tensor_element!(f32, F32);
impl_tensor_element!(f64, F64);
impl_tensor_element!(bool, Bool);

/// Runtime tensor value with an enum over concrete dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    I8(Tensor<i8>),
    U8(Tensor<u8>),
    I32(Tensor<i32>),
    I64(Tensor<i64>),
    F32(Tensor<f32>),
    F64(Tensor<f64>),
    Bool(Tensor<bool>),
}

/// Run `$body` with `$tensor` bound to the typed tensor inside `$value`.
#[macro_export]
macro_rules! with_tensor {
    ($value:expr, $tensor:ident => $body:expr) => {
        match $value {
            $crate::TensorValue::I8($tensor) => $body,
            $crate::TensorValue::U8($tensor) => $body,
            $crate::TensorValue::I32($tensor) => $body,
            $crate::TensorValue::I64($tensor) => $body,
            $crate::TensorValue::F32($tensor) => $body,
            $crate::TensorValue::F64($tensor) => $body,
            $crate::TensorValue::Bool($tensor) => $body,
        }
    };
}

impl TensorValue {
    /// Return the dtype of this value.
    pub fn dtype(&self) -> DType {
        match self {
            TensorValue::I8(_) => DType::I8,
            TensorValue::U8(_) => DType::U8,
            TensorValue::I32(_) => DType::I32,
            TensorValue::I64(_) => DType::I64,
            TensorValue::F32(_) => DType::F32,
            TensorValue::F64(_) => DType::F64,
            TensorValue::Bool(_) => DType::Bool,
        }
    }

    /// Return the logical element count.
    pub fn len(&self) -> usize {
        numel(self.shape())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the tensor shape.
    pub fn shape(&self) -> &[usize] {
        with_tensor!(self, tensor => tensor.shape())
    }

    /// Return the tensor strides.
    pub fn strides(&self) -> &[usize] {
        with_tensor!(self, tensor => tensor.strides())
    }

    /// True if the value is stored row-major with no gaps.
    pub fn is_contiguous(&self) -> bool {
        with_tensor!(self, tensor => tensor.is_contiguous())
    }

    /// Materialize a contiguous copy of this value.
    pub fn to_contiguous(&self) -> TensorValue {
        with_tensor!(self, tensor => tensor.to_contiguous().into())
    }

    /// Borrow the typed tensor, failing on a dtype mismatch.
    pub fn as_tensor<T: TensorElement>(&self) -> Result<&Tensor<T>> {
        T::from_value(self).ok_or_else(|| {
            anyhow!("expected {} tensor, got {}", T::DTYPE, self.dtype())
        })
    }

    /// Construct a zero-filled contiguous tensor for a dtype and shape.
    pub fn zeros(dtype: DType, shape: &[usize]) -> Result<Self> {
        Ok(match dtype {
            DType::I8 => zeros_typed::<i8>(shape)?.into(),
            DType::U8 => zeros_typed::<u8>(shape)?.into(),
            DType::I32 => zeros_typed::<i32>(shape)?.into(),
            DType::I64 => zeros_typed::<i64>(shape)?.into(),
            DType::F32 => zeros_typed::<f32>(shape)?.into(),
            DType::F64 => zeros_typed::<f64>(shape)?.into(),
            DType::Bool => zeros_typed::<bool>(shape)?.into(),
        })
    }
}

fn zeros_typed<T: TensorElement>(shape: &[usize]) -> Result<Tensor<T>> {
    let len = shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| anyhow!("tensor shape {:?} is too large", shape))?;
    Tensor::with_shape(vec![T::default(); len], shape)
}
