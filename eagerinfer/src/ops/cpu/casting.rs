use anyhow::Result;

use crate::kernel::{OpKernel, OpKernelContext, OpKernelInfo};
use crate::ops::cpu::elementwise::logical_values;
use crate::tensor::{DType, Tensor, TensorElement, TensorValue};
use crate::with_tensor;

/// Scalar conversions used by `Cast`.
///
/// Floats convert through `f64` (saturating into integers, NaN to zero),
/// everything else through `i64` (wrapping into narrower integers). Booleans
/// are `value != 0`.
pub trait CastScalar: TensorElement + Copy {
    const FLOAT: bool;
    fn to_f64(self) -> f64;
    fn to_i64(self) -> i64;
    fn from_f64(value: f64) -> Self;
    fn from_i64(value: i64) -> Self;
}

macro_rules! impl_cast_int {
    ($($ty:ty),*) => {$(
        impl CastScalar for $ty {
            const FLOAT: bool = false;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_i64(self) -> i64 {
                self as i64
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn from_i64(value: i64) -> Self {
                value as $ty
            }
        }
    )*};
}

macro_rules! impl_cast_float {
    ($($ty:ty),*) => {$(
        impl CastScalar for $ty {
            const FLOAT: bool = true;

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn to_i64(self) -> i64 {
                self as i64
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn from_i64(value: i64) -> Self {
                value as $ty
            }
        }
    )*};
}

impl_cast_int!(i8, u8, i32, i64);
impl_cast_float!(f32, f64);

impl CastScalar for bool {
    const FLOAT: bool = false;

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn to_i64(self) -> i64 {
        i64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn from_i64(value: i64) -> Self {
        value != 0
    }
}

fn cast_tensor<S: CastScalar, D: CastScalar>(src: &Tensor<S>) -> Result<TensorValue> {
    let data = logical_values(src)
        .iter()
        .map(|value| {
            if S::FLOAT {
                D::from_f64(value.to_f64())
            } else {
                D::from_i64(value.to_i64())
            }
        })
        .collect();
    Ok(D::into_value(Tensor::with_shape(data, src.shape())?))
}

fn cast_to<S: CastScalar>(src: &Tensor<S>, to: DType) -> Result<TensorValue> {
    match to {
        DType::I8 => cast_tensor::<S, i8>(src),
        DType::U8 => cast_tensor::<S, u8>(src),
        DType::I32 => cast_tensor::<S, i32>(src),
        DType::I64 => cast_tensor::<S, i64>(src),
        DType::F32 => cast_tensor::<S, f32>(src),
        DType::F64 => cast_tensor::<S, f64>(src),
        DType::Bool => cast_tensor::<S, bool>(src),
    }
}

#[derive(Debug)]
pub struct CastKernel {
    to: DType,
}

impl CastKernel {
    pub fn from_info(info: &OpKernelInfo<'_>) -> Result<Self> {
        Ok(Self {
            to: info.attr_dtype("to")?,
        })
    }
}

impl OpKernel for CastKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        let input = ctx.input(0)?;
        let output = with_tensor!(input, tensor => cast_to(tensor, self.to)?);
        ctx.set_output(0, output)
    }
}
