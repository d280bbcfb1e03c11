use anyhow::{anyhow, Result};

use crate::kernel::{OpKernel, OpKernelContext};
use crate::ops::cpu::broadcast::broadcast_shape;
use crate::ops::cpu::elementwise::{binary_broadcast, map_input};
use crate::tensor::{Tensor, TensorElement, TensorValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Sub",
            BinaryOp::Mul => "Mul",
            BinaryOp::Div => "Div",
        }
    }
}

/// Element arithmetic. Integer ops wrap on overflow.
pub trait Arithmetic: Copy {
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    /// `None` on integer division by zero.
    fn div(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_int_arithmetic {
    ($($ty:ty),*) => {$(
        impl Arithmetic for $ty {
            fn add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn sub(self, rhs: Self) -> Self {
                self.wrapping_sub(rhs)
            }

            fn mul(self, rhs: Self) -> Self {
                self.wrapping_mul(rhs)
            }

            fn div(self, rhs: Self) -> Option<Self> {
                if rhs == 0 {
                    None
                } else {
                    Some(self.wrapping_div(rhs))
                }
            }
        }
    )*};
}

macro_rules! impl_float_arithmetic {
    ($($ty:ty),*) => {$(
        impl Arithmetic for $ty {
            fn add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn sub(self, rhs: Self) -> Self {
                self - rhs
            }

            fn mul(self, rhs: Self) -> Self {
                self * rhs
            }

            fn div(self, rhs: Self) -> Option<Self> {
                Some(self / rhs)
            }
        }
    )*};
}

impl_int_arithmetic!(i8, u8, i32, i64);
impl_float_arithmetic!(f32, f64);

/// Broadcasting Add/Sub/Mul/Div. Integer division by zero fails the kernel.
#[derive(Debug)]
pub struct BinaryKernel {
    op: BinaryOp,
}

impl BinaryKernel {
    pub fn new(op: BinaryOp) -> Self {
        Self { op }
    }

    fn run<T: TensorElement + Arithmetic>(
        &self,
        ctx: &mut OpKernelContext<'_, '_>,
        a: &Tensor<T>,
        b: &Tensor<T>,
    ) -> Result<()> {
        let shape = broadcast_shape(a.shape(), b.shape())?;
        let out = ctx.output_as::<T>(0, &shape)?;
        match self.op {
            BinaryOp::Add => binary_broadcast(a, b, out, T::add),
            BinaryOp::Sub => binary_broadcast(a, b, out, T::sub),
            BinaryOp::Mul => binary_broadcast(a, b, out, T::mul),
            BinaryOp::Div => {
                let mut by_zero = false;
                binary_broadcast(a, b, out, |x, y| {
                    x.div(y).unwrap_or_else(|| {
                        by_zero = true;
                        x
                    })
                })?;
                if by_zero {
                    return Err(anyhow!("integer division by zero"));
                }
                Ok(())
            }
        }
    }
}

impl OpKernel for BinaryKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        let a = ctx.input(0)?;
        let b = ctx.input(1)?;
        match (a, b) {
            (TensorValue::I8(a), TensorValue::I8(b)) => self.run(ctx, a, b),
            (TensorValue::U8(a), TensorValue::U8(b)) => self.run(ctx, a, b),
            (TensorValue::I32(a), TensorValue::I32(b)) => self.run(ctx, a, b),
            (TensorValue::I64(a), TensorValue::I64(b)) => self.run(ctx, a, b),
            (TensorValue::F32(a), TensorValue::F32(b)) => self.run(ctx, a, b),
            (TensorValue::F64(a), TensorValue::F64(b)) => self.run(ctx, a, b),
            _ => Err(anyhow!(
                "{} does not support inputs {} and {}",
                self.op.as_str(),
                a.dtype(),
                b.dtype()
            )),
        }
    }
}

#[derive(Debug)]
pub struct AbsKernel;

impl OpKernel for AbsKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        match ctx.input(0)? {
            TensorValue::I8(x) => map_input(ctx, x, i8::wrapping_abs),
            TensorValue::U8(x) => map_input(ctx, x, |v| v),
            TensorValue::I32(x) => map_input(ctx, x, i32::wrapping_abs),
            TensorValue::I64(x) => map_input(ctx, x, i64::wrapping_abs),
            TensorValue::F32(x) => map_input(ctx, x, f32::abs),
            TensorValue::F64(x) => map_input(ctx, x, f64::abs),
            other => Err(anyhow!("Abs does not support {}", other.dtype())),
        }
    }
}

#[derive(Debug)]
pub struct NegKernel;

impl OpKernel for NegKernel {
    fn compute(&self, ctx: &mut OpKernelContext<'_, '_>) -> Result<()> {
        match ctx.input(0)? {
            TensorValue::I8(x) => map_input(ctx, x, i8::wrapping_neg),
            TensorValue::I32(x) => map_input(ctx, x, i32::wrapping_neg),
            TensorValue::I64(x) => map_input(ctx, x, i64::wrapping_neg),
            TensorValue::F32(x) => map_input(ctx, x, |v: f32| -v),
            TensorValue::F64(x) => map_input(ctx, x, |v: f64| -v),
            other => Err(anyhow!("Neg does not support {}", other.dtype())),
        }
    }
}
